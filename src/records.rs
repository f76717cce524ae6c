use std::fmt;
use std::str::FromStr;

use polars::prelude::{DataType, Field, Schema};
use serde::{Deserialize, Serialize};

pub const GENDER: &str = "gender";
pub const AGE: &str = "age";
pub const RESIDENCE_TYPE: &str = "Residence_type";
pub const WORK_TYPE: &str = "work_type";
pub const SMOKING_STATUS: &str = "smoking_status";
pub const AVG_GLUCOSE_LEVEL: &str = "avg_glucose_level";
pub const BMI: &str = "bmi";
pub const STROKE: &str = "stroke";

/// Columns the dashboard reads. Any other column in the file is ignored.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    GENDER,
    AGE,
    RESIDENCE_TYPE,
    WORK_TYPE,
    SMOKING_STATUS,
    AVG_GLUCOSE_LEVEL,
    BMI,
    STROKE,
];

/// Label used for a categorical cell that is empty in the source file.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Binary outcome label of a patient row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Yes,
    No,
}

impl Outcome {
    pub const ALL: [Outcome; 2] = [Outcome::Yes, Outcome::No];

    pub fn label(self) -> &'static str {
        match self {
            Outcome::Yes => "Yes",
            Outcome::No => "No",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Outcome {
    type Err = String;

    // Exact match only: rows are grouped by the label as written.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Yes" => Ok(Outcome::Yes),
            "No" => Ok(Outcome::No),
            other => Err(format!("unrecognized outcome label {:?}", other)),
        }
    }
}

/// One patient row, restricted to the fields the dashboard aggregates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientRecord {
    pub gender: String,
    pub age: Option<f64>,
    pub residence_type: String,
    pub work_type: String,
    pub smoking_status: String,
    pub avg_glucose_level: Option<f64>,
    pub bmi: Option<f64>,
    /// `None` when the label is neither `Yes` nor `No`; such rows match no
    /// outcome filter and belong to neither outcome group.
    pub stroke: Option<Outcome>,
}

/// Fields that can be grouped by exact value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoricalField {
    Gender,
    ResidenceType,
    WorkType,
    SmokingStatus,
}

impl CategoricalField {
    pub fn column(self) -> &'static str {
        match self {
            CategoricalField::Gender => GENDER,
            CategoricalField::ResidenceType => RESIDENCE_TYPE,
            CategoricalField::WorkType => WORK_TYPE,
            CategoricalField::SmokingStatus => SMOKING_STATUS,
        }
    }

    pub fn value(self, record: &PatientRecord) -> &str {
        match self {
            CategoricalField::Gender => &record.gender,
            CategoricalField::ResidenceType => &record.residence_type,
            CategoricalField::WorkType => &record.work_type,
            CategoricalField::SmokingStatus => &record.smoking_status,
        }
    }
}

/// Fields coerced to numbers at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericField {
    Age,
    AvgGlucoseLevel,
    Bmi,
}

impl NumericField {
    pub fn column(self) -> &'static str {
        match self {
            NumericField::Age => AGE,
            NumericField::AvgGlucoseLevel => AVG_GLUCOSE_LEVEL,
            NumericField::Bmi => BMI,
        }
    }

    pub fn value(self, record: &PatientRecord) -> Option<f64> {
        match self {
            NumericField::Age => record.age,
            NumericField::AvgGlucoseLevel => record.avg_glucose_level,
            NumericField::Bmi => record.bmi,
        }
    }
}

pub struct StrokeRecord {}

impl StrokeRecord {
    /// Schema applied while reading: every consumed column is read as text so a
    /// stray "N/A" never aborts the read. Numbers are cast afterwards.
    pub fn raw_schema() -> Schema {
        Schema::from_iter(REQUIRED_COLUMNS.iter().map(|name| Field::new(name, DataType::Utf8)))
    }
}
