use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info, warn};
use polars::frame::DataFrame;
use polars::prelude::*;

use crate::error::DataError;
use crate::records::{
    Outcome, PatientRecord, StrokeRecord, AGE, AVG_GLUCOSE_LEVEL, BMI, GENDER, REQUIRED_COLUMNS,
    RESIDENCE_TYPE, SMOKING_STATUS, STROKE, UNKNOWN_CATEGORY, WORK_TYPE,
};

/// The record table. Built once at startup and only ever read afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    headers: Vec<String>,
    records: Vec<PatientRecord>,
}

impl Dataset {
    pub fn new(headers: Vec<String>, records: Vec<PatientRecord>) -> Self {
        Self { headers, records }
    }

    /// Reads the CSV file at `path`. Fails on a missing file or a header
    /// without the required columns. Rows with an outcome other than `Yes` or
    /// `No` are kept, logged, and left without an outcome.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DataError> {
        let path = path.as_ref();
        let headers = read_headers(path)?;

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|name| !headers.iter().any(|h| h == *name))
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(DataError::MissingColumns {
                path: path.to_path_buf(),
                columns: missing,
            });
        }

        let df = read_csv(path)?;
        let records = frame_to_records(&df)?;
        info!(
            "loaded {} rows with {} columns from {:?}",
            records.len(),
            headers.len(),
            path
        );

        Ok(Self { headers, records })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn records(&self) -> &[PatientRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

fn open(path: &Path) -> Result<File, DataError> {
    File::open(path).map_err(|e| DataError::Unavailable {
        path: PathBuf::from(path),
        reason: e.to_string(),
    })
}

fn read_headers(path: &Path) -> Result<Vec<String>, DataError> {
    let mut reader = csv::Reader::from_reader(open(path)?);
    let headers = reader.headers()?;
    if headers.is_empty() {
        return Err(DataError::Unavailable {
            path: path.to_path_buf(),
            reason: "file has no header row".to_string(),
        });
    }
    Ok(headers.iter().map(|h| h.trim().to_string()).collect())
}

pub fn read_csv(path: &Path) -> Result<DataFrame, DataError> {
    let file = open(path)?;

    let df = CsvReader::new(file)
        .has_header(true)
        .with_dtypes(Option::from(Arc::new(StrokeRecord::raw_schema())))
        .finish()?;
    Ok(df)
}

/// Converts a frame read with the raw schema into typed rows.
pub fn frame_to_records(df: &DataFrame) -> Result<Vec<PatientRecord>, DataError> {
    let gender = text_column(df, GENDER)?;
    let residence = text_column(df, RESIDENCE_TYPE)?;
    let work = text_column(df, WORK_TYPE)?;
    let smoking = text_column(df, SMOKING_STATUS)?;
    let stroke = raw_text_column(df, STROKE)?;
    let age = numeric_column(df, AGE)?;
    let glucose = numeric_column(df, AVG_GLUCOSE_LEVEL)?;
    let bmi = numeric_column(df, BMI)?;

    let mut records = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let outcome = match stroke[row].parse::<Outcome>() {
            Ok(outcome) => Some(outcome),
            Err(reason) => {
                warn!("row {}: {}, row left out of outcome groups", row + 1, reason);
                None
            }
        };
        records.push(PatientRecord {
            gender: gender[row].clone(),
            age: age[row],
            residence_type: residence[row].clone(),
            work_type: work[row].clone(),
            smoking_status: smoking[row].clone(),
            avg_glucose_level: glucose[row],
            bmi: bmi[row],
            stroke: outcome,
        });
    }
    Ok(records)
}

// Cells as written; a null cell becomes the empty string.
fn raw_text_column(df: &DataFrame, name: &str) -> Result<Vec<String>, DataError> {
    let values = df.column(name)?.utf8()?;
    Ok(values
        .into_iter()
        .map(|v| v.unwrap_or_default().to_string())
        .collect())
}

fn text_column(df: &DataFrame, name: &str) -> Result<Vec<String>, DataError> {
    let values = df.column(name)?.utf8()?;
    Ok(values
        .into_iter()
        .map(|v| match v.map(str::trim) {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => UNKNOWN_CATEGORY.to_string(),
        })
        .collect())
}

// Non-strict cast: anything that does not parse becomes null.
fn numeric_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, DataError> {
    let raw = df.column(name)?;
    let present = raw.len() - raw.null_count();
    let series = raw.cast(&DataType::Float64)?;
    let values: Vec<Option<f64>> = series
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| x.is_finite()))
        .collect();

    let coerced = values.iter().filter(|v| v.is_some()).count();
    if coerced < present {
        warn!(
            "{} value(s) in column {:?} are not numeric and are treated as missing",
            present - coerced,
            name
        );
    } else {
        debug!("column {:?} fully numeric", name);
    }
    Ok(values)
}
