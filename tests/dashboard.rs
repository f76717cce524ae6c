use std::io::Write;
use std::path::PathBuf;

use stroke_dashboard::aggregate::{binned_count, count_by, split_by_outcome, Bins};
use stroke_dashboard::chart::{bar_chart, ChartOptions};
use stroke_dashboard::dashboard::{
    self, AGE_BAR, AGE_FILTER, GENDER_FILTER, GENDER_PIE, JOB_FILTER, JOB_TREE,
};
use stroke_dashboard::records::{CategoricalField, NumericField};
use stroke_dashboard::{Dataset, InputValues, Outcome, Output};

const HEADER: &str =
    "gender,age,work_type,Residence_type,avg_glucose_level,bmi,smoking_status,stroke";

fn bundled() -> Dataset {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("datasets")
        .join("healthcare_stroke_dataset_clean.csv");
    Dataset::load(path).unwrap()
}

fn load(rows: &[&str]) -> Dataset {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "{}", HEADER).unwrap();
    for row in rows {
        writeln!(file, "{}", row).unwrap();
    }
    Dataset::load(file.path()).unwrap()
}

/// 10 rows: stroke Yes x3 / No x7, gender Male x6 / Female x4.
fn ten_patients() -> Dataset {
    load(&[
        "Male,67,Private,Urban,228.69,36.6,formerly smoked,Yes",
        "Male,80,Private,Rural,105.92,32.5,never smoked,Yes",
        "Female,61,Self-employed,Rural,202.21,N/A,never smoked,Yes",
        "Male,3,children,Rural,95.12,18,Unknown,No",
        "Male,58,Private,Urban,87.96,39.2,never smoked,No",
        "Male,14,Never_worked,Rural,161.28,19.1,Unknown,No",
        "Male,37,Private,Rural,162.96,39.4,never smoked,No",
        "Female,8,Private,Urban,110.89,17.6,Unknown,No",
        "Female,70,Private,Rural,69.04,35.9,formerly smoked,No",
        "Female,N/A,Govt_job,Urban,77.08,35,Unknown,No",
    ])
}

#[test]
fn bundled_dataset_loads() {
    let dataset = bundled();
    assert_eq!(dataset.len(), 25);
    let stroke = dataset
        .records()
        .iter()
        .filter(|r| r.stroke == Some(Outcome::Yes))
        .count();
    assert_eq!(stroke, 10);
}

#[test]
fn stroke_gender_counts_sum_to_stroke_rows() {
    let dataset = ten_patients();
    let counts = count_by(&dataset, CategoricalField::Gender, Some(Outcome::Yes));
    assert_eq!(counts.total(), 3);

    let all = count_by(&dataset, CategoricalField::Gender, None);
    assert_eq!(all.total(), 10);
    assert_eq!(all.get("Male"), Some(&6));
    assert_eq!(all.get("Female"), Some(&4));
}

#[test]
fn missing_age_is_left_out_of_bins() {
    let dataset = ten_patients();
    let bins = Bins::age();
    let counts = binned_count(&dataset, NumericField::Age, &bins, None);

    assert_eq!(counts.len(), bins.len());
    assert_eq!(counts.labels(), bins.labels().to_vec());
    let coerced = dataset.records().iter().filter(|r| r.age.is_some()).count() as u64;
    assert_eq!(coerced, 9);
    assert_eq!(counts.total(), coerced);
}

#[test]
fn two_groups_cover_every_row() {
    let dataset = ten_patients();
    let groups = split_by_outcome(&dataset, NumericField::AvgGlucoseLevel);
    let yes = groups.get("Yes").unwrap().len();
    let no = groups.get("No").unwrap().len();
    assert_eq!((yes, no), (3, 7));
}

#[test]
fn filter_with_no_match_renders_empty_chart() {
    let dataset = load(&["Female,40,Private,Rural,95.04,42.4,never smoked,No"]);
    let registry = dashboard::registry();

    let bindings = [
        (GENDER_PIE, GENDER_FILTER),
        (AGE_BAR, AGE_FILTER),
        (JOB_TREE, JOB_FILTER),
    ];
    for (output, filter) in bindings {
        let values = InputValues::new().with(filter, "Yes");
        match registry.dispatch(&dataset, output, &values) {
            Ok(Output::Figure(spec)) => {
                assert!(spec.empty, "{output} should be empty");
                assert!(spec.series.is_empty());
                assert_eq!(spec.to_figure()["data"].as_array().map(Vec::len), Some(0));
            }
            other => panic!("unexpected result for {output}: {other:?}"),
        }
    }
}

#[test]
fn same_inputs_give_same_chart() {
    let dataset = bundled();
    let registry = dashboard::registry();
    let values = InputValues::new().with(GENDER_FILTER, "No");

    let first = registry.dispatch(&dataset, GENDER_PIE, &values).unwrap();
    let second = registry.dispatch(&dataset, GENDER_PIE, &values).unwrap();
    assert_eq!(first, second);

    let options = ChartOptions::new("Age", 900, 500);
    let counts = binned_count(&dataset, NumericField::Age, &Bins::age(), Some(Outcome::Yes));
    assert_eq!(
        bar_chart(&counts, &options).to_figure(),
        bar_chart(&counts, &options).to_figure()
    );
}

#[test]
fn every_binding_succeeds_on_default_controls() {
    let dataset = bundled();
    let registry = dashboard::registry();
    let mut values = InputValues::new();
    for dep in registry.dependencies() {
        for input in &dep.inputs {
            values = values.with(input.id(), dashboard::FILTER_DEFAULT);
        }
    }
    for dep in registry.dependencies() {
        assert!(
            registry.dispatch(&dataset, &dep.output, &values).is_ok(),
            "{} failed",
            dep.output
        );
    }
}
