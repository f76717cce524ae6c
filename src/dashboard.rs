//! The stroke dashboard: which output is computed from which control.

use crate::aggregate::{
    binned_count, count_by, count_by_value, outcome_totals, split_by_outcome, Aggregation, Bins,
};
use crate::binding::{InputSource, Output, Registry, UpdateContext};
use crate::chart::{
    bar_chart, box_chart, line_chart, pie_chart, treemap_chart, ChartOptions, ChartSpec,
};
use crate::error::BindingError;
use crate::records::{CategoricalField, NumericField};

pub const KPI_TOTAL: &str = "kpi-total";
pub const KPI_NO_STROKE: &str = "kpi-no-stroke";
pub const KPI_STROKE: &str = "kpi-stroke";

pub const GENDER_PIE: &str = "gender-pie-chart";
pub const RESIDENCE_PIE: &str = "residence-pie-chart";
pub const AGE_BAR: &str = "agebar-chart";
pub const SMOKER_BAR: &str = "stroke-positive-smoker-chart";
pub const JOB_TREE: &str = "job-tree-chart";
pub const GLUCOSE_BOX: &str = "glucose-bar-chart";
pub const BMI_BOX: &str = "bmi-bar-chart";
pub const AGE_LINE: &str = "age-line-chart";

pub const GENDER_FILTER: &str = "gender_stroke_val";
pub const RESIDENCE_FILTER: &str = "residence_stroke_val";
pub const AGE_FILTER: &str = "age_stroke_val";
pub const SMOKER_FILTER: &str = "smoker_stroke_val";
pub const JOB_FILTER: &str = "job_stroke_val";

/// Choices offered by every stroke filter dropdown.
pub const FILTER_OPTIONS: [&str; 2] = ["Yes", "No"];
pub const FILTER_DEFAULT: &str = "No";

const GENDER_PIE_OPTIONS: ChartOptions = ChartOptions::new("Gender distribution", 500, 500);
const RESIDENCE_PIE_OPTIONS: ChartOptions = ChartOptions::new("Residence type", 500, 500);
const AGE_BAR_OPTIONS: ChartOptions =
    ChartOptions::new("Age distribution", 900, 500).with_axes("Age Group", "Count");
const SMOKER_BAR_OPTIONS: ChartOptions =
    ChartOptions::new("Smoking status", 450, 450).with_axes("Smoking status", "Count");
const JOB_TREE_OPTIONS: ChartOptions = ChartOptions::new("Work type", 450, 450);
const GLUCOSE_BOX_OPTIONS: ChartOptions =
    ChartOptions::new("Average glucose level", 450, 450).with_axes("Stroke", "mg/dL");
const BMI_BOX_OPTIONS: ChartOptions =
    ChartOptions::new("Body mass index", 450, 450).with_axes("Stroke", "BMI");
const AGE_LINE_OPTIONS: ChartOptions =
    ChartOptions::new("Patients by age", 1800, 400).with_axes("Age", "Count");

/// A chart placeholder with an optional stroke filter dropdown under it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartSlot {
    pub output: &'static str,
    pub filter: Option<&'static str>,
}

const fn filtered(output: &'static str, filter: &'static str) -> ChartSlot {
    ChartSlot {
        output,
        filter: Some(filter),
    }
}

const fn fixed(output: &'static str) -> ChartSlot {
    ChartSlot {
        output,
        filter: None,
    }
}

pub const KPIS: [(&str, &str, &str); 3] = [
    ("Total patients", KPI_TOTAL, "kpi-generic"),
    ("Healthy", KPI_NO_STROKE, "kpi-no-stroke"),
    ("Stroke", KPI_STROKE, "kpi-stroke"),
];

/// Chart placeholders, one inner slice per grid row.
pub const ROWS: [&[ChartSlot]; 3] = [
    &[
        filtered(GENDER_PIE, GENDER_FILTER),
        filtered(RESIDENCE_PIE, RESIDENCE_FILTER),
        filtered(AGE_BAR, AGE_FILTER),
    ],
    &[
        filtered(SMOKER_BAR, SMOKER_FILTER),
        filtered(JOB_TREE, JOB_FILTER),
        fixed(GLUCOSE_BOX),
        fixed(BMI_BOX),
    ],
    &[fixed(AGE_LINE)],
];

fn figure(spec: ChartSpec) -> Result<Output, BindingError> {
    Ok(Output::Figure(spec))
}

fn categorical(
    ctx: &UpdateContext<'_>,
    filter: &str,
    field: CategoricalField,
) -> Result<Aggregation<u64>, BindingError> {
    let outcome = ctx.outcome(filter)?;
    Ok(count_by(ctx.dataset, field, Some(outcome)))
}

/// Registers every binding of the dashboard.
pub fn register(registry: &mut Registry) {
    registry
        .bind(KPI_TOTAL, vec![InputSource::mount(KPI_TOTAL)], |ctx| {
            Ok(Output::Text(outcome_totals(ctx.dataset).total.to_string()))
        })
        .bind(KPI_NO_STROKE, vec![InputSource::mount(KPI_NO_STROKE)], |ctx| {
            Ok(Output::Text(
                outcome_totals(ctx.dataset).no_stroke.to_string(),
            ))
        })
        .bind(KPI_STROKE, vec![InputSource::mount(KPI_STROKE)], |ctx| {
            Ok(Output::Text(outcome_totals(ctx.dataset).stroke.to_string()))
        });

    registry
        .bind(GENDER_PIE, vec![InputSource::control(GENDER_FILTER)], |ctx| {
            let counts = categorical(ctx, GENDER_FILTER, CategoricalField::Gender)?;
            figure(pie_chart(&counts, &GENDER_PIE_OPTIONS))
        })
        .bind(
            RESIDENCE_PIE,
            vec![InputSource::control(RESIDENCE_FILTER)],
            |ctx| {
                let counts = categorical(ctx, RESIDENCE_FILTER, CategoricalField::ResidenceType)?;
                figure(pie_chart(&counts, &RESIDENCE_PIE_OPTIONS))
            },
        )
        .bind(AGE_BAR, vec![InputSource::control(AGE_FILTER)], |ctx| {
            let outcome = ctx.outcome(AGE_FILTER)?;
            let counts = binned_count(ctx.dataset, NumericField::Age, &Bins::age(), Some(outcome));
            figure(bar_chart(&counts, &AGE_BAR_OPTIONS))
        })
        .bind(SMOKER_BAR, vec![InputSource::control(SMOKER_FILTER)], |ctx| {
            let counts = categorical(ctx, SMOKER_FILTER, CategoricalField::SmokingStatus)?;
            figure(bar_chart(&counts, &SMOKER_BAR_OPTIONS))
        })
        .bind(JOB_TREE, vec![InputSource::control(JOB_FILTER)], |ctx| {
            let counts = categorical(ctx, JOB_FILTER, CategoricalField::WorkType)?;
            figure(treemap_chart(&counts, &JOB_TREE_OPTIONS))
        });

    registry
        .bind(GLUCOSE_BOX, vec![InputSource::mount(GLUCOSE_BOX)], |ctx| {
            let groups = split_by_outcome(ctx.dataset, NumericField::AvgGlucoseLevel);
            figure(box_chart(&groups, &GLUCOSE_BOX_OPTIONS))
        })
        .bind(BMI_BOX, vec![InputSource::mount(BMI_BOX)], |ctx| {
            let groups = split_by_outcome(ctx.dataset, NumericField::Bmi);
            figure(box_chart(&groups, &BMI_BOX_OPTIONS))
        })
        .bind(AGE_LINE, vec![InputSource::mount(AGE_LINE)], |ctx| {
            let counts = count_by_value(ctx.dataset, NumericField::Age);
            figure(line_chart(&counts, &AGE_LINE_OPTIONS))
        });
}

pub fn registry() -> Registry {
    let mut registry = Registry::new();
    register(&mut registry);
    registry
}
