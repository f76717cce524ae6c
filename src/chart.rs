//! Chart specifications and the builders that turn aggregations into them.
//!
//! A [`ChartSpec`] is a plain value: builders never look at anything but their
//! arguments, so the same aggregation always yields the same spec. The spec is
//! exported to the browser as a Plotly figure by [`ChartSpec::to_figure`].

use serde::Serialize;
use serde_json::{json, Value};

use crate::aggregate::Aggregation;
use crate::palette::{outcome_color, work_type_color, FALLBACK_COLOR};
use crate::records::Outcome;

/// Inner hole ratio shared by every donut chart.
pub const PIE_HOLE: f64 = 0.6;
pub const TITLE_FONT_SIZE: u32 = 24;
pub const NO_DATA_TEXT: &str = "No data";
pub const TREEMAP_ROOT_ID: &str = "root";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Pie,
    Bar,
    Box,
    Treemap,
    Line,
}

/// Per-chart constants: title, canvas size and axis labels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartOptions {
    pub title: &'static str,
    pub width: u32,
    pub height: u32,
    pub x_axis_title: Option<&'static str>,
    pub y_axis_title: Option<&'static str>,
}

impl ChartOptions {
    pub const fn new(title: &'static str, width: u32, height: u32) -> Self {
        Self {
            title,
            width,
            height,
            x_axis_title: None,
            y_axis_title: None,
        }
    }

    pub const fn with_axes(self, x: &'static str, y: &'static str) -> Self {
        Self {
            x_axis_title: Some(x),
            y_axis_title: Some(y),
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartLayout {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub x_axis_title: Option<String>,
    pub y_axis_title: Option<String>,
}

impl From<&ChartOptions> for ChartLayout {
    fn from(options: &ChartOptions) -> Self {
        Self {
            title: options.title.to_string(),
            width: options.width,
            height: options.height,
            x_axis_title: options.x_axis_title.map(str::to_string),
            y_axis_title: options.y_axis_title.map(str::to_string),
        }
    }
}

/// Five-number summary plus outliers for one box.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxSummary {
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub lower_whisker: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

impl BoxSummary {
    /// Quartiles by linear interpolation, whiskers at the furthest samples
    /// within 1.5 IQR. `None` for an empty sample.
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let mut sorted = samples.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let q1 = quantile(&sorted, 0.25);
        let median = quantile(&sorted, 0.5);
        let q3 = quantile(&sorted, 0.75);
        let iqr = q3 - q1;
        let (lo_fence, hi_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

        let inside: Vec<f64> = sorted
            .iter()
            .copied()
            .filter(|v| *v >= lo_fence && *v <= hi_fence)
            .collect();
        let outliers = sorted
            .iter()
            .copied()
            .filter(|v| *v < lo_fence || *v > hi_fence)
            .collect();

        Some(Self {
            count: sorted.len(),
            min: sorted[0],
            q1,
            median,
            q3,
            max: sorted[sorted.len() - 1],
            lower_whisker: inside.first().copied().unwrap_or(q1),
            upper_whisker: inside.last().copied().unwrap_or(q3),
            outliers,
        })
    }
}

fn quantile(sorted: &[f64], p: f64) -> f64 {
    let pos = p * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Series {
    Pie {
        labels: Vec<String>,
        values: Vec<u64>,
        hole: f64,
    },
    Bar {
        x: Vec<String>,
        y: Vec<u64>,
        text: Vec<String>,
    },
    Box {
        name: String,
        color: String,
        summary: Option<BoxSummary>,
    },
    Treemap {
        ids: Vec<String>,
        labels: Vec<String>,
        parents: Vec<String>,
        values: Vec<u64>,
        colors: Vec<String>,
    },
    Line {
        x: Vec<String>,
        y: Vec<u64>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub series: Vec<Series>,
    pub layout: ChartLayout,
    pub empty: bool,
}

impl ChartSpec {
    fn empty(kind: ChartKind, options: &ChartOptions) -> Self {
        Self {
            kind,
            series: Vec::new(),
            layout: options.into(),
            empty: true,
        }
    }

    /// Plotly figure JSON: `{"data": [...], "layout": {...}}`.
    pub fn to_figure(&self) -> Value {
        let data: Vec<Value> = self.series.iter().flat_map(series_traces).collect();

        let mut layout = json!({
            "title": {
                "text": self.layout.title,
                "font": { "size": TITLE_FONT_SIZE },
                "x": 0.5,
            },
            "autosize": false,
            "width": self.layout.width,
            "height": self.layout.height,
        });
        if let Some(x) = &self.layout.x_axis_title {
            layout["xaxis"] = json!({ "title": { "text": x } });
        }
        if let Some(y) = &self.layout.y_axis_title {
            layout["yaxis"] = json!({ "title": { "text": y } });
        }
        if self.kind == ChartKind::Box {
            layout["showlegend"] = json!(false);
        }
        if self.empty {
            layout["xaxis"] = json!({ "visible": false });
            layout["yaxis"] = json!({ "visible": false });
            layout["annotations"] = json!([{
                "text": NO_DATA_TEXT,
                "showarrow": false,
                "xref": "paper",
                "yref": "paper",
                "x": 0.5,
                "y": 0.5,
                "font": { "size": 20 },
            }]);
        }

        json!({ "data": data, "layout": layout })
    }
}

fn series_traces(series: &Series) -> Vec<Value> {
    match series {
        Series::Pie {
            labels,
            values,
            hole,
        } => vec![json!({ "type": "pie", "labels": labels, "values": values, "hole": hole })],
        Series::Bar { x, y, text } => vec![json!({
            "type": "bar",
            "x": x,
            "y": y,
            "text": text,
            "textposition": "auto",
        })],
        Series::Box {
            name,
            color,
            summary,
        } => {
            let Some(s) = summary else {
                return vec![json!({ "type": "box", "name": name, "x": [name], "marker": { "color": color } })];
            };
            let mut traces = vec![json!({
                "type": "box",
                "name": name,
                "x": [name],
                "q1": [s.q1],
                "median": [s.median],
                "q3": [s.q3],
                "lowerfence": [s.lower_whisker],
                "upperfence": [s.upper_whisker],
                "marker": { "color": color },
            })];
            if !s.outliers.is_empty() {
                traces.push(json!({
                    "type": "scatter",
                    "mode": "markers",
                    "name": format!("{} outliers", name),
                    "x": vec![name; s.outliers.len()],
                    "y": s.outliers,
                    "marker": { "color": color, "size": 4 },
                }));
            }
            traces
        }
        Series::Treemap {
            ids,
            labels,
            parents,
            values,
            colors,
        } => vec![json!({
            "type": "treemap",
            "ids": ids,
            "labels": labels,
            "parents": parents,
            "values": values,
            "branchvalues": "total",
            "marker": { "colors": colors },
            "textinfo": "label+value",
        })],
        Series::Line { x, y } => vec![json!({
            "type": "scatter",
            "mode": "lines",
            "x": x,
            "y": y,
        })],
    }
}

/// One donut slice per category.
pub fn pie_chart(counts: &Aggregation<u64>, options: &ChartOptions) -> ChartSpec {
    if counts.is_empty() {
        return ChartSpec::empty(ChartKind::Pie, options);
    }
    ChartSpec {
        kind: ChartKind::Pie,
        series: vec![Series::Pie {
            labels: counts.labels(),
            values: counts.values(),
            hole: PIE_HOLE,
        }],
        layout: options.into(),
        empty: false,
    }
}

/// One bar per category in aggregation order, labelled with its raw count.
pub fn bar_chart(counts: &Aggregation<u64>, options: &ChartOptions) -> ChartSpec {
    if counts.is_empty() {
        return ChartSpec::empty(ChartKind::Bar, options);
    }
    let values = counts.values();
    ChartSpec {
        kind: ChartKind::Bar,
        series: vec![Series::Bar {
            x: counts.labels(),
            text: values.iter().map(u64::to_string).collect(),
            y: values,
        }],
        layout: options.into(),
        empty: false,
    }
}

/// Exactly two boxes, stroke group first, each in its outcome colour.
pub fn box_chart(groups: &Aggregation<Vec<f64>>, options: &ChartOptions) -> ChartSpec {
    if groups.is_empty() {
        return ChartSpec::empty(ChartKind::Box, options);
    }
    let series = Outcome::ALL
        .iter()
        .map(|outcome| {
            let samples = groups
                .get(outcome.label())
                .map(Vec::as_slice)
                .unwrap_or_default();
            Series::Box {
                name: outcome.label().to_string(),
                color: outcome_color(*outcome).to_string(),
                summary: BoxSummary::from_samples(samples),
            }
        })
        .collect();
    ChartSpec {
        kind: ChartKind::Box,
        series,
        layout: options.into(),
        empty: false,
    }
}

/// Single-level treemap under a root labelled with the chart title.
///
/// Nodes are keyed by id, not label: the root is [`TREEMAP_ROOT_ID`] and each
/// category sits at `root/<label>`, so a category may share the title's label.
pub fn treemap_chart(counts: &Aggregation<u64>, options: &ChartOptions) -> ChartSpec {
    if counts.is_empty() {
        return ChartSpec::empty(ChartKind::Treemap, options);
    }
    let mut ids = vec![TREEMAP_ROOT_ID.to_string()];
    let mut labels = vec![options.title.to_string()];
    let mut parents = vec![String::new()];
    let mut values = vec![counts.total()];
    let mut colors = vec![FALLBACK_COLOR.to_string()];
    for (label, count) in counts.iter() {
        ids.push(format!("{}/{}", TREEMAP_ROOT_ID, label));
        labels.push(label.to_string());
        parents.push(TREEMAP_ROOT_ID.to_string());
        values.push(*count);
        colors.push(work_type_color(label).to_string());
    }
    ChartSpec {
        kind: ChartKind::Treemap,
        series: vec![Series::Treemap {
            ids,
            labels,
            parents,
            values,
            colors,
        }],
        layout: options.into(),
        empty: false,
    }
}

pub fn line_chart(counts: &Aggregation<u64>, options: &ChartOptions) -> ChartSpec {
    if counts.is_empty() {
        return ChartSpec::empty(ChartKind::Line, options);
    }
    ChartSpec {
        kind: ChartKind::Line,
        series: vec![Series::Line {
            x: counts.labels(),
            y: counts.values(),
        }],
        layout: options.into(),
        empty: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPTIONS: ChartOptions = ChartOptions::new("Test", 500, 500);

    fn counts(entries: &[(&str, u64)]) -> Aggregation<u64> {
        Aggregation::from_entries(entries.iter().map(|(k, v)| (k.to_string(), *v)).collect())
    }

    #[test]
    fn box_summary_of_known_sample() {
        let s = BoxSummary::from_samples(&[1.0, 2.0, 3.0, 4.0, 100.0]).unwrap();
        assert_eq!(s.count, 5);
        assert_eq!(s.q1, 2.0);
        assert_eq!(s.median, 3.0);
        assert_eq!(s.q3, 4.0);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 100.0);
        assert_eq!(s.upper_whisker, 4.0);
        assert_eq!(s.outliers, vec![100.0]);
        assert!(BoxSummary::from_samples(&[]).is_none());
    }

    #[test]
    fn quartiles_interpolate() {
        let s = BoxSummary::from_samples(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(s.q1, 1.75);
        assert_eq!(s.median, 2.5);
        assert_eq!(s.q3, 3.25);
        assert!(s.outliers.is_empty());
    }

    #[test]
    fn pie_has_fixed_hole_and_options() {
        let spec = pie_chart(&counts(&[("Male", 6), ("Female", 4)]), &OPTIONS);
        assert_eq!(spec.kind, ChartKind::Pie);
        assert!(!spec.empty);
        assert_eq!(spec.layout.width, 500);
        match &spec.series[0] {
            Series::Pie { labels, values, hole } => {
                assert_eq!(labels, &vec!["Male".to_string(), "Female".to_string()]);
                assert_eq!(values, &vec![6, 4]);
                assert_eq!(*hole, PIE_HOLE);
            }
            other => panic!("unexpected series {other:?}"),
        }
    }

    #[test]
    fn bar_text_shows_raw_counts() {
        let spec = bar_chart(&counts(&[("a", 3), ("b", 0)]), &OPTIONS);
        match &spec.series[0] {
            Series::Bar { x, y, text } => {
                assert_eq!(x, &vec!["a".to_string(), "b".to_string()]);
                assert_eq!(y, &vec![3, 0]);
                assert_eq!(text, &vec!["3".to_string(), "0".to_string()]);
            }
            other => panic!("unexpected series {other:?}"),
        }
    }

    #[test]
    fn box_chart_always_has_two_colored_series() {
        let groups = Aggregation::from_entries(vec![("Yes".to_string(), vec![1.0, 2.0])]);
        let spec = box_chart(&groups, &OPTIONS);
        assert_eq!(spec.series.len(), 2);
        match (&spec.series[0], &spec.series[1]) {
            (
                Series::Box { name: a, color: ca, summary: sa },
                Series::Box { name: b, color: cb, summary: sb },
            ) => {
                assert_eq!((a.as_str(), b.as_str()), ("Yes", "No"));
                assert_eq!(ca, outcome_color(Outcome::Yes));
                assert_eq!(cb, outcome_color(Outcome::No));
                assert!(sa.is_some());
                assert!(sb.is_none());
            }
            other => panic!("unexpected series {other:?}"),
        }
    }

    #[test]
    fn treemap_hangs_every_category_under_root() {
        let spec = treemap_chart(&counts(&[("Private", 5), ("Astronaut", 1)]), &OPTIONS);
        match &spec.series[0] {
            Series::Treemap { ids, labels, parents, values, colors } => {
                assert_eq!(ids, &vec!["root", "root/Private", "root/Astronaut"]);
                assert_eq!(labels[0], "Test");
                assert_eq!(parents, &vec!["", TREEMAP_ROOT_ID, TREEMAP_ROOT_ID]);
                assert_eq!(values, &vec![6, 5, 1]);
                assert_eq!(colors[2], FALLBACK_COLOR);
            }
            other => panic!("unexpected series {other:?}"),
        }
    }

    #[test]
    fn treemap_category_may_share_the_title() {
        let spec = treemap_chart(&counts(&[("Test", 2), ("Private", 3)]), &OPTIONS);
        let figure = spec.to_figure();
        let trace = &figure["data"][0];
        assert_eq!(trace["labels"], json!(["Test", "Test", "Private"]));
        assert_eq!(trace["ids"], json!(["root", "root/Test", "root/Private"]));
        assert_eq!(trace["parents"], json!(["", "root", "root"]));
    }

    #[test]
    fn empty_aggregation_builds_placeholder() {
        let spec = pie_chart(&Aggregation::default(), &OPTIONS);
        assert!(spec.empty);
        assert!(spec.series.is_empty());
        let figure = spec.to_figure();
        assert_eq!(figure["data"], json!([]));
        assert_eq!(figure["layout"]["annotations"][0]["text"], NO_DATA_TEXT);
    }

    #[test]
    fn building_twice_is_identical() {
        let agg = counts(&[("x", 1), ("y", 2)]);
        let options = OPTIONS.with_axes("X", "Y");
        assert_eq!(bar_chart(&agg, &options), bar_chart(&agg, &options));
        assert_eq!(
            bar_chart(&agg, &options).to_figure(),
            bar_chart(&agg, &options).to_figure()
        );
    }

    #[test]
    fn figure_carries_layout_metadata() {
        let figure = line_chart(&counts(&[("1", 2)]), &OPTIONS.with_axes("Age", "Count")).to_figure();
        assert_eq!(figure["layout"]["title"]["text"], "Test");
        assert_eq!(figure["layout"]["xaxis"]["title"]["text"], "Age");
        assert_eq!(figure["data"][0]["mode"], "lines");
    }
}
