//! Grouping passes over the record table.
//!
//! Every function here is pure: it reads the shared [`Dataset`] and returns a
//! freshly built [`Aggregation`]. Nothing is cached between calls.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::dataset::Dataset;
use crate::records::{CategoricalField, NumericField, Outcome, PatientRecord};

/// Ordered category to metric mapping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregation<M> {
    entries: Vec<(String, M)>,
}

impl<M> Default for Aggregation<M> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<M> Aggregation<M> {
    pub fn from_entries(entries: Vec<(String, M)>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &M)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn labels(&self) -> Vec<String> {
        self.entries.iter().map(|(k, _)| k.clone()).collect()
    }

    pub fn get(&self, label: &str) -> Option<&M> {
        self.entries.iter().find(|(k, _)| k == label).map(|(_, v)| v)
    }
}

impl Aggregation<u64> {
    pub fn values(&self) -> Vec<u64> {
        self.entries.iter().map(|(_, v)| *v).collect()
    }

    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, v)| v).sum()
    }
}

/// Fixed, ordered half-open bins `[lo, hi)`; the last bin has no upper bound.
#[derive(Debug, Clone, PartialEq)]
pub struct Bins {
    lower_edges: Vec<f64>,
    labels: Vec<String>,
}

impl Bins {
    /// `count` bins of `width` starting at `start`, followed by one open bin.
    pub fn uniform(start: f64, width: f64, count: usize) -> Self {
        let mut lower_edges = Vec::with_capacity(count + 1);
        let mut labels = Vec::with_capacity(count + 1);
        for i in 0..count {
            let lo = start + width * i as f64;
            lower_edges.push(lo);
            labels.push(format!("{}-{}", lo, lo + width));
        }
        let last = start + width * count as f64;
        lower_edges.push(last);
        labels.push(format!("{}+", last));
        Self {
            lower_edges,
            labels,
        }
    }

    /// `0-5, 5-10, ..., 85-90, 90+`
    pub fn age() -> Self {
        Self::uniform(0.0, 5.0, 18)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Index of the bin holding `value`, if any. Values below the first edge
    /// fall outside every bin.
    pub fn index_of(&self, value: f64) -> Option<usize> {
        if self.lower_edges.is_empty() || value < self.lower_edges[0] {
            return None;
        }
        self.lower_edges.iter().rposition(|lo| value >= *lo)
    }
}

fn matching<'a>(
    dataset: &'a Dataset,
    filter: Option<Outcome>,
) -> impl Iterator<Item = &'a PatientRecord> + 'a {
    dataset
        .records()
        .iter()
        .filter(move |r| filter.map_or(true, |outcome| r.stroke == Some(outcome)))
}

/// Count per distinct value of `field`, in first-seen order. Values absent
/// from the (filtered) rows are absent from the result.
pub fn count_by(
    dataset: &Dataset,
    field: CategoricalField,
    filter: Option<Outcome>,
) -> Aggregation<u64> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut entries: Vec<(String, u64)> = Vec::new();

    for record in matching(dataset, filter) {
        let key = field.value(record);
        match positions.get(key) {
            Some(&i) => entries[i].1 += 1,
            None => {
                positions.insert(key, entries.len());
                entries.push((key.to_string(), 1));
            }
        }
    }
    Aggregation::from_entries(entries)
}

/// Count per bin of `field`, every bin present and in bin order. Rows whose
/// value is missing are skipped. An empty (filtered) row set yields an empty
/// aggregation.
pub fn binned_count(
    dataset: &Dataset,
    field: NumericField,
    bins: &Bins,
    filter: Option<Outcome>,
) -> Aggregation<u64> {
    let mut counts = vec![0u64; bins.len()];
    let mut seen = false;

    for record in matching(dataset, filter) {
        seen = true;
        if let Some(i) = field.value(record).and_then(|v| bins.index_of(v)) {
            counts[i] += 1;
        }
    }

    if !seen {
        return Aggregation::default();
    }
    Aggregation::from_entries(bins.labels().iter().cloned().zip(counts).collect())
}

/// Raw samples of `field` for the stroke group and the healthy group, in that
/// order. Missing values and rows without a recognized outcome are left out.
pub fn split_by_outcome(dataset: &Dataset, field: NumericField) -> Aggregation<Vec<f64>> {
    if dataset.is_empty() {
        return Aggregation::default();
    }

    let mut yes = Vec::new();
    let mut no = Vec::new();
    for record in dataset.records() {
        let group = match record.stroke {
            Some(Outcome::Yes) => &mut yes,
            Some(Outcome::No) => &mut no,
            None => continue,
        };
        if let Some(value) = field.value(record) {
            group.push(value);
        }
    }

    Aggregation::from_entries(vec![
        (Outcome::Yes.label().to_string(), yes),
        (Outcome::No.label().to_string(), no),
    ])
}

/// Count per whole-number value of `field`, ascending.
pub fn count_by_value(dataset: &Dataset, field: NumericField) -> Aggregation<u64> {
    let mut counts: BTreeMap<i64, u64> = BTreeMap::new();
    for value in dataset.records().iter().filter_map(|r| field.value(r)) {
        *counts.entry(value.round() as i64).or_insert(0) += 1;
    }
    Aggregation::from_entries(counts.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OutcomeTotals {
    pub total: u64,
    pub stroke: u64,
    pub no_stroke: u64,
}

pub fn outcome_totals(dataset: &Dataset) -> OutcomeTotals {
    OutcomeTotals {
        total: dataset.len() as u64,
        stroke: matching(dataset, Some(Outcome::Yes)).count() as u64,
        no_stroke: matching(dataset, Some(Outcome::No)).count() as u64,
    }
}
