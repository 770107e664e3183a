//! Series - Ordered Label to Value Mapping

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Insertion-ordered, label-unique data series.
///
/// Serializes as a JSON object whose key order is the series order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Series {
    points: IndexMap<String, f64>,
}

impl Series {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite. An existing label keeps its position.
    pub fn insert(&mut self, label: impl Into<String>, value: f64) -> Option<f64> {
        self.points.insert(label.into(), value)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, label: &str) -> Option<f64> {
        self.points.get(label).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.points.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn labels(&self) -> Vec<&str> {
        self.points.keys().map(String::as_str).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.values().copied().collect()
    }

    /// Largest value, or 0 for an empty series.
    pub fn max_value(&self) -> f64 {
        max_of(self.points.values().copied())
    }

    pub fn total(&self) -> f64 {
        self.points.values().sum()
    }
}

pub(crate) fn max_of(values: impl Iterator<Item = f64>) -> f64 {
    let max = values.fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY {
        0.0
    } else {
        max
    }
}

impl<L: Into<String>> FromIterator<(L, f64)> for Series {
    fn from_iter<I: IntoIterator<Item = (L, f64)>>(iter: I) -> Self {
        let mut series = Self::new();
        for (label, value) in iter {
            series.insert(label, value);
        }
        series
    }
}

impl<L: Into<String>, const N: usize> From<[(L, f64); N]> for Series {
    fn from(points: [(L, f64); N]) -> Self {
        points.into_iter().collect()
    }
}
