//! Min/max/average over metric samples

use serde::{Deserialize, Serialize};

use crate::model::MetricSeries;

/// Aggregate of a set of numeric samples
///
/// An empty input yields all zeros rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Summary {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    pub count: usize,
}

impl Summary {
    /// Summarize the non-null values; `None` entries are skipped and not counted
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;

        for value in values.into_iter().flatten() {
            count += 1;
            sum += value;
            min = min.min(value);
            max = max.max(value);
        }

        if count == 0 {
            return Summary::default();
        }

        Summary {
            min,
            max,
            avg: sum / count as f64,
            count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Summarize every sample across all series
pub fn summarize(series: &[MetricSeries]) -> Summary {
    Summary::from_values(
        series
            .iter()
            .flat_map(|s| s.samples.iter().map(|sample| sample.value)),
    )
}
