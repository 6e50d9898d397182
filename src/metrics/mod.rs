//! Metric computations over in-memory Arrow data.
//!
//! Each submodule owns one metric family and exposes a `compute` entry
//! point dispatched from [`crate::core::metric`]. Shared numeric helpers
//! live here.

pub mod correlation;
pub mod list;
pub mod quality;
pub mod quantile;
pub mod range;
pub mod stability;

use crate::data::Dataset;
use crate::error::{Result, TabwatchError};

/// Arithmetic mean; `None` for an empty slice.
pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator); `None` below two values.
pub(crate) fn std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let sum_sq = values.iter().map(|v| (v - m).powi(2)).sum::<f64>();
    Some((sum_sq / (values.len() - 1) as f64).sqrt())
}

/// Quantile with linear interpolation between closest ranks; `None` for
/// an empty slice. `q` must already be validated to lie in (0, 1).
pub(crate) fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    if lower == upper {
        return Some(sorted[lower]);
    }
    let weight = pos - lower as f64;
    Some(sorted[lower] * (1.0 - weight) + sorted[upper] * weight)
}

/// Median via [`quantile`] at 0.5.
pub(crate) fn median(values: &[f64]) -> Option<f64> {
    quantile(values, 0.5)
}

/// Non-null numeric values of a column, or `None` when the column holds
/// a non-numeric type. Other extraction failures propagate.
pub(crate) fn numeric_values(dataset: &Dataset, column: &str) -> Result<Option<Vec<f64>>> {
    match dataset.numeric_column(column) {
        Ok(values) => Ok(Some(values)),
        Err(TabwatchError::TypeMismatch { .. }) => Ok(None),
        Err(err) => Err(err),
    }
}
