//! Values outside a numeric range, with bounds derived from reference
//! data when not set explicitly.

use serde::Serialize;

use crate::data::InputData;
use crate::error::{Result, TabwatchError};
use crate::metrics::numeric_values;

/// Result of the value range metric. When the column is absent from the
/// current dataset the counts are zero, the bounds unresolved, and
/// `column_present` is false so dependent tests can skip instead of
/// failing the whole run.
#[derive(Debug, Clone, Serialize)]
pub struct ValueRangeResult {
    /// Column under inspection.
    pub column: String,
    /// Whether the column exists in the current dataset.
    pub column_present: bool,
    /// Resolved inclusive lower bound.
    pub left: Option<f64>,
    /// Resolved inclusive upper bound.
    pub right: Option<f64>,
    /// Non-null values inspected.
    pub values_count: usize,
    /// Values strictly outside `[left, right]`.
    pub number_out_of_range: usize,
    /// `number_out_of_range` over `values_count`; zero when empty.
    pub share_out_of_range: f64,
}

/// Counts current values outside the range. Each bound resolves
/// independently: explicit value first, otherwise the reference minimum
/// or maximum of the same column.
pub fn compute(
    data: &InputData,
    column: &str,
    left: Option<f64>,
    right: Option<f64>,
) -> Result<ValueRangeResult> {
    if !data.current().has_column(column) {
        return Ok(ValueRangeResult {
            column: column.to_string(),
            column_present: false,
            left,
            right,
            values_count: 0,
            number_out_of_range: 0,
            share_out_of_range: 0.0,
        });
    }

    let values = data.current().numeric_column(column)?;

    let left = resolve_bound(data, column, left, "left", f64::min)?;
    let right = resolve_bound(data, column, right, "right", f64::max)?;

    let number_out_of_range = values.iter().filter(|&&v| v < left || v > right).count();
    let share_out_of_range = if values.is_empty() {
        0.0
    } else {
        number_out_of_range as f64 / values.len() as f64
    };

    Ok(ValueRangeResult {
        column: column.to_string(),
        column_present: true,
        left: Some(left),
        right: Some(right),
        values_count: values.len(),
        number_out_of_range,
        share_out_of_range,
    })
}

fn resolve_bound(
    data: &InputData,
    column: &str,
    explicit: Option<f64>,
    side: &str,
    fold: fn(f64, f64) -> f64,
) -> Result<f64> {
    if let Some(bound) = explicit {
        return Ok(bound);
    }
    let reference = data.reference().ok_or_else(|| {
        TabwatchError::configuration(format!(
            "{side} bound for range over column '{column}': set it explicitly or provide reference data"
        ))
    })?;
    if !reference.has_column(column) {
        return Err(TabwatchError::configuration(format!(
            "{side} bound for range over column '{column}': column is absent from reference data"
        )));
    }
    numeric_values(reference, column)?
        .and_then(|values| values.into_iter().reduce(fold))
        .ok_or_else(|| {
            TabwatchError::configuration(format!(
                "{side} bound for range over column '{column}': reference column has no numeric values"
            ))
        })
}
