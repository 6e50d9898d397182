//! Label stability: rows whose feature vector repeats with conflicting
//! target or prediction labels.

use std::collections::HashMap;

use serde::Serialize;

use crate::data::InputData;
use crate::error::Result;

/// Result of the data stability metric. Conflict counts are `None` when
/// the corresponding label column is unmapped or absent from the current
/// dataset.
#[derive(Debug, Clone, Serialize)]
pub struct StabilityResult {
    /// Rows in the current dataset.
    pub number_of_rows: usize,
    /// Rows in feature groups carrying more than one distinct target label.
    pub target_conflicts: Option<usize>,
    /// Rows in feature groups carrying more than one distinct prediction
    /// label.
    pub prediction_conflicts: Option<usize>,
}

/// Groups current rows by their feature vector and counts the rows inside
/// groups whose label is not constant. Nulls count as a distinct label
/// value so a null against a non-null is a conflict. With no mapped
/// feature column present there is no vector to repeat, so conflict
/// counts are zero rather than treating every row as one group.
pub fn compute(data: &InputData) -> Result<StabilityResult> {
    let current = data.current();
    let mapping = data.column_mapping();
    let rows = current.row_count();

    let features: Vec<&str> = mapping
        .feature_columns()
        .into_iter()
        .filter(|name| current.has_column(name))
        .collect();

    let mut groups: HashMap<Vec<Option<String>>, Vec<usize>> = HashMap::new();
    if !features.is_empty() {
        let mut columns = Vec::with_capacity(features.len());
        for &name in &features {
            columns.push(current.string_column(name)?);
        }
        for row in 0..rows {
            let key: Vec<Option<String>> =
                columns.iter().map(|column| column[row].clone()).collect();
            groups.entry(key).or_default().push(row);
        }
    }

    let target_conflicts = match mapping.target.as_deref() {
        Some(target) if current.has_column(target) => {
            Some(conflicting_rows(current.string_column(target)?, &groups))
        }
        _ => None,
    };
    let prediction_conflicts = match mapping.prediction.as_deref() {
        Some(prediction) if current.has_column(prediction) => {
            Some(conflicting_rows(current.string_column(prediction)?, &groups))
        }
        _ => None,
    };

    Ok(StabilityResult {
        number_of_rows: rows,
        target_conflicts,
        prediction_conflicts,
    })
}

fn conflicting_rows(
    labels: Vec<Option<String>>,
    groups: &HashMap<Vec<Option<String>>, Vec<usize>>,
) -> usize {
    let mut conflicts = 0;
    for rows in groups.values() {
        if rows.len() < 2 {
            continue;
        }
        let first = &labels[rows[0]];
        if rows.iter().any(|&row| &labels[row] != first) {
            conflicts += rows.len();
        }
    }
    conflicts
}
