//! Pairwise correlations over numeric columns, with derived aggregates
//! for threshold tests.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::{Dataset, InputData};
use crate::error::Result;
use crate::metrics::numeric_values;

/// Correlation method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationMethod {
    /// Pearson product-moment correlation.
    Pearson,
    /// Spearman rank correlation, average ranks for ties.
    Spearman,
}

impl fmt::Display for CorrelationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CorrelationMethod::Pearson => "pearson",
            CorrelationMethod::Spearman => "spearman",
        };
        write!(f, "{s}")
    }
}

/// Symmetric correlation matrix over the numeric columns of one dataset.
/// Cells are `None` when a pair had fewer than two complete observations
/// or a constant series.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationMatrix {
    /// Column names, in mapping order.
    pub columns: Vec<String>,
    /// Row-major cells, `values[i][j]` correlating `columns[i]` with
    /// `columns[j]`.
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    /// Correlation between two named columns.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.values[i][j]
    }

    /// Iterates the strict upper triangle as `(left, right, correlation)`.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str, Option<f64>)> {
        let columns = &self.columns;
        let values = &self.values;
        (0..columns.len()).flat_map(move |i| {
            ((i + 1)..columns.len())
                .map(move |j| (columns[i].as_str(), columns[j].as_str(), values[i][j]))
        })
    }
}

/// Aggregates derived from one matrix, aligned with the threshold tests
/// that consume them.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationStats {
    /// Correlation between target and prediction, when both are numeric
    /// columns of the dataset.
    pub target_prediction: Option<f64>,
    /// Largest absolute correlation among feature pairs, label columns
    /// excluded.
    pub abs_max_features: Option<f64>,
    /// Largest absolute correlation between the target and any feature.
    pub abs_max_target_features: Option<f64>,
    /// Largest absolute correlation between the prediction and any
    /// feature.
    pub abs_max_prediction_features: Option<f64>,
}

/// Result of the correlation metric.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationResult {
    /// Method used.
    pub method: CorrelationMethod,
    /// Matrix over the current dataset.
    pub current: CorrelationMatrix,
    /// Aggregates over the current matrix.
    pub current_stats: CorrelationStats,
    /// Matrix over the reference dataset, when one was supplied.
    pub reference: Option<CorrelationMatrix>,
    /// Aggregates over the reference matrix.
    pub reference_stats: Option<CorrelationStats>,
}

/// Computes pairwise correlations with pairwise deletion of incomplete
/// observations. Mapped columns that are absent or non-numeric in a
/// dataset are left out of that dataset's matrix.
pub fn compute(data: &InputData, method: CorrelationMethod) -> Result<CorrelationResult> {
    let mapping = data.column_mapping();
    let mut candidates: Vec<&str> = mapping
        .numerical_features
        .iter()
        .map(String::as_str)
        .collect();
    candidates.extend(mapping.target.as_deref());
    candidates.extend(mapping.prediction.as_deref());

    let current = matrix_for(data.current(), &candidates, method)?;
    let current_stats = stats_for(&current, mapping.target.as_deref(), mapping.prediction.as_deref());
    let (reference, reference_stats) = match data.reference() {
        Some(reference) => {
            let matrix = matrix_for(reference, &candidates, method)?;
            let stats = stats_for(&matrix, mapping.target.as_deref(), mapping.prediction.as_deref());
            (Some(matrix), Some(stats))
        }
        None => (None, None),
    };

    Ok(CorrelationResult {
        method,
        current,
        current_stats,
        reference,
        reference_stats,
    })
}

fn matrix_for(
    dataset: &Dataset,
    candidates: &[&str],
    method: CorrelationMethod,
) -> Result<CorrelationMatrix> {
    let mut columns = Vec::new();
    let mut series = Vec::new();
    for &name in candidates {
        if !dataset.has_column(name) {
            continue;
        }
        if numeric_values(dataset, name)?.is_none() {
            continue;
        }
        columns.push(name.to_string());
        series.push(dataset.numeric_column_opt(name)?);
    }

    let n = columns.len();
    let mut values = vec![vec![None; n]; n];
    for i in 0..n {
        values[i][i] = Some(1.0);
        for j in (i + 1)..n {
            let cell = pair_correlation(&series[i], &series[j], method);
            values[i][j] = cell;
            values[j][i] = cell;
        }
    }
    Ok(CorrelationMatrix { columns, values })
}

fn pair_correlation(
    a: &[Option<f64>],
    b: &[Option<f64>],
    method: CorrelationMethod,
) -> Option<f64> {
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    for (x, y) in a.iter().zip(b) {
        if let (Some(x), Some(y)) = (x, y) {
            xs.push(*x);
            ys.push(*y);
        }
    }
    if xs.len() < 2 {
        return None;
    }
    match method {
        CorrelationMethod::Pearson => pearson(&xs, &ys),
        CorrelationMethod::Spearman => pearson(&ranks(&xs), &ranks(&ys)),
    }
}

fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;
    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 {
        return None;
    }
    Some(cov / denom)
}

/// Average ranks, ties sharing the mean of their rank positions.
fn ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    let mut ranks = vec![0.0; values.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        let rank = (i + j) as f64 / 2.0 + 1.0;
        for &index in &order[i..=j] {
            ranks[index] = rank;
        }
        i = j + 1;
    }
    ranks
}

fn stats_for(
    matrix: &CorrelationMatrix,
    target: Option<&str>,
    prediction: Option<&str>,
) -> CorrelationStats {
    fn abs_max<I: Iterator<Item = f64>>(iter: I) -> Option<f64> {
        iter.map(f64::abs).reduce(f64::max)
    }

    let is_label = |name: &str| Some(name) == target || Some(name) == prediction;

    let target_prediction = match (target, prediction) {
        (Some(t), Some(p)) => matrix.get(t, p),
        _ => None,
    };
    let abs_max_features = abs_max(matrix.pairs().filter_map(|(a, b, c)| {
        if is_label(a) || is_label(b) {
            None
        } else {
            c
        }
    }));
    let label_feature_max = |label: Option<&str>| {
        let label = label?;
        abs_max(matrix.pairs().filter_map(|(a, b, c)| {
            let touches_label = a == label || b == label;
            let other_is_label = (a == label && is_label(b)) || (b == label && is_label(a));
            if touches_label && !other_is_label {
                c
            } else {
                None
            }
        }))
    };

    CorrelationStats {
        target_prediction,
        abs_max_features,
        abs_max_target_features: label_feature_max(target),
        abs_max_prediction_features: label_feature_max(prediction),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::Float64Array;
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;

    use super::*;
    use crate::data::{ColumnMapping, Dataset};

    fn input(columns: Vec<(&str, Vec<f64>)>, mapping: ColumnMapping) -> InputData {
        let fields: Vec<Field> = columns
            .iter()
            .map(|(name, _)| Field::new(*name, DataType::Float64, false))
            .collect();
        let arrays: Vec<_> = columns
            .into_iter()
            .map(|(_, values)| Arc::new(Float64Array::from(values)) as _)
            .collect();
        let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays).unwrap();
        InputData::new(Dataset::from_batch(batch), mapping)
    }

    #[test]
    fn test_pearson_perfect_correlation() {
        let data = input(
            vec![
                ("x", vec![1.0, 2.0, 3.0, 4.0]),
                ("y", vec![2.0, 4.0, 6.0, 8.0]),
            ],
            ColumnMapping::new().with_numerical_features(["x", "y"]),
        );
        let result = compute(&data, CorrelationMethod::Pearson).unwrap();
        let corr = result.current.get("x", "y").unwrap();
        assert!((corr - 1.0).abs() < 1e-12);
        assert!((result.current_stats.abs_max_features.unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_spearman_monotonic_nonlinear() {
        let data = input(
            vec![
                ("x", vec![1.0, 2.0, 3.0, 4.0, 5.0]),
                ("y", vec![1.0, 8.0, 27.0, 64.0, 125.0]),
            ],
            ColumnMapping::new().with_numerical_features(["x", "y"]),
        );
        let result = compute(&data, CorrelationMethod::Spearman).unwrap();
        let corr = result.current.get("x", "y").unwrap();
        assert!((corr - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_constant_series_has_no_correlation() {
        let data = input(
            vec![
                ("x", vec![1.0, 1.0, 1.0]),
                ("y", vec![1.0, 2.0, 3.0]),
            ],
            ColumnMapping::new().with_numerical_features(["x", "y"]),
        );
        let result = compute(&data, CorrelationMethod::Pearson).unwrap();
        assert_eq!(result.current.get("x", "y"), None);
    }

    #[test]
    fn test_target_prediction_stat() {
        let data = input(
            vec![
                ("f", vec![1.0, 2.0, 3.0, 4.0]),
                ("target", vec![1.0, 2.0, 3.0, 4.0]),
                ("pred", vec![1.1, 2.2, 2.9, 4.1]),
            ],
            ColumnMapping::new()
                .with_numerical_features(["f"])
                .with_target("target")
                .with_prediction("pred"),
        );
        let result = compute(&data, CorrelationMethod::Pearson).unwrap();
        let stats = &result.current_stats;
        assert!(stats.target_prediction.unwrap() > 0.99);
        assert!(stats.abs_max_target_features.is_some());
        assert!(stats.abs_max_features.is_none());
    }

    #[test]
    fn test_ranks_average_ties() {
        assert_eq!(ranks(&[10.0, 20.0, 20.0, 30.0]), vec![1.0, 2.5, 2.5, 4.0]);
    }
}
