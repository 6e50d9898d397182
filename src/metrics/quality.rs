//! Per-column descriptive statistics.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::data::{Dataset, InputData};
use crate::error::Result;
use crate::metrics::{mean, median, numeric_values, std_dev};

/// Descriptive statistics of one column. Numeric fields are `None` for
/// non-numeric columns and for columns without non-null values.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnStats {
    /// Column name.
    pub column: String,
    /// Non-null values.
    pub count: usize,
    /// Null values.
    pub missing: usize,
    /// Minimum, numeric columns only.
    pub min: Option<f64>,
    /// Maximum, numeric columns only.
    pub max: Option<f64>,
    /// Arithmetic mean, numeric columns only.
    pub mean: Option<f64>,
    /// Median, numeric columns only.
    pub median: Option<f64>,
    /// Sample standard deviation, numeric columns only.
    pub std: Option<f64>,
    /// Distinct non-null values.
    pub unique_count: usize,
    /// `unique_count` over `count`; zero for an all-null column.
    pub unique_share: f64,
    /// Most frequent non-null value; ties break toward the
    /// lexicographically smallest.
    pub most_common_value: Option<String>,
    /// Frequency share of the most common value.
    pub most_common_share: f64,
}

/// Statistics keyed by column name.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ColumnStatsSet {
    columns: BTreeMap<String, ColumnStats>,
}

impl ColumnStatsSet {
    /// Statistics for a column, `None` when the column was absent from
    /// the dataset at computation time.
    pub fn get(&self, column: &str) -> Option<&ColumnStats> {
        self.columns.get(column)
    }

    /// Names of the columns with computed statistics.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }
}

/// Result of the data quality metric: current statistics always, plus
/// reference statistics when a reference dataset was supplied.
#[derive(Debug, Clone, Serialize)]
pub struct DataQualityResult {
    /// Statistics over the current dataset.
    pub current: ColumnStatsSet,
    /// Statistics over the reference dataset, when one was supplied.
    pub reference: Option<ColumnStatsSet>,
}

/// Computes statistics for every mapped column present in each dataset.
/// Absent columns are left out of the set rather than erroring; the
/// per-column tests decide whether absence means skipping.
pub fn compute(data: &InputData) -> Result<DataQualityResult> {
    let columns = data.column_mapping().all_columns();
    let current = stats_for(data.current(), &columns)?;
    let reference = match data.reference() {
        Some(reference) => Some(stats_for(reference, &columns)?),
        None => None,
    };
    Ok(DataQualityResult { current, reference })
}

fn stats_for(dataset: &Dataset, columns: &[&str]) -> Result<ColumnStatsSet> {
    let mut set = ColumnStatsSet::default();
    for &column in columns {
        if !dataset.has_column(column) {
            continue;
        }
        let stats = column_stats(dataset, column)?;
        set.columns.insert(column.to_string(), stats);
    }
    Ok(set)
}

fn column_stats(dataset: &Dataset, column: &str) -> Result<ColumnStats> {
    let rows = dataset.row_count();
    let strings = dataset.string_column(column)?;

    let mut frequencies: BTreeMap<&str, usize> = BTreeMap::new();
    for value in strings.iter().flatten() {
        *frequencies.entry(value.as_str()).or_insert(0) += 1;
    }
    let count: usize = frequencies.values().sum();
    let unique_count = frequencies.len();
    let unique_share = if count > 0 {
        unique_count as f64 / count as f64
    } else {
        0.0
    };
    // Ascending key order plus strictly-greater replacement breaks
    // frequency ties toward the lexicographically smallest value.
    let most_common = frequencies
        .iter()
        .fold(None::<(&str, usize)>, |best, (&value, &n)| match best {
            Some((_, best_n)) if best_n >= n => best,
            _ => Some((value, n)),
        })
        .map(|(value, n)| (value.to_string(), n));
    let (most_common_value, most_common_share) = match most_common {
        Some((value, n)) => (Some(value), n as f64 / count as f64),
        None => (None, 0.0),
    };

    let numeric = numeric_values(dataset, column)?;
    let (min, max, mean_value, median_value, std_value) = match &numeric {
        Some(values) if !values.is_empty() => (
            values.iter().copied().reduce(f64::min),
            values.iter().copied().reduce(f64::max),
            mean(values),
            median(values),
            std_dev(values),
        ),
        _ => (None, None, None, None, None),
    };

    Ok(ColumnStats {
        column: column.to_string(),
        count,
        missing: rows - count,
        min,
        max,
        mean: mean_value,
        median: median_value,
        std: std_value,
        unique_count,
        unique_share,
        most_common_value,
        most_common_share,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::{Float64Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;

    use super::*;
    use crate::data::ColumnMapping;

    fn dataset(ages: Vec<Option<f64>>, cities: Vec<Option<&str>>) -> Dataset {
        let schema = Arc::new(Schema::new(vec![
            Field::new("age", DataType::Float64, true),
            Field::new("city", DataType::Utf8, true),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Float64Array::from(ages)),
                Arc::new(StringArray::from(cities)),
            ],
        )
        .unwrap();
        Dataset::from_batch(batch)
    }

    fn input(current: Dataset) -> InputData {
        let mapping = ColumnMapping::new()
            .with_numerical_features(["age"])
            .with_categorical_features(["city"]);
        InputData::new(current, mapping)
    }

    #[test]
    fn test_numeric_column_stats() {
        let data = input(dataset(
            vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0), None],
            vec![Some("a"), Some("b"), Some("a"), Some("a"), Some("c")],
        ));
        let result = compute(&data).unwrap();
        let age = result.current.get("age").unwrap();
        assert_eq!(age.count, 4);
        assert_eq!(age.missing, 1);
        assert_eq!(age.min, Some(1.0));
        assert_eq!(age.max, Some(4.0));
        assert_eq!(age.mean, Some(2.5));
        assert_eq!(age.median, Some(2.5));
        assert_eq!(age.unique_count, 4);
        assert!(result.reference.is_none());
    }

    #[test]
    fn test_most_common_value_tie_breaks_lexicographically() {
        let data = input(dataset(
            vec![Some(1.0), Some(1.0), Some(2.0), Some(2.0)],
            vec![Some("b"), Some("b"), Some("a"), Some("a")],
        ));
        let result = compute(&data).unwrap();
        let city = result.current.get("city").unwrap();
        assert_eq!(city.most_common_value.as_deref(), Some("a"));
        assert_eq!(city.most_common_share, 0.5);
        assert!(city.mean.is_none());
    }

    #[test]
    fn test_absent_column_left_out() {
        let current = dataset(vec![Some(1.0)], vec![Some("a")]);
        let mapping = ColumnMapping::new().with_numerical_features(["age", "income"]);
        let data = InputData::new(current, mapping);
        let result = compute(&data).unwrap();
        assert!(result.current.get("age").is_some());
        assert!(result.current.get("income").is_none());
    }
}
