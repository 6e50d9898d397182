//! A single quantile of a numeric column, for current and reference data.

use serde::Serialize;

use crate::data::InputData;
use crate::error::Result;
use crate::metrics::{numeric_values, quantile};

/// Result of the value quantile metric.
#[derive(Debug, Clone, Serialize)]
pub struct QuantileResult {
    /// Column under inspection.
    pub column: String,
    /// Whether the column exists in the current dataset.
    pub column_present: bool,
    /// Quantile in (0, 1).
    pub quantile: f64,
    /// Quantile over the current data; `None` without non-null values.
    pub value: Option<f64>,
    /// Quantile over the reference data, when available.
    pub reference_value: Option<f64>,
}

/// Computes the quantile with linear interpolation. The quantile bound
/// is validated where the metric is configured.
pub fn compute(data: &InputData, column: &str, q: f64) -> Result<QuantileResult> {
    let column_present = data.current().has_column(column);
    let value = if column_present {
        quantile(&data.current().numeric_column(column)?, q)
    } else {
        None
    };
    let reference_value = match data.reference() {
        Some(reference) if reference.has_column(column) => {
            numeric_values(reference, column)?.and_then(|values| quantile(&values, q))
        }
        _ => None,
    };
    Ok(QuantileResult {
        column: column.to_string(),
        column_present,
        quantile: q,
        value,
        reference_value,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::Float64Array;
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;

    use super::*;
    use crate::data::{ColumnMapping, Dataset};

    fn dataset(values: Vec<f64>) -> Dataset {
        let schema = Arc::new(Schema::new(vec![Field::new(
            "age",
            DataType::Float64,
            false,
        )]));
        let batch =
            RecordBatch::try_new(schema, vec![Arc::new(Float64Array::from(values))]).unwrap();
        Dataset::from_batch(batch)
    }

    #[test]
    fn test_median_with_reference() {
        let data = InputData::new(
            dataset(vec![1.0, 2.0, 3.0, 4.0]),
            ColumnMapping::new().with_numerical_features(["age"]),
        )
        .with_reference(dataset(vec![10.0, 20.0, 30.0]));
        let result = compute(&data, "age", 0.5).unwrap();
        assert_eq!(result.value, Some(2.5));
        assert_eq!(result.reference_value, Some(20.0));
    }

    #[test]
    fn test_absent_column() {
        let data = InputData::new(
            dataset(vec![1.0]),
            ColumnMapping::new().with_numerical_features(["income"]),
        );
        let result = compute(&data, "income", 0.5).unwrap();
        assert!(!result.column_present);
        assert_eq!(result.value, None);
    }
}
