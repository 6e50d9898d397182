//! Values outside an allowed list, with the list derived from the
//! distinct reference values when not set explicitly.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::data::InputData;
use crate::error::{Result, TabwatchError};

/// Result of the value list metric. Mirrors
/// [`ValueRangeResult`](crate::metrics::range::ValueRangeResult) in how
/// column absence is reported.
#[derive(Debug, Clone, Serialize)]
pub struct ValueListResult {
    /// Column under inspection.
    pub column: String,
    /// Whether the column exists in the current dataset.
    pub column_present: bool,
    /// Resolved allowed values.
    pub values: Vec<String>,
    /// Non-null values inspected.
    pub values_count: usize,
    /// Values not in the allowed list.
    pub number_out_of_list: usize,
    /// `number_out_of_list` over `values_count`; zero when empty.
    pub share_out_of_list: f64,
}

/// Counts current values missing from the allowed list. The list is the
/// explicit one when given, otherwise the distinct non-null values of the
/// reference column. Values compare by their string rendering, so numeric
/// columns are supported alongside categorical ones.
pub fn compute(
    data: &InputData,
    column: &str,
    values: Option<&[String]>,
) -> Result<ValueListResult> {
    if !data.current().has_column(column) {
        return Ok(ValueListResult {
            column: column.to_string(),
            column_present: false,
            values: values.map(<[String]>::to_vec).unwrap_or_default(),
            values_count: 0,
            number_out_of_list: 0,
            share_out_of_list: 0.0,
        });
    }

    let allowed: BTreeSet<String> = match values {
        Some(values) => values.iter().cloned().collect(),
        None => {
            let reference = data.reference().ok_or_else(|| {
                TabwatchError::configuration(format!(
                    "value list for column '{column}': set it explicitly or provide reference data"
                ))
            })?;
            if !reference.has_column(column) {
                return Err(TabwatchError::configuration(format!(
                    "value list for column '{column}': column is absent from reference data"
                )));
            }
            reference.string_column(column)?.into_iter().flatten().collect()
        }
    };

    let current: Vec<String> = data
        .current()
        .string_column(column)?
        .into_iter()
        .flatten()
        .collect();
    let number_out_of_list = current.iter().filter(|v| !allowed.contains(*v)).count();
    let share_out_of_list = if current.is_empty() {
        0.0
    } else {
        number_out_of_list as f64 / current.len() as f64
    };

    Ok(ValueListResult {
        column: column.to_string(),
        column_present: true,
        values: allowed.into_iter().collect(),
        values_count: current.len(),
        number_out_of_list,
        share_out_of_list,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::StringArray;
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;

    use super::*;
    use crate::data::{ColumnMapping, Dataset};

    fn dataset(values: Vec<Option<&str>>) -> Dataset {
        let schema = Arc::new(Schema::new(vec![Field::new("city", DataType::Utf8, true)]));
        let batch =
            RecordBatch::try_new(schema, vec![Arc::new(StringArray::from(values))]).unwrap();
        Dataset::from_batch(batch)
    }

    fn mapping() -> ColumnMapping {
        ColumnMapping::new().with_categorical_features(["city"])
    }

    #[test]
    fn test_explicit_list() {
        let data = InputData::new(
            dataset(vec![Some("a"), Some("b"), Some("x"), None]),
            mapping(),
        );
        let allowed = vec!["a".to_string(), "b".to_string()];
        let result = compute(&data, "city", Some(&allowed)).unwrap();
        assert_eq!(result.values_count, 3);
        assert_eq!(result.number_out_of_list, 1);
        assert!((result.share_out_of_list - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_list_derived_from_reference() {
        let data = InputData::new(
            dataset(vec![Some("a"), Some("c")]),
            mapping(),
        )
        .with_reference(dataset(vec![Some("a"), Some("b"), Some("a")]));
        let result = compute(&data, "city", None).unwrap();
        assert_eq!(result.values, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(result.number_out_of_list, 1);
    }

    #[test]
    fn test_no_list_and_no_reference_fails() {
        let data = InputData::new(dataset(vec![Some("a")]), mapping());
        let err = compute(&data, "city", None).unwrap_err();
        assert!(matches!(err, TabwatchError::Configuration(_)));
    }
}
