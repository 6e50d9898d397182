//! Tests over values outside a numeric range.

use std::sync::Arc;

use crate::core::condition::{Condition, TestValue};
use crate::core::groups::GROUP_DATA_QUALITY;
use crate::core::metric::{Metric, MetricResult, MetricSpec, MetricStore};
use crate::core::test::{ValueSignal, ValueTest};
use crate::data::InputData;
use crate::error::Result;
use crate::metrics::range::ValueRangeResult;

fn range_result<'a>(
    result: &'a MetricResult,
) -> Result<std::result::Result<&'a ValueRangeResult, ValueSignal>> {
    let range = result.value_range()?;
    if !range.column_present {
        return Ok(Err(ValueSignal::NotApplicable(format!(
            "column '{}' is absent from current data",
            range.column
        ))));
    }
    Ok(Ok(range))
}

macro_rules! out_of_range_test {
    ($(#[$meta:meta])* $name:ident, $field:ident, $label:literal) => {
        $(#[$meta])*
        pub struct $name {
            metric: Arc<Metric>,
            condition: Option<Condition>,
        }

        impl $name {
            /// Creates the test for a column. Bounds left as `None` are
            /// derived from the reference minimum and maximum.
            pub fn new(
                store: &mut MetricStore,
                column: impl Into<String>,
                left: Option<f64>,
                right: Option<f64>,
            ) -> Self {
                Self {
                    metric: store.register(MetricSpec::ValueRange {
                        column: column.into(),
                        left,
                        right,
                    }),
                    condition: None,
                }
            }

            /// Sets an explicit condition, replacing the default of no
            /// values out of range.
            pub fn with_condition(mut self, condition: Condition) -> Self {
                self.condition = Some(condition);
                self
            }
        }

        impl ValueTest for $name {
            fn name(&self) -> String {
                match self.metric.spec() {
                    MetricSpec::ValueRange { column, .. } => {
                        format!(concat!($label, " in column '{}'"), column)
                    }
                    _ => $label.to_string(),
                }
            }

            fn group(&self) -> &'static str {
                GROUP_DATA_QUALITY
            }

            fn feature(&self) -> Option<String> {
                match self.metric.spec() {
                    MetricSpec::ValueRange { column, .. } => Some(column.clone()),
                    _ => None,
                }
            }

            fn metric(&self) -> Arc<Metric> {
                Arc::clone(&self.metric)
            }

            fn explicit_condition(&self) -> Option<&Condition> {
                self.condition.as_ref()
            }

            fn value(
                &self,
                _data: &InputData,
            ) -> Result<std::result::Result<TestValue, ValueSignal>> {
                let result = self.metric.result()?;
                Ok(match range_result(&result)? {
                    Ok(range) => Ok(TestValue::from(range.$field)),
                    Err(signal) => Err(signal),
                })
            }

            fn condition_from_reference(&self, _data: &InputData) -> Result<Option<Condition>> {
                Ok(None)
            }

            fn default_condition(&self) -> Option<Condition> {
                Some(Condition::new().eq(0.0))
            }
        }
    };
}

out_of_range_test!(
    /// Checks that a column has no values outside its range. The range
    /// comes from explicit bounds or from the reference minimum and
    /// maximum.
    TestValueRange,
    number_out_of_range,
    "values out of range"
);

out_of_range_test!(
    /// Checks the number of values outside the range against a condition,
    /// defaulting to zero.
    TestNumberOfOutOfRangeValues,
    number_out_of_range,
    "number of out-of-range values"
);

out_of_range_test!(
    /// Checks the share of values outside the range against a condition,
    /// defaulting to zero.
    TestShareOfOutOfRangeValues,
    share_out_of_range,
    "share of out-of-range values"
);

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::Float64Array;
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;

    use super::*;
    use crate::core::test::{Test, TestStatus};
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

    fn input(values: Vec<f64>) -> InputData {
        InputData::new(
            dataset(values),
            ColumnMapping::new().with_numerical_features(["age"]),
        )
    }

    #[test]
    fn test_value_range_explicit_bounds() {
        let data = input(vec![0.0, 5.0, 10.0]);
        let mut store = MetricStore::new();
        let test = TestValueRange::new(&mut store, "age", Some(0.0), Some(10.0));
        store.calculate_all(&data).unwrap();
        assert_eq!(test.run(&data).unwrap().status, TestStatus::Success);

        let data = input(vec![0.0, 5.0, 11.0]);
        let mut store = MetricStore::new();
        let test = TestValueRange::new(&mut store, "age", Some(0.0), Some(10.0));
        store.calculate_all(&data).unwrap();
        assert_eq!(test.run(&data).unwrap().status, TestStatus::Fail);
    }

    #[test]
    fn test_share_with_custom_condition() {
        let data = input(vec![1.0, 2.0, 3.0, 100.0]);
        let mut store = MetricStore::new();
        let test = TestShareOfOutOfRangeValues::new(&mut store, "age", Some(0.0), Some(10.0))
            .with_condition(Condition::new().lte(0.3));
        store.calculate_all(&data).unwrap();
        assert_eq!(test.run(&data).unwrap().status, TestStatus::Success);
    }

    #[test]
    fn test_absent_column_skips() {
        let data = input(vec![1.0]);
        let mut store = MetricStore::new();
        let test = TestValueRange::new(&mut store, "income", Some(0.0), Some(1.0));
        store.calculate_all(&data).unwrap();
        assert_eq!(test.run(&data).unwrap().status, TestStatus::Skipped);
    }

    #[test]
    fn test_shared_metric_between_tests() {
        let data = input(vec![1.0, 20.0]);
        let mut store = MetricStore::new();
        let number = TestNumberOfOutOfRangeValues::new(&mut store, "age", Some(0.0), Some(10.0))
            .with_condition(Condition::new().lte(1.0));
        let share = TestShareOfOutOfRangeValues::new(&mut store, "age", Some(0.0), Some(10.0))
            .with_condition(Condition::new().lte(0.5));
        assert_eq!(store.len(), 1);
        store.calculate_all(&data).unwrap();
        assert_eq!(number.run(&data).unwrap().status, TestStatus::Success);
        assert_eq!(share.run(&data).unwrap().status, TestStatus::Success);
    }
}
