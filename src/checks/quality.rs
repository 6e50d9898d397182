//! Tests over per-column descriptive statistics.

use std::sync::Arc;

use crate::checks::stats_or_skip;
use crate::core::condition::{Approx, Condition, TestValue};
use crate::core::groups::GROUP_DATA_QUALITY;
use crate::core::metric::{Metric, MetricSpec, MetricStore};
use crate::core::test::{ValueSignal, ValueTest};
use crate::data::InputData;
use crate::error::Result;

macro_rules! column_stat_test {
    ($(#[$meta:meta])* $name:ident, $stat:ident, $label:literal, $derive:expr) => {
        $(#[$meta])*
        pub struct $name {
            column: String,
            metric: Arc<Metric>,
            condition: Option<Condition>,
        }

        impl $name {
            /// Creates the test for a column, registering its metric
            /// dependency in the store.
            pub fn new(store: &mut MetricStore, column: impl Into<String>) -> Self {
                Self {
                    column: column.into(),
                    metric: store.register(MetricSpec::DataQuality),
                    condition: None,
                }
            }

            /// Sets an explicit condition, overriding reference derivation.
            pub fn with_condition(mut self, condition: Condition) -> Self {
                self.condition = Some(condition);
                self
            }
        }

        impl ValueTest for $name {
            fn name(&self) -> String {
                format!(concat!($label, " of column '{}'"), self.column)
            }

            fn group(&self) -> &'static str {
                GROUP_DATA_QUALITY
            }

            fn feature(&self) -> Option<String> {
                Some(self.column.clone())
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
                let quality = result.data_quality()?;
                let stats = match stats_or_skip(&quality.current, &self.column) {
                    Ok(stats) => stats,
                    Err(signal) => return Ok(Err(signal)),
                };
                Ok(match stats.$stat {
                    Some(value) => Ok(TestValue::from(value)),
                    None => Err(ValueSignal::MissingInput(format!(
                        "column '{}' has no numeric values",
                        self.column
                    ))),
                })
            }

            fn condition_from_reference(&self, _data: &InputData) -> Result<Option<Condition>> {
                let result = self.metric.result()?;
                let quality = result.data_quality()?;
                let Some(reference) = quality.reference.as_ref() else {
                    return Ok(None);
                };
                let Some(stats) = reference.get(&self.column) else {
                    return Ok(None);
                };
                let derive: fn(f64) -> Condition = $derive;
                Ok(stats.$stat.map(derive))
            }

            fn default_condition(&self) -> Option<Condition> {
                None
            }
        }
    };
}

column_stat_test!(
    /// Checks the minimum of a numeric column. Without an explicit
    /// condition the current minimum must not fall below the reference
    /// minimum.
    TestColumnValueMin,
    min,
    "minimum",
    |reference| Condition::new().gte(reference)
);

column_stat_test!(
    /// Checks the maximum of a numeric column. Without an explicit
    /// condition the current maximum must not exceed the reference
    /// maximum.
    TestColumnValueMax,
    max,
    "maximum",
    |reference| Condition::new().lte(reference)
);

column_stat_test!(
    /// Checks the mean of a numeric column. Without an explicit condition
    /// the current mean must match the reference mean within 10 percent.
    TestColumnValueMean,
    mean,
    "mean",
    |reference| Condition::new().eq(Approx::relative(reference, 0.1))
);

column_stat_test!(
    /// Checks the median of a numeric column against the reference median
    /// within 10 percent when no explicit condition is set.
    TestColumnValueMedian,
    median,
    "median",
    |reference| Condition::new().eq(Approx::relative(reference, 0.1))
);

column_stat_test!(
    /// Checks the standard deviation of a numeric column against the
    /// reference within 10 percent when no explicit condition is set.
    TestColumnValueStd,
    std,
    "standard deviation",
    |reference| Condition::new().eq(Approx::relative(reference, 0.1))
);

/// Checks the number of distinct non-null values in a column. Falls back
/// to requiring more than one distinct value.
pub struct TestNumberOfUniqueValues {
    column: String,
    metric: Arc<Metric>,
    condition: Option<Condition>,
}

impl TestNumberOfUniqueValues {
    /// Creates the test for a column.
    pub fn new(store: &mut MetricStore, column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            metric: store.register(MetricSpec::DataQuality),
            condition: None,
        }
    }

    /// Sets an explicit condition.
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }
}

impl ValueTest for TestNumberOfUniqueValues {
    fn name(&self) -> String {
        format!("number of unique values in column '{}'", self.column)
    }

    fn group(&self) -> &'static str {
        GROUP_DATA_QUALITY
    }

    fn feature(&self) -> Option<String> {
        Some(self.column.clone())
    }

    fn metric(&self) -> Arc<Metric> {
        Arc::clone(&self.metric)
    }

    fn explicit_condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }

    fn value(&self, _data: &InputData) -> Result<std::result::Result<TestValue, ValueSignal>> {
        let result = self.metric.result()?;
        let quality = result.data_quality()?;
        Ok(stats_or_skip(&quality.current, &self.column)
            .map(|stats| TestValue::from(stats.unique_count)))
    }

    fn condition_from_reference(&self, _data: &InputData) -> Result<Option<Condition>> {
        let result = self.metric.result()?;
        let quality = result.data_quality()?;
        let Some(reference) = quality.reference.as_ref() else {
            return Ok(None);
        };
        Ok(reference.get(&self.column).map(|stats| {
            Condition::new().eq(Approx::relative(stats.unique_count as f64, 0.1))
        }))
    }

    fn default_condition(&self) -> Option<Condition> {
        Some(Condition::new().gt(1.0))
    }
}

/// Checks the share of distinct values among non-null values, against the
/// reference share within 10 percent when no explicit condition is set.
pub struct TestUniqueValuesShare {
    column: String,
    metric: Arc<Metric>,
    condition: Option<Condition>,
}

impl TestUniqueValuesShare {
    /// Creates the test for a column.
    pub fn new(store: &mut MetricStore, column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            metric: store.register(MetricSpec::DataQuality),
            condition: None,
        }
    }

    /// Sets an explicit condition.
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }
}

impl ValueTest for TestUniqueValuesShare {
    fn name(&self) -> String {
        format!("share of unique values in column '{}'", self.column)
    }

    fn group(&self) -> &'static str {
        GROUP_DATA_QUALITY
    }

    fn feature(&self) -> Option<String> {
        Some(self.column.clone())
    }

    fn metric(&self) -> Arc<Metric> {
        Arc::clone(&self.metric)
    }

    fn explicit_condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }

    fn value(&self, _data: &InputData) -> Result<std::result::Result<TestValue, ValueSignal>> {
        let result = self.metric.result()?;
        let quality = result.data_quality()?;
        Ok(stats_or_skip(&quality.current, &self.column)
            .map(|stats| TestValue::from(stats.unique_share)))
    }

    fn condition_from_reference(&self, _data: &InputData) -> Result<Option<Condition>> {
        let result = self.metric.result()?;
        let quality = result.data_quality()?;
        let Some(reference) = quality.reference.as_ref() else {
            return Ok(None);
        };
        Ok(reference
            .get(&self.column)
            .map(|stats| Condition::new().eq(Approx::relative(stats.unique_share, 0.1))))
    }

    fn default_condition(&self) -> Option<Condition> {
        None
    }
}

/// Checks the frequency share of the most common value. Falls back to
/// requiring the share to stay below 0.8.
pub struct TestMostCommonValueShare {
    column: String,
    metric: Arc<Metric>,
    condition: Option<Condition>,
}

impl TestMostCommonValueShare {
    /// Creates the test for a column.
    pub fn new(store: &mut MetricStore, column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            metric: store.register(MetricSpec::DataQuality),
            condition: None,
        }
    }

    /// Sets an explicit condition.
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }
}

impl ValueTest for TestMostCommonValueShare {
    fn name(&self) -> String {
        format!("most common value share in column '{}'", self.column)
    }

    fn group(&self) -> &'static str {
        GROUP_DATA_QUALITY
    }

    fn feature(&self) -> Option<String> {
        Some(self.column.clone())
    }

    fn metric(&self) -> Arc<Metric> {
        Arc::clone(&self.metric)
    }

    fn explicit_condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }

    fn value(&self, _data: &InputData) -> Result<std::result::Result<TestValue, ValueSignal>> {
        let result = self.metric.result()?;
        let quality = result.data_quality()?;
        Ok(stats_or_skip(&quality.current, &self.column)
            .map(|stats| TestValue::from(stats.most_common_share)))
    }

    fn condition_from_reference(&self, _data: &InputData) -> Result<Option<Condition>> {
        let result = self.metric.result()?;
        let quality = result.data_quality()?;
        let Some(reference) = quality.reference.as_ref() else {
            return Ok(None);
        };
        Ok(reference
            .get(&self.column)
            .map(|stats| Condition::new().eq(Approx::relative(stats.most_common_share, 0.1))))
    }

    fn default_condition(&self) -> Option<Condition> {
        Some(Condition::new().lt(0.8))
    }
}

/// Checks that the current mean lies within `n_sigmas` reference standard
/// deviations of the reference mean. Reference data is required; without
/// it the test reports an error outcome.
pub struct TestMeanInNSigmas {
    column: String,
    n_sigmas: f64,
    metric: Arc<Metric>,
}

impl TestMeanInNSigmas {
    /// Creates the test for a column with the given sigma multiplier.
    pub fn new(store: &mut MetricStore, column: impl Into<String>, n_sigmas: f64) -> Self {
        Self {
            column: column.into(),
            n_sigmas,
            metric: store.register(MetricSpec::DataQuality),
        }
    }

    fn reference_bounds(&self) -> Result<std::result::Result<(f64, f64), ValueSignal>> {
        let result = self.metric.result()?;
        let quality = result.data_quality()?;
        let Some(reference) = quality.reference.as_ref() else {
            return Ok(Err(ValueSignal::MissingInput(
                "reference data is required".to_string(),
            )));
        };
        let Some(stats) = reference.get(&self.column) else {
            return Ok(Err(ValueSignal::MissingInput(format!(
                "column '{}' is absent from reference data",
                self.column
            ))));
        };
        match (stats.mean, stats.std) {
            (Some(mean), Some(std)) => Ok(Ok((
                mean - self.n_sigmas * std,
                mean + self.n_sigmas * std,
            ))),
            _ => Ok(Err(ValueSignal::MissingInput(format!(
                "reference column '{}' has too few numeric values",
                self.column
            )))),
        }
    }
}

impl ValueTest for TestMeanInNSigmas {
    fn name(&self) -> String {
        format!(
            "mean of column '{}' within {} sigmas of reference",
            self.column, self.n_sigmas
        )
    }

    fn group(&self) -> &'static str {
        GROUP_DATA_QUALITY
    }

    fn feature(&self) -> Option<String> {
        Some(self.column.clone())
    }

    fn metric(&self) -> Arc<Metric> {
        Arc::clone(&self.metric)
    }

    fn explicit_condition(&self) -> Option<&Condition> {
        None
    }

    fn value(&self, _data: &InputData) -> Result<std::result::Result<TestValue, ValueSignal>> {
        let result = self.metric.result()?;
        let quality = result.data_quality()?;
        let stats = match stats_or_skip(&quality.current, &self.column) {
            Ok(stats) => stats,
            Err(signal) => return Ok(Err(signal)),
        };
        // Resolve the bounds up front so a missing reference surfaces as
        // an error outcome rather than a configuration failure.
        if let Err(signal) = self.reference_bounds()? {
            return Ok(Err(signal));
        }
        Ok(match stats.mean {
            Some(mean) => Ok(TestValue::from(mean)),
            None => Err(ValueSignal::MissingInput(format!(
                "column '{}' has no numeric values",
                self.column
            ))),
        })
    }

    fn condition_from_reference(&self, _data: &InputData) -> Result<Option<Condition>> {
        Ok(self
            .reference_bounds()?
            .ok()
            .map(|(low, high)| Condition::new().gte(low).lte(high)))
    }

    fn default_condition(&self) -> Option<Condition> {
        None
    }
}

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

    fn input(current: Vec<f64>, reference: Option<Vec<f64>>) -> InputData {
        let mapping = ColumnMapping::new().with_numerical_features(["age"]);
        let data = InputData::new(dataset(current), mapping);
        match reference {
            Some(values) => data.with_reference(dataset(values)),
            None => data,
        }
    }

    fn run_test<T: Test>(build: impl FnOnce(&mut MetricStore) -> T, data: &InputData) -> TestStatus {
        let mut store = MetricStore::new();
        let test = build(&mut store);
        store.calculate_all(data).unwrap();
        test.run(data).unwrap().status
    }

    #[test]
    fn test_mean_with_explicit_condition() {
        let data = input(vec![1.0, 2.0, 3.0], None);
        let status = run_test(
            |store| TestColumnValueMean::new(store, "age").with_condition(Condition::new().gt(0.0)),
            &data,
        );
        assert_eq!(status, TestStatus::Success);

        let status = run_test(
            |store| TestColumnValueMean::new(store, "age").with_condition(Condition::new().lt(1.0)),
            &data,
        );
        assert_eq!(status, TestStatus::Fail);
    }

    #[test]
    fn test_mean_derived_from_reference() {
        // Current mean 2.0 against reference mean 2.05, within 10 percent.
        let data = input(vec![1.0, 2.0, 3.0], Some(vec![1.1, 2.0, 3.05]));
        let status = run_test(|store| TestColumnValueMean::new(store, "age"), &data);
        assert_eq!(status, TestStatus::Success);
    }

    #[test]
    fn test_mean_without_condition_or_reference_is_configuration_error() {
        let data = input(vec![1.0, 2.0], None);
        let mut store = MetricStore::new();
        let test = TestColumnValueMean::new(&mut store, "age");
        store.calculate_all(&data).unwrap();
        assert!(test.run(&data).is_err());
    }

    #[test]
    fn test_absent_column_is_skipped() {
        let data = input(vec![1.0], None);
        let status = run_test(
            |store| {
                TestColumnValueMean::new(store, "income")
                    .with_condition(Condition::new().gt(0.0))
            },
            &data,
        );
        assert_eq!(status, TestStatus::Skipped);
    }

    #[test]
    fn test_unique_values_default_condition() {
        let data = input(vec![1.0, 2.0, 1.0], None);
        let status = run_test(|store| TestNumberOfUniqueValues::new(store, "age"), &data);
        assert_eq!(status, TestStatus::Success);

        let constant = input(vec![5.0, 5.0, 5.0], None);
        let status = run_test(
            |store| TestNumberOfUniqueValues::new(store, "age"),
            &constant,
        );
        assert_eq!(status, TestStatus::Fail);
    }

    #[test]
    fn test_most_common_share_default() {
        let data = input(vec![1.0, 1.0, 1.0, 1.0, 2.0], None);
        let status = run_test(|store| TestMostCommonValueShare::new(store, "age"), &data);
        assert_eq!(status, TestStatus::Fail);

        let spread = input(vec![1.0, 2.0, 3.0, 4.0], None);
        let status = run_test(|store| TestMostCommonValueShare::new(store, "age"), &spread);
        assert_eq!(status, TestStatus::Success);
    }

    #[test]
    fn test_mean_in_n_sigmas() {
        // Reference mean 10, sample std about 1.85; two sigmas give
        // roughly [6.3, 13.7].
        let reference = vec![8.0, 10.0, 12.0, 8.0, 10.0, 12.0, 8.0, 12.0];
        let data = input(vec![13.0, 13.0], Some(reference.clone()));
        let status = run_test(|store| TestMeanInNSigmas::new(store, "age", 2.0), &data);
        assert_eq!(status, TestStatus::Success);

        let data = input(vec![15.0, 15.0], Some(reference));
        let status = run_test(|store| TestMeanInNSigmas::new(store, "age", 2.0), &data);
        assert_eq!(status, TestStatus::Fail);
    }

    #[test]
    fn test_mean_in_n_sigmas_without_reference_errors() {
        let data = input(vec![1.0, 2.0], None);
        let status = run_test(|store| TestMeanInNSigmas::new(store, "age", 2.0), &data);
        assert_eq!(status, TestStatus::Error);
    }
}
