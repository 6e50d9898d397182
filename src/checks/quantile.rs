//! Test over a single column quantile.

use std::sync::Arc;

use crate::core::condition::{Approx, Condition, TestValue};
use crate::core::groups::GROUP_DATA_QUALITY;
use crate::core::metric::{Metric, MetricSpec, MetricStore};
use crate::core::test::{ValueSignal, ValueTest};
use crate::data::InputData;
use crate::error::{Result, TabwatchError};

/// Checks a quantile of a numeric column. Without an explicit condition
/// the current quantile must match the reference quantile within 10
/// percent.
pub struct TestValueQuantile {
    column: String,
    quantile: f64,
    metric: Arc<Metric>,
    condition: Option<Condition>,
}

impl TestValueQuantile {
    /// Creates the test for a column.
    ///
    /// # Errors
    ///
    /// Fails with a configuration error when the quantile lies outside
    /// the open interval (0, 1).
    pub fn new(
        store: &mut MetricStore,
        column: impl Into<String>,
        quantile: f64,
    ) -> Result<Self> {
        if !(quantile > 0.0 && quantile < 1.0) {
            return Err(TabwatchError::configuration(format!(
                "quantile must lie in (0, 1), got {quantile}"
            )));
        }
        let column = column.into();
        Ok(Self {
            metric: store.register(MetricSpec::ValueQuantile {
                column: column.clone(),
                quantile,
            }),
            column,
            quantile,
            condition: None,
        })
    }

    /// Sets an explicit condition, overriding reference derivation.
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }
}

impl ValueTest for TestValueQuantile {
    fn name(&self) -> String {
        format!("quantile {} of column '{}'", self.quantile, self.column)
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
        let quantile = result.value_quantile()?;
        if !quantile.column_present {
            return Ok(Err(ValueSignal::NotApplicable(format!(
                "column '{}' is absent from current data",
                self.column
            ))));
        }
        Ok(match quantile.value {
            Some(value) => Ok(TestValue::from(value)),
            None => Err(ValueSignal::MissingInput(format!(
                "column '{}' has no numeric values",
                self.column
            ))),
        })
    }

    fn condition_from_reference(&self, _data: &InputData) -> Result<Option<Condition>> {
        let result = self.metric.result()?;
        let quantile = result.value_quantile()?;
        Ok(quantile
            .reference_value
            .map(|v| Condition::new().eq(Approx::relative(v, 0.1))))
    }

    fn default_condition(&self) -> Option<Condition> {
        None
    }
}
