//! Tests over pairwise correlations and their drift against reference
//! data.

use std::sync::Arc;

use crate::core::condition::{Approx, Condition, TestValue};
use crate::core::groups::GROUP_DATA_STABILITY;
use crate::core::metric::{Metric, MetricSpec, MetricStore};
use crate::core::test::{ValueSignal, ValueTest};
use crate::data::InputData;
use crate::error::Result;
use crate::metrics::correlation::{CorrelationMethod, CorrelationStats};

macro_rules! correlation_stat_test {
    (
        $(#[$meta:meta])*
        $name:ident,
        $stat:ident,
        $label:literal,
        $missing:literal,
        $derive:expr,
        $default:expr
    ) => {
        $(#[$meta])*
        pub struct $name {
            metric: Arc<Metric>,
            condition: Option<Condition>,
        }

        impl $name {
            /// Creates the test over Pearson correlations.
            pub fn new(store: &mut MetricStore) -> Self {
                Self::with_method(store, CorrelationMethod::Pearson)
            }

            /// Creates the test over the given correlation method.
            pub fn with_method(store: &mut MetricStore, method: CorrelationMethod) -> Self {
                Self {
                    metric: store.register(MetricSpec::Correlation { method }),
                    condition: None,
                }
            }

            /// Sets an explicit condition, overriding derivation and the
            /// default.
            pub fn with_condition(mut self, condition: Condition) -> Self {
                self.condition = Some(condition);
                self
            }
        }

        impl ValueTest for $name {
            fn name(&self) -> String {
                $label.to_string()
            }

            fn group(&self) -> &'static str {
                GROUP_DATA_STABILITY
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
                let correlation = result.correlation()?;
                Ok(match correlation.current_stats.$stat {
                    Some(value) => Ok(TestValue::from(value)),
                    None => Err(ValueSignal::MissingInput($missing.to_string())),
                })
            }

            fn condition_from_reference(&self, _data: &InputData) -> Result<Option<Condition>> {
                let result = self.metric.result()?;
                let correlation = result.correlation()?;
                let derive: fn(&CorrelationStats) -> Option<Condition> = $derive;
                Ok(correlation.reference_stats.as_ref().and_then(derive))
            }

            fn default_condition(&self) -> Option<Condition> {
                $default
            }
        }
    };
}

correlation_stat_test!(
    /// Checks the correlation between target and prediction. Against
    /// reference data the current value must stay within 0.25 of the
    /// reference; otherwise it must be positive.
    TestTargetPredictionCorrelation,
    target_prediction,
    "correlation between target and prediction",
    "target and prediction are not both numeric columns of the current data",
    |stats| {
        stats
            .target_prediction
            .map(|v| Condition::new().eq(Approx::absolute(v, 0.25)))
    },
    Some(Condition::new().gt(0.0))
);

correlation_stat_test!(
    /// Checks the strongest absolute correlation among feature pairs.
    /// Against reference data it must match within 10 percent; otherwise
    /// it must stay below 0.9.
    TestHighlyCorrelatedFeatures,
    abs_max_features,
    "strongest correlation between features",
    "fewer than two numeric feature columns in the current data",
    |stats| {
        stats
            .abs_max_features
            .map(|v| Condition::new().eq(Approx::relative(v, 0.1)))
    },
    Some(Condition::new().lt(0.9))
);

correlation_stat_test!(
    /// Checks the strongest absolute correlation between the target and
    /// any feature.
    TestTargetFeaturesCorrelations,
    abs_max_target_features,
    "strongest correlation between target and features",
    "no numeric target and feature pair in the current data",
    |stats| {
        stats
            .abs_max_target_features
            .map(|v| Condition::new().eq(Approx::relative(v, 0.1)))
    },
    Some(Condition::new().lt(0.9))
);

correlation_stat_test!(
    /// Checks the strongest absolute correlation between the prediction
    /// and any feature.
    TestPredictionFeaturesCorrelations,
    abs_max_prediction_features,
    "strongest correlation between prediction and features",
    "no numeric prediction and feature pair in the current data",
    |stats| {
        stats
            .abs_max_prediction_features
            .map(|v| Condition::new().eq(Approx::relative(v, 0.1)))
    },
    Some(Condition::new().lt(0.9))
);

/// Counts column pairs whose correlation moved by more than `corr_diff`
/// between reference and current data. Defaults to allowing none.
pub struct TestCorrelationChanges {
    metric: Arc<Metric>,
    corr_diff: f64,
    condition: Option<Condition>,
}

impl TestCorrelationChanges {
    /// Default threshold for a pair to count as changed.
    pub const DEFAULT_CORR_DIFF: f64 = 0.25;

    /// Creates the test over Pearson correlations with the default
    /// change threshold.
    pub fn new(store: &mut MetricStore) -> Self {
        Self::with_method(store, CorrelationMethod::Pearson)
    }

    /// Creates the test over the given correlation method.
    pub fn with_method(store: &mut MetricStore, method: CorrelationMethod) -> Self {
        Self {
            metric: store.register(MetricSpec::Correlation { method }),
            corr_diff: Self::DEFAULT_CORR_DIFF,
            condition: None,
        }
    }

    /// Sets the per-pair change threshold.
    pub fn with_corr_diff(mut self, corr_diff: f64) -> Self {
        self.corr_diff = corr_diff;
        self
    }

    /// Sets an explicit condition over the number of changed pairs.
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }
}

impl ValueTest for TestCorrelationChanges {
    fn name(&self) -> String {
        format!("correlation changes above {}", self.corr_diff)
    }

    fn group(&self) -> &'static str {
        GROUP_DATA_STABILITY
    }

    fn metric(&self) -> Arc<Metric> {
        Arc::clone(&self.metric)
    }

    fn explicit_condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }

    fn value(&self, _data: &InputData) -> Result<std::result::Result<TestValue, ValueSignal>> {
        let result = self.metric.result()?;
        let correlation = result.correlation()?;
        let Some(reference) = correlation.reference.as_ref() else {
            return Ok(Err(ValueSignal::MissingInput(
                "reference data is required".to_string(),
            )));
        };
        let mut changed = 0usize;
        for (a, b, current) in correlation.current.pairs() {
            let pair = current.zip(reference.get(a, b));
            if let Some((current, reference)) = pair {
                if (current - reference).abs() > self.corr_diff {
                    changed += 1;
                }
            }
        }
        Ok(Ok(TestValue::from(changed)))
    }

    fn condition_from_reference(&self, _data: &InputData) -> Result<Option<Condition>> {
        Ok(None)
    }

    fn default_condition(&self) -> Option<Condition> {
        Some(Condition::new().eq(0.0))
    }
}
