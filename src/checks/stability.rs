//! Tests over label stability between repeated feature vectors.

use std::sync::Arc;

use crate::core::condition::{Condition, TestValue};
use crate::core::groups::GROUP_DATA_STABILITY;
use crate::core::metric::{Metric, MetricSpec, MetricStore};
use crate::core::test::{ValueSignal, ValueTest};
use crate::data::InputData;
use crate::error::Result;

macro_rules! conflict_test {
    ($(#[$meta:meta])* $name:ident, $field:ident, $label:literal) => {
        $(#[$meta])*
        pub struct $name {
            metric: Arc<Metric>,
            condition: Option<Condition>,
        }

        impl $name {
            /// Creates the test, registering its metric dependency.
            pub fn new(store: &mut MetricStore) -> Self {
                Self {
                    metric: store.register(MetricSpec::DataStability),
                    condition: None,
                }
            }

            /// Sets an explicit condition, replacing the default of zero
            /// conflicts.
            pub fn with_condition(mut self, condition: Condition) -> Self {
                self.condition = Some(condition);
                self
            }
        }

        impl ValueTest for $name {
            fn name(&self) -> String {
                concat!("conflicting ", $label, " labels").to_string()
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
                let stability = result.data_stability()?;
                Ok(match stability.$field {
                    Some(conflicts) => Ok(TestValue::from(conflicts)),
                    None => Err(ValueSignal::MissingInput(concat!(
                        "no ",
                        $label,
                        " column in the current data"
                    )
                    .to_string())),
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

conflict_test!(
    /// Checks that rows sharing a feature vector agree on the target
    /// label. Defaults to requiring zero conflicting rows.
    TestConflictTarget,
    target_conflicts,
    "target"
);

conflict_test!(
    /// Checks that rows sharing a feature vector agree on the prediction
    /// label. Defaults to requiring zero conflicting rows.
    TestConflictPrediction,
    prediction_conflicts,
    "prediction"
);
