//! Tests over values outside an allowed list.

use std::sync::Arc;

use crate::core::condition::{Condition, TestValue};
use crate::core::groups::GROUP_DATA_QUALITY;
use crate::core::metric::{Metric, MetricResult, MetricSpec, MetricStore};
use crate::core::test::{ValueSignal, ValueTest};
use crate::data::InputData;
use crate::error::Result;
use crate::metrics::list::ValueListResult;

fn list_result<'a>(
    result: &'a MetricResult,
) -> Result<std::result::Result<&'a ValueListResult, ValueSignal>> {
    let list = result.value_list()?;
    if !list.column_present {
        return Ok(Err(ValueSignal::NotApplicable(format!(
            "column '{}' is absent from current data",
            list.column
        ))));
    }
    Ok(Ok(list))
}

macro_rules! out_of_list_test {
    ($(#[$meta:meta])* $name:ident, $field:ident, $label:literal) => {
        $(#[$meta])*
        pub struct $name {
            metric: Arc<Metric>,
            condition: Option<Condition>,
        }

        impl $name {
            /// Creates the test for a column. Without an explicit list the
            /// distinct reference values of the column are allowed.
            pub fn new(
                store: &mut MetricStore,
                column: impl Into<String>,
                values: Option<Vec<String>>,
            ) -> Self {
                Self {
                    metric: store.register(MetricSpec::ValueList {
                        column: column.into(),
                        values,
                    }),
                    condition: None,
                }
            }

            /// Sets an explicit condition, replacing the default of no
            /// values out of the list.
            pub fn with_condition(mut self, condition: Condition) -> Self {
                self.condition = Some(condition);
                self
            }
        }

        impl ValueTest for $name {
            fn name(&self) -> String {
                match self.metric.spec() {
                    MetricSpec::ValueList { column, .. } => {
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
                    MetricSpec::ValueList { column, .. } => Some(column.clone()),
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
                Ok(match list_result(&result)? {
                    Ok(list) => Ok(TestValue::from(list.$field)),
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

out_of_list_test!(
    /// Checks that a column has no values outside its allowed list.
    TestValueList,
    number_out_of_list,
    "values out of list"
);

out_of_list_test!(
    /// Checks the number of values outside the list against a condition,
    /// defaulting to zero.
    TestNumberOfOutOfListValues,
    number_out_of_list,
    "number of out-of-list values"
);

out_of_list_test!(
    /// Checks the share of values outside the list against a condition,
    /// defaulting to zero.
    TestShareOfOutOfListValues,
    share_out_of_list,
    "share of out-of-list values"
);
