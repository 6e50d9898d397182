//! Test outcomes, the [`Test`] trait, and the value-test evaluation
//! pipeline shared by every threshold-style check.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::condition::{Condition, TestValue};
use crate::core::metric::{Metric, MetricStore};
use crate::data::InputData;
use crate::error::{Result, TabwatchError};

/// Terminal status of a single executed test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    /// The condition held.
    Success,
    /// The condition was violated.
    Fail,
    /// A required input was missing or a computation failed at run time.
    Error,
    /// The test did not apply to this input, e.g. its column is absent.
    Skipped,
}

impl TestStatus {
    /// Returns true for [`TestStatus::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, TestStatus::Success)
    }
}

impl std::fmt::Display for TestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TestStatus::Success => "success",
            TestStatus::Fail => "fail",
            TestStatus::Error => "error",
            TestStatus::Skipped => "skipped",
        };
        write!(f, "{s}")
    }
}

/// The full outcome of one test execution: status, human-readable
/// description, and the evaluated value with its resolved condition so
/// downstream renderers can show what was compared against what.
#[derive(Debug, Clone, Serialize)]
pub struct TestOutcome {
    /// Terminal status.
    pub status: TestStatus,
    /// Human-readable description of what happened.
    pub description: String,
    /// The value the condition was evaluated against, when one was produced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<TestValue>,
    /// The fully resolved condition, when evaluation got that far.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
}

impl TestOutcome {
    /// A passing outcome.
    pub fn success(description: impl Into<String>) -> Self {
        Self {
            status: TestStatus::Success,
            description: description.into(),
            value: None,
            condition: None,
        }
    }

    /// A failing outcome.
    pub fn fail(description: impl Into<String>) -> Self {
        Self {
            status: TestStatus::Fail,
            description: description.into(),
            value: None,
            condition: None,
        }
    }

    /// A terminal error outcome, used when a required input is missing.
    pub fn error(description: impl Into<String>) -> Self {
        Self {
            status: TestStatus::Error,
            description: description.into(),
            value: None,
            condition: None,
        }
    }

    /// A skipped outcome, used when the test does not apply.
    pub fn skipped(description: impl Into<String>) -> Self {
        Self {
            status: TestStatus::Skipped,
            description: description.into(),
            value: None,
            condition: None,
        }
    }

    /// Attaches the evaluated value.
    pub fn with_value(mut self, value: TestValue) -> Self {
        self.value = Some(value);
        self
    }

    /// Attaches the resolved condition.
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }
}

/// A single executable check against computed metrics.
///
/// Configuration problems surface as `Err` from [`Test::run`] and abort
/// the suite; data problems surface as [`TestStatus::Error`] or
/// [`TestStatus::Skipped`] outcomes and let the suite continue.
pub trait Test {
    /// Stable test name for reports and logs.
    fn name(&self) -> String;

    /// The logical group this test belongs to, e.g. `data_quality`.
    fn group(&self) -> &'static str;

    /// The column this test inspects, when it is a per-column test.
    /// Reports bucket outcomes by feature along this value.
    fn feature(&self) -> Option<String> {
        None
    }

    /// The metric this test reads. The suite calculates it before the
    /// test runs.
    fn metric(&self) -> Arc<Metric>;

    /// Evaluates the test against the computed metric.
    fn run(&self, data: &InputData) -> Result<TestOutcome>;
}

/// How a test's condition was obtained, reported in outcome descriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionSource {
    /// The caller set the condition explicitly.
    Explicit,
    /// Derived from the reference dataset.
    Reference,
    /// The test's built-in fallback.
    Default,
}

impl std::fmt::Display for ConditionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ConditionSource::Explicit => "explicit",
            ConditionSource::Reference => "reference",
            ConditionSource::Default => "default",
        };
        write!(f, "{s}")
    }
}

/// Signals raised by value extraction that map to non-Err terminal
/// statuses instead of aborting the suite.
#[derive(Debug, Clone)]
pub enum ValueSignal {
    /// A required input is missing at evaluation time, e.g. a test that
    /// compares against reference data ran without a reference dataset.
    MissingInput(String),
    /// The test does not apply to this input, e.g. a per-column test
    /// whose column is absent from the current dataset.
    NotApplicable(String),
}

/// A threshold-style test over a single numeric value.
///
/// Implementors supply the value and the condition-resolution hooks; the
/// blanket [`Test`] impl wires them into the shared evaluation pipeline:
/// explicit condition first, then a reference-derived one, then the
/// built-in default, and a configuration error when all three are absent.
pub trait ValueTest {
    /// Stable test name for reports and logs.
    fn name(&self) -> String;

    /// The logical group this test belongs to.
    fn group(&self) -> &'static str;

    /// The column this test inspects, when it is a per-column test.
    fn feature(&self) -> Option<String> {
        None
    }

    /// The metric this test reads.
    fn metric(&self) -> Arc<Metric>;

    /// The condition the caller set explicitly, if any.
    fn explicit_condition(&self) -> Option<&Condition>;

    /// Extracts the value under test from the computed metric.
    ///
    /// Returns `Ok(Err(signal))` for missing-input and not-applicable
    /// situations, which become `Error` and `Skipped` outcomes. `Err`
    /// is reserved for configuration and internal failures.
    fn value(&self, data: &InputData) -> Result<std::result::Result<TestValue, ValueSignal>>;

    /// Derives a condition from the reference dataset, when one is
    /// available and the reference carries what the derivation needs.
    fn condition_from_reference(&self, data: &InputData) -> Result<Option<Condition>>;

    /// The built-in fallback condition, if the test has one.
    fn default_condition(&self) -> Option<Condition>;

    /// Renders the outcome description. The default names the test,
    /// the value, and the condition with its source.
    fn describe(&self, value: &TestValue, condition: &Condition, source: ConditionSource) -> String {
        format!(
            "{}: value is {value}, condition ({source}) is {condition}",
            self.name()
        )
    }
}

impl<T: ValueTest> Test for T {
    fn name(&self) -> String {
        ValueTest::name(self)
    }

    fn group(&self) -> &'static str {
        ValueTest::group(self)
    }

    fn feature(&self) -> Option<String> {
        ValueTest::feature(self)
    }

    fn metric(&self) -> Arc<Metric> {
        ValueTest::metric(self)
    }

    fn run(&self, data: &InputData) -> Result<TestOutcome> {
        let value = match self.value(data)? {
            Ok(value) => value,
            Err(ValueSignal::MissingInput(reason)) => {
                debug!(test = %ValueTest::name(self), %reason, "Required input missing");
                return Ok(TestOutcome::error(format!(
                    "{}: {reason}",
                    ValueTest::name(self)
                )));
            }
            Err(ValueSignal::NotApplicable(reason)) => {
                debug!(test = %ValueTest::name(self), %reason, "Test not applicable");
                return Ok(TestOutcome::skipped(format!(
                    "{}: {reason}",
                    ValueTest::name(self)
                )));
            }
        };

        let (condition, source) = self.resolve_condition(data)?;

        let violated = condition.check(&value);
        let description = self.describe(&value, &condition, source);
        let outcome = if violated.is_empty() {
            TestOutcome::success(description)
        } else {
            TestOutcome::fail(format!(
                "{description}; violated: {}",
                violated.join(", ")
            ))
        };
        Ok(outcome.with_value(value).with_condition(condition))
    }
}

/// Condition resolution shared by the blanket impl and tests that need
/// to inspect the resolved condition without running.
pub trait ResolveCondition {
    /// Resolves the effective condition and reports where it came from.
    fn resolve_condition(&self, data: &InputData) -> Result<(Condition, ConditionSource)>;
}

impl<T: ValueTest> ResolveCondition for T {
    fn resolve_condition(&self, data: &InputData) -> Result<(Condition, ConditionSource)> {
        if let Some(condition) = self.explicit_condition() {
            if condition.is_set() {
                return Ok((condition.clone(), ConditionSource::Explicit));
            }
        }
        if let Some(condition) = self.condition_from_reference(data)? {
            return Ok((condition, ConditionSource::Reference));
        }
        if let Some(condition) = self.default_condition() {
            return Ok((condition, ConditionSource::Default));
        }
        Err(TabwatchError::configuration(format!(
            "test '{}' has no condition: set one explicitly or provide reference data",
            ValueTest::name(self)
        )))
    }
}

/// Expands into a family of tests at suite-build time, one per matching
/// column of the input.
pub trait TestGenerator {
    /// Stable generator name for logs.
    fn name(&self) -> String;

    /// Produces the concrete tests for this input, in a deterministic
    /// order. Registers metric dependencies in the store as it goes.
    fn generate(&self, store: &mut MetricStore, data: &InputData) -> Result<Vec<Box<dyn Test>>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serde_lowercase() {
        assert_eq!(serde_json::to_string(&TestStatus::Success).unwrap(), "\"success\"");
        assert_eq!(serde_json::to_string(&TestStatus::Skipped).unwrap(), "\"skipped\"");
        let status: TestStatus = serde_json::from_str("\"fail\"").unwrap();
        assert_eq!(status, TestStatus::Fail);
    }

    #[test]
    fn test_outcome_builders() {
        let outcome = TestOutcome::fail("mean out of bounds")
            .with_value(TestValue::from(15.0))
            .with_condition(Condition::new().lt(10.0));
        assert_eq!(outcome.status, TestStatus::Fail);
        assert!(outcome.value.is_some());
        assert!(outcome.condition.is_some());
    }
}
