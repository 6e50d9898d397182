//! Test suite assembly and execution.
//!
//! A [`TestSuite`] owns a [`MetricStore`], a list of tests, and a list of
//! generators. Running the suite expands generators against the input,
//! calculates every registered metric exactly once, then evaluates each
//! test in insertion order and aggregates the outcomes into a
//! [`SuiteReport`].

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::core::groups::{BY_FEATURE, BY_TEST_GROUP};
use crate::core::metric::MetricStore;
use crate::core::test::{Test, TestGenerator, TestOutcome, TestStatus};
use crate::data::InputData;
use crate::error::Result;

/// A named collection of tests and generators, built via
/// [`TestSuite::builder`].
pub struct TestSuite {
    name: String,
    store: MetricStore,
    tests: Vec<Box<dyn Test>>,
    generators: Vec<Box<dyn TestGenerator>>,
}

impl TestSuite {
    /// Starts building a suite with the given name.
    pub fn builder(name: impl Into<String>) -> TestSuiteBuilder {
        TestSuiteBuilder {
            name: name.into(),
            store: MetricStore::new(),
            tests: Vec::new(),
            generators: Vec::new(),
        }
    }

    /// The suite name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of directly added tests, before generator expansion.
    pub fn test_count(&self) -> usize {
        self.tests.len()
    }

    /// Runs every test against the input data.
    ///
    /// Generators expand first, metrics calculate once, then tests
    /// evaluate in insertion order with generated tests appended after
    /// the directly added ones.
    ///
    /// # Errors
    ///
    /// Fails fast on configuration errors and on metric calculation
    /// failures. Missing-input and not-applicable situations do not
    /// abort the run; they surface as `error` and `skipped` outcomes.
    #[instrument(skip(self, data), fields(suite.name = %self.name))]
    pub fn run(mut self, data: &InputData) -> Result<SuiteReport> {
        let started_at = Utc::now();
        let timer = Instant::now();
        info!(
            tests = self.tests.len(),
            generators = self.generators.len(),
            rows = data.current().row_count(),
            "Running test suite"
        );

        for generator in &self.generators {
            let generated = generator.generate(&mut self.store, data)?;
            debug!(
                generator = %generator.name(),
                count = generated.len(),
                "Expanded test generator"
            );
            self.tests.extend(generated);
        }

        self.store.calculate_all(data)?;

        let mut executed = Vec::with_capacity(self.tests.len());
        for test in &self.tests {
            let outcome = test.run(data)?;
            debug!(
                test = %test.name(),
                status = %outcome.status,
                "Test evaluated"
            );
            let mut groups = BTreeMap::new();
            groups.insert(BY_TEST_GROUP.to_string(), test.group().to_string());
            if let Some(feature) = test.feature() {
                groups.insert(BY_FEATURE.to_string(), feature);
            }
            executed.push(ExecutedTest {
                name: test.name(),
                group: test.group(),
                groups,
                outcome,
            });
        }

        let summary = SuiteSummary::from_outcomes(&executed);
        let report = SuiteReport {
            name: self.name,
            started_at,
            execution_time_ms: timer.elapsed().as_millis() as u64,
            summary,
            tests: executed,
        };
        info!(
            total = report.summary.total,
            success = report.summary.success,
            fail = report.summary.fail,
            error = report.summary.error,
            skipped = report.summary.skipped,
            duration_ms = report.execution_time_ms,
            "Test suite finished"
        );
        Ok(report)
    }
}

/// Builder for [`TestSuite`].
pub struct TestSuiteBuilder {
    name: String,
    store: MetricStore,
    tests: Vec<Box<dyn Test>>,
    generators: Vec<Box<dyn TestGenerator>>,
}

impl TestSuiteBuilder {
    /// Adds a test. The closure receives the suite's metric store so the
    /// test can register its metric dependencies; equal dependencies are
    /// shared across tests.
    pub fn test<T, F>(mut self, build: F) -> Self
    where
        T: Test + 'static,
        F: FnOnce(&mut MetricStore) -> T,
    {
        let test = build(&mut self.store);
        self.tests.push(Box::new(test));
        self
    }

    /// Adds a test whose constructor can fail, propagating the error at
    /// build time.
    pub fn try_test<T, F>(mut self, build: F) -> Result<Self>
    where
        T: Test + 'static,
        F: FnOnce(&mut MetricStore) -> Result<T>,
    {
        let test = build(&mut self.store)?;
        self.tests.push(Box::new(test));
        Ok(self)
    }

    /// Adds a generator that expands into per-column tests at run time.
    pub fn generate<G>(mut self, generator: G) -> Self
    where
        G: TestGenerator + 'static,
    {
        self.generators.push(Box::new(generator));
        self
    }

    /// Finishes the build.
    pub fn build(self) -> TestSuite {
        TestSuite {
            name: self.name,
            store: self.store,
            tests: self.tests,
            generators: self.generators,
        }
    }
}

/// One executed test inside a [`SuiteReport`].
#[derive(Debug, Clone, Serialize)]
pub struct ExecutedTest {
    /// Test name.
    pub name: String,
    /// Logical group, used for report bucketing.
    pub group: &'static str,
    /// Grouping-dimension values for this test, keyed by dimension id.
    pub groups: BTreeMap<String, String>,
    /// The outcome.
    pub outcome: TestOutcome,
}

/// Status counts across a suite run.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SuiteSummary {
    /// Number of executed tests.
    pub total: usize,
    /// Tests whose condition held.
    pub success: usize,
    /// Tests whose condition was violated.
    pub fail: usize,
    /// Tests that hit a missing input at run time.
    pub error: usize,
    /// Tests that did not apply to this input.
    pub skipped: usize,
}

impl SuiteSummary {
    fn from_outcomes(executed: &[ExecutedTest]) -> Self {
        let mut summary = Self {
            total: executed.len(),
            ..Self::default()
        };
        for test in executed {
            match test.outcome.status {
                TestStatus::Success => summary.success += 1,
                TestStatus::Fail => summary.fail += 1,
                TestStatus::Error => summary.error += 1,
                TestStatus::Skipped => summary.skipped += 1,
            }
        }
        summary
    }
}

/// Aggregated result of one suite run.
#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    /// Suite name.
    pub name: String,
    /// Wall-clock start of the run.
    pub started_at: DateTime<Utc>,
    /// Run duration in milliseconds.
    pub execution_time_ms: u64,
    /// Status counts.
    pub summary: SuiteSummary,
    /// Executed tests in execution order.
    pub tests: Vec<ExecutedTest>,
}

impl SuiteReport {
    /// Returns true when no test failed or errored. Skipped tests do not
    /// count against the suite.
    pub fn is_passed(&self) -> bool {
        self.summary.fail == 0 && self.summary.error == 0
    }

    /// Outcomes of tests in the given group, in execution order.
    pub fn tests_in_group(&self, group: &str) -> Vec<&ExecutedTest> {
        self.tests.iter().filter(|t| t.group == group).collect()
    }

    /// Outcomes of per-column tests over the given column.
    pub fn tests_for_feature(&self, column: &str) -> Vec<&ExecutedTest> {
        self.tests
            .iter()
            .filter(|t| t.groups.get(BY_FEATURE).map(String::as_str) == Some(column))
            .collect()
    }

    /// Serializes the report to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn executed(status: TestStatus) -> ExecutedTest {
        let outcome = match status {
            TestStatus::Success => TestOutcome::success("ok"),
            TestStatus::Fail => TestOutcome::fail("bad"),
            TestStatus::Error => TestOutcome::error("missing"),
            TestStatus::Skipped => TestOutcome::skipped("absent"),
        };
        ExecutedTest {
            name: "t".to_string(),
            group: "data_quality",
            groups: BTreeMap::new(),
            outcome,
        }
    }

    #[test]
    fn test_summary_counts() {
        let tests = vec![
            executed(TestStatus::Success),
            executed(TestStatus::Success),
            executed(TestStatus::Fail),
            executed(TestStatus::Skipped),
        ];
        let summary = SuiteSummary::from_outcomes(&tests);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.success, 2);
        assert_eq!(summary.fail, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.error, 0);
    }

    #[test]
    fn test_is_passed_ignores_skipped() {
        let passing = SuiteReport {
            name: "s".to_string(),
            started_at: Utc::now(),
            execution_time_ms: 0,
            summary: SuiteSummary {
                total: 2,
                success: 1,
                skipped: 1,
                ..SuiteSummary::default()
            },
            tests: Vec::new(),
        };
        assert!(passing.is_passed());

        let erroring = SuiteReport {
            summary: SuiteSummary {
                total: 1,
                error: 1,
                ..SuiteSummary::default()
            },
            ..passing
        };
        assert!(!erroring.is_passed());
    }
}
