//! Core engine: conditions, metrics, tests, suites, and group metadata.

pub mod condition;
pub mod groups;
pub mod metric;
pub mod suite;
pub mod test;

pub use condition::{Approx, Condition, Expected, TestValue, Tolerance};
pub use metric::{Metric, MetricResult, MetricSpec, MetricStore};
pub use suite::{ExecutedTest, SuiteReport, SuiteSummary, TestSuite, TestSuiteBuilder};
pub use test::{
    ConditionSource, ResolveCondition, Test, TestGenerator, TestOutcome, TestStatus, ValueSignal,
    ValueTest,
};
