//! Prelude for commonly used types and traits in tabwatch.

pub use crate::checks::registry;
pub use crate::core::{
    Approx, Condition, Expected, MetricSpec, MetricStore, SuiteReport, Test, TestGenerator,
    TestOutcome, TestStatus, TestSuite, TestValue, Tolerance, ValueTest,
};
pub use crate::data::{ColumnMapping, Dataset, InputData};
pub use crate::error::{Result, TabwatchError};
pub use crate::logging::LoggingConfig;
