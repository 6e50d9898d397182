//! # Tabwatch - Test Suites for Tabular Model-Quality Data
//!
//! Tabwatch runs pass/fail test suites over tabular datasets backed by
//! Arrow record batches. Tests compare metric values (column statistics,
//! correlations, value domains, label stability) against conditions that
//! are set explicitly, derived from a reference dataset, or taken from
//! built-in defaults. The typical use is monitoring production model
//! inputs against a training or baseline snapshot.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use arrow::array::{Float64Array, StringArray};
//! use arrow::datatypes::{DataType, Field, Schema};
//! use arrow::record_batch::RecordBatch;
//! use tabwatch::checks::{TestColumnValueMean, TestConflictTarget};
//! use tabwatch::core::{Condition, TestSuite};
//! use tabwatch::data::{ColumnMapping, Dataset, InputData};
//!
//! # fn main() -> tabwatch::error::Result<()> {
//! let schema = Arc::new(Schema::new(vec![
//!     Field::new("age", DataType::Float64, false),
//!     Field::new("label", DataType::Utf8, false),
//! ]));
//! let batch = RecordBatch::try_new(
//!     schema,
//!     vec![
//!         Arc::new(Float64Array::from(vec![25.0, 32.0, 47.0])),
//!         Arc::new(StringArray::from(vec!["yes", "no", "yes"])),
//!     ],
//! )?;
//!
//! let mapping = ColumnMapping::new()
//!     .with_numerical_features(["age"])
//!     .with_target("label");
//! let data = InputData::new(Dataset::from_batch(batch), mapping);
//!
//! let suite = TestSuite::builder("input_monitoring")
//!     .test(|store| {
//!         TestColumnValueMean::new(store, "age")
//!             .with_condition(Condition::new().gt(18.0).lt(60.0))
//!     })
//!     .test(|store| TestConflictTarget::new(store))
//!     .build();
//!
//! let report = suite.run(&data)?;
//! assert!(report.is_passed());
//! # Ok(())
//! # }
//! ```
//!
//! ## Conditions and Thresholds
//!
//! Every value test resolves its condition in a fixed order: an explicit
//! condition set by the caller wins, otherwise one is derived from the
//! reference dataset (for example, a mean within 10 percent of the
//! reference mean), otherwise the test's built-in default applies. A
//! test with none of the three is a configuration error and aborts the
//! run.
//!
//! Conditions are conjunctive: every set field must hold, and a failing
//! test reports the full set of violated fields. Equality fields accept
//! approximate expectations with absolute or relative tolerances.
//!
//! ## Outcome Statuses
//!
//! Data problems never abort a run. A test finishes as `success` or
//! `fail` when its condition was evaluated, `error` when a required
//! input was missing at run time (for example, no reference data for a
//! reference-bound test), and `skipped` when the test does not apply
//! (for example, its column is absent from the current dataset).
//!
//! ## Architecture
//!
//! - **`core`**: conditions, metric memoization, the test traits, and
//!   the suite runner
//! - **`metrics`**: metric computations over Arrow record batches
//! - **`checks`**: concrete tests, the per-column test registry, and
//!   generators that expand over columns
//! - **`data`**: datasets, column role mapping, and paired
//!   current/reference input
//! - **`logging`**: `tracing` subscriber setup for suite runs

pub mod checks;
pub mod core;
pub mod data;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod prelude;
