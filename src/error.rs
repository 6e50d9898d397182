//! Error types for the tabwatch library.
//!
//! This module provides the error handling strategy using `thiserror` for
//! automatic error trait implementations. All errors raised by the library
//! are represented by the [`TabwatchError`] enum.
//!
//! Two failure classes deliberately do *not* appear here: a test whose
//! value is undefined for the given dataset produces a terminal
//! [`TestStatus::Error`](crate::core::TestStatus::Error) result, and a
//! generated per-column test whose column is absent produces
//! [`TestStatus::Skipped`](crate::core::TestStatus::Skipped). Only
//! configuration mistakes (a threshold that is neither supplied nor
//! derivable, conflicting constructor arguments, invalid parameters) and
//! genuine data-access failures propagate as `TabwatchError`.

use thiserror::Error;

/// The main error type for the tabwatch library.
#[derive(Error, Debug)]
pub enum TabwatchError {
    /// A test or metric was configured incorrectly. Raised at construction
    /// or condition-resolution time; the suite definition must be fixed.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A required column is not present in the dataset.
    #[error("Column '{column}' not found in dataset")]
    ColumnNotFound {
        /// Name of the missing column
        column: String,
    },

    /// A metric result was requested before the metric was calculated.
    #[error("Metric '{metric}' has not been computed yet")]
    MetricNotComputed {
        /// Display name of the metric
        metric: String,
    },

    /// A column has a data type the operation cannot work with.
    #[error("Type mismatch for column '{column}': expected {expected}, found {found}")]
    TypeMismatch {
        /// Name of the offending column
        column: String,
        /// Expected type description
        expected: String,
        /// Actual type description
        found: String,
    },

    /// Error from Arrow operations.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Error from serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal error for unexpected conditions.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TabwatchError {
    /// Creates a configuration error with the given message.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Creates a column-not-found error for the given column.
    pub fn column_not_found(column: impl Into<String>) -> Self {
        Self::ColumnNotFound {
            column: column.into(),
        }
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

/// A type alias for `Result<T, TabwatchError>`.
///
/// This is the standard `Result` type used throughout the library.
pub type Result<T> = std::result::Result<T, TabwatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TabwatchError::configuration("neither threshold nor reference data provided");
        assert_eq!(
            err.to_string(),
            "Configuration error: neither threshold nor reference data provided"
        );

        let err = TabwatchError::column_not_found("age");
        assert_eq!(err.to_string(), "Column 'age' not found in dataset");

        let err = TabwatchError::MetricNotComputed {
            metric: "data_quality".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Metric 'data_quality' has not been computed yet"
        );
    }
}
