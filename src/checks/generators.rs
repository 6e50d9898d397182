//! Generators that expand into per-column tests at suite run time.

use tracing::debug;

use crate::checks::{registry, TestMeanInNSigmas};
use crate::core::metric::MetricStore;
use crate::core::test::{Test, TestGenerator};
use crate::data::InputData;
use crate::error::Result;

/// Expands into a most-common-value-share test for every mapped column,
/// in mapping order.
#[derive(Debug, Default)]
pub struct TestAllColumnsMostCommonValueShare;

impl TestGenerator for TestAllColumnsMostCommonValueShare {
    fn name(&self) -> String {
        "most common value share for all columns".to_string()
    }

    fn generate(&self, store: &mut MetricStore, data: &InputData) -> Result<Vec<Box<dyn Test>>> {
        let columns = data.column_mapping().all_columns();
        debug!(generator = %TestGenerator::name(self), columns = columns.len(), "Generating tests");
        columns
            .into_iter()
            .map(|column| registry::build("most_common_value_share", store, column))
            .collect()
    }
}

/// Expands into a mean-in-n-sigmas test for every numeric feature.
#[derive(Debug)]
pub struct TestNumColumnsMeanInNSigmas {
    n_sigmas: f64,
}

impl TestNumColumnsMeanInNSigmas {
    /// Creates the generator with the given sigma multiplier.
    pub fn new(n_sigmas: f64) -> Self {
        Self { n_sigmas }
    }
}

impl Default for TestNumColumnsMeanInNSigmas {
    fn default() -> Self {
        Self::new(registry::DEFAULT_N_SIGMAS)
    }
}

impl TestGenerator for TestNumColumnsMeanInNSigmas {
    fn name(&self) -> String {
        format!("mean within {} sigmas for numeric features", self.n_sigmas)
    }

    fn generate(&self, store: &mut MetricStore, data: &InputData) -> Result<Vec<Box<dyn Test>>> {
        Ok(data
            .column_mapping()
            .numerical_features
            .iter()
            .map(|column| {
                Box::new(TestMeanInNSigmas::new(store, column.as_str(), self.n_sigmas))
                    as Box<dyn Test>
            })
            .collect())
    }
}

/// Expands into an out-of-range count test for every numeric feature,
/// with bounds derived from the reference data.
#[derive(Debug, Default)]
pub struct TestNumColumnsOutOfRangeValues;

impl TestGenerator for TestNumColumnsOutOfRangeValues {
    fn name(&self) -> String {
        "out-of-range values for numeric features".to_string()
    }

    fn generate(&self, store: &mut MetricStore, data: &InputData) -> Result<Vec<Box<dyn Test>>> {
        data.column_mapping()
            .numerical_features
            .iter()
            .map(|column| registry::build("number_of_out_of_range_values", store, column))
            .collect()
    }
}

/// Expands into an out-of-list count test for every categorical feature,
/// with the allowed list derived from the reference data.
#[derive(Debug, Default)]
pub struct TestCatColumnsOutOfListValues;

impl TestGenerator for TestCatColumnsOutOfListValues {
    fn name(&self) -> String {
        "out-of-list values for categorical features".to_string()
    }

    fn generate(&self, store: &mut MetricStore, data: &InputData) -> Result<Vec<Box<dyn Test>>> {
        data.column_mapping()
            .categorical_features
            .iter()
            .map(|column| registry::build("number_of_out_of_list_values", store, column))
            .collect()
    }
}
