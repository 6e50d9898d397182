//! Input data model: datasets, column roles, and the snapshot tests run on.
//!
//! Datasets are immutable wrappers over Arrow [`RecordBatch`]es. The engine
//! never mutates them; metrics read columns out as plain vectors and compute
//! from those.

use std::collections::BTreeSet;
use std::sync::Arc;

use arrow::array::{
    Array, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TabwatchError};

/// An immutable tabular dataset backed by Arrow record batches.
///
/// All batches must share the same schema. Column accessors materialize the
/// values the metric layer needs; unsupported array types surface as
/// [`TabwatchError::TypeMismatch`] rather than silently dropping data.
#[derive(Debug, Clone)]
pub struct Dataset {
    schema: SchemaRef,
    batches: Vec<RecordBatch>,
}

impl Dataset {
    /// Creates a dataset from a single record batch.
    pub fn from_batch(batch: RecordBatch) -> Self {
        Self {
            schema: batch.schema(),
            batches: vec![batch],
        }
    }

    /// Creates a dataset from a sequence of batches sharing one schema.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `batches` is empty or the schemas
    /// disagree.
    pub fn from_batches(batches: Vec<RecordBatch>) -> Result<Self> {
        let first = batches.first().ok_or_else(|| {
            TabwatchError::configuration("a dataset requires at least one record batch")
        })?;
        let schema = first.schema();
        for batch in &batches[1..] {
            if batch.schema() != schema {
                return Err(TabwatchError::configuration(
                    "all record batches in a dataset must share the same schema",
                ));
            }
        }
        Ok(Self { schema, batches })
    }

    /// Returns the dataset schema.
    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    /// Returns the total number of rows across all batches.
    pub fn row_count(&self) -> usize {
        self.batches.iter().map(RecordBatch::num_rows).sum()
    }

    /// Returns true when the dataset has a column with the given name.
    pub fn has_column(&self, name: &str) -> bool {
        self.schema.index_of(name).is_ok()
    }

    /// Returns the column names in schema order.
    pub fn column_names(&self) -> Vec<&str> {
        self.schema.fields().iter().map(|f| f.name().as_str()).collect()
    }

    /// Extracts the non-null values of a numeric column as `f64`.
    ///
    /// Booleans count as numeric (false = 0, true = 1), matching how the
    /// original system treats them in statistics.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<f64>> {
        Ok(self
            .numeric_column_opt(name)?
            .into_iter()
            .flatten()
            .collect())
    }

    /// Extracts a numeric column with per-row nullability preserved.
    ///
    /// Row alignment matters for pairwise statistics such as correlation.
    pub fn numeric_column_opt(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let index = self
            .schema
            .index_of(name)
            .map_err(|_| TabwatchError::column_not_found(name))?;
        let mut values = Vec::with_capacity(self.row_count());

        for batch in &self.batches {
            let array = batch.column(index);
            for row in 0..array.len() {
                if array.is_null(row) {
                    values.push(None);
                    continue;
                }
                let value = if let Some(a) = array.as_any().downcast_ref::<Float64Array>() {
                    a.value(row)
                } else if let Some(a) = array.as_any().downcast_ref::<Float32Array>() {
                    f64::from(a.value(row))
                } else if let Some(a) = array.as_any().downcast_ref::<Int64Array>() {
                    a.value(row) as f64
                } else if let Some(a) = array.as_any().downcast_ref::<Int32Array>() {
                    f64::from(a.value(row))
                } else if let Some(a) = array.as_any().downcast_ref::<BooleanArray>() {
                    if a.value(row) {
                        1.0
                    } else {
                        0.0
                    }
                } else {
                    return Err(TabwatchError::TypeMismatch {
                        column: name.to_string(),
                        expected: "numeric".to_string(),
                        found: array.data_type().to_string(),
                    });
                };
                values.push(Some(value));
            }
        }
        Ok(values)
    }

    /// Extracts a column as per-row optional strings.
    ///
    /// Numeric and boolean values are stringified, so categorical
    /// statistics (uniques, most common value, membership) work uniformly
    /// over every supported column type.
    pub fn string_column(&self, name: &str) -> Result<Vec<Option<String>>> {
        let index = self
            .schema
            .index_of(name)
            .map_err(|_| TabwatchError::column_not_found(name))?;
        let mut values = Vec::with_capacity(self.row_count());

        for batch in &self.batches {
            let array = batch.column(index);
            for row in 0..array.len() {
                if array.is_null(row) {
                    values.push(None);
                    continue;
                }
                let value = if let Some(a) = array.as_any().downcast_ref::<StringArray>() {
                    a.value(row).to_string()
                } else if let Some(a) = array.as_any().downcast_ref::<Float64Array>() {
                    a.value(row).to_string()
                } else if let Some(a) = array.as_any().downcast_ref::<Float32Array>() {
                    a.value(row).to_string()
                } else if let Some(a) = array.as_any().downcast_ref::<Int64Array>() {
                    a.value(row).to_string()
                } else if let Some(a) = array.as_any().downcast_ref::<Int32Array>() {
                    a.value(row).to_string()
                } else if let Some(a) = array.as_any().downcast_ref::<BooleanArray>() {
                    a.value(row).to_string()
                } else {
                    return Err(TabwatchError::TypeMismatch {
                        column: name.to_string(),
                        expected: "string, numeric, or boolean".to_string(),
                        found: array.data_type().to_string(),
                    });
                };
                values.push(Some(value));
            }
        }
        Ok(values)
    }
}

/// Maps dataset columns to their roles in model-quality monitoring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnMapping {
    /// Name of the ground-truth column, if present.
    pub target: Option<String>,
    /// Name of the model-output column, if present.
    pub prediction: Option<String>,
    /// Names of numeric feature columns.
    pub numerical_features: Vec<String>,
    /// Names of categorical feature columns.
    pub categorical_features: Vec<String>,
}

impl ColumnMapping {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the target column.
    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Sets the prediction column.
    #[must_use]
    pub fn with_prediction(mut self, prediction: impl Into<String>) -> Self {
        self.prediction = Some(prediction.into());
        self
    }

    /// Sets the numeric feature columns.
    #[must_use]
    pub fn with_numerical_features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.numerical_features = features.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the categorical feature columns.
    #[must_use]
    pub fn with_categorical_features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categorical_features = features.into_iter().map(Into::into).collect();
        self
    }

    /// Returns every feature column: numeric first, then categorical.
    pub fn feature_columns(&self) -> Vec<&str> {
        self.numerical_features
            .iter()
            .chain(self.categorical_features.iter())
            .map(String::as_str)
            .collect()
    }

    /// Returns all mapped columns in a stable order: numeric features,
    /// categorical features, target, prediction. Duplicates keep their
    /// first occurrence.
    pub fn all_columns(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        let mut columns = Vec::new();
        let roles = self
            .numerical_features
            .iter()
            .chain(self.categorical_features.iter())
            .chain(self.target.iter())
            .chain(self.prediction.iter());
        for name in roles {
            if seen.insert(name.as_str()) {
                columns.push(name.as_str());
            }
        }
        columns
    }
}

/// The immutable snapshot a test suite runs against: the dataset under
/// evaluation, an optional reference baseline, and the column roles.
#[derive(Debug, Clone)]
pub struct InputData {
    current: Arc<Dataset>,
    reference: Option<Arc<Dataset>>,
    column_mapping: ColumnMapping,
}

impl InputData {
    /// Creates input data without a reference dataset.
    pub fn new(current: Dataset, column_mapping: ColumnMapping) -> Self {
        Self {
            current: Arc::new(current),
            reference: None,
            column_mapping,
        }
    }

    /// Attaches a reference dataset used for comparison metrics and for
    /// deriving default test thresholds.
    #[must_use]
    pub fn with_reference(mut self, reference: Dataset) -> Self {
        self.reference = Some(Arc::new(reference));
        self
    }

    /// The dataset under evaluation.
    pub fn current(&self) -> &Dataset {
        &self.current
    }

    /// The optional baseline dataset.
    pub fn reference(&self) -> Option<&Dataset> {
        self.reference.as_deref()
    }

    /// The column-role mapping.
    pub fn column_mapping(&self) -> &ColumnMapping {
        &self.column_mapping
    }
}
