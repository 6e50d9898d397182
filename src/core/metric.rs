//! Metric configurations, memoized computation, and dependency sharing.
//!
//! A [`Metric`] pairs a [`MetricSpec`] with a write-once result cell. Two
//! metrics with equal specs are interchangeable dependencies; the
//! [`MetricStore`] dedupes them so each distinct configuration is computed
//! exactly once per suite run, no matter how many tests depend on it.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::InputData;
use crate::error::{Result, TabwatchError};
use crate::metrics::correlation::{self, CorrelationMethod, CorrelationResult};
use crate::metrics::list::{self, ValueListResult};
use crate::metrics::quality::{self, DataQualityResult};
use crate::metrics::quantile::{self, QuantileResult};
use crate::metrics::range::{self, ValueRangeResult};
use crate::metrics::stability::{self, StabilityResult};

/// A metric configuration. Value equality over the variant and its
/// parameters defines dependency identity: two specs that compare equal
/// share one computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "metric", rename_all = "snake_case")]
pub enum MetricSpec {
    /// Per-column descriptive statistics for every mapped column.
    DataQuality,
    /// Conflicting target/prediction labels for repeated feature vectors.
    DataStability,
    /// Pairwise correlations over numeric columns.
    Correlation {
        /// Correlation method to use.
        method: CorrelationMethod,
    },
    /// Count of values outside a numeric range.
    ValueRange {
        /// Column under inspection.
        column: String,
        /// Lower bound; derived from reference data when absent.
        left: Option<f64>,
        /// Upper bound; derived from reference data when absent.
        right: Option<f64>,
    },
    /// Count of values outside an allowed list.
    ValueList {
        /// Column under inspection.
        column: String,
        /// Allowed values; derived from reference data when absent.
        values: Option<Vec<String>>,
    },
    /// A single quantile of a numeric column.
    ValueQuantile {
        /// Column under inspection.
        column: String,
        /// Quantile in (0, 1).
        quantile: f64,
    },
}

impl MetricSpec {
    /// Short identifier used in logs and error messages.
    pub fn id(&self) -> &'static str {
        match self {
            MetricSpec::DataQuality => "data_quality",
            MetricSpec::DataStability => "data_stability",
            MetricSpec::Correlation { .. } => "correlation",
            MetricSpec::ValueRange { .. } => "value_range",
            MetricSpec::ValueList { .. } => "value_list",
            MetricSpec::ValueQuantile { .. } => "value_quantile",
        }
    }
}

impl fmt::Display for MetricSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricSpec::Correlation { method } => write!(f, "correlation({method})"),
            MetricSpec::ValueRange { column, .. } => write!(f, "value_range({column})"),
            MetricSpec::ValueList { column, .. } => write!(f, "value_list({column})"),
            MetricSpec::ValueQuantile { column, quantile } => {
                write!(f, "value_quantile({column}, {quantile})")
            }
            other => write!(f, "{}", other.id()),
        }
    }
}

/// The computed result of a metric, one variant per [`MetricSpec`] variant.
#[derive(Debug, Clone)]
pub enum MetricResult {
    /// Result of [`MetricSpec::DataQuality`].
    DataQuality(DataQualityResult),
    /// Result of [`MetricSpec::DataStability`].
    DataStability(StabilityResult),
    /// Result of [`MetricSpec::Correlation`].
    Correlation(CorrelationResult),
    /// Result of [`MetricSpec::ValueRange`].
    ValueRange(ValueRangeResult),
    /// Result of [`MetricSpec::ValueList`].
    ValueList(ValueListResult),
    /// Result of [`MetricSpec::ValueQuantile`].
    ValueQuantile(QuantileResult),
}

macro_rules! result_accessor {
    ($fn_name:ident, $variant:ident, $ty:ty) => {
        /// Typed view of this result; internal error when the variant
        /// does not match the caller's metric.
        pub fn $fn_name(&self) -> Result<&$ty> {
            match self {
                MetricResult::$variant(inner) => Ok(inner),
                other => Err(TabwatchError::internal(format!(
                    concat!("expected ", stringify!($variant), " result, found {}"),
                    other.id()
                ))),
            }
        }
    };
}

impl MetricResult {
    /// Short identifier of the result variant.
    pub fn id(&self) -> &'static str {
        match self {
            MetricResult::DataQuality(_) => "data_quality",
            MetricResult::DataStability(_) => "data_stability",
            MetricResult::Correlation(_) => "correlation",
            MetricResult::ValueRange(_) => "value_range",
            MetricResult::ValueList(_) => "value_list",
            MetricResult::ValueQuantile(_) => "value_quantile",
        }
    }

    result_accessor!(data_quality, DataQuality, DataQualityResult);
    result_accessor!(data_stability, DataStability, StabilityResult);
    result_accessor!(correlation, Correlation, CorrelationResult);
    result_accessor!(value_range, ValueRange, ValueRangeResult);
    result_accessor!(value_list, ValueList, ValueListResult);
    result_accessor!(value_quantile, ValueQuantile, QuantileResult);
}

/// A memoized metric: a spec plus a write-once cached result.
///
/// Requesting the result before [`Metric::calculate`] ran fails with
/// [`TabwatchError::MetricNotComputed`]. The `OnceCell` guard keeps the
/// cache population single-shot even under concurrent first access.
#[derive(Debug)]
pub struct Metric {
    spec: MetricSpec,
    result: OnceCell<Arc<MetricResult>>,
}

impl Metric {
    /// Creates an uncomputed metric for the given spec.
    pub fn new(spec: MetricSpec) -> Self {
        Self {
            spec,
            result: OnceCell::new(),
        }
    }

    /// The configuration of this metric.
    pub fn spec(&self) -> &MetricSpec {
        &self.spec
    }

    /// Returns true once the result cache is populated.
    pub fn is_computed(&self) -> bool {
        self.result.get().is_some()
    }

    /// Computes the metric from the input data, populating the cache.
    /// A second call is a no-op cache hit.
    pub fn calculate(&self, data: &InputData) -> Result<()> {
        if self.result.get().is_some() {
            debug!(metric = %self.spec, "Metric cache hit, skipping recomputation");
            return Ok(());
        }
        let computed = compute(&self.spec, data)?;
        // A concurrent winner having filled the cell first is fine; the
        // computation is deterministic for identical inputs.
        let _ = self.result.set(Arc::new(computed));
        Ok(())
    }

    /// Returns the cached result.
    ///
    /// # Errors
    ///
    /// Fails with [`TabwatchError::MetricNotComputed`] when `calculate` has
    /// not run yet.
    pub fn result(&self) -> Result<Arc<MetricResult>> {
        self.result
            .get()
            .cloned()
            .ok_or_else(|| TabwatchError::MetricNotComputed {
                metric: self.spec.to_string(),
            })
    }
}

fn compute(spec: &MetricSpec, data: &InputData) -> Result<MetricResult> {
    match spec {
        MetricSpec::DataQuality => quality::compute(data).map(MetricResult::DataQuality),
        MetricSpec::DataStability => stability::compute(data).map(MetricResult::DataStability),
        MetricSpec::Correlation { method } => {
            correlation::compute(data, *method).map(MetricResult::Correlation)
        }
        MetricSpec::ValueRange {
            column,
            left,
            right,
        } => range::compute(data, column, *left, *right).map(MetricResult::ValueRange),
        MetricSpec::ValueList { column, values } => {
            list::compute(data, column, values.as_deref()).map(MetricResult::ValueList)
        }
        MetricSpec::ValueQuantile { column, quantile } => {
            quantile::compute(data, column, *quantile).map(MetricResult::ValueQuantile)
        }
    }
}

/// Registry of the metrics a suite depends on, deduplicated by spec
/// equality. The suite builder registers every dependency up front and
/// hands each test a reference to its already-registered metric.
#[derive(Debug, Default)]
pub struct MetricStore {
    metrics: Vec<Arc<Metric>>,
}

impl MetricStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the metric for the given spec, registering it on first use.
    /// Specs that compare equal share one `Metric` instance.
    pub fn register(&mut self, spec: MetricSpec) -> Arc<Metric> {
        if let Some(existing) = self.metrics.iter().find(|m| *m.spec() == spec) {
            return Arc::clone(existing);
        }
        let metric = Arc::new(Metric::new(spec));
        self.metrics.push(Arc::clone(&metric));
        metric
    }

    /// Calculates every registered metric, each exactly once, in
    /// registration order.
    pub fn calculate_all(&self, data: &InputData) -> Result<()> {
        for metric in &self.metrics {
            debug!(metric = %metric.spec(), "Calculating metric");
            metric.calculate(data)?;
        }
        Ok(())
    }

    /// Number of distinct registered metrics.
    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    /// Returns true when no metric is registered.
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Registered metrics in registration order.
    pub fn metrics(&self) -> &[Arc<Metric>] {
        &self.metrics
    }
}
