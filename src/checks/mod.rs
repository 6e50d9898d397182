//! Concrete tests over computed metrics.
//!
//! Each submodule covers one metric family. Constructors take the
//! suite's [`MetricStore`](crate::core::MetricStore) so tests sharing a
//! configuration share one computation.

pub mod correlation;
pub mod generators;
pub mod list;
pub mod quality;
pub mod quantile;
pub mod range;
pub mod registry;
pub mod stability;

pub use correlation::{
    TestCorrelationChanges, TestHighlyCorrelatedFeatures, TestPredictionFeaturesCorrelations,
    TestTargetFeaturesCorrelations, TestTargetPredictionCorrelation,
};
pub use generators::{
    TestAllColumnsMostCommonValueShare, TestCatColumnsOutOfListValues,
    TestNumColumnsMeanInNSigmas, TestNumColumnsOutOfRangeValues,
};
pub use list::{TestNumberOfOutOfListValues, TestShareOfOutOfListValues, TestValueList};
pub use quality::{
    TestColumnValueMax, TestColumnValueMean, TestColumnValueMedian, TestColumnValueMin,
    TestColumnValueStd, TestMeanInNSigmas, TestMostCommonValueShare, TestNumberOfUniqueValues,
    TestUniqueValuesShare,
};
pub use quantile::TestValueQuantile;
pub use range::{TestNumberOfOutOfRangeValues, TestShareOfOutOfRangeValues, TestValueRange};
pub use stability::{TestConflictPrediction, TestConflictTarget};

use crate::core::ValueSignal;
use crate::metrics::quality::{ColumnStats, ColumnStatsSet};

/// Looks up a column in a stats set, mapping absence to the skip signal
/// shared by every per-column test.
pub(crate) fn stats_or_skip<'a>(
    stats: &'a ColumnStatsSet,
    column: &str,
) -> std::result::Result<&'a ColumnStats, ValueSignal> {
    stats.get(column).ok_or_else(|| {
        ValueSignal::NotApplicable(format!("column '{column}' is absent from current data"))
    })
}
