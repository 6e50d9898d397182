//! Name-indexed registry of per-column test constructors, used by the
//! generators and by callers assembling suites from configuration.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;

use crate::checks::{
    TestColumnValueMax, TestColumnValueMean, TestColumnValueMedian, TestColumnValueMin,
    TestColumnValueStd, TestMeanInNSigmas, TestMostCommonValueShare, TestNumberOfOutOfListValues,
    TestNumberOfOutOfRangeValues, TestNumberOfUniqueValues, TestShareOfOutOfListValues,
    TestShareOfOutOfRangeValues, TestUniqueValuesShare, TestValueList, TestValueRange,
};
use crate::core::metric::MetricStore;
use crate::core::test::Test;
use crate::error::{Result, TabwatchError};

/// Constructs a per-column test with default parameters.
pub type TestBuilder = fn(&mut MetricStore, &str) -> Box<dyn Test>;

/// Default sigma multiplier used by the registry entry for the
/// mean-in-n-sigmas test.
pub const DEFAULT_N_SIGMAS: f64 = 2.0;

static REGISTRY: Lazy<BTreeMap<&'static str, TestBuilder>> = Lazy::new(|| {
    let mut map: BTreeMap<&'static str, TestBuilder> = BTreeMap::new();
    map.insert("column_value_min", |store, column| {
        Box::new(TestColumnValueMin::new(store, column))
    });
    map.insert("column_value_max", |store, column| {
        Box::new(TestColumnValueMax::new(store, column))
    });
    map.insert("column_value_mean", |store, column| {
        Box::new(TestColumnValueMean::new(store, column))
    });
    map.insert("column_value_median", |store, column| {
        Box::new(TestColumnValueMedian::new(store, column))
    });
    map.insert("column_value_std", |store, column| {
        Box::new(TestColumnValueStd::new(store, column))
    });
    map.insert("number_of_unique_values", |store, column| {
        Box::new(TestNumberOfUniqueValues::new(store, column))
    });
    map.insert("unique_values_share", |store, column| {
        Box::new(TestUniqueValuesShare::new(store, column))
    });
    map.insert("most_common_value_share", |store, column| {
        Box::new(TestMostCommonValueShare::new(store, column))
    });
    map.insert("mean_in_n_sigmas", |store, column| {
        Box::new(TestMeanInNSigmas::new(store, column, DEFAULT_N_SIGMAS))
    });
    map.insert("value_range", |store, column| {
        Box::new(TestValueRange::new(store, column, None, None))
    });
    map.insert("number_of_out_of_range_values", |store, column| {
        Box::new(TestNumberOfOutOfRangeValues::new(store, column, None, None))
    });
    map.insert("share_of_out_of_range_values", |store, column| {
        Box::new(TestShareOfOutOfRangeValues::new(store, column, None, None))
    });
    map.insert("value_list", |store, column| {
        Box::new(TestValueList::new(store, column, None))
    });
    map.insert("number_of_out_of_list_values", |store, column| {
        Box::new(TestNumberOfOutOfListValues::new(store, column, None))
    });
    map.insert("share_of_out_of_list_values", |store, column| {
        Box::new(TestShareOfOutOfListValues::new(store, column, None))
    });
    map
});

/// Names of all registered per-column tests.
pub fn names() -> impl Iterator<Item = &'static str> {
    REGISTRY.keys().copied()
}

/// Builds a registered test for a column.
///
/// # Errors
///
/// Fails with a configuration error for an unknown test name.
pub fn build(name: &str, store: &mut MetricStore, column: &str) -> Result<Box<dyn Test>> {
    let builder = REGISTRY.get(name).ok_or_else(|| {
        TabwatchError::configuration(format!("unknown per-column test '{name}'"))
    })?;
    Ok(builder(store, column))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_name_builds() {
        let mut store = MetricStore::new();
        let test = build("most_common_value_share", &mut store, "city").unwrap();
        assert_eq!(test.name(), "most common value share in column 'city'");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_unknown_name_fails() {
        let mut store = MetricStore::new();
        assert!(build("nonsense", &mut store, "city").is_err());
    }

    #[test]
    fn test_names_are_sorted() {
        let names: Vec<_> = names().collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }
}
