//! Read-only registry of grouping dimensions and the groups defined
//! along them, used by report renderers to bucket test outcomes.

use once_cell::sync::Lazy;
use serde::Serialize;

/// Grouping dimension: tests sharing the same `test_group` value land in
/// the same bucket.
pub const BY_TEST_GROUP: &str = "test_group";

/// Grouping dimension: per-column tests bucketed by the column they
/// inspect.
pub const BY_FEATURE: &str = "by_feature";

/// Group identifier for descriptive-statistics tests.
pub const GROUP_DATA_QUALITY: &str = "data_quality";

/// Group identifier for label-conflict and correlation-drift tests.
pub const GROUP_DATA_STABILITY: &str = "data_stability";

/// A named group within a grouping dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupData {
    /// Stable group identifier.
    pub id: &'static str,
    /// Human-readable title.
    pub title: &'static str,
    /// Short description for report headers.
    pub description: &'static str,
}

/// A grouping dimension and the groups registered under it.
#[derive(Debug, Clone, Serialize)]
pub struct GroupingDimension {
    /// Stable dimension identifier.
    pub id: &'static str,
    /// Human-readable title.
    pub title: &'static str,
    /// Registered groups, empty for open-ended dimensions such as
    /// per-feature bucketing where groups come from the data.
    pub groups: Vec<GroupData>,
}

static DIMENSIONS: Lazy<Vec<GroupingDimension>> = Lazy::new(|| {
    vec![
        GroupingDimension {
            id: BY_TEST_GROUP,
            title: "By test group",
            groups: vec![
                GroupData {
                    id: GROUP_DATA_QUALITY,
                    title: "Data quality",
                    description: "Descriptive statistics and value domain checks",
                },
                GroupData {
                    id: GROUP_DATA_STABILITY,
                    title: "Data stability",
                    description: "Label conflicts and correlation drift between datasets",
                },
            ],
        },
        GroupingDimension {
            id: BY_FEATURE,
            title: "By feature",
            groups: Vec::new(),
        },
    ]
});

/// All registered grouping dimensions.
pub fn dimensions() -> &'static [GroupingDimension] {
    &DIMENSIONS
}

/// Looks up a dimension by identifier.
pub fn dimension(id: &str) -> Option<&'static GroupingDimension> {
    DIMENSIONS.iter().find(|d| d.id == id)
}

/// Looks up a group within a dimension.
pub fn group(dimension_id: &str, group_id: &str) -> Option<&'static GroupData> {
    dimension(dimension_id)?.groups.iter().find(|g| g.id == group_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registered_dimensions() {
        assert_eq!(dimensions().len(), 2);
        assert!(dimension(BY_TEST_GROUP).is_some());
        assert!(dimension(BY_FEATURE).is_some());
        assert!(dimension("unknown").is_none());
    }

    #[test]
    fn test_group_lookup() {
        let quality = group(BY_TEST_GROUP, GROUP_DATA_QUALITY).unwrap();
        assert_eq!(quality.title, "Data quality");
        assert!(group(BY_TEST_GROUP, "unknown").is_none());
        assert!(group(BY_FEATURE, GROUP_DATA_QUALITY).is_none());
    }
}
