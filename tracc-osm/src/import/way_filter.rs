use serde::{Deserialize, Serialize};

/// highway classes a pedestrian cannot legally use. everything else tagged
/// `highway=*` is assumed walkable unless `foot=no` says otherwise, which
/// matches the permissive default of OSM pedestrian routing profiles.
const NON_WALKABLE: [&str; 6] = [
    "motorway",
    "motorway_link",
    "trunk",
    "trunk_link",
    "raceway",
    "proposed",
];

/// selects the walkable subset of OSM ways for the pedestrian network.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct WayFilter {
    /// additional highway classes to exclude beyond the built-in
    /// non-walkable set, e.g. `["service"]` to drop driveways.
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl WayFilter {
    /// accepts or rejects a way based on its highway and foot tags.
    pub fn walkable(&self, highway: Option<&str>, foot: Option<&str>) -> bool {
        let class = match highway {
            Some(c) => c,
            None => return false,
        };
        if foot == Some("no") {
            return false;
        }
        if NON_WALKABLE.contains(&class) {
            return false;
        }
        !self.exclude.iter().any(|e| e == class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_residential_and_footway_accepted() {
        let filter = WayFilter::default();
        assert!(filter.walkable(Some("residential"), None));
        assert!(filter.walkable(Some("footway"), None));
        assert!(filter.walkable(Some("path"), Some("yes")));
    }

    #[test]
    fn test_motorway_rejected() {
        let filter = WayFilter::default();
        assert!(!filter.walkable(Some("motorway"), None));
        assert!(!filter.walkable(Some("motorway_link"), None));
    }

    #[test]
    fn test_foot_no_rejected() {
        let filter = WayFilter::default();
        assert!(!filter.walkable(Some("residential"), Some("no")));
    }

    #[test]
    fn test_untagged_way_rejected() {
        let filter = WayFilter::default();
        assert!(!filter.walkable(None, None));
    }

    #[test]
    fn test_configured_exclusions() {
        let filter = WayFilter {
            exclude: vec![String::from("service")],
        };
        assert!(!filter.walkable(Some("service"), None));
        assert!(filter.walkable(Some("residential"), None));
    }
}
