use geo::algorithm::concave_hull::ConcaveHull;
use geo::KNearestConcaveHull;
use geo::{polygon, MultiPoint, Polygon};
use serde::{Deserialize, Serialize};

/// algorithm used to wrap one cluster of reachable points into a closed
/// polygon. fewer than 3 points cannot enclose area and produce an empty
/// polygon rather than an error.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "snake_case")]
#[serde(tag = "type")]
pub enum HullAlgorithm {
    ConcaveHull { concavity: f64 },
    KNearestConcaveHull { k: u32 },
}

impl Default for HullAlgorithm {
    fn default() -> Self {
        HullAlgorithm::ConcaveHull { concavity: 2.0 }
    }
}

impl HullAlgorithm {
    pub fn run(&self, points: &MultiPoint<f64>) -> Polygon<f64> {
        if points.0.len() < 3 {
            return polygon!();
        }
        match self {
            HullAlgorithm::ConcaveHull { concavity } => points.concave_hull(*concavity),
            HullAlgorithm::KNearestConcaveHull { k } => points.k_nearest_concave_hull(*k),
        }
    }
}
