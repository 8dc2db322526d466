use crate::model::network::TravelMode;
use geo::Point;
use tracc_gtfs::timetable::TimeOfDay;

/// one per-origin reachability question: everything held fixed across a
/// run except the origin point.
#[derive(Clone, Debug)]
pub struct ReachabilityQuery {
    /// origin in WGS-84 coordinates.
    pub origin: Point<f64>,
    /// departure as seconds after midnight on the service date.
    pub departure: TimeOfDay,
    pub budget_seconds: u32,
    pub modes: Vec<TravelMode>,
}

impl ReachabilityQuery {
    /// the latest arrival time still inside the travel budget.
    pub fn limit(&self) -> TimeOfDay {
        self.departure + self.budget_seconds
    }

    pub fn transit_enabled(&self) -> bool {
        self.modes.contains(&TravelMode::Transit)
    }
}

/// ways a single per-origin query can fail. these are recorded against the
/// origin's output row, not propagated as run failures.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum QueryFailure {
    #[error("origin ({x:.5}, {y:.5}) could not be attached to the walk network")]
    OriginUnreachableError { x: f64, y: f64 },
    #[error("query exceeded its {limit_seconds}s time limit")]
    TimeoutError { limit_seconds: u64 },
}

impl QueryFailure {
    pub fn unreachable(origin: &Point<f64>) -> QueryFailure {
        QueryFailure::OriginUnreachableError {
            x: origin.x(),
            y: origin.y(),
        }
    }
}
