use tracc_gtfs::ScheduleError;
use tracc_osm::OsmError;

#[derive(thiserror::Error, Debug)]
pub enum NetworkError {
    #[error("failure building walk network: {0}")]
    WalkNetworkError(#[from] OsmError),
    #[error("failure building transit timetable: {0}")]
    ScheduleError(#[from] ScheduleError),
    #[error("no transit stop could be linked to the walk network within {radius_meters}m")]
    NoLinkedStopsError { radius_meters: f64 },
    #[error("{0}")]
    InternalError(String),
}
