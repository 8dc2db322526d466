pub mod calendar_ops;

mod timetable;

pub use timetable::{Departure, Timetable, TransitStop, TripSchedule, TripStopTime};

/// seconds since midnight on the service date. GTFS stop times can exceed
/// 24h for trips that run past midnight, so this is not bounded at 86400.
pub type TimeOfDay = u32;
