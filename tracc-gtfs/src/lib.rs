pub mod timetable;

mod error;
pub use error::ScheduleError;
