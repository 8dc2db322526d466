use chrono::NaiveDate;

#[derive(thiserror::Error, Debug)]
pub enum ScheduleError {
    #[error("failed to parse GTFS bundle: {0}")]
    BundleReadError(#[from] gtfs_structures::Error),
    #[error("service date {date} is outside the feed calendar range {start}..{end}")]
    DateOutsideCalendarError {
        date: NaiveDate,
        start: NaiveDate,
        end: NaiveDate,
    },
    #[error("feed declares no calendar entries in calendar.txt or calendar_dates.txt")]
    EmptyCalendarError,
    #[error("no trips are active on service date {0}")]
    NoActiveServiceError(NaiveDate),
    #[error("{0}")]
    MalformedBundleError(String),
}
