use chrono::{Datelike, NaiveDate, Weekday};
use gtfs_structures::{Calendar, CalendarDate, Exception};

/// uses calendar.txt and calendar_dates.txt to decide whether a service
/// runs on the given date. a calendar_dates.txt exception overrides the
/// weekly pattern in both directions.
pub fn service_active(
    calendar: Option<&Calendar>,
    exceptions: Option<&Vec<CalendarDate>>,
    date: NaiveDate,
) -> bool {
    let exception = exceptions.and_then(|cds| {
        cds.iter()
            .find(|cd| cd.date == date)
            .map(|cd| cd.exception_type.clone())
    });
    match exception {
        Some(Exception::Added) => return true,
        Some(Exception::Deleted) => return false,
        None => {}
    }
    match calendar {
        Some(c) => c.start_date <= date && date <= c.end_date && runs_on_weekday(c, date),
        None => false,
    }
}

/// the overall date range covered by a feed, spanning weekly calendars and
/// added exceptions. None when the feed declares no service at all.
pub fn feed_date_range<'a>(
    calendars: impl Iterator<Item = &'a Calendar>,
    exceptions: impl Iterator<Item = &'a CalendarDate>,
) -> Option<(NaiveDate, NaiveDate)> {
    let mut range: Option<(NaiveDate, NaiveDate)> = None;
    let mut extend = |start: NaiveDate, end: NaiveDate| {
        range = Some(match range {
            None => (start, end),
            Some((lo, hi)) => (lo.min(start), hi.max(end)),
        });
    };
    for calendar in calendars {
        extend(calendar.start_date, calendar.end_date);
    }
    for exception in exceptions {
        if exception.exception_type == Exception::Added {
            extend(exception.date, exception.date);
        }
    }
    range
}

fn runs_on_weekday(calendar: &Calendar, date: NaiveDate) -> bool {
    match date.weekday() {
        Weekday::Mon => calendar.monday,
        Weekday::Tue => calendar.tuesday,
        Weekday::Wed => calendar.wednesday,
        Weekday::Thu => calendar.thursday,
        Weekday::Fri => calendar.friday,
        Weekday::Sat => calendar.saturday,
        Weekday::Sun => calendar.sunday,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weekday_calendar(start: NaiveDate, end: NaiveDate) -> Calendar {
        Calendar {
            id: String::from("WD"),
            monday: true,
            tuesday: true,
            wednesday: true,
            thursday: true,
            friday: true,
            saturday: false,
            sunday: false,
            start_date: start,
            end_date: end,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_weekday_pattern() {
        let calendar = weekday_calendar(date(2015, 1, 1), date(2015, 12, 31));
        // 2015-11-20 is a Friday, 2015-11-22 a Sunday
        assert!(service_active(Some(&calendar), None, date(2015, 11, 20)));
        assert!(!service_active(Some(&calendar), None, date(2015, 11, 22)));
    }

    #[test]
    fn test_date_outside_range_inactive() {
        let calendar = weekday_calendar(date(2015, 1, 1), date(2015, 12, 31));
        assert!(!service_active(Some(&calendar), None, date(2016, 1, 4)));
    }

    #[test]
    fn test_deleted_exception_overrides_calendar() {
        let calendar = weekday_calendar(date(2015, 1, 1), date(2015, 12, 31));
        let exceptions = vec![CalendarDate {
            service_id: String::from("WD"),
            date: date(2015, 11, 20),
            exception_type: Exception::Deleted,
        }];
        assert!(!service_active(
            Some(&calendar),
            Some(&exceptions),
            date(2015, 11, 20)
        ));
    }

    #[test]
    fn test_added_exception_without_calendar() {
        let exceptions = vec![CalendarDate {
            service_id: String::from("HOLIDAY"),
            date: date(2015, 12, 25),
            exception_type: Exception::Added,
        }];
        assert!(service_active(None, Some(&exceptions), date(2015, 12, 25)));
        assert!(!service_active(None, Some(&exceptions), date(2015, 12, 26)));
    }

    #[test]
    fn test_feed_date_range_spans_exceptions() {
        let calendar = weekday_calendar(date(2015, 3, 1), date(2015, 10, 31));
        let exceptions = vec![CalendarDate {
            service_id: String::from("HOLIDAY"),
            date: date(2015, 12, 25),
            exception_type: Exception::Added,
        }];
        let (start, end) =
            feed_date_range([&calendar].into_iter(), exceptions.iter()).unwrap();
        assert_eq!(start, date(2015, 3, 1));
        assert_eq!(end, date(2015, 12, 25));
    }

    #[test]
    fn test_empty_feed_has_no_range() {
        let range = feed_date_range(std::iter::empty::<&Calendar>(), std::iter::empty());
        assert_eq!(range, None);
    }
}
