use super::{calendar_ops, TimeOfDay};
use crate::ScheduleError;
use chrono::NaiveDate;
use geo::Point;
use gtfs_structures::Gtfs;
use std::collections::HashMap;

/// a transit stop with a resolved WGS-84 location.
#[derive(Clone, Debug)]
pub struct TransitStop {
    pub stop_id: String,
    pub location: Point<f64>,
}

/// one stop visit of a trip, in stop_sequence order.
#[derive(Clone, Copy, Debug)]
pub struct TripStopTime {
    pub stop: usize,
    pub arrival: TimeOfDay,
    pub departure: TimeOfDay,
}

/// the ordered stop visits of one trip active on the service date.
#[derive(Clone, Debug)]
pub struct TripSchedule {
    pub trip_id: String,
    pub route_id: String,
    pub stops: Vec<TripStopTime>,
}

/// a boarding opportunity at a stop: departure time, trip index, and the
/// boarding position within that trip's stop sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Departure {
    pub time: TimeOfDay,
    pub trip: usize,
    pub position: usize,
}

/// the transit half of the multimodal network for one analysis year: the
/// stops, the trips running on one service date, and per-stop departure
/// boards sorted for binary-search boarding. immutable once built.
#[derive(Clone, Debug)]
pub struct Timetable {
    pub service_date: NaiveDate,
    pub stops: Vec<TransitStop>,
    pub trips: Vec<TripSchedule>,
    boards: Vec<Vec<Departure>>,
}

impl Timetable {
    /// loads a GTFS bundle (zip or directory) and builds the timetable for
    /// one service date. the feed's calendar coverage is validated up
    /// front, before any per-origin query can run, so a mispaired
    /// (feed, departure) configuration fails the whole run immediately.
    pub fn from_bundle(path: &str, service_date: NaiveDate) -> Result<Timetable, ScheduleError> {
        let gtfs = Gtfs::new(path)?;
        Timetable::from_gtfs(&gtfs, service_date)
    }

    pub fn from_gtfs(gtfs: &Gtfs, service_date: NaiveDate) -> Result<Timetable, ScheduleError> {
        let range = calendar_ops::feed_date_range(
            gtfs.calendar.values(),
            gtfs.calendar_dates.values().flatten(),
        );
        validate_service_date(service_date, range)?;

        // index every stop with a resolvable location. stops that lack
        // lon/lat even via their parent station are skipped with a warning
        // rather than failing the feed.
        let mut stops: Vec<TransitStop> = vec![];
        let mut stop_index: HashMap<String, usize> = HashMap::new();
        let mut unlocated: usize = 0;
        for (stop_id, stop) in &gtfs.stops {
            let location = match (stop.longitude, stop.latitude) {
                (Some(lon), Some(lat)) => Some(Point::new(lon, lat)),
                _ => stop
                    .parent_station
                    .as_ref()
                    .and_then(|parent_id| gtfs.stops.get(parent_id))
                    .and_then(|parent| match (parent.longitude, parent.latitude) {
                        (Some(lon), Some(lat)) => Some(Point::new(lon, lat)),
                        _ => None,
                    }),
            };
            match location {
                Some(location) => {
                    stop_index.insert(stop_id.clone(), stops.len());
                    stops.push(TransitStop {
                        stop_id: stop_id.clone(),
                        location,
                    });
                }
                None => unlocated += 1,
            }
        }
        if unlocated > 0 {
            log::warn!("skipped {unlocated} stops without resolvable locations");
        }

        // retain trips whose service runs on the requested date
        let mut trips: Vec<TripSchedule> = vec![];
        for trip in gtfs.trips.values() {
            let active = calendar_ops::service_active(
                gtfs.calendar.get(&trip.service_id),
                gtfs.calendar_dates.get(&trip.service_id),
                service_date,
            );
            if !active {
                continue;
            }
            let mut sequenced: Vec<(u32, TripStopTime)> = trip
                .stop_times
                .iter()
                .filter_map(|st| {
                    let stop = *stop_index.get(&st.stop.id)?;
                    // either time may stand in for a missing counterpart
                    let departure = st.departure_time.or(st.arrival_time)?;
                    let arrival = st.arrival_time.or(st.departure_time)?;
                    Some((
                        st.stop_sequence,
                        TripStopTime {
                            stop,
                            arrival,
                            departure,
                        },
                    ))
                })
                .collect();
            if sequenced.len() < 2 {
                continue;
            }
            sequenced.sort_by_key(|(sequence, _)| *sequence);
            let stop_times: Vec<TripStopTime> =
                sequenced.into_iter().map(|(_, st)| st).collect();
            trips.push(TripSchedule {
                trip_id: trip.id.clone(),
                route_id: trip.route_id.clone(),
                stops: stop_times,
            });
        }
        if trips.is_empty() {
            return Err(ScheduleError::NoActiveServiceError(service_date));
        }
        log::info!(
            "timetable for {}: {} stops, {} active trips",
            service_date,
            stops.len(),
            trips.len()
        );

        Ok(Timetable::assemble(service_date, stops, trips))
    }

    /// builds the per-stop departure boards from already-validated parts.
    /// exposed for synthetic networks in tests.
    pub fn assemble(
        service_date: NaiveDate,
        stops: Vec<TransitStop>,
        trips: Vec<TripSchedule>,
    ) -> Timetable {
        let mut boards: Vec<Vec<Departure>> = vec![vec![]; stops.len()];
        for (trip_idx, trip) in trips.iter().enumerate() {
            // the final stop of a trip is alight-only
            for (position, stop_time) in trip.stops.iter().enumerate().rev().skip(1) {
                boards[stop_time.stop].push(Departure {
                    time: stop_time.departure,
                    trip: trip_idx,
                    position,
                });
            }
        }
        for board in boards.iter_mut() {
            board.sort_by_key(|d| d.time);
        }
        Timetable {
            service_date,
            stops,
            trips,
            boards,
        }
    }

    /// all boarding opportunities at a stop departing at or after the
    /// given time, in departure order.
    pub fn next_departures(&self, stop: usize, after: TimeOfDay) -> &[Departure] {
        let board = &self.boards[stop];
        let from = board.partition_point(|d| d.time < after);
        &board[from..]
    }

    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }
}

/// rejects a (feed, service date) pairing the feed's calendar does not
/// cover. a mismatch here is a misconfiguration that must fail the whole
/// run before any per-origin query starts.
fn validate_service_date(
    service_date: NaiveDate,
    range: Option<(NaiveDate, NaiveDate)>,
) -> Result<(), ScheduleError> {
    let (start, end) = range.ok_or(ScheduleError::EmptyCalendarError)?;
    if service_date < start || end < service_date {
        return Err(ScheduleError::DateOutsideCalendarError {
            date: service_date,
            start,
            end,
        });
    }
    Ok(())
}
