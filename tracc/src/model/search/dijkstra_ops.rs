use super::{QueryFailure, ReachabilityQuery};
use crate::model::network::TransportNetwork;
use geo::Point;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};
use std::time::{Duration, Instant};
use tracc_gtfs::timetable::TimeOfDay;

/// how often the search polls the wall clock for its deadline.
const DEADLINE_CHECK_INTERVAL: usize = 1024;

/// a settled position in the multimodal search space: either a walk
/// network node or a transit stop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Label {
    Node(usize),
    Stop(usize),
}

/// runs an earliest-arrival search from the query origin and returns the
/// walk nodes reached within the budget, grouped into connected clusters.
/// grouping matters downstream: a hull drawn over two disconnected
/// clusters would claim coverage of the gap between them.
pub fn reachable_clusters(
    network: &TransportNetwork,
    query: &ReachabilityQuery,
    timeout: Option<Duration>,
) -> Result<Vec<Vec<Point<f64>>>, QueryFailure> {
    let (start_node, snap_meters) = network
        .walk
        .nearest_node(&query.origin)
        .filter(|(_, meters)| *meters <= network.params.snap_radius_meters)
        .ok_or_else(|| QueryFailure::unreachable(&query.origin))?;

    let access_seconds = (snap_meters / network.params.walk_speed_mps).ceil() as u32;
    let start_time = query.departure + access_seconds;
    if start_time > query.limit() {
        return Err(QueryFailure::unreachable(&query.origin));
    }

    let node_arrivals = search(network, query, start_node, start_time, timeout)?;
    Ok(cluster_reached_nodes(network, &node_arrivals))
}

/// the earliest-arrival relaxation loop. walk edges are always available;
/// transit legs join the frontier when the query enables them, boarding
/// the next departure at each linked stop after a fixed slack.
fn search(
    network: &TransportNetwork,
    query: &ReachabilityQuery,
    start_node: usize,
    start_time: TimeOfDay,
    timeout: Option<Duration>,
) -> Result<Vec<Option<TimeOfDay>>, QueryFailure> {
    let limit = query.limit();
    let transit = query.transit_enabled();
    let slack = network.params.boarding_slack_seconds;
    let started_at = Instant::now();

    let mut node_arrivals: Vec<Option<TimeOfDay>> = vec![None; network.walk.len()];
    let mut stop_arrivals: Vec<Option<TimeOfDay>> = vec![None; network.timetable.stop_count()];
    // earliest position along each trip the search has boarded at. a trip
    // must be re-ridden when a strictly earlier boarding point turns up,
    // otherwise stops between the two boarding points are never relaxed.
    let mut boarded_at: Vec<Option<usize>> = vec![None; network.timetable.trips.len()];

    let mut heap: BinaryHeap<Reverse<(TimeOfDay, Label)>> = BinaryHeap::new();
    node_arrivals[start_node] = Some(start_time);
    heap.push(Reverse((start_time, Label::Node(start_node))));

    let mut pops = 0_usize;
    while let Some(Reverse((time, label))) = heap.pop() {
        pops += 1;
        if pops % DEADLINE_CHECK_INTERVAL == 0 {
            if let Some(timeout) = timeout {
                if started_at.elapsed() > timeout {
                    return Err(QueryFailure::TimeoutError {
                        limit_seconds: timeout.as_secs(),
                    });
                }
            }
        }

        match label {
            Label::Node(node) => {
                if node_arrivals[node].is_some_and(|best| time > best) {
                    continue;
                }
                for &(next, meters) in network.walk.neighbors(node) {
                    let arrival = time + (meters / network.params.walk_speed_mps).ceil() as u32;
                    if arrival <= limit
                        && node_arrivals[next].map_or(true, |best| arrival < best)
                    {
                        node_arrivals[next] = Some(arrival);
                        heap.push(Reverse((arrival, Label::Node(next))));
                    }
                }
                if transit {
                    for &(stop, walk_seconds) in network.stops_at_node(node) {
                        let arrival = time + walk_seconds;
                        if arrival <= limit
                            && stop_arrivals[stop].map_or(true, |best| arrival < best)
                        {
                            stop_arrivals[stop] = Some(arrival);
                            heap.push(Reverse((arrival, Label::Stop(stop))));
                        }
                    }
                }
            }
            Label::Stop(stop) => {
                if stop_arrivals[stop].is_some_and(|best| time > best) {
                    continue;
                }
                // egress back onto the walk network
                if let Some(link) = network.stop_link(stop) {
                    let arrival = time + link.walk_seconds;
                    if arrival <= limit
                        && node_arrivals[link.node].map_or(true, |best| arrival < best)
                    {
                        node_arrivals[link.node] = Some(arrival);
                        heap.push(Reverse((arrival, Label::Node(link.node))));
                    }
                }
                // board every trip and relax its downstream stops, skipping
                // trips already ridden from this position or earlier
                for departure in network.timetable.next_departures(stop, time + slack) {
                    if departure.time > limit {
                        break;
                    }
                    if boarded_at[departure.trip].is_some_and(|pos| pos <= departure.position) {
                        continue;
                    }
                    boarded_at[departure.trip] = Some(departure.position);
                    let trip = &network.timetable.trips[departure.trip];
                    for stop_time in trip.stops.iter().skip(departure.position + 1) {
                        if stop_time.arrival > limit {
                            break;
                        }
                        if stop_arrivals[stop_time.stop]
                            .map_or(true, |best| stop_time.arrival < best)
                        {
                            stop_arrivals[stop_time.stop] = Some(stop_time.arrival);
                            heap.push(Reverse((stop_time.arrival, Label::Stop(stop_time.stop))));
                        }
                    }
                }
            }
        }
    }

    Ok(node_arrivals)
}

/// groups the reached walk nodes into connected clusters, restricting the
/// breadth-first search to nodes inside the reached set.
fn cluster_reached_nodes(
    network: &TransportNetwork,
    node_arrivals: &[Option<TimeOfDay>],
) -> Vec<Vec<Point<f64>>> {
    let mut visited = vec![false; node_arrivals.len()];
    let mut clusters = vec![];
    for start in 0..node_arrivals.len() {
        if visited[start] || node_arrivals[start].is_none() {
            continue;
        }
        let mut cluster = vec![];
        let mut queue = VecDeque::from([start]);
        visited[start] = true;
        while let Some(node) = queue.pop_front() {
            cluster.push(network.walk.point(node));
            for &(next, _) in network.walk.neighbors(node) {
                if !visited[next] && node_arrivals[next].is_some() {
                    visited[next] = true;
                    queue.push_back(next);
                }
            }
        }
        clusters.push(cluster);
    }
    clusters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::network::{NetworkParameters, TravelMode};
    use chrono::NaiveDate;
    use tracc_gtfs::timetable::{Timetable, TransitStop, TripSchedule, TripStopTime};
    use tracc_osm::graph::WalkGraph;

    /// an east-west chain of 11 walk nodes ~80m apart along 43.7N, with a
    /// transit stop at each end of the chain.
    fn chain_network() -> TransportNetwork {
        let nodes: Vec<(i64, geo::Point<f64>)> = (0..11)
            .map(|i| (i as i64 + 1, geo::Point::new(-79.4000 + 0.001 * i as f64, 43.7000)))
            .collect();
        let segments: Vec<(i64, i64)> = (1..11).map(|i| (i, i + 1)).collect();
        let walk = WalkGraph::new(nodes, segments).unwrap();

        let stops = vec![
            TransitStop {
                stop_id: String::from("west"),
                location: geo::Point::new(-79.4000, 43.7001),
            },
            TransitStop {
                stop_id: String::from("east"),
                location: geo::Point::new(-79.3900, 43.7001),
            },
        ];
        // departs the west end 2 minutes after 08:30, arrives east 3 minutes later
        let trips = vec![TripSchedule {
            trip_id: String::from("T1"),
            route_id: String::from("R1"),
            stops: vec![
                TripStopTime {
                    stop: 0,
                    arrival: 30_720,
                    departure: 30_720,
                },
                TripStopTime {
                    stop: 1,
                    arrival: 30_900,
                    departure: 30_900,
                },
            ],
        }];
        let timetable = Timetable::assemble(
            NaiveDate::from_ymd_opt(2015, 11, 22).unwrap(),
            stops,
            trips,
        );
        TransportNetwork::new(walk, timetable, NetworkParameters::default()).unwrap()
    }

    fn query(budget_seconds: u32, modes: Vec<TravelMode>) -> ReachabilityQuery {
        ReachabilityQuery {
            origin: geo::Point::new(-79.4000, 43.7000),
            departure: 30_600,
            budget_seconds,
            modes,
        }
    }

    fn reached_count(clusters: &[Vec<geo::Point<f64>>]) -> usize {
        clusters.iter().map(|c| c.len()).sum()
    }

    fn reaches(clusters: &[Vec<geo::Point<f64>>], x: f64, y: f64) -> bool {
        clusters
            .iter()
            .flatten()
            .any(|p| (p.x() - x).abs() < 1e-9 && (p.y() - y).abs() < 1e-9)
    }

    /// a trip that passes near the origin mid-route: boarding it there must
    /// not shadow the earlier boarding point further up the chain.
    ///
    /// layout: an east-west chain of 12 walk nodes ~80m apart, with a second
    /// two-node chain far east reachable only by riding. the trip calls at
    /// the chain's far end (10 min walk, departs 08:41:40), the isolated
    /// chain (08:43:20), one edge from the origin (08:46:40), and the
    /// isolated chain's second node (08:51:40).
    fn mid_route_network() -> TransportNetwork {
        let mut nodes: Vec<(i64, geo::Point<f64>)> = (0..12)
            .map(|i| (i as i64 + 1, geo::Point::new(-79.4000 + 0.001 * i as f64, 43.7000)))
            .collect();
        nodes.push((100, geo::Point::new(-79.3600, 43.7000)));
        nodes.push((101, geo::Point::new(-79.3590, 43.7000)));
        let mut segments: Vec<(i64, i64)> = (1..12).map(|i| (i, i + 1)).collect();
        segments.push((100, 101));
        let walk = WalkGraph::new(nodes, segments).unwrap();

        let stops = vec![
            TransitStop {
                stop_id: String::from("chain_end"),
                location: geo::Point::new(-79.3900, 43.7000),
            },
            TransitStop {
                stop_id: String::from("isolated"),
                location: geo::Point::new(-79.3600, 43.7000),
            },
            TransitStop {
                stop_id: String::from("near_origin"),
                location: geo::Point::new(-79.3990, 43.7000),
            },
            TransitStop {
                stop_id: String::from("isolated_far"),
                location: geo::Point::new(-79.3590, 43.7000),
            },
        ];
        let trips = vec![TripSchedule {
            trip_id: String::from("T1"),
            route_id: String::from("R1"),
            stops: vec![
                TripStopTime {
                    stop: 0,
                    arrival: 31_300,
                    departure: 31_300,
                },
                TripStopTime {
                    stop: 1,
                    arrival: 31_400,
                    departure: 31_400,
                },
                TripStopTime {
                    stop: 2,
                    arrival: 31_600,
                    departure: 31_600,
                },
                TripStopTime {
                    stop: 3,
                    arrival: 31_900,
                    departure: 31_900,
                },
            ],
        }];
        let timetable = Timetable::assemble(
            NaiveDate::from_ymd_opt(2015, 11, 22).unwrap(),
            stops,
            trips,
        );
        TransportNetwork::new(walk, timetable, NetworkParameters::default()).unwrap()
    }

    #[test]
    fn test_reach_monotone_with_mid_route_boarding() {
        let network = mid_route_network();
        let modes = vec![TravelMode::Walk, TravelMode::Transit];

        // tight budget: the mid-route call is past the limit, so the search
        // walks to the chain's end, boards there, and rides to the isolated
        // node
        let tight =
            reachable_clusters(&network, &query(900, modes.clone()), None).unwrap();
        assert!(reaches(&tight, -79.3600, 43.7000));

        // double the budget: the mid-route stop is settled first, but
        // boarding there must not consume the trip for the earlier stop
        let loose = reachable_clusters(&network, &query(1800, modes), None).unwrap();
        assert!(reaches(&loose, -79.3600, 43.7000));
        assert!(reached_count(&loose) >= reached_count(&tight));
    }

    #[test]
    fn test_walk_reach_grows_with_budget() {
        let network = chain_network();
        let small = reachable_clusters(&network, &query(120, vec![TravelMode::Walk]), None)
            .unwrap();
        let large = reachable_clusters(&network, &query(600, vec![TravelMode::Walk]), None)
            .unwrap();
        assert!(reached_count(&small) >= 1);
        assert!(reached_count(&large) > reached_count(&small));
    }

    #[test]
    fn test_walk_only_cannot_cross_the_chain() {
        let network = chain_network();
        // ~800m of chain at 1.33 m/s needs ~600s on foot
        let clusters =
            reachable_clusters(&network, &query(300, vec![TravelMode::Walk]), None).unwrap();
        assert!(reached_count(&clusters) < 11);
    }

    #[test]
    fn test_transit_extends_walk_reach() {
        let network = chain_network();
        let walk_only =
            reachable_clusters(&network, &query(330, vec![TravelMode::Walk]), None).unwrap();
        let multimodal = reachable_clusters(
            &network,
            &query(330, vec![TravelMode::Walk, TravelMode::Transit]),
            None,
        )
        .unwrap();
        // the vehicle reaches the east end inside the budget, walking does not
        assert!(reached_count(&multimodal) > reached_count(&walk_only));
    }

    #[test]
    fn test_unreachable_origin() {
        let network = chain_network();
        let far_away = ReachabilityQuery {
            origin: geo::Point::new(-75.0, 45.0),
            departure: 30_600,
            budget_seconds: 600,
            modes: vec![TravelMode::Walk],
        };
        let result = reachable_clusters(&network, &far_away, None);
        assert!(matches!(
            result,
            Err(QueryFailure::OriginUnreachableError { .. })
        ));
    }

    #[test]
    fn test_expired_deadline_times_out() {
        let network = chain_network();
        let result = reachable_clusters(
            &network,
            &query(600, vec![TravelMode::Walk]),
            Some(Duration::from_secs(0)),
        );
        // a zero timeout must either finish before the first deadline poll
        // or report a timeout, never panic or hang
        if let Err(failure) = result {
            assert!(matches!(failure, QueryFailure::TimeoutError { .. }));
        }
    }
}
