use super::NetworkError;
use serde::{Deserialize, Serialize};
use tracc_gtfs::timetable::Timetable;
use tracc_osm::graph::WalkGraph;

/// tunable parameters of the multimodal network. defaults follow common
/// pedestrian assumptions: 1.33 m/s walking, stops snapped within 500m of
/// the walk network, 30s of slack between arriving at a stop and boarding.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct NetworkParameters {
    pub walk_speed_mps: f64,
    pub snap_radius_meters: f64,
    pub boarding_slack_seconds: u32,
}

impl Default for NetworkParameters {
    fn default() -> Self {
        NetworkParameters {
            walk_speed_mps: 1.33,
            snap_radius_meters: 500.0,
            boarding_slack_seconds: 30,
        }
    }
}

/// the connection between a transit stop and its nearest walk node.
#[derive(Clone, Copy, Debug)]
pub struct StopLink {
    pub node: usize,
    pub walk_seconds: u32,
}

/// the multimodal network for one analysis year: the pedestrian graph, the
/// transit timetable for the service date, and the links between them.
/// immutable once built and shared across all per-origin queries.
pub struct TransportNetwork {
    pub walk: WalkGraph,
    pub timetable: Timetable,
    pub params: NetworkParameters,
    /// per-stop link into the walk graph, `None` when no walk node lies
    /// within the snap radius.
    stop_links: Vec<Option<StopLink>>,
    /// reverse of `stop_links`: the stops reachable on foot from a node.
    node_stops: Vec<Vec<(usize, u32)>>,
}

impl TransportNetwork {
    pub fn new(
        walk: WalkGraph,
        timetable: Timetable,
        params: NetworkParameters,
    ) -> Result<TransportNetwork, NetworkError> {
        let mut stop_links: Vec<Option<StopLink>> = Vec::with_capacity(timetable.stop_count());
        let mut node_stops: Vec<Vec<(usize, u32)>> = vec![vec![]; walk.len()];
        let mut linked = 0_usize;
        for (stop_idx, stop) in timetable.stops.iter().enumerate() {
            let link = walk
                .nearest_node(&stop.location)
                .filter(|(_, meters)| *meters <= params.snap_radius_meters)
                .map(|(node, meters)| StopLink {
                    node,
                    walk_seconds: (meters / params.walk_speed_mps).ceil() as u32,
                });
            if let Some(link) = link {
                node_stops[link.node].push((stop_idx, link.walk_seconds));
                linked += 1;
            }
            stop_links.push(link);
        }
        if linked == 0 && timetable.stop_count() > 0 {
            return Err(NetworkError::NoLinkedStopsError {
                radius_meters: params.snap_radius_meters,
            });
        }
        let unlinked = timetable.stop_count() - linked;
        if unlinked > 0 {
            log::warn!(
                "{unlinked} of {} stops have no walk node within {}m",
                timetable.stop_count(),
                params.snap_radius_meters
            );
        }
        log::info!(
            "transport network: {} walk nodes, {} stops ({linked} linked)",
            walk.len(),
            timetable.stop_count()
        );
        Ok(TransportNetwork {
            walk,
            timetable,
            params,
            stop_links,
            node_stops,
        })
    }

    pub fn stop_link(&self, stop: usize) -> Option<StopLink> {
        self.stop_links[stop]
    }

    /// stops walkable from a node via their snap link.
    pub fn stops_at_node(&self, node: usize) -> &[(usize, u32)] {
        &self.node_stops[node]
    }
}
