use crate::model::network::{TransportNetwork, TravelMode};
use crate::model::search::{dijkstra_ops, QueryFailure, ReachabilityQuery};
use geo::{MultiPoint, MultiPolygon, Point, Polygon};
use std::sync::Arc;
use std::time::Duration;
use tracc_core::model::crs::Crs;
use tracc_core::model::isochrone::{merge_ops, HullAlgorithm};
use tracc_core::CoreError;
use tracc_gtfs::timetable::TimeOfDay;

/// produces one isochrone per origin, with every non-origin parameter held
/// fixed. the trait seam lets batch plumbing be tested against a stub
/// without a street network or timetable behind it.
pub trait IsochroneSource: Send + Sync {
    /// the merged isochrone for one origin, in the source's projected CRS.
    fn isochrone(&self, origin: &Point<f64>) -> Result<MultiPolygon<f64>, QueryFailure>;

    fn crs(&self) -> &Crs;
}

/// the production source: reachability search over the multimodal network,
/// hulls drawn per reachable cluster in projected space, fragments merged
/// into one multipolygon.
pub struct NetworkIsochroneSource {
    network: Arc<TransportNetwork>,
    departure: TimeOfDay,
    budget_seconds: u32,
    modes: Vec<TravelMode>,
    hull: HullAlgorithm,
    target_crs: Crs,
    timeout: Option<Duration>,
}

impl NetworkIsochroneSource {
    /// the target CRS must be projected: hull geometry and the downstream
    /// area ratios are meaningless in degree space.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        network: Arc<TransportNetwork>,
        departure: TimeOfDay,
        budget_seconds: u32,
        modes: Vec<TravelMode>,
        hull: HullAlgorithm,
        target_crs: Crs,
        timeout: Option<Duration>,
    ) -> Result<NetworkIsochroneSource, CoreError> {
        if !target_crs.is_projected() {
            return Err(CoreError::GeographicAreaError(target_crs.to_string()));
        }
        Ok(NetworkIsochroneSource {
            network,
            departure,
            budget_seconds,
            modes,
            hull,
            target_crs,
            timeout,
        })
    }
}

impl IsochroneSource for NetworkIsochroneSource {
    fn isochrone(&self, origin: &Point<f64>) -> Result<MultiPolygon<f64>, QueryFailure> {
        let query = ReachabilityQuery {
            origin: *origin,
            departure: self.departure,
            budget_seconds: self.budget_seconds,
            modes: self.modes.clone(),
        };
        let clusters = dijkstra_ops::reachable_clusters(&self.network, &query, self.timeout)?;

        let fragments: Vec<Polygon<f64>> = clusters
            .into_iter()
            .filter(|cluster| cluster.len() >= 3)
            .map(|cluster| {
                let projected: MultiPoint<f64> = cluster
                    .into_iter()
                    .map(|p| self.target_crs.project_point(p))
                    .collect::<Vec<Point<f64>>>()
                    .into();
                self.hull.run(&projected)
            })
            .collect();
        Ok(merge_ops::merge_fragments(&fragments))
    }

    fn crs(&self) -> &Crs {
        &self.target_crs
    }
}
