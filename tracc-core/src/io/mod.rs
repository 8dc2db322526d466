pub mod geojson_ops;
pub mod shapefile_ops;

use crate::model::Dguid;
use geo::MultiPolygon;

/// one output row of an analysis run: the tract identifier, the geometry
/// carried for that row (the merged isochrone, or the original tract
/// boundary when the origin failed), and the coverage ratio. a `None`
/// ratio flags a missing result (unreachable origin or query timeout) and
/// is distinct from a 0.0 ratio, which means an empty-but-valid isochrone.
#[derive(Clone, Debug)]
pub struct CoverageRow {
    pub dguid: Dguid,
    pub geometry: MultiPolygon<f64>,
    pub area_pct: Option<f64>,
}
