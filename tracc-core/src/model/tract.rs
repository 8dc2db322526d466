use super::Dguid;
use crate::CoreError;
use geo::{Centroid, MultiPolygon, Point};

/// one census tract of the study area: boundary polygon plus derived
/// centroid point. created once by the boundary extractor, read-only
/// afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Tract {
    pub dguid: Dguid,
    pub boundary: MultiPolygon<f64>,
    pub centroid: Point<f64>,
}

impl Tract {
    /// builds a tract from its boundary, deriving the centroid. fails on
    /// degenerate (empty) boundaries rather than silently carrying a
    /// missing centroid forward into the isochrone loop.
    pub fn new(dguid: Dguid, boundary: MultiPolygon<f64>) -> Result<Tract, CoreError> {
        let centroid = boundary.centroid().ok_or_else(|| {
            CoreError::InternalError(format!("tract {dguid} has no centroid (empty boundary)"))
        })?;
        Ok(Tract {
            dguid,
            boundary,
            centroid,
        })
    }

    /// builds a tract from a separately-persisted centroid layer, as
    /// emitted by the boundary extractor.
    pub fn from_parts(dguid: Dguid, boundary: MultiPolygon<f64>, centroid: Point<f64>) -> Tract {
        Tract {
            dguid,
            boundary,
            centroid,
        }
    }
}
