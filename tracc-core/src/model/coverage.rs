use super::StudyArea;
use geo::{Area, BooleanOps, MultiPolygon};

/// the fraction of the study area covered by an isochrone, in [0, 1].
///
/// the isochrone is clipped to the study footprint first: an isochrone can
/// legitimately spill past the study boundary (transit reaches beyond the
/// city), and the covered *share* is what the analysis compares across
/// years. both geometries must already be in the study area's projected
/// CRS; that invariant is owned by the isochrone generator.
///
/// an empty-but-valid isochrone yields 0.0. an *absent* isochrone
/// (unreachable origin, timed-out query) is represented as `None` by the
/// caller and never passed here.
pub fn coverage_ratio(isochrone: &MultiPolygon<f64>, study_area: &StudyArea) -> f64 {
    if isochrone.0.is_empty() {
        return 0.0;
    }
    let covered = isochrone.intersection(study_area.geometry());
    covered.unsigned_area() / study_area.area()
}
