use super::{crs::Crs, Tract};
use crate::CoreError;
use geo::{Area, BooleanOps, MultiPolygon};

/// the dissolved footprint of the study region. fixed for the life of one
/// analysis run; its area is the denominator for every coverage ratio.
#[derive(Clone, Debug)]
pub struct StudyArea {
    geometry: MultiPolygon<f64>,
    crs: Crs,
    area: f64,
}

impl StudyArea {
    /// builds a study area from an already-dissolved footprint. the CRS
    /// must be projected: area under a geographic CRS is not comparable
    /// to a projected one, so this constructor refuses it outright.
    pub fn new(geometry: MultiPolygon<f64>, crs: Crs) -> Result<StudyArea, CoreError> {
        if !crs.is_projected() {
            return Err(CoreError::GeographicAreaError(crs.to_string()));
        }
        let area = geometry.unsigned_area();
        if area <= 0.0 {
            return Err(CoreError::InternalError(String::from(
                "study area footprint has zero area",
            )));
        }
        Ok(StudyArea {
            geometry,
            crs,
            area,
        })
    }

    /// dissolves the tract boundaries of one analysis run into the study
    /// area footprint.
    pub fn from_tracts(tracts: &[Tract], crs: Crs) -> Result<StudyArea, CoreError> {
        let dissolved = dissolve(tracts.iter().map(|t| &t.boundary));
        StudyArea::new(dissolved, crs)
    }

    pub fn geometry(&self) -> &MultiPolygon<f64> {
        &self.geometry
    }

    pub fn crs(&self) -> &Crs {
        &self.crs
    }

    pub fn area(&self) -> f64 {
        self.area
    }
}

/// unions a set of polygons into one (possibly multipart) footprint.
pub fn dissolve<'a>(polygons: impl Iterator<Item = &'a MultiPolygon<f64>>) -> MultiPolygon<f64> {
    polygons.fold(MultiPolygon::new(vec![]), |acc, mp| {
        if acc.0.is_empty() {
            mp.clone()
        } else {
            acc.union(mp)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    fn unit_square(x0: f64, y0: f64, side: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: x0, y: y0),
            (x: x0 + side, y: y0),
            (x: x0 + side, y: y0 + side),
            (x: x0, y: y0 + side),
            (x: x0, y: y0),
        ]])
    }

    #[test]
    fn test_dissolve_disjoint_sums_area() {
        let a = unit_square(0.0, 0.0, 10.0);
        let b = unit_square(100.0, 0.0, 10.0);
        let dissolved = dissolve([&a, &b].into_iter());
        assert!((dissolved.unsigned_area() - 200.0).abs() < 1e-6);
    }

    #[test]
    fn test_dissolve_overlapping_collapses() {
        let a = unit_square(0.0, 0.0, 10.0);
        let b = unit_square(0.0, 0.0, 10.0);
        let dissolved = dissolve([&a, &b].into_iter());
        assert!((dissolved.unsigned_area() - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_geographic_crs_rejected() {
        let result = StudyArea::new(unit_square(0.0, 0.0, 1.0), Crs::Wgs84);
        assert!(matches!(result, Err(CoreError::GeographicAreaError(_))));
    }

    #[test]
    fn test_area_cached_on_construction() {
        let study = StudyArea::new(unit_square(0.0, 0.0, 10.0), Crs::utm(17, true)).unwrap();
        assert!((study.area() - 100.0).abs() < 1e-9);
    }
}
