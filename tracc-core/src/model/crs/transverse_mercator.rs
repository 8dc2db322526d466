//! forward transverse-Mercator projection on the WGS-84 ellipsoid, after
//! Snyder, Map Projections: A Working Manual, eq. 8-9..8-15. covers UTM
//! zones and the NAD83 variants used by Canadian census layers (the NAD83
//! and WGS-84 ellipsoids differ by well under a millimeter at this scale).

/// WGS-84 semi-major axis, meters.
pub const SEMI_MAJOR: f64 = 6_378_137.0;

/// WGS-84 inverse flattening.
pub const INVERSE_FLATTENING: f64 = 298.257_223_563;

/// parameters of one transverse-Mercator projected system.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TmParameters {
    pub central_meridian: f64,
    pub latitude_of_origin: f64,
    pub scale_factor: f64,
    pub false_easting: f64,
    pub false_northing: f64,
}

impl TmParameters {
    /// the standard parameters for a UTM zone.
    pub fn utm(zone: u8, north: bool) -> TmParameters {
        TmParameters {
            central_meridian: (zone as f64) * 6.0 - 183.0,
            latitude_of_origin: 0.0,
            scale_factor: 0.9996,
            false_easting: 500_000.0,
            false_northing: if north { 0.0 } else { 10_000_000.0 },
        }
    }
}

/// projects a WGS-84 (lon, lat) degree pair into (easting, northing) meters.
pub fn forward(lon_deg: f64, lat_deg: f64, params: &TmParameters) -> (f64, f64) {
    let f = 1.0 / INVERSE_FLATTENING;
    let e2 = f * (2.0 - f);
    let ep2 = e2 / (1.0 - e2);

    let lat = lat_deg.to_radians();
    let dlon = (lon_deg - params.central_meridian).to_radians();

    let sin_lat = lat.sin();
    let cos_lat = lat.cos();
    let tan_lat = lat.tan();

    let n = SEMI_MAJOR / (1.0 - e2 * sin_lat * sin_lat).sqrt();
    let t = tan_lat * tan_lat;
    let c = ep2 * cos_lat * cos_lat;
    let a = cos_lat * dlon;

    let m = meridional_arc(lat, e2);
    let m0 = meridional_arc(params.latitude_of_origin.to_radians(), e2);

    let k0 = params.scale_factor;
    let easting = params.false_easting
        + k0 * n
            * (a + (1.0 - t + c) * a.powi(3) / 6.0
                + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * a.powi(5) / 120.0);
    let northing = params.false_northing
        + k0 * (m - m0
            + n * tan_lat
                * (a * a / 2.0
                    + (5.0 - t + 9.0 * c + 4.0 * c * c) * a.powi(4) / 24.0
                    + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * a.powi(6) / 720.0));
    (easting, northing)
}

/// distance along the meridian from the equator to the given latitude.
fn meridional_arc(lat: f64, e2: f64) -> f64 {
    let e4 = e2 * e2;
    let e6 = e4 * e2;
    SEMI_MAJOR
        * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * lat
            - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * lat).sin()
            + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * lat).sin()
            - (35.0 * e6 / 3072.0) * (6.0 * lat).sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Distance, Haversine, Point};

    #[test]
    fn test_central_meridian_maps_to_false_easting() {
        let params = TmParameters::utm(17, true);
        let (easting, _) = forward(params.central_meridian, 43.7, &params);
        assert!(
            (easting - 500_000.0).abs() < 1e-6,
            "easting on the central meridian should equal the false easting, got {easting}"
        );
    }

    #[test]
    fn test_equator_maps_to_false_northing() {
        let params = TmParameters::utm(17, true);
        let (_, northing) = forward(-80.0, 0.0, &params);
        assert!(
            northing.abs() < 1e-6,
            "northing at the equator should be ~0 in a northern zone, got {northing}"
        );
    }

    #[test]
    fn test_projected_distance_agrees_with_haversine() {
        // two points ~1.5km apart in downtown Toronto, UTM zone 17N
        let params = TmParameters::utm(17, true);
        let a = Point::new(-79.3871, 43.6426);
        let b = Point::new(-79.3800, 43.6550);
        let (ax, ay) = forward(a.x(), a.y(), &params);
        let (bx, by) = forward(b.x(), b.y(), &params);
        let projected = ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt();
        let haversine = Haversine.distance(a, b);
        // haversine is spherical while the projection is ellipsoidal with a
        // grid scale factor, so agreement is loose but bounded
        let relative = (projected - haversine).abs() / haversine;
        assert!(
            relative < 0.005,
            "projected distance {projected} differs from haversine {haversine} by {relative}"
        );
    }

    #[test]
    fn test_easting_increases_with_longitude() {
        let params = TmParameters::utm(17, true);
        let (west, _) = forward(-80.0, 43.7, &params);
        let (east, _) = forward(-79.0, 43.7, &params);
        assert!(west < east);
    }
}
