use super::transverse_mercator as tm;
use super::transverse_mercator::TmParameters;
use crate::CoreError;
use geo::{Coord, MapCoords, MultiPolygon, Point};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::path::Path;

/// coordinate reference system of a geometry layer. layers must agree on
/// their CRS before any overlay or area computation; see
/// [`Crs::validate_match`]. areas are only meaningful under a projected
/// CRS, which is enforced at the study-area and coverage seams.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum Crs {
    /// WGS-84 geographic coordinates (EPSG:4326), lon/lat in degrees.
    /// routing layers always produce geometries in this CRS.
    Wgs84,
    /// a projected transverse-Mercator system in meters (UTM zones and
    /// their NAD83 variants).
    TransverseMercator { parameters: TmParameters },
}

impl Crs {
    /// the standard UTM zone projection (northern or southern hemisphere).
    pub fn utm(zone: u8, north: bool) -> Crs {
        Crs::TransverseMercator {
            parameters: TmParameters::utm(zone, north),
        }
    }

    /// parses a CRS from either an `EPSG:<code>` string or the WKT body of
    /// a shapefile `.prj` sidecar.
    pub fn parse(text: &str) -> Result<Crs, CoreError> {
        let trimmed = text.trim();
        if let Some(code) = trimmed
            .strip_prefix("EPSG:")
            .or_else(|| trimmed.strip_prefix("epsg:"))
        {
            let code = code
                .parse::<u32>()
                .map_err(|_| CoreError::CrsParseError(trimmed.to_string()))?;
            return Crs::from_epsg(code);
        }
        Crs::from_prj_wkt(trimmed)
    }

    /// maps well-known EPSG codes onto their projection parameters.
    pub fn from_epsg(code: u32) -> Result<Crs, CoreError> {
        match code {
            4326 | 4269 => Ok(Crs::Wgs84),
            // WGS-84 UTM north / south
            32601..=32660 => Ok(Crs::utm((code - 32600) as u8, true)),
            32701..=32760 => Ok(Crs::utm((code - 32700) as u8, false)),
            // NAD83 UTM north
            26901..=26923 => Ok(Crs::utm((code - 26900) as u8, true)),
            _ => Err(CoreError::CrsParseError(format!("EPSG:{code}"))),
        }
    }

    /// reads the CRS of a shapefile layer from its `.prj` sidecar.
    pub fn from_prj_file(shp_path: &Path) -> Result<Crs, CoreError> {
        let prj_path = shp_path.with_extension("prj");
        let layer = shp_path.to_string_lossy().to_string();
        let wkt = std::fs::read_to_string(&prj_path)
            .map_err(|_| CoreError::CrsMissingError { layer })?;
        Crs::from_prj_wkt(&wkt)
    }

    /// interprets a `.prj` WKT body. geographic definitions collapse to
    /// WGS-84 (NAD83 and WGS-84 are treated as equivalent at this scale);
    /// projected definitions must be transverse-Mercator.
    pub fn from_prj_wkt(wkt: &str) -> Result<Crs, CoreError> {
        if wkt.contains("PROJCS") {
            if !wkt.contains("Transverse_Mercator") {
                return Err(CoreError::CrsParseError(wkt.to_string()));
            }
            let parameters = TmParameters {
                central_meridian: wkt_parameter(wkt, "central_meridian")
                    .ok_or_else(|| CoreError::CrsParseError(wkt.to_string()))?,
                latitude_of_origin: wkt_parameter(wkt, "latitude_of_origin").unwrap_or(0.0),
                scale_factor: wkt_parameter(wkt, "scale_factor").unwrap_or(1.0),
                false_easting: wkt_parameter(wkt, "false_easting").unwrap_or(0.0),
                false_northing: wkt_parameter(wkt, "false_northing").unwrap_or(0.0),
            };
            Ok(Crs::TransverseMercator { parameters })
        } else if wkt.contains("GEOGCS") {
            Ok(Crs::Wgs84)
        } else {
            Err(CoreError::CrsParseError(wkt.to_string()))
        }
    }

    pub fn is_projected(&self) -> bool {
        matches!(self, Crs::TransverseMercator { .. })
    }

    /// fails loudly when two layers that are about to be overlaid or
    /// compared do not share a CRS. replaces the legacy behavior of
    /// silently assuming agreement and producing a wrong overlay.
    pub fn validate_match(&self, other: &Crs, context: &str) -> Result<(), CoreError> {
        if self == other {
            Ok(())
        } else {
            Err(CoreError::CrsMismatchError {
                left: self.to_string(),
                right: other.to_string(),
                context: context.to_string(),
            })
        }
    }

    /// projects a WGS-84 point into this CRS. the identity under WGS-84.
    pub fn project_point(&self, point: Point<f64>) -> Point<f64> {
        match self {
            Crs::Wgs84 => point,
            Crs::TransverseMercator { parameters } => {
                let (x, y) = tm::forward(point.x(), point.y(), parameters);
                Point::new(x, y)
            }
        }
    }

    /// normalizes a WGS-84 multipolygon (e.g. a routing result) into this
    /// CRS so that area computations are valid.
    pub fn project_multi_polygon(&self, geometry: &MultiPolygon<f64>) -> MultiPolygon<f64> {
        match self {
            Crs::Wgs84 => geometry.clone(),
            Crs::TransverseMercator { parameters } => geometry.map_coords(|Coord { x, y }| {
                let (px, py) = tm::forward(x, y, parameters);
                Coord { x: px, y: py }
            }),
        }
    }

    /// the WKT body written to a `.prj` sidecar alongside layer outputs.
    pub fn to_prj_wkt(&self) -> String {
        match self {
            Crs::Wgs84 => String::from(WGS84_WKT),
            Crs::TransverseMercator { parameters } => format!(
                "PROJCS[\"Transverse_Mercator\",{WGS84_WKT},PROJECTION[\"Transverse_Mercator\"],\
                 PARAMETER[\"False_Easting\",{}],PARAMETER[\"False_Northing\",{}],\
                 PARAMETER[\"Central_Meridian\",{}],PARAMETER[\"Scale_Factor\",{}],\
                 PARAMETER[\"Latitude_Of_Origin\",{}],UNIT[\"Meter\",1.0]]",
                parameters.false_easting,
                parameters.false_northing,
                parameters.central_meridian,
                parameters.scale_factor,
                parameters.latitude_of_origin,
            ),
        }
    }
}

impl Display for Crs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Crs::Wgs84 => write!(f, "EPSG:4326"),
            Crs::TransverseMercator { parameters } => write!(
                f,
                "TransverseMercator(cm={}, k0={}, fe={}, fn={})",
                parameters.central_meridian,
                parameters.scale_factor,
                parameters.false_easting,
                parameters.false_northing
            ),
        }
    }
}

const WGS84_WKT: &str = "GEOGCS[\"GCS_WGS_1984\",DATUM[\"D_WGS_1984\",SPHEROID[\"WGS_1984\",6378137.0,298.257223563]],PRIMEM[\"Greenwich\",0.0],UNIT[\"Degree\",0.0174532925199433]]";

/// pulls a named `PARAMETER["name",value]` out of a WKT body. matching is
/// case-insensitive since ESRI and OGC spellings differ.
fn wkt_parameter(wkt: &str, name: &str) -> Option<f64> {
    let lowered = wkt.to_lowercase();
    let needle = format!("parameter[\"{}\"", name.to_lowercase());
    let start = lowered.find(&needle)? + needle.len();
    let rest = &lowered[start..];
    let comma = rest.find(',')? + 1;
    let close = rest.find(']')?;
    if close <= comma {
        return None;
    }
    rest[comma..close].trim().parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const UTM17_PRJ: &str = "PROJCS[\"NAD_1983_UTM_Zone_17N\",GEOGCS[\"GCS_North_American_1983\",DATUM[\"D_North_American_1983\",SPHEROID[\"GRS_1980\",6378137.0,298.257222101]],PRIMEM[\"Greenwich\",0.0],UNIT[\"Degree\",0.0174532925199433]],PROJECTION[\"Transverse_Mercator\"],PARAMETER[\"False_Easting\",500000.0],PARAMETER[\"False_Northing\",0.0],PARAMETER[\"Central_Meridian\",-81.0],PARAMETER[\"Scale_Factor\",0.9996],PARAMETER[\"Latitude_Of_Origin\",0.0],UNIT[\"Meter\",1.0]]";

    #[test]
    fn test_parse_epsg_strings() {
        assert_eq!(Crs::parse("EPSG:4326").unwrap(), Crs::Wgs84);
        assert_eq!(Crs::parse("EPSG:32617").unwrap(), Crs::utm(17, true));
        assert_eq!(Crs::parse("EPSG:26917").unwrap(), Crs::utm(17, true));
        assert!(Crs::parse("EPSG:99999").is_err());
    }

    #[test]
    fn test_parse_projected_wkt() {
        let crs = Crs::from_prj_wkt(UTM17_PRJ).unwrap();
        assert_eq!(crs, Crs::utm(17, true));
    }

    #[test]
    fn test_parse_geographic_wkt() {
        let crs = Crs::from_prj_wkt(WGS84_WKT).unwrap();
        assert_eq!(crs, Crs::Wgs84);
        assert!(!crs.is_projected());
    }

    #[test]
    fn test_validate_match_rejects_mismatch() {
        let a = Crs::utm(17, true);
        let b = Crs::Wgs84;
        assert!(a.validate_match(&a.clone(), "same layer").is_ok());
        let err = a.validate_match(&b, "tract layer vs DA layer");
        assert!(matches!(err, Err(CoreError::CrsMismatchError { .. })));
    }

    #[test]
    fn test_prj_roundtrip() {
        let crs = Crs::utm(17, true);
        let parsed = Crs::from_prj_wkt(&crs.to_prj_wkt()).unwrap();
        assert_eq!(crs, parsed);
    }

    #[test]
    fn test_wkt_parameter_extraction() {
        assert_eq!(wkt_parameter(UTM17_PRJ, "central_meridian"), Some(-81.0));
        assert_eq!(wkt_parameter(UTM17_PRJ, "scale_factor"), Some(0.9996));
        assert_eq!(wkt_parameter(UTM17_PRJ, "no_such_parameter"), None);
    }
}
