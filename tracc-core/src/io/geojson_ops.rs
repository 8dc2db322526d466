use super::CoverageRow;
use crate::model::crs::Crs;
use crate::CoreError;
use geojson::{Feature, FeatureCollection, GeoJson, JsonObject};
use std::path::Path;

/// writes the coverage rows as a GeoJSON sidecar mirroring the shapefile
/// output. shapefile consumers vary in how they surface null dbase
/// numerics, so the sidecar keeps the missing-result distinction portable:
/// `area_pct` is a JSON number or an explicit null.
pub fn write_coverage_geojson(
    path: &Path,
    rows: &[CoverageRow],
    crs: &Crs,
) -> Result<(), CoreError> {
    let features = rows
        .iter()
        .map(|row| {
            let mut properties = JsonObject::new();
            properties.insert(
                String::from("DGUID"),
                serde_json::Value::from(row.dguid.as_str()),
            );
            properties.insert(
                String::from("area_pct"),
                match row.area_pct {
                    Some(ratio) => serde_json::Value::from(ratio),
                    None => serde_json::Value::Null,
                },
            );
            properties.insert(String::from("crs"), serde_json::Value::from(crs.to_string()));
            Feature {
                bbox: None,
                geometry: Some(geojson::Geometry::new(geojson::Value::from(&row.geometry))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();
    let collection = FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    };
    let serialized = GeoJson::FeatureCollection(collection).to_string();
    std::fs::write(path, serialized).map_err(|e| CoreError::OutputWriteError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Dguid;
    use geo::{polygon, MultiPolygon};

    #[test]
    fn test_null_ratio_serialized_as_json_null() {
        let row = CoverageRow {
            dguid: Dguid::from("2021S05073500001"),
            geometry: MultiPolygon::new(vec![polygon![
                (x: 0.0, y: 0.0),
                (x: 1.0, y: 0.0),
                (x: 1.0, y: 1.0),
                (x: 0.0, y: 0.0),
            ]]),
            area_pct: None,
        };
        let dir = std::env::temp_dir().join("tracc_geojson_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("coverage.geojson");
        write_coverage_geojson(&path, &[row], &Crs::utm(17, true)).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        let ratio = &value["features"][0]["properties"]["area_pct"];
        assert!(ratio.is_null(), "missing result must serialize as null");
    }
}
