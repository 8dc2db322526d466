use super::CoverageRow;
use crate::model::{crs::Crs, Dguid};
use crate::CoreError;
use geo::Winding;
use geo_types::{LineString, MultiPolygon, Point};
use shapefile::dbase;
use std::path::Path;

/// name of the identifier attribute in Statistics Canada boundary layers.
pub const DEFAULT_ID_FIELD: &str = "DGUID";

const RATIO_FIELD: &str = "area_pct";

/// reads a polygon layer plus its `.prj` CRS, keyed by an identifier
/// attribute of the `.dbf` sidecar.
pub fn read_polygon_layer(
    path: &Path,
    id_field: &str,
) -> Result<(Vec<(Dguid, MultiPolygon<f64>)>, Crs), CoreError> {
    let crs = Crs::from_prj_file(path)?;
    let rows = shapefile::read(path).map_err(|e| CoreError::InputLoadError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut processed = vec![];
    for (idx, (shape, record)) in rows.into_iter().enumerate() {
        let geometry: MultiPolygon<f64> = match shape {
            shapefile::Shape::Polygon(generic_polygon) => {
                generic_polygon
                    .try_into()
                    .map_err(|e| CoreError::InputLoadError {
                        path: path.to_path_buf(),
                        message: format!("failed to convert polygon at row {idx}: {e}"),
                    })?
            }
            shapefile::Shape::PolygonM(generic_polygon) => {
                generic_polygon
                    .try_into()
                    .map_err(|e| CoreError::InputLoadError {
                        path: path.to_path_buf(),
                        message: format!("failed to convert polygon at row {idx}: {e}"),
                    })?
            }
            other => {
                return Err(CoreError::InputLoadError {
                    path: path.to_path_buf(),
                    message: format!(
                        "unexpected shape type {} at row {idx}, must be polygonal",
                        other.shapetype()
                    ),
                })
            }
        };
        let dguid = read_id_field(&record, id_field, idx, path)?;
        processed.push((dguid, geometry));
    }
    log::info!(
        "read {} polygon rows from {} ({})",
        processed.len(),
        path.display(),
        crs
    );
    Ok((processed, crs))
}

/// reads a point layer (e.g. the persisted centroid layer) plus its CRS.
pub fn read_point_layer(
    path: &Path,
    id_field: &str,
) -> Result<(Vec<(Dguid, Point<f64>)>, Crs), CoreError> {
    let crs = Crs::from_prj_file(path)?;
    let rows = shapefile::read(path).map_err(|e| CoreError::InputLoadError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut processed = vec![];
    for (idx, (shape, record)) in rows.into_iter().enumerate() {
        let point = match shape {
            shapefile::Shape::Point(p) => Point::new(p.x, p.y),
            shapefile::Shape::PointM(p) => Point::new(p.x, p.y),
            other => {
                return Err(CoreError::InputLoadError {
                    path: path.to_path_buf(),
                    message: format!(
                        "unexpected shape type {} at row {idx}, must be point",
                        other.shapetype()
                    ),
                })
            }
        };
        let dguid = read_id_field(&record, id_field, idx, path)?;
        processed.push((dguid, point));
    }
    Ok((processed, crs))
}

/// writes a polygon layer with a single identifier attribute, plus the
/// `.prj` sidecar declaring its CRS.
pub fn write_polygon_layer(
    path: &Path,
    rows: &[(Dguid, MultiPolygon<f64>)],
    crs: &Crs,
) -> Result<(), CoreError> {
    let table = dbase::TableWriterBuilder::new().add_character_field(field_name(DEFAULT_ID_FIELD)?, 32);
    let mut writer = shapefile::Writer::from_path(path, table).map_err(|e| {
        CoreError::OutputWriteError {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;
    for (dguid, geometry) in rows {
        let mut record = dbase::Record::default();
        record.insert(
            DEFAULT_ID_FIELD.to_string(),
            dbase::FieldValue::Character(Some(dguid.to_string())),
        );
        writer
            .write_shape_and_record(&to_shapefile_polygon(geometry), &record)
            .map_err(|e| CoreError::OutputWriteError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
    }
    write_prj(path, crs)
}

/// writes a point layer with a single identifier attribute, plus `.prj`.
pub fn write_point_layer(
    path: &Path,
    rows: &[(Dguid, Point<f64>)],
    crs: &Crs,
) -> Result<(), CoreError> {
    let table = dbase::TableWriterBuilder::new().add_character_field(field_name(DEFAULT_ID_FIELD)?, 32);
    let mut writer = shapefile::Writer::from_path(path, table).map_err(|e| {
        CoreError::OutputWriteError {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;
    for (dguid, point) in rows {
        let mut record = dbase::Record::default();
        record.insert(
            DEFAULT_ID_FIELD.to_string(),
            dbase::FieldValue::Character(Some(dguid.to_string())),
        );
        writer
            .write_shape_and_record(&shapefile::Point::new(point.x(), point.y()), &record)
            .map_err(|e| CoreError::OutputWriteError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
    }
    write_prj(path, crs)
}

/// writes the per-run coverage layer: identifier, geometry, and a nullable
/// numeric coverage ratio. dbase numerics are nullable, so missing results
/// stay distinguishable from zero coverage in the output file.
pub fn write_coverage_layer(
    path: &Path,
    rows: &[CoverageRow],
    crs: &Crs,
) -> Result<(), CoreError> {
    let table = dbase::TableWriterBuilder::new()
        .add_character_field(field_name(DEFAULT_ID_FIELD)?, 32)
        .add_numeric_field(field_name(RATIO_FIELD)?, 20, 8);
    let mut writer = shapefile::Writer::from_path(path, table).map_err(|e| {
        CoreError::OutputWriteError {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;
    for row in rows {
        let mut record = dbase::Record::default();
        record.insert(
            DEFAULT_ID_FIELD.to_string(),
            dbase::FieldValue::Character(Some(row.dguid.to_string())),
        );
        record.insert(
            RATIO_FIELD.to_string(),
            dbase::FieldValue::Numeric(row.area_pct),
        );
        writer
            .write_shape_and_record(&to_shapefile_polygon(&row.geometry), &record)
            .map_err(|e| CoreError::OutputWriteError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
    }
    write_prj(path, crs)
}

fn read_id_field(
    record: &dbase::Record,
    id_field: &str,
    idx: usize,
    path: &Path,
) -> Result<Dguid, CoreError> {
    let field = record.get(id_field).ok_or_else(|| CoreError::InputLoadError {
        path: path.to_path_buf(),
        message: format!("field '{id_field}' missing from record at row {idx}"),
    })?;
    match field {
        dbase::FieldValue::Character(Some(s)) => Ok(Dguid::new(s.trim())),
        other => Err(CoreError::InputLoadError {
            path: path.to_path_buf(),
            message: format!(
                "field '{}' at row {} has unexpected type '{}'",
                id_field,
                idx,
                other.field_type()
            ),
        }),
    }
}

fn field_name(name: &str) -> Result<dbase::FieldName, CoreError> {
    dbase::FieldName::try_from(name)
        .map_err(|_| CoreError::InternalError(format!("invalid dbf field name '{name}'")))
}

/// converts a geo multipolygon into shapefile rings, enforcing the esri
/// winding convention (outer rings clockwise, inner rings counter-clockwise).
fn to_shapefile_polygon(geometry: &MultiPolygon<f64>) -> shapefile::Polygon {
    let mut rings = vec![];
    for polygon in &geometry.0 {
        let mut exterior = polygon.exterior().clone();
        exterior.make_cw_winding();
        rings.push(shapefile::PolygonRing::Outer(ring_points(&exterior)));
        for interior in polygon.interiors() {
            let mut ring = interior.clone();
            ring.make_ccw_winding();
            rings.push(shapefile::PolygonRing::Inner(ring_points(&ring)));
        }
    }
    shapefile::Polygon::with_rings(rings)
}

fn ring_points(ring: &LineString<f64>) -> Vec<shapefile::Point> {
    let mut points: Vec<shapefile::Point> = ring
        .coords()
        .map(|c| shapefile::Point::new(c.x, c.y))
        .collect();
    // shapefile rings must be explicitly closed
    if points.first().map(|p| (p.x, p.y)) != points.last().map(|p| (p.x, p.y)) {
        if let Some(first) = points.first().copied() {
            points.push(first);
        }
    }
    points
}

fn write_prj(path: &Path, crs: &Crs) -> Result<(), CoreError> {
    let prj_path = path.with_extension("prj");
    std::fs::write(&prj_path, crs.to_prj_wkt()).map_err(|e| CoreError::OutputWriteError {
        path: prj_path,
        message: e.to_string(),
    })
}
