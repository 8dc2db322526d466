use super::TractCoverage;
use std::path::Path;
use tracc_core::io::{geojson_ops, shapefile_ops, CoverageRow};
use tracc_core::model::crs::Crs;
use tracc_core::CoreError;

/// writes the three result artifacts for one run under a common stem:
/// `<stem>.shp` (plus sidecars), `<stem>.geojson`, and `<stem>.csv`. all
/// three carry one row per tract, failed tracts included.
pub fn write_run_outputs(
    stem: &Path,
    rows: &[TractCoverage],
    crs: &Crs,
) -> Result<(), CoreError> {
    let coverage_rows: Vec<CoverageRow> = rows.iter().map(CoverageRow::from).collect();
    shapefile_ops::write_coverage_layer(&stem.with_extension("shp"), &coverage_rows, crs)?;
    geojson_ops::write_coverage_geojson(&stem.with_extension("geojson"), &coverage_rows, crs)?;
    write_summary_csv(&stem.with_extension("csv"), rows)?;
    log::info!("wrote {} rows to {}.{{shp,geojson,csv}}", rows.len(), stem.display());
    Ok(())
}

/// a flat per-tract summary for spreadsheet review: identifier, outcome,
/// and the ratio (empty cell when missing).
fn write_summary_csv(path: &Path, rows: &[TractCoverage]) -> Result<(), CoreError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| CoreError::OutputWriteError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    writer
        .write_record(["DGUID", "status", "area_pct"])
        .map_err(|e| CoreError::OutputWriteError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    for row in rows {
        let ratio = match row.area_pct {
            Some(r) => format!("{r:.8}"),
            None => String::new(),
        };
        writer
            .write_record([row.dguid.as_str(), &row.status.to_string(), &ratio])
            .map_err(|e| CoreError::OutputWriteError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
    }
    writer.flush().map_err(|e| CoreError::OutputWriteError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::output::CoverageStatus;
    use geo::{polygon, MultiPolygon};
    use tracc_core::model::Dguid;

    fn square() -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: 0.0, y: 0.0),
            (x: 10.0, y: 0.0),
            (x: 10.0, y: 10.0),
            (x: 0.0, y: 10.0),
        ]])
    }

    #[test]
    fn test_summary_csv_keeps_missing_ratio_empty() {
        let rows = vec![
            TractCoverage {
                dguid: Dguid::new("2021S05070001.00"),
                geometry: square(),
                area_pct: Some(0.25),
                status: CoverageStatus::Ok,
            },
            TractCoverage {
                dguid: Dguid::new("2021S05070002.00"),
                geometry: square(),
                area_pct: None,
                status: CoverageStatus::Unreachable,
            },
        ];
        let path = std::env::temp_dir().join("tracc_summary_test.csv");
        write_summary_csv(&path, &rows).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines[0], "DGUID,status,area_pct");
        assert!(lines[1].starts_with("2021S05070001.00,ok,0.25"));
        assert_eq!(lines[2], "2021S05070002.00,unreachable,");
        std::fs::remove_file(&path).ok();
    }
}
