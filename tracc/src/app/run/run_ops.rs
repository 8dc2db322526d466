use super::RunConfig;
use crate::app::AppError;
use crate::model::isochrone::{IsochroneSource, NetworkIsochroneSource};
use crate::model::network::TransportNetwork;
use crate::model::output::{writer_ops, CoverageStatus, TractCoverage};
use geo::{MultiPolygon, Point};
use kdam::{Bar, BarExt};
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracc_core::io::shapefile_ops;
use tracc_core::model::crs::Crs;
use tracc_core::model::{coverage, study_area, Dguid, StudyArea, Tract};
use tracc_gtfs::timetable::Timetable;
use tracc_osm::import::{read_walk_network, WayFilter};

/// one origin of a batch: identifier, WGS-84 centroid to route from, and
/// the tract boundary already projected to the output CRS.
pub struct RunTract {
    pub dguid: Dguid,
    pub origin: Point<f64>,
    pub boundary: MultiPolygon<f64>,
}

/// executes one full analysis run: load the study area, build the year's
/// multimodal network, generate one isochrone per tract centroid, and
/// write the coverage outputs.
pub fn run(config: &RunConfig) -> Result<(), AppError> {
    let tracts = load_tracts(config)?;
    let target_crs = resolve_target_crs(config, &tracts)?;
    log::info!("computing areas under {target_crs}");

    let run_tracts: Vec<RunTract> = tracts
        .iter()
        .map(|t| RunTract {
            dguid: t.dguid.clone(),
            origin: t.centroid,
            boundary: target_crs.project_multi_polygon(&t.boundary),
        })
        .collect();
    let study = StudyArea::new(
        study_area::dissolve(run_tracts.iter().map(|t| &t.boundary)),
        target_crs.clone(),
    )?;

    log::info!("loading walk network from {}", config.pbf_file);
    let walk = read_walk_network(&config.pbf_file, &WayFilter::default())
        .map_err(crate::model::network::NetworkError::from)?;
    log::info!(
        "loading transit schedule from {} for {}",
        config.gtfs_file,
        config.service_date()
    );
    let timetable = Timetable::from_bundle(&config.gtfs_file, config.service_date())
        .map_err(crate::model::network::NetworkError::from)?;
    let network = Arc::new(TransportNetwork::new(walk, timetable, config.network)?);
    let source = NetworkIsochroneSource::new(
        network,
        config.departure_seconds(),
        config.budget_seconds(),
        config.modes.clone(),
        config.hull.clone(),
        target_crs.clone(),
        config.query_timeout(),
    )?;

    let rows = run_batch(&run_tracts, &source, &study)?;
    report_outcomes(&rows);
    writer_ops::write_run_outputs(Path::new(&config.output_stem), &rows, &target_crs)?;
    Ok(())
}

/// maps every tract through the isochrone source in parallel. rows come
/// back in input order, one per tract. per-origin failures become rows
/// with a missing ratio instead of failing the batch.
pub fn run_batch(
    tracts: &[RunTract],
    source: &dyn IsochroneSource,
    study: &StudyArea,
) -> Result<Vec<TractCoverage>, AppError> {
    source
        .crs()
        .validate_match(study.crs(), "isochrone source vs study area")?;
    let bar = Arc::new(Mutex::new(
        Bar::builder()
            .desc("isochrones")
            .total(tracts.len())
            .build()
            .map_err(AppError::ConfigurationError)?,
    ));
    let rows: Vec<TractCoverage> = tracts
        .par_iter()
        .map(|tract| {
            if let Ok(mut bar) = bar.clone().lock() {
                let _ = bar.update(1);
            }
            match source.isochrone(&tract.origin) {
                Ok(isochrone) => {
                    let ratio = coverage::coverage_ratio(&isochrone, study);
                    // shapefile rows need non-degenerate geometry, so an
                    // empty isochrone row carries the tract boundary
                    let geometry = if isochrone.0.is_empty() {
                        tract.boundary.clone()
                    } else {
                        isochrone
                    };
                    TractCoverage {
                        dguid: tract.dguid.clone(),
                        geometry,
                        area_pct: Some(ratio),
                        status: CoverageStatus::Ok,
                    }
                }
                Err(failure) => {
                    log::warn!("tract {}: {failure}", tract.dguid);
                    TractCoverage {
                        dguid: tract.dguid.clone(),
                        geometry: tract.boundary.clone(),
                        area_pct: None,
                        status: CoverageStatus::from(&failure),
                    }
                }
            }
        })
        .collect();
    eprintln!();
    Ok(rows)
}

/// reads the boundary layer and joins the optional centroid layer by
/// identifier, deriving centroids from boundaries when no layer is given.
fn load_tracts(config: &RunConfig) -> Result<Vec<Tract>, AppError> {
    let (boundaries, boundary_crs) =
        shapefile_ops::read_polygon_layer(Path::new(&config.tracts_file), &config.id_field)?;
    if boundary_crs.is_projected() {
        return Err(AppError::ConfigurationError(format!(
            "tract layer {} is in projected CRS {boundary_crs}; provide WGS-84 layers",
            config.tracts_file
        )));
    }

    let tracts = match &config.centroids_file {
        None => boundaries
            .into_iter()
            .map(|(dguid, boundary)| Tract::new(dguid, boundary))
            .collect::<Result<Vec<Tract>, _>>()?,
        Some(centroids_file) => {
            let (centroids, centroid_crs) =
                shapefile_ops::read_point_layer(Path::new(centroids_file), &config.id_field)?;
            boundary_crs.validate_match(&centroid_crs, "tract boundaries vs centroids")?;
            let lookup: HashMap<&str, Point<f64>> = centroids
                .iter()
                .map(|(dguid, point)| (dguid.as_str(), *point))
                .collect();
            boundaries
                .into_iter()
                .map(|(dguid, boundary)| match lookup.get(dguid.as_str()) {
                    Some(centroid) => Ok(Tract::from_parts(dguid, boundary, *centroid)),
                    None => Err(AppError::ConfigurationError(format!(
                        "tract {dguid} missing from centroid layer {centroids_file}"
                    ))),
                })
                .collect::<Result<Vec<Tract>, AppError>>()?
        }
    };
    if tracts.is_empty() {
        return Err(AppError::ConfigurationError(format!(
            "tract layer {} is empty",
            config.tracts_file
        )));
    }
    Ok(tracts)
}

/// the projected CRS for areas: the configured one when present,
/// otherwise the UTM zone containing the first tract centroid.
fn resolve_target_crs(config: &RunConfig, tracts: &[Tract]) -> Result<Crs, AppError> {
    match &config.target_crs {
        Some(text) => Ok(Crs::parse(text)?),
        None => {
            let centroid = tracts
                .first()
                .map(|t| t.centroid)
                .ok_or_else(|| AppError::ConfigurationError(String::from("no tracts loaded")))?;
            let zone = (((centroid.x() + 180.0) / 6.0).floor() as i32).clamp(0, 59) as u8 + 1;
            let crs = Crs::utm(zone, centroid.y() >= 0.0);
            log::info!("no target CRS configured, derived {crs} from tract extent");
            Ok(crs)
        }
    }
}

fn report_outcomes(rows: &[TractCoverage]) {
    let ok = rows.iter().filter(|r| r.status == CoverageStatus::Ok).count();
    let unreachable = rows
        .iter()
        .filter(|r| r.status == CoverageStatus::Unreachable)
        .count();
    let timeout = rows
        .iter()
        .filter(|r| r.status == CoverageStatus::Timeout)
        .count();
    log::info!("{ok} tracts ok, {unreachable} unreachable, {timeout} timed out");
}
