use crate::app::AppError;
use geo::{BooleanOps, MultiPolygon};
use kdam::tqdm;
use std::path::{Path, PathBuf};
use tracc_core::io::shapefile_ops;
use tracc_core::model::{study_area, Dguid, Tract};

/// builds the study-area boundary layers: census tracts clipped to the
/// union of the dissemination areas that delimit the serviced region, plus
/// one representative centroid per surviving tract. both output layers
/// inherit the CRS of the inputs.
///
/// # Arguments
/// * `ct_file` - census tract polygon shapefile
/// * `da_file` - dissemination area polygon shapefile, same CRS
/// * `output_stem` - stem for `<stem>_boundaries.shp` and `<stem>_centroids.shp`
/// * `id_field` - identifier attribute of the census tract layer
pub fn run(
    ct_file: &str,
    da_file: &str,
    output_stem: &str,
    id_field: &str,
) -> Result<(), AppError> {
    let (cts, ct_crs) = shapefile_ops::read_polygon_layer(Path::new(ct_file), id_field)?;
    let (das, da_crs) = shapefile_ops::read_polygon_layer(Path::new(da_file), id_field)?;
    ct_crs.validate_match(&da_crs, "census tract layer vs dissemination area layer")?;

    log::info!("dissolving {} dissemination areas", das.len());
    let footprint = study_area::dissolve(das.iter().map(|(_, geometry)| geometry));
    if footprint.0.is_empty() {
        return Err(AppError::ConfigurationError(String::from(
            "dissemination area union is empty",
        )));
    }

    let clip_iter = tqdm!(cts.iter(), desc = "clipping tracts", total = cts.len());
    let mut clipped = vec![];
    for (dguid, boundary) in clip_iter {
        if let Some(result) = clip_tract(dguid, boundary, &footprint) {
            clipped.push(result);
        }
    }
    eprintln!();
    if clipped.is_empty() {
        return Err(AppError::ConfigurationError(String::from(
            "no census tract intersects the dissemination area union",
        )));
    }
    log::info!(
        "{} of {} tracts intersect the serviced region",
        clipped.len(),
        cts.len()
    );

    let mut tracts = vec![];
    for (dguid, boundary) in clipped {
        match Tract::new(dguid.clone(), boundary) {
            Ok(tract) => tracts.push(tract),
            Err(e) => log::warn!("dropping tract {dguid}: {e}"),
        }
    }

    let boundary_rows: Vec<(Dguid, MultiPolygon<f64>)> = tracts
        .iter()
        .map(|t| (t.dguid.clone(), t.boundary.clone()))
        .collect();
    let centroid_rows: Vec<(Dguid, geo::Point<f64>)> = tracts
        .iter()
        .map(|t| (t.dguid.clone(), t.centroid))
        .collect();
    shapefile_ops::write_polygon_layer(&stem_path(output_stem, "boundaries"), &boundary_rows, &ct_crs)?;
    shapefile_ops::write_point_layer(&stem_path(output_stem, "centroids"), &centroid_rows, &ct_crs)?;
    Ok(())
}

/// intersects one tract with the serviced-region footprint. tracts fully
/// outside the footprint drop out; partially-covered tracts keep only
/// their covered portion, so the downstream coverage denominator measures
/// serviced land rather than nominal tract extent.
pub fn clip_tract(
    dguid: &Dguid,
    boundary: &MultiPolygon<f64>,
    footprint: &MultiPolygon<f64>,
) -> Option<(Dguid, MultiPolygon<f64>)> {
    let clipped = boundary.intersection(footprint);
    if clipped.0.is_empty() {
        None
    } else {
        Some((dguid.clone(), clipped))
    }
}

fn stem_path(output_stem: &str, suffix: &str) -> PathBuf {
    PathBuf::from(format!("{output_stem}_{suffix}.shp"))
}
