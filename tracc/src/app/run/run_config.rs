use crate::app::AppError;
use crate::model::network::{NetworkParameters, TravelMode};
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracc_core::io::shapefile_ops::DEFAULT_ID_FIELD;
use tracc_core::model::isochrone::HullAlgorithm;
use tracc_gtfs::timetable::TimeOfDay;

/// one analysis run: the input layers and networks for a single year, a
/// fixed departure instant, and a travel budget. a study across years is a
/// sequence of these files, one per (network, departure, budget) triple.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunConfig {
    /// tract boundary shapefile from the boundary extractor, WGS-84.
    pub tracts_file: String,
    /// optional centroid shapefile; centroids are derived from the
    /// boundaries when absent.
    pub centroids_file: Option<String>,
    /// OSM street network extract for the run's year.
    pub pbf_file: String,
    /// GTFS bundle whose calendar covers the departure date.
    pub gtfs_file: String,
    /// local departure instant, e.g. 2015-11-22T08:30:00.
    pub departure: NaiveDateTime,
    pub budget_minutes: u32,
    #[serde(default = "TravelMode::default_modes")]
    pub modes: Vec<TravelMode>,
    #[serde(default)]
    pub network: NetworkParameters,
    #[serde(default)]
    pub hull: HullAlgorithm,
    /// per-origin wall-clock limit; 0 disables the limit.
    #[serde(default = "default_query_timeout")]
    pub query_timeout_seconds: u64,
    /// projected CRS for areas, e.g. "EPSG:32617". derived from the tract
    /// extent (UTM) when absent.
    pub target_crs: Option<String>,
    pub output_stem: String,
    #[serde(default = "default_id_field")]
    pub id_field: String,
}

fn default_query_timeout() -> u64 {
    120
}

fn default_id_field() -> String {
    String::from(DEFAULT_ID_FIELD)
}

impl RunConfig {
    pub fn service_date(&self) -> NaiveDate {
        self.departure.date()
    }

    pub fn departure_seconds(&self) -> TimeOfDay {
        self.departure.time().num_seconds_from_midnight()
    }

    pub fn budget_seconds(&self) -> u32 {
        self.budget_minutes * 60
    }

    pub fn query_timeout(&self) -> Option<Duration> {
        if self.query_timeout_seconds == 0 {
            None
        } else {
            Some(Duration::from_secs(self.query_timeout_seconds))
        }
    }
}

impl TryFrom<&String> for RunConfig {
    type Error = AppError;

    fn try_from(f: &String) -> Result<Self, Self::Error> {
        if f.ends_with(".toml") {
            let s = std::fs::read_to_string(f)
                .map_err(|e| AppError::ConfigurationError(format!("failure reading {f}: {e}")))?;
            toml::from_str(&s)
                .map_err(|e| AppError::ConfigurationError(format!("failure decoding {f}: {e}")))
        } else if f.ends_with(".json") {
            let s = std::fs::read_to_string(f)
                .map_err(|e| AppError::ConfigurationError(format!("failure reading {f}: {e}")))?;
            serde_json::from_str(&s)
                .map_err(|e| AppError::ConfigurationError(format!("failure decoding {f}: {e}")))
        } else {
            Err(AppError::ConfigurationError(format!(
                "unsupported file type: {f}"
            )))
        }
    }
}
