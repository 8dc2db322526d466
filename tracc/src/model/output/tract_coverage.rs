use crate::model::search::QueryFailure;
use geo::MultiPolygon;
use serde::Serialize;
use std::fmt::Display;
use tracc_core::io::CoverageRow;
use tracc_core::model::Dguid;

/// how a tract's query ended. failures are per-origin outcomes, recorded
/// in the outputs rather than aborting the run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageStatus {
    Ok,
    Unreachable,
    Timeout,
}

impl From<&QueryFailure> for CoverageStatus {
    fn from(failure: &QueryFailure) -> CoverageStatus {
        match failure {
            QueryFailure::OriginUnreachableError { .. } => CoverageStatus::Unreachable,
            QueryFailure::TimeoutError { .. } => CoverageStatus::Timeout,
        }
    }
}

impl Display for CoverageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoverageStatus::Ok => write!(f, "ok"),
            CoverageStatus::Unreachable => write!(f, "unreachable"),
            CoverageStatus::Timeout => write!(f, "timeout"),
        }
    }
}

/// the result for one tract in one run. a failed tract keeps its boundary
/// as the row geometry and carries no ratio, so the output layer stays
/// complete over the study area and missing results remain distinguishable
/// from zero coverage.
#[derive(Clone, Debug)]
pub struct TractCoverage {
    pub dguid: Dguid,
    pub geometry: MultiPolygon<f64>,
    pub area_pct: Option<f64>,
    pub status: CoverageStatus,
}

impl From<&TractCoverage> for CoverageRow {
    fn from(coverage: &TractCoverage) -> CoverageRow {
        CoverageRow {
            dguid: coverage.dguid.clone(),
            geometry: coverage.geometry.clone(),
            area_pct: coverage.area_pct,
        }
    }
}
