use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// travel modes available to a reachability query. walking is always the
/// access and egress mode; transit adds scheduled vehicle legs on top.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelMode {
    Walk,
    Transit,
}

impl TravelMode {
    pub fn default_modes() -> Vec<TravelMode> {
        vec![TravelMode::Walk, TravelMode::Transit]
    }
}

impl Display for TravelMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TravelMode::Walk => write!(f, "walk"),
            TravelMode::Transit => write!(f, "transit"),
        }
    }
}
