use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// dissemination-geography unique identifier for a census tract, as found
/// in the DGUID attribute of a Statistics Canada boundary layer.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Dguid(String);

impl Dguid {
    pub fn new(id: impl Into<String>) -> Dguid {
        Dguid(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Dguid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Dguid {
    fn from(value: &str) -> Self {
        Dguid(value.to_string())
    }
}
