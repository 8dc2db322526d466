mod crs;
pub mod transverse_mercator;

pub use crs::Crs;
