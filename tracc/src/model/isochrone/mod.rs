mod generator;
pub use generator::{IsochroneSource, NetworkIsochroneSource};
