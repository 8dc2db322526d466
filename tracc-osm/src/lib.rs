pub mod graph;
pub mod import;

mod error;
pub use error::OsmError;
