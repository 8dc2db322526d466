pub mod coverage;
pub mod crs;
pub mod isochrone;
pub mod study_area;

mod dguid;
mod tract;

pub use dguid::Dguid;
pub use study_area::StudyArea;
pub use tract::Tract;
