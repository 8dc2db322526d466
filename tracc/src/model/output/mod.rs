pub mod writer_ops;

mod tract_coverage;
pub use tract_coverage::{CoverageStatus, TractCoverage};
