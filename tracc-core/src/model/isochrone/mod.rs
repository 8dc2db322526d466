mod hull_algorithm;
pub mod merge_ops;

pub use hull_algorithm::HullAlgorithm;
