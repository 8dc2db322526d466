pub mod dijkstra_ops;

mod query;
pub use query::{QueryFailure, ReachabilityQuery};
