mod pbf_ops;
mod way_filter;

pub use pbf_ops::read_walk_network;
pub use way_filter::WayFilter;
