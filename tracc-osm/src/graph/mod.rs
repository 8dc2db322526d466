mod walk_graph;

pub use walk_graph::WalkGraph;
