pub mod isochrone;
pub mod network;
pub mod output;
pub mod search;
