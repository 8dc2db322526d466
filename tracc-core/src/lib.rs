pub mod io;
pub mod model;

mod error;
pub use error::CoreError;
