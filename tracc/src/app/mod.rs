pub mod extract;
pub mod run;

mod error;
pub use error::AppError;
