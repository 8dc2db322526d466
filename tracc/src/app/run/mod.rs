pub mod run_ops;

mod run_config;
pub use run_config::RunConfig;
