use crate::model::network::NetworkError;
use tracc_core::CoreError;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("configuration error: {0}")]
    ConfigurationError(String),
    #[error(transparent)]
    CoreError(#[from] CoreError),
    #[error(transparent)]
    NetworkError(#[from] NetworkError),
}
