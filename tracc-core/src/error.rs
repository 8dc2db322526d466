use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum CoreError {
    #[error("failure loading input '{path}': {message}")]
    InputLoadError { path: PathBuf, message: String },
    #[error("layer '{layer}' has no coordinate reference system (.prj sidecar missing or unreadable)")]
    CrsMissingError { layer: String },
    #[error("coordinate reference systems do not match between layers being compared: {left} vs {right} ({context})")]
    CrsMismatchError {
        left: String,
        right: String,
        context: String,
    },
    #[error("cannot compute area under geographic CRS {0}; reproject to a projected CRS first")]
    GeographicAreaError(String),
    #[error("failed to parse CRS from '{0}'")]
    CrsParseError(String),
    #[error("failure writing output '{path}': {message}")]
    OutputWriteError { path: PathBuf, message: String },
    #[error("{0}")]
    InternalError(String),
}
