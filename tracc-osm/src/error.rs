#[derive(thiserror::Error, Debug)]
pub enum OsmError {
    #[error("failure reading PBF extract '{path}': {source}")]
    PbfReadError { path: String, source: osmpbf::Error },
    #[error("walk network from '{0}' is empty after filtering")]
    EmptyNetworkError(String),
    #[error("way references node id {0} which is not present in the extract")]
    MissingNodeError(i64),
    #[error("{0}")]
    InternalError(String),
}
