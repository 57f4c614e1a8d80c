use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, WeftError>;

#[derive(Debug, Error)]
pub enum WeftError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse requirements document: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid config {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("node not found: {0}")]
    NodeNotFound(String),

    #[error("no cached graph for feature: {0}")]
    UnknownFeature(String),
}

impl WeftError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
