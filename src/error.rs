//! Error type for the fallible edges of the crate.
//!
//! Rendering itself never fails; these errors come from loading configuration,
//! listing pages on disk, generating stylesheets, and the CLI's output formats.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid config: {0}")]
    ConfigText(#[from] serde_yaml::Error),

    #[error("page directory not found: {0}")]
    PagesDirNotFound(PathBuf),

    #[error("unknown highlight theme: {0}")]
    UnknownTheme(String),

    #[error("stylesheet generation failed: {0}")]
    Stylesheet(#[from] syntect::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
