use crate::entity::error::ScheduleError;
use std::path::PathBuf;
use thiserror::Error;
use yaml_rust::ScanError;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML error in {path:?}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: ScanError,
    },

    #[error("YAML emit error: {0}")]
    Emit(String),

    #[error("malformed document {path:?}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

impl RepositoryError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RepositoryError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        RepositoryError::Malformed {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
