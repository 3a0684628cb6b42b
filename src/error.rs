//! Crate error type
//!
//! Only storage and configuration paths can fail. The simulation itself
//! never returns errors; it clamps and falls back instead.

use std::path::PathBuf;

/// Errors from level storage, config and leaderboard files.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Filesystem failure.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Level id does not carry a level number.
    #[error("Invalid level id: {0}")]
    InvalidLevelId(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
