//! Errors surfaced by the command-line tool.

use covenant_core::ContractError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for demo operations.
pub type DemoResult<T> = Result<T, DemoError>;

#[derive(Debug, Error)]
pub enum DemoError {
    #[error(transparent)]
    Contract(#[from] ContractError),

    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("JSON {kind} values have no counterpart")]
    UnsupportedJson { kind: &'static str },
}

impl DemoError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns true if the error is a failed check rather than a usage or
    /// input problem.
    pub fn is_violation(&self) -> bool {
        matches!(self, DemoError::Contract(err) if err.is_violation())
    }
}
