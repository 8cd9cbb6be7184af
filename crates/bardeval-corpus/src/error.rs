//! Error types for bardeval-corpus

use std::path::PathBuf;

use thiserror::Error;

/// Errors from corpus splitting and fine-tune file generation
#[derive(Error, Debug)]
pub enum CorpusError {
    /// IO error on a specific path
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input directory holds no files
    #[error("no input files found in {}", .0.display())]
    EmptyInput(PathBuf),

    /// Boundary pattern failed to compile
    #[error("invalid boundary pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CorpusError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CorpusError::Io {
            path: path.into(),
            source,
        }
    }
}
