//! Error types for bardeval-core

use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by an [`EvalPlatform`](crate::platform::EvalPlatform) implementation.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// Transport-level failure (connect, timeout, TLS)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Platform answered with a non-success status
    #[error("platform returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body could not be decoded
    #[error("failed to decode platform response: {0}")]
    Decode(String),

    /// Referenced entity does not exist platform-side
    #[error("{entity} not found: {name}")]
    NotFound { entity: &'static str, name: String },

    /// Platform refused the request payload
    #[error("platform rejected request: {0}")]
    Rejected(String),

    /// Client could not be constructed
    #[error("client configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for PlatformError {
    fn from(err: serde_json::Error) -> Self {
        PlatformError::Decode(err.to_string())
    }
}

/// Errors that abort the evaluation flow, or fail a single check registration.
#[derive(Error, Debug)]
pub enum FlowError {
    #[error("platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("project not found: {0}")]
    ProjectNotFound(String),

    #[error("{name}: Failed to upload check {source}")]
    CheckUpload {
        name: String,
        #[source]
        source: PlatformError,
    },

    #[error("{name}: check generation returned no code")]
    EmptyGeneratedCheck { name: String },

    #[error("{} check(s) failed to register: {}", .failed.len(), .failed.join(", "))]
    ChecksFailed { failed: Vec<String> },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid seed file {}: {source}", .path.display())]
    SeedFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for flow operations.
pub type Result<T> = std::result::Result<T, FlowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checks_failed_lists_names() {
        let err = FlowError::ChecksFailed {
            failed: vec!["custom.Archaic".to_string(), "custom.Poetic".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "2 check(s) failed to register: custom.Archaic, custom.Poetic"
        );
    }

    #[test]
    fn check_upload_wraps_platform_error() {
        let err = FlowError::CheckUpload {
            name: "custom.Poetic".to_string(),
            source: PlatformError::Status {
                status: 422,
                body: "bad prompt".to_string(),
            },
        };
        assert_eq!(
            err.to_string(),
            "custom.Poetic: Failed to upload check platform returned HTTP 422: bad prompt"
        );
    }

    #[test]
    fn serde_error_becomes_decode() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: PlatformError = json_err.into();
        assert!(matches!(err, PlatformError::Decode(_)));
    }
}
