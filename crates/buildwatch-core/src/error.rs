//! Error types for the buildwatch system
//!
//! This module defines all error types used throughout the crate.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for buildwatch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for change detection and labeling
#[derive(Error, Debug)]
pub enum Error {
    /// The repository root of a filesystem source does not exist
    #[error("Directory not found: {}", .path.display())]
    DirectoryNotFound {
        /// The missing directory
        path: PathBuf,
    },

    /// A backend (remote endpoint, working copy) could not be reached
    #[error("Source '{source_name}' unavailable: {message}")]
    BackendUnavailable {
        /// Name of the source that failed
        source_name: String,
        /// Error message
        message: String,
    },

    /// A backend could not apply a label
    #[error("Source '{source_name}' failed to apply label '{label}': {message}")]
    LabelFailure {
        /// Name of the source that failed
        source_name: String,
        /// The label being applied
        label: String,
        /// Error message
        message: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// No factory registered for a source type
    #[error("Unknown source type: {0}")]
    UnknownSourceType(String),

    /// Filesystem I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a "directory not found" error
    pub fn directory_not_found(path: impl Into<PathBuf>) -> Self {
        Self::DirectoryNotFound { path: path.into() }
    }

    /// Create a backend unavailable error
    pub fn backend_unavailable(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BackendUnavailable {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Create a label failure error
    pub fn label_failure(
        source_name: impl Into<String>,
        label: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::LabelFailure {
            source_name: source_name.into(),
            label: label.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an unknown source type error
    pub fn unknown_source_type(name: impl Into<String>) -> Self {
        Self::UnknownSourceType(name.into())
    }

    /// Whether this error means the underlying repository could not be reached
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::DirectoryNotFound { .. } | Self::BackendUnavailable { .. }
        )
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
