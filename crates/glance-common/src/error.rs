//! Error types for Project Glance.

use thiserror::Error;

/// Top-level error type for Glance operations.
#[derive(Debug, Error)]
pub enum GlanceError {
    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Schema version string could not be parsed
    #[error("Invalid schema version '{0}'")]
    InvalidVersion(String),

    /// Schema version mismatch
    #[error("Schema version mismatch: expected {expected}, got {actual}")]
    VersionMismatch {
        /// Expected version
        expected: String,
        /// Actual version found
        actual: String,
    },
}

/// Result type alias for Glance operations.
pub type GlanceResult<T> = Result<T, GlanceError>;
