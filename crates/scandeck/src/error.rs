//! Service error type.
//!
//! One enum covers everything a request handler can surface. Image decode and
//! repair failures never appear here: those are absorbed inside the imaging
//! modules and reported through degraded results instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("unsafe filename: {0}")]
    UnsafeFilename(String),

    #[error("no such artifact: {0}")]
    NotFound(String),

    #[error("upload of {size} bytes exceeds the {limit} byte limit")]
    UploadTooLarge { size: u64, limit: u64 },

    #[error("uploads with extension '{0}' are not accepted")]
    DisallowedExtension(String),

    #[error("internal error: {0}")]
    Internal(String),
}

// Convenient crate-wide result type
pub type Result<T> = std::result::Result<T, ServiceError>;
