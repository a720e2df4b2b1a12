//! Shared contract between the scandeck service and its clients.
//!
//! The service stores scan artifacts as plain files under one scans
//! directory; this crate defines the JSON payloads of the HTTP API, the
//! filename allocation/sanitization rules for those files, and the default
//! constants both sides agree on.

pub mod defaults;
pub mod naming;
pub mod types;

// Re-export types for convenience
pub use types::{
    ErrorResponse,
    HealthResponse,
    MergeRequest,
    MergeResult,
    PrintOrientation,
    PrintQuality,
    PrintRequest,
    PrintResult,
    PrintSides,
    ScanFormat,
    ScanList,
    ScanListItem,
    ScanMode,
    ScanRequest,
    ScanResult,
    ThumbnailRef,
};

pub use naming::{
    ensure_pdf_extension, has_artifact_extension, is_safe_artifact_name, scan_filename,
    unique_filename,
};
