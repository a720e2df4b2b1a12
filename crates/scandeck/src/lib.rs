//! scandeck service library.
//!
//! Drives a physical document scanner and printer through external
//! command-line tools, stores produced images/PDFs under one scans directory,
//! detects and best-effort-repairs truncated raster output, derives cached
//! thumbnails, and merges page images into PDFs. The HTTP layer in [`api`] is
//! a thin adapter over the pipeline modules.

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod exec;
pub mod imaging;
pub mod locks;
pub mod pipeline;

pub use api::{router, AppState};
pub use catalog::ScanCatalog;
pub use config::ServiceConfig;
pub use error::ServiceError;
pub use locks::PathLocks;
