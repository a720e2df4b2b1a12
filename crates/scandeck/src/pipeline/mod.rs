//! Request pipelines.
//!
//! Each pipeline sequences external process execution and file/image
//! operations for one request: scan-and-store, merge-to-PDF, print. They are
//! invoked by the HTTP layer and hold the per-filename locks themselves.

pub mod merge;
pub mod print;
pub mod scan;
