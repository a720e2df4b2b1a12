//! Raster image handling for stored artifacts.
//!
//! Scanner output is written by an external process and arrives truncated
//! often enough to matter (paper jams, USB resets, the tool being killed
//! mid-page). This module detects such files, salvages what is decodable, and
//! derives the bounded-size previews the catalog serves.
//!
//! Nothing in here surfaces an error to a request handler: decode failures are
//! absorbed into booleans and degraded references.

pub mod integrity;
pub mod thumbs;

pub use integrity::{is_truncated, repair, tolerant_decode};
pub use thumbs::{get_or_create, thumbnail_name};
