//! Default constants shared by the service binary and clients.

/// Default HTTP bind address.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5520";

/// Default scans directory, relative to the working directory.
pub const DEFAULT_SCANS_DIR: &str = "scans";

/// Default scan executable input buffer size, in kilobytes.
pub const DEFAULT_BUFFER_SIZE: u32 = 32;

/// External executables driven by the pipelines.
pub const DEFAULT_SCAN_BIN: &str = "scanimage";
pub const DEFAULT_MERGE_BIN: &str = "convert";
pub const DEFAULT_PRINT_BIN: &str = "lp";

/// Subdirectory of the scans directory holding cached thumbnails.
pub const THUMBS_DIR: &str = "thumbs";

/// Suffix appended to an artifact name to form its thumbnail name.
pub const THUMB_SUFFIX: &str = ".thumb.jpg";

/// Thumbnails fit within this bounding box, aspect ratio preserved.
pub const THUMB_MAX_DIM: u32 = 128;

/// Maximum accepted upload size in bytes.
pub const DEFAULT_UPLOAD_LIMIT: u64 = 50 * 1024 * 1024;
