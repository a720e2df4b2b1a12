//! Service configuration.
//!
//! Built once in `main` from CLI arguments and environment, then passed by
//! `Arc` through the request state. There is no global settings object.

use scandeck_protocol::defaults;
use std::io;
use std::path::PathBuf;

/// Canonical service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// HTTP bind address, e.g. `0.0.0.0:5520`.
    pub bind_addr: String,
    /// Destination directory for stored artifacts.
    pub scans_dir: PathBuf,
    /// Scanner input buffer size in kilobytes, passed to the scan executable.
    pub buffer_size: u32,
    /// Scan executable (scanimage-compatible argument contract).
    pub scan_bin: String,
    /// Merge executable (ImageMagick convert-compatible argument contract).
    pub merge_bin: String,
    /// Print executable (lp-compatible argument contract).
    pub print_bin: String,
    /// Maximum accepted upload size in bytes.
    pub upload_limit: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: defaults::DEFAULT_BIND_ADDR.to_string(),
            scans_dir: PathBuf::from(defaults::DEFAULT_SCANS_DIR),
            buffer_size: defaults::DEFAULT_BUFFER_SIZE,
            scan_bin: defaults::DEFAULT_SCAN_BIN.to_string(),
            merge_bin: defaults::DEFAULT_MERGE_BIN.to_string(),
            print_bin: defaults::DEFAULT_PRINT_BIN.to_string(),
            upload_limit: defaults::DEFAULT_UPLOAD_LIMIT,
        }
    }
}

impl ServiceConfig {
    /// Create the scans directory if it does not exist yet.
    pub fn ensure_scans_dir(&self) -> io::Result<()> {
        std::fs::create_dir_all(&self.scans_dir)
    }

    /// Absolute or relative path of a named artifact inside the scans
    /// directory. Callers must have sanitized `filename` beforehand.
    pub fn artifact_path(&self, filename: &str) -> PathBuf {
        self.scans_dir.join(filename)
    }
}
