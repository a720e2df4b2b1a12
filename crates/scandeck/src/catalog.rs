//! Artifact catalog.
//!
//! The scans directory itself is the index: listing enumerates recognized
//! artifact files newest-first and attaches thumbnail references, generating
//! missing thumbnails on first access. Deletion removes an artifact together
//! with its cached thumbnail.

use crate::error::{Result, ServiceError};
use crate::imaging::{self, thumbnail_name};
use crate::locks::PathLocks;
use scandeck_protocol::defaults::THUMBS_DIR;
use scandeck_protocol::{naming, ScanListItem, ThumbnailRef};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::SystemTime;
use tracing::{info, warn};

/// Read/write view over the scans directory.
#[derive(Debug, Clone)]
pub struct ScanCatalog {
    scans_dir: PathBuf,
}

impl ScanCatalog {
    pub fn new(scans_dir: PathBuf) -> Self {
        Self { scans_dir }
    }

    /// Artifact filenames sorted by modification time, newest first.
    ///
    /// Only files with a recognized artifact extension count; the thumbs
    /// subdirectory and stray files are ignored. A missing scans directory is
    /// an empty catalog, not an error.
    pub fn artifact_names(&self) -> io::Result<Vec<String>> {
        let entries = match fs::read_dir(&self.scans_dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err),
        };

        let mut found: Vec<(String, SystemTime)> = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if !naming::has_artifact_extension(&name) {
                continue;
            }
            let modified = entry
                .metadata()?
                .modified()
                .unwrap_or(SystemTime::UNIX_EPOCH);
            found.push((name, modified));
        }

        found.sort_by(|a, b| b.1.cmp(&a.1));
        Ok(found.into_iter().map(|(name, _)| name).collect())
    }

    /// Full listing with thumbnail references, generating thumbnails for
    /// raster artifacts on first access. Generation runs under the artifact's
    /// advisory lock so concurrent listings do the work once.
    pub async fn list(&self, locks: &PathLocks) -> Result<Vec<ScanListItem>> {
        let catalog = self.clone();
        let names = tokio::task::spawn_blocking(move || catalog.artifact_names())
            .await
            .map_err(|err| ServiceError::Internal(err.to_string()))??;

        let mut items = Vec::with_capacity(names.len());
        for name in names {
            let _guard = locks.lock(&name).await;
            let dir = self.scans_dir.clone();
            let source = name.clone();
            let thumbnail = tokio::task::spawn_blocking(move || {
                imaging::get_or_create(&dir, &source)
            })
            .await
            .unwrap_or_else(|_| ThumbnailRef::Degraded(name.clone()));

            items.push(ScanListItem {
                filename: name,
                thumbnail: thumbnail.into(),
            });
        }
        Ok(items)
    }

    /// Delete an artifact and its thumbnail, if any.
    ///
    /// Returns whether the artifact existed; a repeated delete returns false
    /// and mutates nothing.
    pub async fn delete(&self, locks: &PathLocks, filename: &str) -> Result<bool> {
        let _guard = locks.lock(filename).await;
        let catalog = self.clone();
        let name = filename.to_string();
        tokio::task::spawn_blocking(move || catalog.delete_blocking(&name))
            .await
            .map_err(|err| ServiceError::Internal(err.to_string()))?
    }

    fn delete_blocking(&self, filename: &str) -> Result<bool> {
        let path = self.scans_dir.join(filename);
        if !path.is_file() {
            return Ok(false);
        }
        fs::remove_file(&path)?;
        info!("Deleted artifact {}", filename);

        if !filename.to_ascii_lowercase().ends_with(".pdf") {
            let thumb = self.scans_dir.join(THUMBS_DIR).join(thumbnail_name(filename));
            if thumb.is_file() {
                if let Err(err) = fs::remove_file(&thumb) {
                    warn!("Could not remove thumbnail of {}: {}", filename, err);
                }
            }
        }
        Ok(true)
    }
}
