//! Disk-cached thumbnails for catalog listings.
//!
//! Thumbnail paths are deterministic: `thumbs/<filename>.thumb.jpg` under the
//! scans directory. A thumbnail that exists is never regenerated; one that
//! cannot be generated degrades to the original filename so the front end
//! shows the full image instead.

use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use scandeck_protocol::defaults::{THUMBS_DIR, THUMB_MAX_DIM, THUMB_SUFFIX};
use scandeck_protocol::ThumbnailRef;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use super::integrity;

const JPEG_QUALITY: u8 = 85;

/// Thumbnail filename for an artifact, e.g. `a.png` -> `a.png.thumb.jpg`.
pub fn thumbnail_name(filename: &str) -> String {
    format!("{}{}", filename, THUMB_SUFFIX)
}

/// Relative reference served to clients.
fn thumbnail_rel(filename: &str) -> String {
    format!("{}/{}", THUMBS_DIR, thumbnail_name(filename))
}

/// Return the thumbnail reference for an artifact, generating the file on
/// first access.
///
/// PDFs short-circuit to [`ThumbnailRef::None`]; a cache hit returns without
/// touching the source image, even if it changed since.
pub fn get_or_create(scans_dir: &Path, filename: &str) -> ThumbnailRef {
    if filename.to_ascii_lowercase().ends_with(".pdf") {
        return ThumbnailRef::None;
    }

    let thumb_path = scans_dir.join(THUMBS_DIR).join(thumbnail_name(filename));
    if thumb_path.exists() {
        debug!("Thumbnail cache hit for {}", filename);
        return ThumbnailRef::Generated(thumbnail_rel(filename));
    }

    match generate(scans_dir, filename, &thumb_path) {
        Ok(()) => ThumbnailRef::Generated(thumbnail_rel(filename)),
        Err(err) => {
            warn!("Thumbnail generation failed for {}: {:#}", filename, err);
            ThumbnailRef::Degraded(filename.to_string())
        }
    }
}

fn generate(scans_dir: &Path, filename: &str, thumb_path: &Path) -> Result<()> {
    if let Some(parent) = thumb_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let source = integrity::tolerant_decode(&scans_dir.join(filename))?;
    let thumb = source.thumbnail(THUMB_MAX_DIM, THUMB_MAX_DIM).to_rgb8();

    // Encode fully in memory so a failure leaves no partial file behind.
    let mut encoded = Vec::new();
    thumb
        .write_with_encoder(JpegEncoder::new_with_quality(&mut encoded, JPEG_QUALITY))
        .context("JPEG encode failed")?;
    fs::write(thumb_path, &encoded)
        .with_context(|| format!("Failed to write {}", thumb_path.display()))?;
    Ok(())
}
