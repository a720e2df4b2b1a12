//! Integrity checking and best-effort repair of raster artifacts.
//!
//! A file is "truncated" when a strict full decode fails for any reason.
//! Repair re-decodes in a tolerant mode and rewrites the file in place:
//!
//! - PNG: row-wise salvage. Every row decoded before the stream broke is
//!   kept, the remainder stays blank, and the result is re-encoded as a
//!   well-formed file.
//! - JPEG: the byte stream is patched with a trailing EOI marker and decoded
//!   again; many truncated scans become decodable once the end of the
//!   entropy-coded segment is marked.
//!
//! Repair is best-effort. On failure it logs and returns; callers re-attempt
//! whatever operation originally failed and accept a second failure as final.

use anyhow::{bail, Context, Result};
use image::{DynamicImage, ImageFormat, ImageReader};
use std::fs;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info, warn};

/// JPEG end-of-image marker.
const JPEG_EOI: [u8; 2] = [0xFF, 0xD9];

/// Returns true when the file cannot be fully decoded.
///
/// Format errors, truncated streams and I/O errors all collapse into `true`;
/// no decode error escapes.
pub fn is_truncated(path: &Path) -> bool {
    let reader = match ImageReader::open(path).and_then(|r| r.with_guessed_format()) {
        Ok(reader) => reader,
        Err(err) => {
            debug!("Integrity check could not open {}: {}", path.display(), err);
            return true;
        }
    };
    match reader.decode() {
        Ok(_) => false,
        Err(err) => {
            debug!("Integrity check failed for {}: {}", path.display(), err);
            true
        }
    }
}

/// Re-decode `path` tolerantly and rewrite it in place as a well-formed file.
///
/// Never fails from the caller's point of view; the outcome is logged.
pub fn repair(path: &Path) {
    match salvage_to_disk(path) {
        Ok(()) => info!("Repaired truncated image {}", path.display()),
        Err(err) => warn!("Could not repair {}: {:#}", path.display(), err),
    }
}

fn salvage_to_disk(path: &Path) -> Result<()> {
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let format = image::guess_format(&bytes).context("Unrecognized image format")?;
    let recovered = tolerant_decode_bytes(&bytes, format)?;

    match format {
        // JPEG carries no alpha channel.
        ImageFormat::Jpeg => recovered
            .to_rgb8()
            .save_with_format(path, ImageFormat::Jpeg)?,
        other => recovered.save_with_format(path, other)?,
    }
    Ok(())
}

/// Decode an artifact, tolerating a truncated byte stream.
///
/// Used by the repairer and by thumbnail generation, which must render a
/// preview even for files the strict decoder rejects.
pub fn tolerant_decode(path: &Path) -> Result<DynamicImage> {
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let format = image::guess_format(&bytes).context("Unrecognized image format")?;
    tolerant_decode_bytes(&bytes, format)
}

fn tolerant_decode_bytes(bytes: &[u8], format: ImageFormat) -> Result<DynamicImage> {
    // The strict path first; most files are fine.
    if let Ok(img) = image::load_from_memory_with_format(bytes, format) {
        return Ok(img);
    }
    match format {
        ImageFormat::Png => salvage_png(bytes),
        ImageFormat::Jpeg => salvage_jpeg(bytes),
        other => bail!("no tolerant decoder for {:?}", other),
    }
}

/// Keep every PNG row the decoder produces before the stream breaks.
fn salvage_png(bytes: &[u8]) -> Result<DynamicImage> {
    let mut decoder = png::Decoder::new(Cursor::new(bytes));
    decoder.set_transformations(png::Transformations::normalize_to_color8());
    let mut reader = decoder.read_info().context("PNG header unreadable")?;

    let info = reader.info();
    if info.interlaced {
        bail!("interlaced PNG salvage is not supported");
    }
    let width = info.width;
    let height = info.height;
    let line_size = reader.output_line_size(width);

    let mut data = vec![0u8; line_size * height as usize];
    let mut rows_done: u32 = 0;
    while rows_done < height {
        match reader.next_row() {
            Ok(Some(row)) => {
                let start = rows_done as usize * line_size;
                data[start..start + row.data().len()].copy_from_slice(row.data());
                rows_done += 1;
            }
            Ok(None) => break,
            // The truncation point. Everything before it is good.
            Err(err) => {
                debug!("PNG stream broke after {} rows: {}", rows_done, err);
                break;
            }
        }
    }
    if rows_done == 0 {
        bail!("no decodable rows");
    }

    let (color, _depth) = reader.output_color_type();
    let image = match color {
        png::ColorType::Grayscale => image::GrayImage::from_raw(width, height, data)
            .map(DynamicImage::ImageLuma8),
        png::ColorType::GrayscaleAlpha => image::GrayAlphaImage::from_raw(width, height, data)
            .map(DynamicImage::ImageLumaA8),
        png::ColorType::Rgb => {
            image::RgbImage::from_raw(width, height, data).map(DynamicImage::ImageRgb8)
        }
        png::ColorType::Rgba => {
            image::RgbaImage::from_raw(width, height, data).map(DynamicImage::ImageRgba8)
        }
        png::ColorType::Indexed => bail!("indexed PNG not expanded by decoder"),
    };
    image.context("salvaged buffer has unexpected size")
}

/// Patch a truncated JPEG with an end-of-image marker and decode again.
fn salvage_jpeg(bytes: &[u8]) -> Result<DynamicImage> {
    let mut patched = Vec::with_capacity(bytes.len() + JPEG_EOI.len());
    patched.extend_from_slice(bytes);
    patched.extend_from_slice(&JPEG_EOI);
    image::load_from_memory_with_format(&patched, ImageFormat::Jpeg)
        .context("JPEG not decodable even with EOI patch")
}
