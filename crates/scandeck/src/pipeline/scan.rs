//! Scan-and-store pipeline.
//!
//! One request walks through: resolve output filename, ensure the scans
//! directory, invoke the scan executable, integrity-check raster output and
//! repair once if truncated, report the outcome. The scanner's exit code is
//! reported verbatim; repair neither retries the scan nor changes the code.

use crate::config::ServiceConfig;
use crate::error::Result;
use crate::exec;
use crate::imaging;
use crate::locks::PathLocks;
use scandeck_protocol::{naming, ScanRequest, ScanResult};
use std::path::Path;
use tracing::{info, warn};

// Fixed page geometry in millimeters: full A4-width flatbed pass. Not
// user-configurable; the front end crops afterwards if needed.
const PAGE_LEFT_MM: &str = "0";
const PAGE_TOP_MM: &str = "0";
const PAGE_WIDTH_MM: &str = "211";
const PAGE_HEIGHT_MM: &str = "297";

/// Execute one scan request and store its output.
pub async fn execute(
    config: &ServiceConfig,
    locks: &PathLocks,
    req: &ScanRequest,
) -> Result<ScanResult> {
    // A caller-supplied filename wins verbatim, extension included.
    let filename = match &req.filename {
        Some(name) => name.clone(),
        None => naming::unique_filename(&config.scans_dir, req.format.extension()),
    };

    config.ensure_scans_dir()?;

    let _guard = locks.lock(&filename).await;

    let output_path = config.artifact_path(&filename);
    let args = build_args(config, req, &output_path);
    let outcome = exec::run(&config.scan_bin, &args).await?;
    info!(
        "Scan finished with code {} for {}",
        outcome.exit_code, filename
    );

    // The scanner may exit nonzero and still leave a partially written file;
    // check raster output regardless of the exit code.
    if req.format.is_raster() && output_path.is_file() {
        let path = output_path.clone();
        let checked = tokio::task::spawn_blocking(move || {
            if imaging::is_truncated(&path) {
                imaging::repair(&path);
            }
        })
        .await;
        if let Err(err) = checked {
            warn!("Integrity pass for {} did not complete: {}", filename, err);
        }
    }

    Ok(ScanResult {
        code: outcome.exit_code,
        detail: outcome.detail().to_string(),
        filename,
    })
}

fn build_args(config: &ServiceConfig, req: &ScanRequest, output_path: &Path) -> Vec<String> {
    vec![
        "--mode".to_string(),
        req.mode.to_string(),
        "-l".to_string(),
        PAGE_LEFT_MM.to_string(),
        "-t".to_string(),
        PAGE_TOP_MM.to_string(),
        "-x".to_string(),
        PAGE_WIDTH_MM.to_string(),
        "-y".to_string(),
        PAGE_HEIGHT_MM.to_string(),
        format!("--resolution={}", req.resolution),
        format!("--format={}", req.format),
        format!("--buffer-size={}", config.buffer_size),
        // The output flag is concatenated with the path, no separating space.
        format!("-o{}", output_path.display()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use scandeck_protocol::{ScanFormat, ScanMode};
    use std::path::PathBuf;

    fn request(format: ScanFormat) -> ScanRequest {
        ScanRequest {
            mode: ScanMode::Color,
            resolution: "300".to_string(),
            format,
            filename: None,
        }
    }

    #[test]
    fn argument_order_matches_the_scanner_contract() {
        let config = ServiceConfig {
            scans_dir: PathBuf::from("/data/scans"),
            buffer_size: 32,
            ..ServiceConfig::default()
        };
        let args = build_args(&config, &request(ScanFormat::Png), Path::new("/data/scans/x.png"));
        assert_eq!(
            args,
            vec![
                "--mode",
                "color",
                "-l",
                "0",
                "-t",
                "0",
                "-x",
                "211",
                "-y",
                "297",
                "--resolution=300",
                "--format=png",
                "--buffer-size=32",
                "-o/data/scans/x.png",
            ]
        );
    }

    #[test]
    fn jpeg_request_keeps_format_name_but_jpg_extension() {
        let config = ServiceConfig::default();
        let req = request(ScanFormat::Jpeg);
        let args = build_args(&config, &req, Path::new("/tmp/a.jpg"));
        assert!(args.contains(&"--format=jpeg".to_string()));
        assert_eq!(req.format.extension(), "jpg");
    }
}
