//! Print pipeline.
//!
//! Hands a stored artifact to the print executable with optional IPP-style
//! options. One attempt, outcome surfaced verbatim.

use crate::config::ServiceConfig;
use crate::error::{Result, ServiceError};
use crate::exec;
use scandeck_protocol::{PrintRequest, PrintResult};
use tracing::info;

/// Execute one print request.
pub async fn execute(config: &ServiceConfig, req: &PrintRequest) -> Result<PrintResult> {
    let path = config.artifact_path(&req.filename);
    if !path.is_file() {
        return Err(ServiceError::NotFound(req.filename.clone()));
    }

    let args = build_args(req, &path.display().to_string());
    let outcome = exec::run(&config.print_bin, &args).await?;
    info!(
        "Print of {} submitted with code {}",
        req.filename, outcome.exit_code
    );

    Ok(PrintResult {
        returncode: outcome.exit_code,
        detail: outcome.detail().to_string(),
        filename: req.filename.clone(),
    })
}

fn build_args(req: &PrintRequest, path: &str) -> Vec<String> {
    let mut args = Vec::new();
    if let Some(quality) = req.quality {
        args.push("-o".to_string());
        args.push(format!("print-quality={}", quality.ipp_value()));
    }
    if let Some(orientation) = req.orientation {
        args.push("-o".to_string());
        args.push(format!("orientation-requested={}", orientation.ipp_value()));
    }
    if let Some(sides) = req.sides {
        args.push("-o".to_string());
        args.push(format!("sides={}", sides.as_str()));
    }
    if let Some(pages) = &req.pages {
        args.push("-P".to_string());
        args.push(pages.clone());
    }
    args.push(path.to_string());
    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use scandeck_protocol::{PrintOrientation, PrintQuality, PrintSides};

    #[test]
    fn full_option_set_in_documented_order() {
        let req = PrintRequest {
            filename: "a.pdf".to_string(),
            quality: Some(PrintQuality::Best),
            orientation: Some(PrintOrientation::Landscape),
            sides: Some(PrintSides::TwoSidedLongEdge),
            pages: Some("1-3,5".to_string()),
        };
        assert_eq!(
            build_args(&req, "/scans/a.pdf"),
            vec![
                "-o",
                "print-quality=5",
                "-o",
                "orientation-requested=4",
                "-o",
                "sides=two-sided-long-edge",
                "-P",
                "1-3,5",
                "/scans/a.pdf",
            ]
        );
    }

    #[test]
    fn bare_request_is_just_the_path() {
        let req = PrintRequest {
            filename: "a.pdf".to_string(),
            quality: None,
            orientation: None,
            sides: None,
            pages: None,
        };
        assert_eq!(build_args(&req, "/scans/a.pdf"), vec!["/scans/a.pdf"]);
    }

    #[tokio::test]
    async fn missing_artifact_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServiceConfig {
            scans_dir: dir.path().to_path_buf(),
            ..ServiceConfig::default()
        };
        let req = PrintRequest {
            filename: "ghost.pdf".to_string(),
            quality: None,
            orientation: None,
            sides: None,
            pages: None,
        };
        let err = execute(&config, &req).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
