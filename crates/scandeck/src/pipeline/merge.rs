//! PDF merge pipeline.
//!
//! Merges an ordered set of stored page images into one PDF through the merge
//! executable. Merge tools fail wholesale on any single truncated page and
//! report it as text rather than a dedicated exit code, so the retry rule is:
//! on nonzero exit or a corrupt-data marker in the combined output, repair
//! every input and re-run exactly once. The second outcome is final.

use crate::config::ServiceConfig;
use crate::error::{Result, ServiceError};
use crate::exec::{self, ProcessOutcome};
use crate::imaging;
use crate::locks::PathLocks;
use scandeck_protocol::{naming, MergeRequest, MergeResult};
use tracing::{info, warn};

/// Substrings in the merge tool's output that mean a page image was corrupt
/// or incomplete. Matched case-insensitively against stdout+stderr.
const DATA_ERROR_MARKERS: &[&str] = &["not enough image data", "insufficient image data"];

/// Execute one merge request.
pub async fn execute(
    config: &ServiceConfig,
    locks: &PathLocks,
    req: &MergeRequest,
) -> Result<MergeResult> {
    if req.filenames.is_empty() {
        return Err(ServiceError::InvalidRequest(
            "merge needs at least one input file".to_string(),
        ));
    }

    let target = match &req.target {
        Some(name) => naming::ensure_pdf_extension(name),
        None => naming::unique_filename(&config.scans_dir, "pdf"),
    };

    config.ensure_scans_dir()?;

    let _guard = locks.lock(&target).await;

    // Input order is page order.
    let mut args: Vec<String> = req
        .filenames
        .iter()
        .map(|name| config.artifact_path(name).display().to_string())
        .collect();
    args.push(config.artifact_path(&target).display().to_string());

    let first = exec::run(&config.merge_bin, &args).await?;
    if !needs_retry(&first) {
        return Ok(result(first, target));
    }

    warn!(
        "Merge into {} reported corrupt page data, repairing {} input(s) and retrying",
        target,
        req.filenames.len()
    );
    for name in &req.filenames {
        // The target's lock is already held; an input listed under the same
        // name is the output being rebuilt, not a page to salvage.
        if name == &target {
            continue;
        }
        let _input_guard = locks.lock(name).await;
        let path = config.artifact_path(name);
        let repaired = tokio::task::spawn_blocking(move || imaging::repair(&path)).await;
        if let Err(err) = repaired {
            warn!("Repair task for {} did not complete: {}", name, err);
        }
    }

    let second = exec::run(&config.merge_bin, &args).await?;
    info!(
        "Merge retry for {} finished with code {}",
        target, second.exit_code
    );
    Ok(result(second, target))
}

fn needs_retry(outcome: &ProcessOutcome) -> bool {
    if !outcome.success() {
        return true;
    }
    let combined = outcome.combined().to_lowercase();
    DATA_ERROR_MARKERS
        .iter()
        .any(|marker| combined.contains(marker))
}

fn result(outcome: ProcessOutcome, target: String) -> MergeResult {
    MergeResult {
        returncode: outcome.exit_code,
        detail: outcome.detail().to_string(),
        filename: target,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(exit_code: i32, stdout: &str, stderr: &str) -> ProcessOutcome {
        ProcessOutcome {
            exit_code,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        }
    }

    #[test]
    fn nonzero_exit_triggers_retry() {
        assert!(needs_retry(&outcome(1, "", "")));
    }

    #[test]
    fn data_marker_triggers_retry_even_on_zero_exit() {
        assert!(needs_retry(&outcome(
            0,
            "",
            "convert: Not enough image data `p1.png'"
        )));
        assert!(needs_retry(&outcome(
            0,
            "insufficient image data in file",
            ""
        )));
    }

    #[test]
    fn clean_run_does_not_retry() {
        assert!(!needs_retry(&outcome(0, "4 pages written", "")));
    }

    #[tokio::test]
    async fn empty_input_set_is_rejected() {
        let config = ServiceConfig::default();
        let locks = PathLocks::new();
        let req = MergeRequest {
            target: None,
            filenames: vec![],
        };
        let err = execute(&config, &locks, &req).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidRequest(_)));
    }
}
