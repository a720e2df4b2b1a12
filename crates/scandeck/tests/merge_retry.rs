//! Merge pipeline retry law against a fake merge executable.

#![cfg(unix)]

use image::{ImageFormat, RgbImage};
use scandeck::locks::PathLocks;
use scandeck::pipeline::merge;
use scandeck::ServiceConfig;
use scandeck_protocol::MergeRequest;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

/// Fake merge tool that fails its first invocation with a corrupt-data
/// message and succeeds afterwards, counting attempts in a side file.
fn flaky_merger(dir: &Path) -> String {
    let script = dir.join("fake-convert");
    let counter = dir.join("attempts");
    let body = format!(
        "#!/bin/sh\n\
         count=$(cat \"{counter}\" 2>/dev/null || echo 0)\n\
         count=$((count+1))\n\
         echo \"$count\" > \"{counter}\"\n\
         if [ \"$count\" -eq 1 ]; then\n\
           echo \"convert: Not enough image data\" >&2\n\
           exit 1\n\
         fi\n\
         for last in \"$@\"; do :; done\n\
         printf '%%PDF-1.4\\n' > \"$last\"\n\
         echo \"pages merged\"\n",
        counter = counter.display(),
    );
    fs::write(&script, body).unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
    script.display().to_string()
}

/// Fake merge tool that always succeeds.
fn clean_merger(dir: &Path) -> String {
    let script = dir.join("fake-convert-ok");
    let counter = dir.join("ok-attempts");
    let body = format!(
        "#!/bin/sh\n\
         count=$(cat \"{counter}\" 2>/dev/null || echo 0)\n\
         echo $((count+1)) > \"{counter}\"\n\
         for last in \"$@\"; do :; done\n\
         printf '%%PDF-1.4\\n' > \"$last\"\n\
         echo \"pages merged\"\n",
        counter = counter.display(),
    );
    fs::write(&script, body).unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
    script.display().to_string()
}

fn store_page(dir: &Path, name: &str) {
    RgbImage::from_fn(64, 64, |x, y| image::Rgb([x as u8 * 3, y as u8 * 3, 77]))
        .save_with_format(dir.join(name), ImageFormat::Png)
        .unwrap();
}

fn truncate_page(dir: &Path, name: &str) {
    let path = dir.join(name);
    let bytes = fs::read(&path).unwrap();
    fs::write(&path, &bytes[..bytes.len() * 3 / 4]).unwrap();
}

fn attempts(dir: &Path, counter: &str) -> u32 {
    fs::read_to_string(dir.join(counter))
        .unwrap_or_default()
        .trim()
        .parse()
        .unwrap_or(0)
}

#[tokio::test]
async fn corrupt_input_triggers_repair_and_exactly_one_retry() {
    let dir = tempfile::tempdir().unwrap();
    let scans = dir.path().join("scans");
    fs::create_dir_all(&scans).unwrap();
    store_page(&scans, "p1.png");
    store_page(&scans, "p2.png");
    truncate_page(&scans, "p2.png");

    let config = ServiceConfig {
        scans_dir: scans.clone(),
        merge_bin: flaky_merger(dir.path()),
        ..ServiceConfig::default()
    };
    let locks = PathLocks::new();

    let req = MergeRequest {
        target: Some("bundle".to_string()),
        filenames: vec!["p1.png".to_string(), "p2.png".to_string()],
    };
    let result = merge::execute(&config, &locks, &req).await.unwrap();

    assert_eq!(result.returncode, 0);
    assert_eq!(result.filename, "bundle.pdf");
    assert_eq!(result.detail.trim(), "pages merged");
    assert!(scans.join("bundle.pdf").is_file());
    assert_eq!(attempts(dir.path(), "attempts"), 2);

    // The retry path repaired every input; the truncated page decodes again.
    image::open(scans.join("p2.png")).unwrap();
}

#[tokio::test]
async fn clean_merge_runs_once_with_allocated_target() {
    let dir = tempfile::tempdir().unwrap();
    let scans = dir.path().join("scans");
    fs::create_dir_all(&scans).unwrap();
    store_page(&scans, "p1.png");

    let config = ServiceConfig {
        scans_dir: scans.clone(),
        merge_bin: clean_merger(dir.path()),
        ..ServiceConfig::default()
    };
    let locks = PathLocks::new();

    let req = MergeRequest {
        target: None,
        filenames: vec!["p1.png".to_string()],
    };
    let result = merge::execute(&config, &locks, &req).await.unwrap();

    assert_eq!(result.returncode, 0);
    assert!(result.filename.ends_with(".pdf"));
    assert!(scans.join(&result.filename).is_file());
    assert_eq!(attempts(dir.path(), "ok-attempts"), 1);
}

#[tokio::test]
async fn persistent_failure_is_surfaced_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let scans = dir.path().join("scans");
    fs::create_dir_all(&scans).unwrap();
    store_page(&scans, "p1.png");

    let script = dir.path().join("fake-convert-bad");
    fs::write(
        &script,
        "#!/bin/sh\necho \"convert: Not enough image data\" >&2\nexit 1\n",
    )
    .unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

    let config = ServiceConfig {
        scans_dir: scans.clone(),
        merge_bin: script.display().to_string(),
        ..ServiceConfig::default()
    };
    let locks = PathLocks::new();

    let req = MergeRequest {
        target: Some("out.pdf".to_string()),
        filenames: vec!["p1.png".to_string()],
    };
    let result = merge::execute(&config, &locks, &req).await.unwrap();

    // Second failure is final and verbatim.
    assert_eq!(result.returncode, 1);
    assert!(result.detail.contains("Not enough image data"));
    assert!(!scans.join("out.pdf").exists());
}
