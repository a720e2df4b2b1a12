//! Artifact filename rules.
//!
//! Generated names are `<YYYYMMDD-HHMMSS>_<NN>.<ext>` with a 2-3 digit random
//! suffix, so two requests landing in the same second stay distinct. Client
//! supplied names are accepted verbatim but must pass [`is_safe_artifact_name`]
//! before they touch the filesystem.

use chrono::Local;
use rand::Rng;
use std::path::Path;

/// Extensions the catalog recognizes as stored artifacts.
pub const ARTIFACT_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "pdf"];

/// Returns true if a client-supplied filename is safe to join onto the scans
/// directory: no path separators, no parent components, not hidden, not empty.
pub fn is_safe_artifact_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains("..")
        && !name.contains(['/', '\\'])
        && !name.contains('\0')
}

/// Returns true if `name` carries one of the recognized artifact extensions.
pub fn has_artifact_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            ARTIFACT_EXTENSIONS.iter().any(|known| *known == ext)
        })
        .unwrap_or(false)
}

/// Generate a timestamped artifact name with the given extension.
pub fn scan_filename(extension: &str) -> String {
    let stamp = Local::now().format("%Y%m%d-%H%M%S");
    let suffix: u32 = rand::thread_rng().gen_range(10..1000);
    format!("{}_{}.{}", stamp, suffix, extension)
}

/// Generate a timestamped artifact name that does not collide with an existing
/// file in `dir`. The random suffix is re-rolled until the name is free; the
/// existence check runs against the actual target directory.
pub fn unique_filename(dir: &Path, extension: &str) -> String {
    loop {
        let candidate = scan_filename(extension);
        if !dir.join(&candidate).exists() {
            return candidate;
        }
    }
}

/// Append `.pdf` to a merge target unless it already carries it.
pub fn ensure_pdf_extension(target: &str) -> String {
    if target.to_ascii_lowercase().ends_with(".pdf") {
        target.to_string()
    } else {
        format!("{}.pdf", target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn scan_filename_matches_expected_pattern() {
        let name = scan_filename("png");
        // YYYYMMDD-HHMMSS_NN.png
        let (stem, ext) = name.split_once('.').unwrap();
        assert_eq!(ext, "png");
        let (stamp, suffix) = stem.split_once('_').unwrap();
        assert_eq!(stamp.len(), 15);
        assert_eq!(&stamp[8..9], "-");
        assert!(stamp[..8].chars().all(|c| c.is_ascii_digit()));
        assert!(stamp[9..].chars().all(|c| c.is_ascii_digit()));
        assert!(suffix.len() == 2 || suffix.len() == 3);
        assert!(suffix.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn unique_filename_avoids_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        // Fill a handful of names; the allocator must come back with a fresh one.
        for _ in 0..8 {
            let taken = scan_filename("png");
            fs::write(dir.path().join(taken), b"x").unwrap();
        }
        let name = unique_filename(dir.path(), "png");
        assert!(!dir.path().join(&name).exists());
    }

    #[test]
    fn safe_artifact_names() {
        assert!(is_safe_artifact_name("20240101-120000_42.png"));
        assert!(is_safe_artifact_name("letter.pdf"));
        assert!(!is_safe_artifact_name(""));
        assert!(!is_safe_artifact_name(".hidden"));
        assert!(!is_safe_artifact_name("../etc/passwd"));
        assert!(!is_safe_artifact_name("a/b.png"));
        assert!(!is_safe_artifact_name("a\\b.png"));
    }

    #[test]
    fn artifact_extension_filter() {
        assert!(has_artifact_extension("a.png"));
        assert!(has_artifact_extension("a.JPG"));
        assert!(has_artifact_extension("b.pdf"));
        assert!(!has_artifact_extension("notes.txt"));
        assert!(!has_artifact_extension("noext"));
    }

    #[test]
    fn pdf_extension_appended_once() {
        assert_eq!(ensure_pdf_extension("out"), "out.pdf");
        assert_eq!(ensure_pdf_extension("out.pdf"), "out.pdf");
        assert_eq!(ensure_pdf_extension("out.PDF"), "out.PDF");
    }
}
