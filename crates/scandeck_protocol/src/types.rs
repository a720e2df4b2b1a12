//! Request/response payload types for the scandeck HTTP API.
//!
//! These are the wire shapes consumed by the browser front end and any CLI
//! client. All types use serde for JSON serialization; field names follow the
//! original service contract (`code` for scan results, `returncode` for merge,
//! print and listing results).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Canonical Enums
// ============================================================================

/// Scanner color mode, passed through to the scan executable's `--mode` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    #[default]
    Color,
    Gray,
    Lineart,
}

impl ScanMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanMode::Color => "color",
            ScanMode::Gray => "gray",
            ScanMode::Lineart => "lineart",
        }
    }
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ScanMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "color" => Ok(ScanMode::Color),
            "gray" => Ok(ScanMode::Gray),
            "lineart" => Ok(ScanMode::Lineart),
            _ => Err(format!(
                "Invalid scan mode: '{}'. Expected: color, gray, or lineart",
                s
            )),
        }
    }
}

/// Output format requested from the scan executable.
///
/// The format decides the extension of the stored artifact; note that `jpeg`
/// maps to the `.jpg` extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScanFormat {
    #[default]
    Png,
    Jpeg,
    Pdf,
}

impl ScanFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanFormat::Png => "png",
            ScanFormat::Jpeg => "jpeg",
            ScanFormat::Pdf => "pdf",
        }
    }

    /// File extension written for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ScanFormat::Png => "png",
            ScanFormat::Jpeg => "jpg",
            ScanFormat::Pdf => "pdf",
        }
    }

    /// Whether artifacts of this format are raster images that can be decoded,
    /// repaired and thumbnailed. PDFs are opaque to the image pipeline.
    pub fn is_raster(&self) -> bool {
        !matches!(self, ScanFormat::Pdf)
    }
}

impl fmt::Display for ScanFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Scan
// ============================================================================

/// One scan-and-store request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRequest {
    pub mode: ScanMode,
    /// Resolution in dpi, passed verbatim to the scan executable.
    pub resolution: String,
    pub format: ScanFormat,
    /// Explicit output filename. When present it wins verbatim, including its
    /// extension; when absent the service allocates a timestamped name.
    #[serde(default)]
    pub filename: Option<String>,
}

/// Outcome of a scan request. Immutable once produced.
///
/// `detail` carries the scan executable's stdout on success and its stderr on
/// failure; the HTTP status is 200 either way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    pub code: i32,
    pub detail: String,
    pub filename: String,
}

// ============================================================================
// PDF merge
// ============================================================================

/// Merge a set of stored page images into one PDF.
///
/// `filenames` order is significant: it is the page order of the output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeRequest {
    /// Target PDF name, with or without the `.pdf` suffix. Allocated when
    /// absent.
    #[serde(default)]
    pub target: Option<String>,
    pub filenames: Vec<String>,
}

/// Outcome of a merge request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeResult {
    pub returncode: i32,
    pub detail: String,
    pub filename: String,
}

// ============================================================================
// Print
// ============================================================================

/// Print quality mapped onto IPP `print-quality` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrintQuality {
    Draft,
    Normal,
    Best,
}

impl PrintQuality {
    /// IPP enum value for the print executable's `-o print-quality=` option.
    pub fn ipp_value(&self) -> u8 {
        match self {
            PrintQuality::Draft => 3,
            PrintQuality::Normal => 4,
            PrintQuality::Best => 5,
        }
    }
}

/// Page orientation mapped onto IPP `orientation-requested` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrintOrientation {
    Portrait,
    Landscape,
}

impl PrintOrientation {
    pub fn ipp_value(&self) -> u8 {
        match self {
            PrintOrientation::Portrait => 3,
            PrintOrientation::Landscape => 4,
        }
    }
}

/// Duplex selection for the print executable's `-o sides=` option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrintSides {
    OneSided,
    TwoSidedLongEdge,
    TwoSidedShortEdge,
}

impl PrintSides {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrintSides::OneSided => "one-sided",
            PrintSides::TwoSidedLongEdge => "two-sided-long-edge",
            PrintSides::TwoSidedShortEdge => "two-sided-short-edge",
        }
    }
}

/// Print a stored artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrintRequest {
    pub filename: String,
    #[serde(default)]
    pub quality: Option<PrintQuality>,
    #[serde(default)]
    pub orientation: Option<PrintOrientation>,
    #[serde(default)]
    pub sides: Option<PrintSides>,
    /// Page ranges in the print executable's own syntax, e.g. `1-4,7`.
    #[serde(default)]
    pub pages: Option<String>,
}

/// Outcome of a print request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrintResult {
    pub returncode: i32,
    pub detail: String,
    pub filename: String,
}

// ============================================================================
// Catalog listing
// ============================================================================

/// Reference clients use to fetch a preview of a stored artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThumbnailRef {
    /// Relative path of a generated (or cached) thumbnail file.
    Generated(String),
    /// No thumbnail could be produced; clients fall back to displaying the
    /// original artifact itself.
    Degraded(String),
    /// The artifact kind is never thumbnailed (PDF).
    None,
}

impl ThumbnailRef {
    /// Wire representation: the path to fetch, or empty when nothing applies.
    pub fn as_str(&self) -> &str {
        match self {
            ThumbnailRef::Generated(path) => path,
            ThumbnailRef::Degraded(original) => original,
            ThumbnailRef::None => "",
        }
    }
}

impl fmt::Display for ThumbnailRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<ThumbnailRef> for String {
    fn from(value: ThumbnailRef) -> Self {
        value.as_str().to_string()
    }
}

/// One catalog entry: the artifact plus its preview reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanListItem {
    pub filename: String,
    pub thumbnail: String,
}

/// Catalog listing, newest artifact first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanList {
    pub returncode: i32,
    pub detail: String,
    pub filenames: Vec<ScanListItem>,
}

impl ScanList {
    pub fn new(filenames: Vec<ScanListItem>) -> Self {
        Self {
            returncode: 0,
            detail: String::new(),
            filenames,
        }
    }
}

// ============================================================================
// Errors and service info
// ============================================================================

/// Structured error payload for requests rejected before any pipeline runs
/// (validation failures, unsafe filenames, oversized uploads).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub detail: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            detail: detail.into(),
        }
    }
}

/// Liveness probe payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub name: String,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_request_parses_without_filename() {
        let req: ScanRequest =
            serde_json::from_str(r#"{"mode":"color","resolution":"300","format":"png"}"#).unwrap();
        assert_eq!(req.mode, ScanMode::Color);
        assert_eq!(req.format, ScanFormat::Png);
        assert!(req.filename.is_none());
    }

    #[test]
    fn jpeg_format_maps_to_jpg_extension() {
        assert_eq!(ScanFormat::Jpeg.extension(), "jpg");
        assert_eq!(ScanFormat::Png.extension(), "png");
        assert_eq!(ScanFormat::Pdf.extension(), "pdf");
    }

    #[test]
    fn pdf_is_not_raster() {
        assert!(!ScanFormat::Pdf.is_raster());
        assert!(ScanFormat::Jpeg.is_raster());
    }

    #[test]
    fn thumbnail_ref_wire_forms() {
        assert_eq!(
            ThumbnailRef::Generated("thumbs/a.png.thumb.jpg".into()).as_str(),
            "thumbs/a.png.thumb.jpg"
        );
        assert_eq!(ThumbnailRef::Degraded("a.png".into()).as_str(), "a.png");
        assert_eq!(ThumbnailRef::None.as_str(), "");
    }

    #[test]
    fn print_sides_serialize_kebab_case() {
        let json = serde_json::to_string(&PrintSides::TwoSidedLongEdge).unwrap();
        assert_eq!(json, "\"two-sided-long-edge\"");
    }
}
