//! HTTP API over the pipelines.
//!
//! Thin layer: handlers validate and sanitize what arrives, then hand off to
//! the pipeline modules. Pipeline outcomes travel in the response body with
//! HTTP 200 regardless of the external tool's exit code; only pre-pipeline
//! rejections (validation, unsafe names, upload limits) use HTTP error codes.

use crate::catalog::ScanCatalog;
use crate::config::ServiceConfig;
use crate::error::ServiceError;
use crate::locks::PathLocks;
use crate::pipeline;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use scandeck_protocol::{
    naming, ErrorResponse, HealthResponse, MergeRequest, MergeResult, PrintRequest, PrintResult,
    ScanList, ScanRequest, ScanResult,
};
use std::sync::Arc;
use tracing::info;

/// Shared request state: configuration, lock registry, catalog view.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServiceConfig>,
    pub locks: PathLocks,
    pub catalog: ScanCatalog,
}

impl AppState {
    pub fn new(config: ServiceConfig) -> Self {
        let catalog = ScanCatalog::new(config.scans_dir.clone());
        Self {
            config: Arc::new(config),
            locks: PathLocks::new(),
            catalog,
        }
    }
}

/// Build the service router.
pub fn router(state: AppState) -> Router {
    // Multipart framing needs headroom beyond the raw file limit.
    let body_limit = state.config.upload_limit as usize + 1024 * 1024;
    Router::new()
        .route("/scan/execute", post(scan_execute))
        .route(
            "/scan/update",
            post(scan_update).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/makepdf", post(make_pdf))
        .route("/print", post(print_artifact))
        .route("/scans", get(list_scans))
        .route("/scans/{filename}", delete(delete_scan))
        .route("/health", get(health))
        .with_state(state)
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ServiceError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            ServiceError::UnsafeFilename(_) => (StatusCode::BAD_REQUEST, "unsafe_filename"),
            ServiceError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ServiceError::UploadTooLarge { .. } => {
                (StatusCode::PAYLOAD_TOO_LARGE, "upload_too_large")
            }
            ServiceError::DisallowedExtension(_) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, "disallowed_extension")
            }
            ServiceError::Io(_) | ServiceError::Spawn { .. } | ServiceError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        };
        let body = Json(ErrorResponse::new(code, self.to_string()));
        (status, body).into_response()
    }
}

fn require_safe(name: &str) -> Result<(), ServiceError> {
    if naming::is_safe_artifact_name(name) {
        Ok(())
    } else {
        Err(ServiceError::UnsafeFilename(name.to_string()))
    }
}

async fn scan_execute(
    State(state): State<AppState>,
    Json(req): Json<ScanRequest>,
) -> Result<Json<ScanResult>, ServiceError> {
    if let Some(name) = &req.filename {
        require_safe(name)?;
    }
    let result = pipeline::scan::execute(&state.config, &state.locks, &req).await?;
    Ok(Json(result))
}

async fn scan_update(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<bool>, ServiceError> {
    let limit = state.config.upload_limit;
    if let Some(length) = content_length(&headers) {
        if length > limit {
            return Err(ServiceError::UploadTooLarge {
                size: length,
                limit,
            });
        }
    }

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ServiceError::InvalidRequest(format!("multipart error: {}", err)))?
    {
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        require_safe(&filename)?;
        if !naming::has_artifact_extension(&filename) {
            let ext = filename.rsplit('.').next().unwrap_or("").to_string();
            return Err(ServiceError::DisallowedExtension(ext));
        }

        let data = field
            .bytes()
            .await
            .map_err(|err| ServiceError::InvalidRequest(format!("upload read error: {}", err)))?;
        if data.len() as u64 > limit {
            return Err(ServiceError::UploadTooLarge {
                size: data.len() as u64,
                limit,
            });
        }

        state.config.ensure_scans_dir()?;

        // A colliding name gets a freshly allocated one instead of clobbering
        // the stored artifact; the existence check runs against the scans
        // directory itself.
        let stored = if state.config.artifact_path(&filename).exists() {
            let ext = filename.rsplit('.').next().unwrap_or("bin");
            let fresh = naming::unique_filename(&state.config.scans_dir, ext);
            info!("Upload name {} taken, storing as {}", filename, fresh);
            fresh
        } else {
            filename
        };

        let _guard = state.locks.lock(&stored).await;
        tokio::fs::write(state.config.artifact_path(&stored), &data).await?;
        info!("Stored upload {} ({} bytes)", stored, data.len());
        return Ok(Json(true));
    }

    Err(ServiceError::InvalidRequest(
        "multipart body carried no file".to_string(),
    ))
}

async fn make_pdf(
    State(state): State<AppState>,
    Json(req): Json<MergeRequest>,
) -> Result<Json<MergeResult>, ServiceError> {
    if let Some(target) = &req.target {
        require_safe(target)?;
    }
    for name in &req.filenames {
        require_safe(name)?;
    }
    let result = pipeline::merge::execute(&state.config, &state.locks, &req).await?;
    Ok(Json(result))
}

async fn print_artifact(
    State(state): State<AppState>,
    Json(req): Json<PrintRequest>,
) -> Result<Json<PrintResult>, ServiceError> {
    require_safe(&req.filename)?;
    let result = pipeline::print::execute(&state.config, &req).await?;
    Ok(Json(result))
}

async fn list_scans(State(state): State<AppState>) -> Result<Json<ScanList>, ServiceError> {
    let items = state.catalog.list(&state.locks).await?;
    Ok(Json(ScanList::new(items)))
}

async fn delete_scan(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<bool>, ServiceError> {
    require_safe(&filename)?;
    let existed = state.catalog.delete(&state.locks, &filename).await?;
    Ok(Json(existed))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(axum::http::header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}
