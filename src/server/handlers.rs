//! HTTP request handlers for the file host API.
//!
//! # Endpoints
//!
//! - `POST   /api/{team}/file` - Upload a file (token)
//! - `POST   /api/{team}/model` - Upload and extract a zip model (token)
//! - `GET    /api/{team}/file/{filename}` - Download a file
//! - `GET    /api/{team}/model/{modelname}/{*filename}` - Download a model file
//! - `DELETE /api/{team}/model/{modelname}` - Delete a model (token)
//! - `DELETE /api/{team}` - Delete a whole team (token)
//! - `POST   /api/report/image` - Render a muscle heatmap PNG
//! - `GET    /health` - Health check

use std::sync::Arc;

use axum::{
    extract::{
        multipart::{Field, MultipartError, MultipartRejection},
        rejection::JsonRejection,
        Multipart, Path, Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::error::{HeatmapError, StoreError};
use crate::heatmap::{HeatmapCompositor, WeightVector};
use crate::store::{FailedEntry, StoredFile, TeamFileStore};

/// Multipart field carrying the uploaded file.
pub const FILE_FIELD: &str = "file";

/// Media types accepted for model uploads.
pub const ZIP_MEDIA_TYPES: [&str; 2] = ["application/zip", "application/x-zip-compressed"];

// =============================================================================
// Application State
// =============================================================================

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Team-scoped file store
    pub store: Arc<TeamFileStore>,

    /// Heatmap renderer with preloaded assets
    pub heatmap: Arc<HeatmapCompositor>,
}

impl AppState {
    pub fn new(store: TeamFileStore, heatmap: HeatmapCompositor) -> Self {
        Self {
            store: Arc::new(store),
            heatmap: Arc::new(heatmap),
        }
    }
}

// =============================================================================
// Request Parameters
// =============================================================================

/// Query parameters for model uploads.
#[derive(Debug, Default, Deserialize)]
pub struct ModelUploadQuery {
    /// Model directory name; defaults to the uploaded file name without extension
    #[serde(default)]
    pub modelname: Option<String>,
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON body for successful mutations.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    /// Always `"successful"`
    pub result: &'static str,

    /// Human-readable summary
    pub message: String,

    /// Stored file name, or the affected directory for model/team operations
    pub filename: String,

    /// Entries written by a model upload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted: Option<Vec<String>>,

    /// Entries a model upload had to skip
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed: Option<Vec<FailedEntry>>,
}

impl SuccessResponse {
    pub fn new(message: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            result: "successful",
            message: message.into(),
            filename: filename.into(),
            extracted: None,
            failed: None,
        }
    }
}

/// JSON body returned for all error conditions.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Always `"failed"`
    pub result: &'static str,

    /// Error type identifier (e.g., "conflict", "not_found")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Path or file name the error refers to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    /// Declared content type of a rejected upload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filetype: Option<String>,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// An error ready to be rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, error: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                result: "failed",
                error: error.to_string(),
                message: message.into(),
                filename: None,
                filetype: None,
            },
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.body.filename = Some(filename.into());
        self
    }

    pub fn with_filetype(mut self, filetype: impl Into<String>) -> Self {
        self.body.filetype = Some(filetype.into());
        self
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthorized", "Unauthorized")
    }

    pub fn forbidden() -> Self {
        Self::new(StatusCode::FORBIDDEN, "forbidden", "Forbidden")
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_ACCEPTABLE, "invalid_input", message)
    }

    pub fn server_fault(message: impl std::fmt::Display) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "server_error",
            format!("Server Error: {}", message),
        )
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { path } => Self::new(
                StatusCode::NOT_ACCEPTABLE,
                "conflict",
                "A file or folder with the same name already exists",
            )
            .with_filename(path),
            StoreError::NotFound { path } => {
                Self::new(StatusCode::NOT_FOUND, "not_found", "File or folder does not exist")
                    .with_filename(path)
            }
            StoreError::InvalidInput { reason } => Self::invalid_input(reason),
            StoreError::InvalidArchive(e) => Self::new(
                StatusCode::NOT_ACCEPTABLE,
                "invalid_archive",
                format!("Invalid archive: {}", e),
            ),
            StoreError::Io(e) => Self::server_fault(e),
        }
    }
}

impl From<HeatmapError> for ApiError {
    fn from(err: HeatmapError) -> Self {
        Self::server_fault(err)
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::invalid_input(format!("Failed to read multipart body: {}", err.body_text()))
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(err: MultipartRejection) -> Self {
        Self::invalid_input(err.body_text())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(err: JsonRejection) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, "invalid_body", err.body_text())
    }
}

/// Renders the error as JSON, logging by severity:
/// 5xx at ERROR, 404 at DEBUG, other 4xx at WARN.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status;
        let error_type = self.body.error.as_str();
        if status.is_server_error() {
            error!(
                error_type = error_type,
                status = status.as_u16(),
                "Server error: {}",
                self.body.message
            );
        } else if status == StatusCode::NOT_FOUND {
            debug!(
                error_type = error_type,
                status = status.as_u16(),
                "Resource not found: {}",
                self.body.message
            );
        } else if status.is_client_error() {
            warn!(
                error_type = error_type,
                status = status.as_u16(),
                "Client error: {}",
                self.body.message
            );
        }

        (status, Json(self.body)).into_response()
    }
}

// =============================================================================
// Multipart Helpers
// =============================================================================

/// The uploaded file part of a multipart body.
struct UploadedFile {
    filename: String,
    content_type: Option<String>,
    data: Bytes,
}

async fn read_file_field(multipart: &mut Multipart) -> Result<UploadedFile, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(FILE_FIELD) {
            return read_field(field).await;
        }
    }
    Err(ApiError::invalid_input("No file was provided"))
}

async fn read_field(field: Field<'_>) -> Result<UploadedFile, ApiError> {
    let filename = field
        .file_name()
        .map(str::to_owned)
        .ok_or_else(|| ApiError::invalid_input("Uploaded file has no file name"))?;
    let content_type = field.content_type().map(str::to_owned);
    let data = field.bytes().await?;

    Ok(UploadedFile {
        filename,
        content_type,
        data,
    })
}

fn file_response(file: StoredFile) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, file.media_type)],
        file.data,
    )
        .into_response()
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle plain file uploads.
///
/// # Endpoint
///
/// `POST /api/{team}/file` with a multipart `file` field and a `token` header.
///
/// # Response
///
/// - `200 OK`: stored; body carries the stored `filename`
/// - `401 Unauthorized`: missing or wrong token
/// - `406 Not Acceptable`: a file with that name already exists, or the name is unsafe
pub async fn upload_file_handler(
    State(state): State<AppState>,
    Path(team): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let mut multipart = multipart?;
    let upload = read_file_field(&mut multipart).await?;

    let filename = state
        .store
        .upload_file(&team, &upload.filename, upload.data)
        .await?;

    Ok(Json(SuccessResponse::new(
        "File uploaded successfully",
        filename,
    )))
}

/// Handle model archive uploads.
///
/// # Endpoint
///
/// `POST /api/{team}/model?modelname=<name>` with a multipart `file` field
/// holding a zip archive, and a `token` header.
///
/// # Response
///
/// - `200 OK`: extracted; `extracted` and `failed` list the per-entry outcome
/// - `401 Unauthorized`: missing or wrong token
/// - `406 Not Acceptable`: not a zip upload, unreadable archive, or the model exists
pub async fn upload_model_handler(
    State(state): State<AppState>,
    Path(team): Path<String>,
    Query(query): Query<ModelUploadQuery>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let mut multipart = multipart?;
    let upload = read_file_field(&mut multipart).await?;

    let content_type = upload.content_type.as_deref().unwrap_or("");
    if !ZIP_MEDIA_TYPES.contains(&content_type) {
        return Err(ApiError::invalid_input("Only .zip archives can be uploaded")
            .with_filename(upload.filename.as_str())
            .with_filetype(content_type));
    }

    let model = state
        .store
        .upload_model(
            &team,
            query.modelname.as_deref(),
            &upload.filename,
            upload.data,
        )
        .await?;

    let message = if model.report.is_complete() {
        "Model uploaded successfully".to_string()
    } else {
        format!(
            "Model uploaded with {} entries skipped",
            model.report.failed.len()
        )
    };

    let mut response = SuccessResponse::new(message, upload.filename);
    response.extracted = Some(model.report.extracted);
    response.failed = Some(model.report.failed);
    Ok(Json(response))
}

/// Handle file downloads.
///
/// # Endpoint
///
/// `GET /api/{team}/file/{filename}`
///
/// # Response
///
/// - `200 OK`: raw bytes; `image/<ext>` for jpg/jpeg/png/gif, otherwise
///   `application/octet-stream`
/// - `404 Not Found`: no such file
/// - `406 Not Acceptable`: unsafe team or file name
pub async fn get_file_handler(
    State(state): State<AppState>,
    Path((team, filename)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let file = state.store.get_file(&team, &filename).await?;
    Ok(file_response(file))
}

/// Handle downloads of files inside an extracted model.
///
/// # Endpoint
///
/// `GET /api/{team}/model/{modelname}/{*filename}` (`filename` may be nested)
pub async fn get_model_file_handler(
    State(state): State<AppState>,
    Path((team, modelname, filename)): Path<(String, String, String)>,
) -> Result<Response, ApiError> {
    let file = state
        .store
        .get_model_file(&team, &modelname, &filename)
        .await?;
    Ok(file_response(file))
}

/// Handle model deletion.
///
/// # Endpoint
///
/// `DELETE /api/{team}/model/{modelname}` with a `token` header.
pub async fn delete_model_handler(
    State(state): State<AppState>,
    Path((team, modelname)): Path<(String, String)>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let path = state.store.delete_model(&team, &modelname).await?;
    Ok(Json(SuccessResponse::new("Folder deleted successfully", path)))
}

/// Handle team deletion.
///
/// # Endpoint
///
/// `DELETE /api/{team}` with a `token` header.
pub async fn delete_team_handler(
    State(state): State<AppState>,
    Path(team): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let path = state.store.delete_team(&team).await?;
    Ok(Json(SuccessResponse::new("Team space deleted successfully", path)))
}

/// Render the muscle heatmap.
///
/// # Endpoint
///
/// `POST /api/report/image` with a JSON object of group weights.
///
/// # Response
///
/// `200 OK` with `Content-Type: image/png`.
pub async fn heatmap_handler(
    State(state): State<AppState>,
    body: Result<Json<WeightVector>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(weights) = body?;

    let compositor = Arc::clone(&state.heatmap);
    let png = tokio::task::spawn_blocking(move || compositor.render(&weights))
        .await
        .map_err(ApiError::server_fault)??;

    Ok((StatusCode::OK, [(header::CONTENT_TYPE, "image/png")], png).into_response())
}

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /health`
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// =============================================================================
// Tests
// =============================================================================
