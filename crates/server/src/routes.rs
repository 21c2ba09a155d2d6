//! HTTP routes over a shared session pipeline.

use crate::error::ApiError;
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use sweeper_core::viz::{ChartSpec, SeriesPair};
use sweeper_core::{
    CacheStatus, CleanReport, FileSummary, Pipeline, TablePreview, TargetFormat, UploadReport,
    UploadStatus, UploadedFile,
};
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

/// Shared application state. Actions run one at a time behind the mutex.
#[derive(Clone, Default)]
pub struct AppState {
    pub pipeline: Arc<Mutex<Pipeline>>,
    /// Request body limit; `None` lifts axum's default cap.
    pub max_upload_bytes: Option<usize>,
}

impl AppState {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            max_upload_bytes: pipeline.config().server.max_upload_bytes,
            pipeline: Arc::new(Mutex::new(pipeline)),
        }
    }
}

/// Health check response.
#[derive(Serialize, Deserialize)]
pub struct Health {
    /// Server status ("ok" when healthy).
    pub status: String,
    /// Server version from Cargo.toml.
    pub version: String,
}

#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    pub rows: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChartQuery {
    pub html: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct SelectColumns {
    pub columns: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ChartResponse {
    pub series: SeriesPair,
    pub chart: ChartSpec,
}

/// Create the application router.
///
/// This is separated from `main()` to allow testing.
pub fn create_router(state: AppState) -> Router {
    let body_limit = match state.max_upload_bytes {
        Some(limit) => DefaultBodyLimit::max(limit),
        None => DefaultBodyLimit::disable(),
    };

    Router::new()
        .route("/health", get(health))
        .route("/files", get(list_files))
        .route("/files/:name", put(upload))
        .route("/files/:name/preview", get(preview))
        .route("/files/:name/dedup", post(deduplicate))
        .route("/files/:name/fill-missing", post(fill_missing))
        .route("/files/:name/columns", post(select_columns))
        .route("/files/:name/chart", get(chart))
        .route("/files/:name/export", get(export))
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint handler.
pub async fn health() -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn list_files(State(state): State<AppState>) -> Json<Vec<FileSummary>> {
    Json(state.pipeline.lock().await.files())
}

/// Upload a file's raw bytes under `name`.
///
/// Responds 201 on first load, 200 when the name was already known.
async fn upload(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<UploadReport>), ApiError> {
    let file = UploadedFile::new(name, body.to_vec());
    let report = state.pipeline.lock().await.upload(&file)?;
    let status = match report.status {
        UploadStatus::Loaded {
            cache: CacheStatus::Miss,
            ..
        } => StatusCode::CREATED,
        _ => StatusCode::OK,
    };
    Ok((status, Json(report)))
}

async fn preview(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<PreviewQuery>,
) -> Result<Json<TablePreview>, ApiError> {
    let preview = state.pipeline.lock().await.preview(&name, query.rows)?;
    Ok(Json(preview))
}

async fn deduplicate(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<CleanReport>, ApiError> {
    Ok(Json(state.pipeline.lock().await.deduplicate(&name)?))
}

async fn fill_missing(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<CleanReport>, ApiError> {
    Ok(Json(state.pipeline.lock().await.fill_missing(&name)?))
}

async fn select_columns(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(request): Json<SelectColumns>,
) -> Result<Json<CleanReport>, ApiError> {
    let report = state
        .pipeline
        .lock()
        .await
        .select_columns(&name, &request.columns)?;
    Ok(Json(report))
}

/// Chart series as JSON, or a standalone HTML page with `?html=true`.
async fn chart(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<ChartQuery>,
) -> Result<Response, ApiError> {
    let series = state.pipeline.lock().await.visualize(&name)?;
    let chart = ChartSpec::bar(name, &series);
    if query.html.unwrap_or(false) {
        return Ok(Html(chart.to_html()).into_response());
    }
    Ok(Json(ChartResponse { series, chart }).into_response())
}

/// Download the current table; `format` defaults to CSV.
async fn export(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, ApiError> {
    let target: TargetFormat = query.format.as_deref().unwrap_or("csv").parse()?;
    let download = state.pipeline.lock().await.export(&name, target)?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        download.file_name.replace('"', "")
    );
    Ok((
        [
            (header::CONTENT_TYPE, download.mime_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        download.bytes,
    )
        .into_response())
}
