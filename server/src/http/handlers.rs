use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use shared_types::ResourceKind;
use std::sync::Arc;
use tracing::{info, instrument};

use super::{content_type::JsonContentType, error::ApiResult, state::AppState};

/// GET /{resource}
/// List all records of a kind
#[instrument(skip(state, _content_type))]
pub async fn list_records(
    Extension(kind): Extension<ResourceKind>,
    _content_type: JsonContentType,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<serde_json::Value>> {
    info!("Listing {} records", kind);

    let collection = state.records.list(kind).await?;
    Ok(Json(collection))
}

/// GET /{resource}/:id
/// Get a single record
#[instrument(skip(state, _content_type))]
pub async fn get_record(
    Extension(kind): Extension<ResourceKind>,
    _content_type: JsonContentType,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    info!("Getting {} {}", kind, id);

    let record = state.records.get_by_id(kind, &id).await?;
    Ok(Json(record))
}

/// PUT /{resource}/:id
/// Replace an existing record with the JSON body
#[instrument(skip(state, _content_type, body))]
pub async fn update_record(
    Extension(kind): Extension<ResourceKind>,
    _content_type: JsonContentType,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<StatusCode> {
    info!("Updating {} {}", kind, id);

    state.records.update_by_id(kind, &id, &body).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /steps/:id/script
/// Get the script of a step as plain text
#[instrument(skip(state))]
pub async fn get_script(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<String> {
    info!("Getting script of step {}", id);

    state.scripts.get_script(&id).await
}

/// PUT /steps/:id/script
/// Replace the script of a step with the plain-text body
#[instrument(skip(state, script))]
pub async fn put_script(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    script: String,
) -> ApiResult<StatusCode> {
    info!("Putting script of step {}", id);

    state.scripts.put_script(&id, script).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "harvester-admin",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
