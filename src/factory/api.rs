//! REST endpoints for the box inventory.
//!
//! Every handler goes through the [`BoxStore`] trait, so the router is
//! oblivious to whether Postgres or the in-memory store is behind it.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;

use crate::errors::StoreError;
use crate::factory::models::BoxPayload;
use crate::factory::store::BoxStore;

// ── Shared state ──────────────────────────────────────────────────────

pub struct AppState {
    pub store: Arc<dyn BoxStore>,
}

pub type SharedState = Arc<AppState>;

// ── Request types ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SearchParams {
    #[serde(rename = "searchTerm")]
    search_term: Option<String>,
}

// ── Error handling ────────────────────────────────────────────────────

pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        // The search page surfaces `message` directly, keep the key stable.
        (status, Json(serde_json::json!({"message": message}))).into_response()
    }
}

// ── Router ────────────────────────────────────────────────────────────

pub fn api_router() -> Router<SharedState> {
    Router::new()
        .route("/api/boxes", get(search_boxes).post(create_box))
        .route("/api/boxes/{id}", get(get_box).put(replace_box))
        .route("/health", get(health_check))
}

// ── Helpers ───────────────────────────────────────────────────────────

fn internal(err: StoreError) -> ApiError {
    tracing::error!(error = %err, "Store operation failed");
    ApiError::Internal(err.to_string())
}

// ── Handlers ──────────────────────────────────────────────────────────

async fn health_check(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    state.store.ping().await.map_err(internal)?;
    Ok("ok")
}

async fn search_boxes(
    State(state): State<SharedState>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, ApiError> {
    let boxes = state
        .store
        .search(params.search_term.as_deref())
        .await
        .map_err(internal)?;
    Ok(Json(boxes))
}

async fn get_box(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let found = state.store.get(id).await.map_err(internal)?;
    match found {
        Some(record) => Ok(Json(record)),
        None => Err(ApiError::NotFound(format!("No box with id {id}"))),
    }
}

async fn create_box(
    State(state): State<SharedState>,
    Json(payload): Json<BoxPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let draft = payload.validate().map_err(ApiError::BadRequest)?;
    let record = state.store.insert(&draft).await.map_err(internal)?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn replace_box(
    State(state): State<SharedState>,
    Path(id): Path<i32>,
    Json(payload): Json<BoxPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let draft = payload.validate().map_err(ApiError::BadRequest)?;
    let replaced = state.store.replace(id, &draft).await.map_err(internal)?;
    match replaced {
        Some(record) => Ok(Json(record)),
        None => Err(ApiError::NotFound(format!("No box with id {id}"))),
    }
}
