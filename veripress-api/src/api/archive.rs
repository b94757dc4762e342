//! Archive endpoints
//!
//! Stored claim records (listing and lookup by content hash) and the
//! web-archive tracer.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Deserialize;

use crate::db::{claims, ClaimRecord};
use crate::services::{trace_archive, ArchiveTrace};
use crate::{ApiError, ApiResult, AppState};

pub const DEFAULT_LISTING: i64 = 20;

#[derive(Debug, Deserialize)]
pub struct ArchiveQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct TraceRequest {
    #[serde(default)]
    pub url: String,
}

/// GET /archive?limit=N
pub async fn list_archive(
    State(state): State<AppState>,
    Query(query): Query<ArchiveQuery>,
) -> ApiResult<Json<Vec<ClaimRecord>>> {
    let limit = query.limit.unwrap_or(DEFAULT_LISTING);
    let records = claims::recent_claims(&state.db, limit).await?;
    Ok(Json(records))
}

/// GET /archive/hash/:hash
pub async fn get_by_hash(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> ApiResult<Json<ClaimRecord>> {
    claims::find_by_hash(&state.db, &hash)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No claim record with hash {}", hash)))
}

/// POST /trace-archive (form field `url`)
pub async fn trace_archive_handler(
    State(state): State<AppState>,
    Form(request): Form<TraceRequest>,
) -> ApiResult<Json<ArchiveTrace>> {
    Ok(Json(trace_archive(&state.services, &request.url).await?))
}

pub fn archive_routes() -> Router<AppState> {
    Router::new()
        .route("/archive", get(list_archive))
        .route("/archive/hash/:hash", get(get_by_hash))
        .route("/trace-archive", post(trace_archive_handler))
}
