//! Claim verification endpoint
//!
//! POST /verify-claim, rate limited per client address.

use axum::{
    extract::{ConnectInfo, State},
    http::HeaderMap,
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use tracing::warn;

use crate::services::{record_claim, verify_claim, ClaimResult};
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct ClaimRequest {
    #[serde(default)]
    pub claim_text: String,
}

/// Rate-limit key: socket peer, then the first X-Forwarded-For hop
pub fn client_key(connect_info: Option<&SocketAddr>, headers: &HeaderMap) -> String {
    if let Some(addr) = connect_info {
        return addr.ip().to_string();
    }
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| "unknown".to_string())
}

/// POST /verify-claim
pub async fn verify_claim_handler(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Json(request): Json<ClaimRequest>,
) -> ApiResult<Json<ClaimResult>> {
    let client = client_key(connect_info.as_ref().map(|ConnectInfo(addr)| addr), &headers);
    if state.claim_limiter.check_key(&client).is_err() {
        warn!(client = %client, "Claim verification rate limit exceeded");
        return Err(ApiError::TooManyRequests(
            "Claim verification rate limit exceeded; try again in a minute".to_string(),
        ));
    }

    let verdict = verify_claim(&state.services, &request.claim_text).await?;
    let result = record_claim(&state.db, &request.claim_text, verdict).await;
    if result.id.is_none() {
        state
            .record_error(format!("Failed to persist claim record {}", result.hash))
            .await;
    }

    Ok(Json(result))
}

pub fn claim_routes() -> Router<AppState> {
    Router::new().route("/verify-claim", post(verify_claim_handler))
}
