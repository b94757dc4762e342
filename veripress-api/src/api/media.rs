//! Image scan endpoint

use axum::{
    extract::{Multipart, State},
    routing::post,
    Json, Router,
};

use super::read_upload;
use crate::services::{scan_image, ImageScanResult};
use crate::{ApiError, ApiResult, AppState};

/// POST /scan-image (multipart field `file`)
pub async fn scan_image_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<ImageScanResult>> {
    let upload = read_upload(multipart).await?;
    match scan_image(&state.services, &upload.filename, upload.bytes).await {
        Ok(result) => Ok(Json(result)),
        Err(ApiError::Internal(msg)) => {
            state.record_error(msg.clone()).await;
            Err(ApiError::Internal(msg))
        }
        Err(e) => Err(e),
    }
}

pub fn media_routes() -> Router<AppState> {
    Router::new().route("/scan-image", post(scan_image_handler))
}
