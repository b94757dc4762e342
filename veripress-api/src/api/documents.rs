//! Document scan endpoint

use axum::{
    extract::{Multipart, State},
    routing::post,
    Json, Router,
};

use super::read_upload;
use crate::services::{scan_document, DocumentReport};
use crate::{ApiError, ApiResult, AppState};

/// POST /scan-document (multipart field `file`, PDF or DOCX)
pub async fn scan_document_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<DocumentReport>> {
    let upload = read_upload(multipart).await?;
    match scan_document(&state.services, &upload.filename, upload.bytes).await {
        Ok(report) => Ok(Json(report)),
        Err(ApiError::Internal(msg)) => {
            state.record_error(msg.clone()).await;
            Err(ApiError::Internal(msg))
        }
        Err(e) => Err(e),
    }
}

pub fn document_routes() -> Router<AppState> {
    Router::new().route("/scan-document", post(scan_document_handler))
}
