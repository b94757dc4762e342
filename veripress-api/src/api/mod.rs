//! HTTP API handlers for veripress-api

pub mod archive;
pub mod claims;
pub mod documents;
pub mod health;
pub mod media;

pub use archive::archive_routes;
pub use claims::claim_routes;
pub use documents::document_routes;
pub use health::health_routes;
pub use media::media_routes;

use crate::error::ApiError;
use axum::extract::Multipart;

/// An uploaded file from a multipart form
#[derive(Debug)]
pub struct Upload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Pull the `file` field out of a multipart body
pub async fn read_upload(mut multipart: Multipart) -> Result<Upload, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;
        if bytes.is_empty() {
            return Err(ApiError::BadRequest("Uploaded file is empty".to_string()));
        }
        return Ok(Upload {
            filename,
            bytes: bytes.to_vec(),
        });
    }
    Err(ApiError::BadRequest("Missing multipart field 'file'".to_string()))
}
