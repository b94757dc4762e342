//! Image scan pipeline
//!
//! sniff → hash → decode (blocking pool) → EXIF + noise statistic →
//! classifier (bounded) → five-layer fusion

use super::{bounded, ServiceContext};
use crate::error::ApiError;
use crate::forensics::image::{decode_image, edge_noise_variance, ensure_image, extract_exif};
use crate::fusion::media_verdict::fuse_image;
use crate::fusion::{ImageReport, ImageSignals};
use crate::providers::synthetic_confidence;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};
use veripress_common::content_hash;

/// Image scan response: the fused report plus the uploaded file name
#[derive(Debug, Clone, Serialize)]
pub struct ImageScanResult {
    pub filename: String,
    #[serde(flatten)]
    pub report: ImageReport,
}

/// Scan an uploaded image
///
/// Non-image bytes are a client error; bytes that sniff as an image but do
/// not decode are an internal error.
pub async fn scan_image(
    ctx: &ServiceContext,
    filename: &str,
    bytes: Vec<u8>,
) -> Result<ImageScanResult, ApiError> {
    let mime = ensure_image(&bytes)?;
    debug!(filename, mime, size = bytes.len(), "Scanning image");

    let bytes: Arc<[u8]> = bytes.into();
    let hash = content_hash(&bytes);

    let local = {
        let bytes = Arc::clone(&bytes);
        tokio::task::spawn_blocking(move || -> Result<(BTreeMap<String, String>, f64), ApiError> {
            let image = decode_image(&bytes)?;
            let metadata = extract_exif(&bytes);
            let noise = edge_noise_variance(&image);
            Ok((metadata, noise))
        })
    };

    let classifier = async {
        match &ctx.providers.image_classifier {
            Some(c) => bounded(c.name(), ctx.call_timeout, c.classify(&bytes))
                .await
                .and_then(|labels| synthetic_confidence(&labels)),
            None => None,
        }
    };

    let (local, ai_confidence) = tokio::join!(local, classifier);
    let (metadata, noise_variance) =
        local.map_err(|e| ApiError::Internal(format!("Image analysis task failed: {}", e)))??;

    let signals = ImageSignals {
        hash,
        metadata,
        noise_variance: Some(noise_variance),
        ai_confidence,
    };
    let report = fuse_image(&signals, &ctx.policy);

    info!(filename, verdict = %report.verdict, score = %report.score, "Image scanned");

    Ok(ImageScanResult {
        filename: filename.to_string(),
        report,
    })
}
