//! AI-generated image classifier (Hugging Face Inference API)
//!
//! The fused pipeline reads the confidence of the synthetic class
//! specifically, not the top-ranked label, so an unrelated top label
//! cannot produce a false positive.

use super::{ensure_success, http_client, ImageClassifier, ProviderError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const HF_INFERENCE_URL: &str = "https://api-inference.huggingface.co/models";

/// Label tokens that identify the synthetic/AI class
const SYNTHETIC_TOKENS: &[&str] = &["ai", "artificial", "generated", "fake", "synthetic"];

/// One (label, confidence) pair; confidence 0.0-1.0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassLabel {
    pub label: String,
    pub score: f64,
}

/// Whether a classifier label names the synthetic class
pub fn is_synthetic_label(label: &str) -> bool {
    label
        .to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .any(|token| SYNTHETIC_TOKENS.contains(&token))
}

/// Synthetic-image confidence as a percentage (0-100)
///
/// Highest score among synthetic-class labels; None when the classifier
/// reported no such class.
pub fn synthetic_confidence(labels: &[ClassLabel]) -> Option<f64> {
    labels
        .iter()
        .filter(|l| is_synthetic_label(&l.label) && l.score.is_finite())
        .map(|l| (l.score * 100.0).clamp(0.0, 100.0))
        .fold(None, |best: Option<f64>, c| Some(best.map_or(c, |b| b.max(c))))
}

pub struct HuggingFaceClassifier {
    http_client: reqwest::Client,
    api_key: String,
    model: String,
}

impl HuggingFaceClassifier {
    pub fn new(api_key: String, model: String, timeout: Duration) -> Result<Self, ProviderError> {
        Ok(Self {
            http_client: http_client(timeout)?,
            api_key,
            model,
        })
    }
}

#[async_trait]
impl ImageClassifier for HuggingFaceClassifier {
    fn name(&self) -> &'static str {
        "huggingface"
    }

    async fn classify(&self, image: &[u8]) -> Result<Vec<ClassLabel>, ProviderError> {
        let url = format!("{}/{}", HF_INFERENCE_URL, self.model);
        debug!(model = %self.model, bytes = image.len(), "Classifying image");

        let response = self
            .http_client
            .post(url)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/octet-stream")
            .body(image.to_vec())
            .send()
            .await?;

        let labels: Vec<ClassLabel> = ensure_success(response).await?.json().await?;
        Ok(labels)
    }
}
