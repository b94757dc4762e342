//! ClaimBuster check-worthiness client
//!
//! Display-only signal: the score is listed as evidence, never fused.

use super::{ensure_success, http_client, CheckWorthinessProvider, ProviderError};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const CLAIMBUSTER_URL: &str = "https://idir.uta.edu/claimbuster/api/v2/score/text/";

#[derive(Debug, Default, Deserialize)]
pub struct ClaimBusterResponse {
    #[serde(default)]
    pub results: Vec<ClaimBusterScore>,
}

#[derive(Debug, Deserialize)]
pub struct ClaimBusterScore {
    pub score: f64,
}

impl ClaimBusterResponse {
    /// Highest sentence score, clamped to 0.0-1.0
    pub fn top_score(&self) -> Option<f64> {
        self.results
            .iter()
            .map(|r| r.score)
            .filter(|s| s.is_finite())
            .fold(None, |best: Option<f64>, s| Some(best.map_or(s, |b| b.max(s))))
            .map(|s| s.clamp(0.0, 1.0))
    }
}

pub struct ClaimBusterClient {
    http_client: reqwest::Client,
    api_key: String,
}

impl ClaimBusterClient {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, ProviderError> {
        Ok(Self {
            http_client: http_client(timeout)?,
            api_key,
        })
    }
}

#[async_trait]
impl CheckWorthinessProvider for ClaimBusterClient {
    fn name(&self) -> &'static str {
        "claimbuster"
    }

    async fn score(&self, claim: &str) -> Result<Option<f64>, ProviderError> {
        let mut url = reqwest::Url::parse(CLAIMBUSTER_URL)
            .map_err(|e| ProviderError::Parse(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ProviderError::Parse("ClaimBuster URL cannot be a base".to_string()))?
            .pop_if_empty()
            .push(claim);

        debug!("Querying ClaimBuster");

        let response = self
            .http_client
            .get(url)
            .header("x-api-key", &self.api_key)
            .send()
            .await?;

        let body: ClaimBusterResponse = ensure_success(response).await?.json().await?;
        Ok(body.top_score())
    }
}
