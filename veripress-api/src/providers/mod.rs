//! External evidence providers
//!
//! Each provider sits behind a trait so the pipelines can run against mocks.
//! A provider whose API key is not configured is simply absent from the
//! [`Providers`] registry; any call failure degrades to an absent signal in
//! the calling service, never to a request failure.

pub mod ai_judge;
pub mod check_worthiness;
pub mod fact_check;
pub mod image_classifier;
pub mod language_model;
pub mod wayback;
pub mod web_search;

use crate::config::ProviderConfig;
use crate::fusion::claim_verdict::{FactCheckMatch, SearchResult};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

pub use ai_judge::AiJudge;
pub use image_classifier::{synthetic_confidence, ClassLabel};
pub use wayback::ArchiveSnapshot;

pub(crate) const USER_AGENT: &str = concat!(
    "Veripress/",
    env!("CARGO_PKG_VERSION"),
    " (claim and media verification)"
);

/// Provider call errors
///
/// All variants are treated the same way by the pipelines: the signal is
/// logged and dropped.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ProviderError::Parse(err.to_string())
        } else {
            ProviderError::Network(err.to_string())
        }
    }
}

/// Check an HTTP response status, capturing the body on failure
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let body: String = body.chars().take(200).collect();
    Err(ProviderError::Api(status.as_u16(), body))
}

/// Shared HTTP client with user agent and per-call timeout
pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| ProviderError::Network(e.to_string()))
}

/// Fact-check database (zero-or-one match per claim)
#[async_trait]
pub trait FactCheckProvider: Send + Sync {
    fn name(&self) -> &'static str;
    async fn lookup(&self, claim: &str) -> Result<Option<FactCheckMatch>, ProviderError>;
}

/// Live web search (ordered results)
#[async_trait]
pub trait SearchProvider: Send + Sync {
    fn name(&self) -> &'static str;
    async fn search(&self, claim: &str) -> Result<Vec<SearchResult>, ProviderError>;
}

/// Chat-style language model returning free text
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Model identifier (used in evidence labels)
    fn model(&self) -> &str;

    /// Single-turn completion
    ///
    /// `json_mode` asks the model for a JSON object; the caller must still
    /// validate whatever comes back.
    async fn complete(
        &self,
        prompt: &str,
        temperature: f32,
        max_tokens: Option<u32>,
        json_mode: bool,
    ) -> Result<String, ProviderError>;
}

/// Claim check-worthiness model (score 0.0-1.0)
#[async_trait]
pub trait CheckWorthinessProvider: Send + Sync {
    fn name(&self) -> &'static str;
    async fn score(&self, claim: &str) -> Result<Option<f64>, ProviderError>;
}

/// Image classifier returning (label, confidence) pairs
#[async_trait]
pub trait ImageClassifier: Send + Sync {
    fn name(&self) -> &'static str;
    async fn classify(&self, image: &[u8]) -> Result<Vec<ClassLabel>, ProviderError>;
}

/// Web archive availability lookup
#[async_trait]
pub trait ArchiveLookup: Send + Sync {
    fn name(&self) -> &'static str;
    async fn closest_snapshot(&self, url: &str) -> Result<Option<ArchiveSnapshot>, ProviderError>;
}

/// Registry of configured providers, built once at startup
#[derive(Clone, Default)]
pub struct Providers {
    pub fact_check: Option<Arc<dyn FactCheckProvider>>,
    pub search: Option<Arc<dyn SearchProvider>>,
    pub language_model: Option<Arc<dyn LanguageModel>>,
    pub check_worthiness: Option<Arc<dyn CheckWorthinessProvider>>,
    pub image_classifier: Option<Arc<dyn ImageClassifier>>,
    pub archive: Option<Arc<dyn ArchiveLookup>>,
}

impl Providers {
    /// Construct real HTTP providers for every configured key
    ///
    /// The archive lookup needs no key and is always present.
    pub fn from_config(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let timeout = config.timeout;
        let mut providers = Providers::default();

        if let Some(key) = &config.google_fact_check_key {
            providers.fact_check = Some(Arc::new(fact_check::GoogleFactCheckClient::new(
                key.clone(),
                timeout,
            )?));
        }
        if let Some(key) = &config.serper_api_key {
            providers.search = Some(Arc::new(web_search::SerperClient::new(key.clone(), timeout)?));
        }
        if let Some(key) = &config.groq_api_key {
            providers.language_model = Some(Arc::new(language_model::GroqClient::new(
                key.clone(),
                config.llm_model.clone(),
                timeout,
            )?));
        }
        if let Some(key) = &config.claimbuster_api_key {
            providers.check_worthiness = Some(Arc::new(
                check_worthiness::ClaimBusterClient::new(key.clone(), timeout)?,
            ));
        }
        if let Some(key) = &config.hf_api_key {
            providers.image_classifier = Some(Arc::new(
                image_classifier::HuggingFaceClassifier::new(
                    key.clone(),
                    config.image_model.clone(),
                    timeout,
                )?,
            ));
        }
        providers.archive = Some(Arc::new(wayback::WaybackClient::new(timeout)?));

        for (name, available) in providers.availability() {
            if available {
                info!("Provider enabled: {}", name);
            } else {
                info!("Provider disabled (no API key): {}", name);
            }
        }

        Ok(providers)
    }

    /// Provider name → configured
    pub fn availability(&self) -> BTreeMap<&'static str, bool> {
        BTreeMap::from([
            ("fact_check", self.fact_check.is_some()),
            ("web_search", self.search.is_some()),
            ("language_model", self.language_model.is_some()),
            ("check_worthiness", self.check_worthiness.is_some()),
            ("image_classifier", self.image_classifier.is_some()),
            ("web_archive", self.archive.is_some()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_only_has_archive() {
        let config = ProviderConfig {
            timeout: Duration::from_secs(5),
            ..ProviderConfig::default()
        };
        let providers = Providers::from_config(&config).unwrap();
        let availability = providers.availability();
        assert!(availability["web_archive"]);
        assert!(!availability["fact_check"]);
        assert!(!availability["language_model"]);
        assert!(!availability["image_classifier"]);
    }

    #[test]
    fn test_configured_keys_enable_providers() {
        let config = ProviderConfig {
            serper_api_key: Some("serper".to_string()),
            groq_api_key: Some("groq".to_string()),
            timeout: Duration::from_secs(5),
            ..ProviderConfig::default()
        };
        let providers = Providers::from_config(&config).unwrap();
        assert!(providers.search.is_some());
        assert_eq!(
            providers.language_model.as_ref().map(|m| m.model().to_string()),
            Some(config.llm_model.clone())
        );
        assert!(providers.fact_check.is_none());
    }
}
