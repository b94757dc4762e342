//! Google Fact Check Tools client
//!
//! Claim search against published ClaimReview markup. Only the first review
//! of the first matching claim is used.

use super::{ensure_success, http_client, FactCheckProvider, ProviderError};
use crate::fusion::claim_verdict::FactCheckMatch;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const FACT_CHECK_URL: &str = "https://factchecktools.googleapis.com/v1alpha1/claims:search";

#[derive(Debug, Default, Deserialize)]
pub struct FactCheckResponse {
    #[serde(default)]
    pub claims: Vec<ReviewedClaim>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewedClaim {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub claim_review: Vec<ClaimReview>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimReview {
    #[serde(default)]
    pub publisher: Option<Publisher>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub review_date: Option<String>,
    #[serde(default)]
    pub textual_rating: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Publisher {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub site: Option<String>,
}

impl FactCheckResponse {
    /// First usable review, if any
    ///
    /// A review without a textual rating cannot decide anything and is skipped.
    pub fn first_match(self) -> Option<FactCheckMatch> {
        let claim = self.claims.into_iter().next()?;
        claim
            .claim_review
            .into_iter()
            .find(|r| r.textual_rating.as_deref().is_some_and(|t| !t.trim().is_empty()))
            .map(|review| {
                let publisher = review
                    .publisher
                    .and_then(|p| p.name.or(p.site))
                    .unwrap_or_else(|| "Unknown publisher".to_string());
                FactCheckMatch {
                    publisher,
                    rating: review.textual_rating.unwrap_or_default(),
                    review_date: review.review_date,
                    url: review.url.unwrap_or_default(),
                }
            })
    }
}

pub struct GoogleFactCheckClient {
    http_client: reqwest::Client,
    api_key: String,
}

impl GoogleFactCheckClient {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, ProviderError> {
        Ok(Self {
            http_client: http_client(timeout)?,
            api_key,
        })
    }
}

#[async_trait]
impl FactCheckProvider for GoogleFactCheckClient {
    fn name(&self) -> &'static str {
        "google_fact_check"
    }

    async fn lookup(&self, claim: &str) -> Result<Option<FactCheckMatch>, ProviderError> {
        debug!("Querying Google Fact Check Tools");

        let response = self
            .http_client
            .get(FACT_CHECK_URL)
            .query(&[
                ("query", claim),
                ("key", self.api_key.as_str()),
                ("languageCode", "en"),
            ])
            .send()
            .await?;

        let body: FactCheckResponse = ensure_success(response).await?.json().await?;
        let found = body.first_match();

        if let Some(m) = &found {
            debug!(publisher = %m.publisher, rating = %m.rating, "Fact-check match");
        }
        Ok(found)
    }
}
