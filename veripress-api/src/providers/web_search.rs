//! Serper (Google Search API) client

use super::{ensure_success, http_client, ProviderError, SearchProvider};
use crate::fusion::claim_verdict::SearchResult;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

const SERPER_URL: &str = "https://google.serper.dev/search";

#[derive(Debug, Default, Deserialize)]
pub struct SerperResponse {
    #[serde(default)]
    pub organic: Vec<OrganicResult>,
}

#[derive(Debug, Deserialize)]
pub struct OrganicResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub date: Option<String>,
}

impl SerperResponse {
    /// Organic results in ranking order; entries without a link are dropped
    pub fn into_results(self) -> Vec<SearchResult> {
        self.organic
            .into_iter()
            .filter(|r| !r.link.trim().is_empty())
            .map(|r| SearchResult {
                source: source_name(&r.link),
                title: r.title,
                snippet: r.snippet,
                link: r.link,
                date: r.date,
            })
            .collect()
    }
}

/// Bare host of a link ("www." stripped); the link itself if it does not parse
pub fn source_name(link: &str) -> String {
    reqwest::Url::parse(link)
        .ok()
        .and_then(|url| url.host_str().map(|h| h.trim_start_matches("www.").to_string()))
        .unwrap_or_else(|| link.to_string())
}

pub struct SerperClient {
    http_client: reqwest::Client,
    api_key: String,
}

impl SerperClient {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, ProviderError> {
        Ok(Self {
            http_client: http_client(timeout)?,
            api_key,
        })
    }
}

#[async_trait]
impl SearchProvider for SerperClient {
    fn name(&self) -> &'static str {
        "serper"
    }

    async fn search(&self, claim: &str) -> Result<Vec<SearchResult>, ProviderError> {
        debug!("Querying Serper web search");

        let response = self
            .http_client
            .post(SERPER_URL)
            .header("X-API-KEY", &self.api_key)
            .json(&json!({ "q": claim }))
            .send()
            .await?;

        let body: SerperResponse = ensure_success(response).await?.json().await?;
        let results = body.into_results();
        debug!(count = results.len(), "Serper results");
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_name() {
        assert_eq!(source_name("https://www.reuters.com/world/x"), "reuters.com");
        assert_eq!(source_name("https://apnews.com/article/1"), "apnews.com");
        assert_eq!(source_name("not a url"), "not a url");
    }

    #[test]
    fn test_parse_organic_results() {
        let json = r#"{
            "searchParameters": {"q": "x"},
            "organic": [
                {"title": "Story", "link": "https://www.bbc.co.uk/news/1", "snippet": "Text", "date": "2 days ago"},
                {"title": "No link"},
                {"title": "Second", "link": "https://blog.example/p", "snippet": "More"}
            ]
        }"#;
        let parsed: SerperResponse = serde_json::from_str(json).unwrap();
        let results = parsed.into_results();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].source, "bbc.co.uk");
        assert_eq!(results[0].date.as_deref(), Some("2 days ago"));
        assert_eq!(results[1].source, "blog.example");
        assert!(results[1].date.is_none());
    }
}
