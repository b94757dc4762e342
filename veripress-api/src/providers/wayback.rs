//! Wayback Machine availability client

use super::{ensure_success, http_client, ArchiveLookup, ProviderError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const WAYBACK_URL: &str = "https://archive.org/wayback/available";

/// Closest archived snapshot of a URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveSnapshot {
    pub url: String,
    /// Wayback timestamp (YYYYMMDDhhmmss)
    pub timestamp: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct WaybackResponse {
    #[serde(default)]
    pub archived_snapshots: ArchivedSnapshots,
}

#[derive(Debug, Default, Deserialize)]
pub struct ArchivedSnapshots {
    #[serde(default)]
    pub closest: Option<ClosestSnapshot>,
}

#[derive(Debug, Deserialize)]
pub struct ClosestSnapshot {
    #[serde(default)]
    pub available: bool,
    pub url: String,
    pub timestamp: String,
}

impl WaybackResponse {
    pub fn into_snapshot(self) -> Option<ArchiveSnapshot> {
        self.archived_snapshots
            .closest
            .filter(|c| c.available)
            .map(|c| ArchiveSnapshot {
                url: c.url,
                timestamp: c.timestamp,
            })
    }
}

pub struct WaybackClient {
    http_client: reqwest::Client,
}

impl WaybackClient {
    pub fn new(timeout: Duration) -> Result<Self, ProviderError> {
        Ok(Self {
            http_client: http_client(timeout)?,
        })
    }
}

#[async_trait]
impl ArchiveLookup for WaybackClient {
    fn name(&self) -> &'static str {
        "wayback"
    }

    async fn closest_snapshot(&self, url: &str) -> Result<Option<ArchiveSnapshot>, ProviderError> {
        debug!(url, "Querying Wayback Machine");

        let response = self
            .http_client
            .get(WAYBACK_URL)
            .query(&[("url", url)])
            .send()
            .await?;

        let body: WaybackResponse = ensure_success(response).await?.json().await?;
        Ok(body.into_snapshot())
    }
}
