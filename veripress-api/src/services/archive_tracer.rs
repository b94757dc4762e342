//! Archive trace: web-archive snapshot lookup plus a one-line AI opinion
//! on the domain. Both halves degrade independently.

use super::{bounded, ServiceContext};
use crate::error::ApiError;
use crate::providers::AiJudge;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub const UNKNOWN_CREDIBILITY: &str = "Unknown";

/// Outcome of the snapshot lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ArchiveStatus {
    Found {
        url: String,
        timestamp: String,
        available: bool,
    },
    NotFound {
        available: bool,
    },
    Error {
        error: String,
        available: bool,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveTrace {
    pub url: String,
    pub archive_status: ArchiveStatus,
    pub ai_credibility_check: String,
}

pub async fn trace_archive(ctx: &ServiceContext, url: &str) -> Result<ArchiveTrace, ApiError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(ApiError::BadRequest("URL is required".to_string()));
    }

    let lookup = async {
        let Some(archive) = &ctx.providers.archive else {
            return ArchiveStatus::Error {
                error: "Web archive lookup not configured".to_string(),
                available: false,
            };
        };
        match tokio::time::timeout(ctx.call_timeout, archive.closest_snapshot(url)).await {
            Ok(Ok(Some(snapshot))) => ArchiveStatus::Found {
                url: snapshot.url,
                timestamp: snapshot.timestamp,
                available: true,
            },
            Ok(Ok(None)) => ArchiveStatus::NotFound { available: false },
            Ok(Err(e)) => {
                warn!(provider = archive.name(), error = %e, "Archive lookup failed");
                ArchiveStatus::Error {
                    error: e.to_string(),
                    available: false,
                }
            }
            Err(_) => {
                warn!(provider = archive.name(), "Archive lookup timed out");
                ArchiveStatus::Error {
                    error: format!("Timed out after {:?}", ctx.call_timeout),
                    available: false,
                }
            }
        }
    };

    let opinion = async {
        match &ctx.providers.language_model {
            Some(model) => {
                let judge = AiJudge::new(model.clone());
                bounded("ai_domain_check", ctx.call_timeout, judge.assess_domain(url))
                    .await
                    .map(|text| text.trim().to_string())
                    .filter(|text| !text.is_empty())
            }
            None => None,
        }
    };

    let (archive_status, opinion) = tokio::join!(lookup, opinion);
    info!(url, status = ?archive_status, "Archive traced");

    Ok(ArchiveTrace {
        url: url.to_string(),
        archive_status,
        ai_credibility_check: opinion.unwrap_or_else(|| UNKNOWN_CREDIBILITY.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fusion::FusionPolicy;
    use crate::providers::{ArchiveLookup, ArchiveSnapshot, ProviderError, Providers};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::time::Duration;

    struct FixedArchive(Result<Option<ArchiveSnapshot>, u16>);

    #[async_trait]
    impl ArchiveLookup for FixedArchive {
        fn name(&self) -> &'static str {
            "fixed_archive"
        }
        async fn closest_snapshot(&self, _url: &str) -> Result<Option<ArchiveSnapshot>, ProviderError> {
            match &self.0 {
                Ok(s) => Ok(s.clone()),
                Err(code) => Err(ProviderError::Api(*code, "unavailable".into())),
            }
        }
    }

    fn ctx(archive: FixedArchive) -> ServiceContext {
        let providers = Providers {
            archive: Some(Arc::new(archive)),
            ..Providers::default()
        };
        ServiceContext::new(providers, FusionPolicy::default(), Duration::from_secs(2))
    }

    #[tokio::test]
    async fn test_found_snapshot() {
        let snapshot = ArchiveSnapshot {
            url: "http://web.archive.org/web/2024/https://example.com".into(),
            timestamp: "20240101000000".into(),
        };
        let trace = trace_archive(&ctx(FixedArchive(Ok(Some(snapshot.clone())))), " https://example.com ")
            .await
            .unwrap();
        assert_eq!(trace.url, "https://example.com");
        assert_eq!(
            trace.archive_status,
            ArchiveStatus::Found {
                url: snapshot.url,
                timestamp: snapshot.timestamp,
                available: true
            }
        );
        assert_eq!(trace.ai_credibility_check, UNKNOWN_CREDIBILITY);
    }

    #[tokio::test]
    async fn test_lookup_error_degrades() {
        let trace = trace_archive(&ctx(FixedArchive(Err(503))), "https://example.com")
            .await
            .unwrap();
        let json = serde_json::to_value(&trace.archive_status).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["available"], false);
    }

    #[tokio::test]
    async fn test_not_found_serialization() {
        let trace = trace_archive(&ctx(FixedArchive(Ok(None))), "https://example.com")
            .await
            .unwrap();
        let json = serde_json::to_value(&trace.archive_status).unwrap();
        assert_eq!(json["status"], "not_found");
    }

    #[tokio::test]
    async fn test_empty_url_rejected() {
        let err = trace_archive(&ctx(FixedArchive(Ok(None))), "  ").await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}
