//! Verification pipelines
//!
//! Each pipeline gathers its signals concurrently, bounds every provider call
//! with the configured timeout, and hands the result to the fusion core.
//! A provider error or timeout is logged and the signal becomes absent.

pub mod archive_tracer;
pub mod claim_verifier;
pub mod document_scanner;
pub mod image_scanner;

use crate::fusion::FusionPolicy;
use crate::providers::{ProviderError, Providers};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

pub use archive_tracer::{trace_archive, ArchiveStatus, ArchiveTrace};
pub use claim_verifier::{record_claim, verify_claim, ClaimResult};
pub use document_scanner::{scan_document, DocumentReport};
pub use image_scanner::{scan_image, ImageScanResult};

/// Everything a pipeline needs, shared across requests
#[derive(Clone)]
pub struct ServiceContext {
    pub providers: Providers,
    pub policy: Arc<FusionPolicy>,
    /// Upper bound for each individual provider call
    pub call_timeout: Duration,
}

impl ServiceContext {
    pub fn new(providers: Providers, policy: FusionPolicy, call_timeout: Duration) -> Self {
        Self {
            providers,
            policy: Arc::new(policy),
            call_timeout,
        }
    }
}

/// Run one provider call; any failure or timeout degrades to `None`
pub(crate) async fn bounded<T, F>(provider: &str, timeout: Duration, call: F) -> Option<T>
where
    F: Future<Output = Result<T, ProviderError>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(value)) => Some(value),
        Ok(Err(e)) => {
            warn!(provider, error = %e, "Signal unavailable");
            None
        }
        Err(_) => {
            warn!(provider, error = %ProviderError::Timeout(timeout), "Signal unavailable");
            None
        }
    }
}
