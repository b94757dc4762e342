//! veripress-api library interface for testing
//!
//! Exposes the application state and router so integration tests can drive
//! the HTTP surface with mock providers.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod forensics;
pub mod fusion;
pub mod providers;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use services::ServiceContext;
use sqlx::SqlitePool;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::debug;

/// Default request body limit when none is configured (20 MiB)
pub const DEFAULT_BODY_LIMIT: usize = 20 * 1024 * 1024;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Claim record store
    pub db: SqlitePool,
    /// Providers, fusion policy and call timeout
    pub services: ServiceContext,
    /// Per-client quota for claim verification
    pub claim_limiter: Arc<DefaultKeyedRateLimiter<String>>,
    /// Request body limit (uploads included)
    pub body_limit: usize,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last error for diagnostic purposes
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(db: SqlitePool, services: ServiceContext, claims_per_minute: u32) -> Self {
        let per_minute = NonZeroU32::new(claims_per_minute).unwrap_or(NonZeroU32::MIN);
        Self {
            db,
            services,
            claim_limiter: Arc::new(RateLimiter::keyed(Quota::per_minute(per_minute))),
            body_limit: DEFAULT_BODY_LIMIT,
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }

    pub fn with_body_limit(mut self, bytes: usize) -> Self {
        self.body_limit = bytes;
        self
    }

    /// Forget clients whose claim quota has fully replenished
    ///
    /// Returns the number of clients still tracked.
    pub fn prune_rate_limits(&self) -> usize {
        self.claim_limiter.retain_recent();
        self.claim_limiter.shrink_to_fit();
        self.claim_limiter.len()
    }

    /// Prune the claim limiter every `period` until the runtime shuts down
    pub fn spawn_rate_limit_pruner(&self, period: Duration) -> JoinHandle<()> {
        let state = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let tracked = state.prune_rate_limits();
                debug!(tracked, "Pruned claim rate limiter");
            }
        })
    }

    /// Remember an error for the health endpoint
    pub async fn record_error(&self, message: impl Into<String>) {
        *self.last_error.write().await = Some(message.into());
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.body_limit;

    Router::new()
        .merge(api::health_routes())
        .merge(api::claim_routes())
        .merge(api::media_routes())
        .merge(api::document_routes())
        .merge(api::archive_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fusion::FusionPolicy;
    use crate::providers::Providers;

    fn state(claims_per_minute: u32) -> AppState {
        let db = SqlitePool::connect_lazy("sqlite::memory:").unwrap();
        let services =
            ServiceContext::new(Providers::default(), FusionPolicy::default(), Duration::from_secs(1));
        AppState::new(db, services, claims_per_minute)
    }

    #[tokio::test]
    async fn test_prune_drops_replenished_clients() {
        // 6000/min replenishes one cell every 10ms
        let state = state(6000);
        for i in 0..500 {
            let key = format!("2001:db8::{:x}", i);
            assert!(state.claim_limiter.check_key(&key).is_ok());
        }
        assert_eq!(state.claim_limiter.len(), 500);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(state.prune_rate_limits(), 0);
        assert!(state.claim_limiter.is_empty());
    }

    #[tokio::test]
    async fn test_prune_keeps_throttled_clients() {
        let state = state(1);
        assert!(state.claim_limiter.check_key(&"10.0.0.1".to_string()).is_ok());
        assert!(state.claim_limiter.check_key(&"10.0.0.1".to_string()).is_err());
        assert_eq!(state.prune_rate_limits(), 1);
    }

    #[tokio::test]
    async fn test_pruner_task_runs() {
        let state = state(6000);
        assert!(state.claim_limiter.check_key(&"10.0.0.2".to_string()).is_ok());
        let handle = state.spawn_rate_limit_pruner(Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(150)).await;
        handle.abort();
        assert!(state.claim_limiter.is_empty());
    }
}
