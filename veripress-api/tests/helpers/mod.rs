//! Test Helper Utilities
//!
//! Mock providers and an in-memory application for veripress-api tests

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use chrono::{Duration as ChronoDuration, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use veripress_api::fusion::claim_verdict::{FactCheckMatch, SearchResult};
use veripress_api::fusion::FusionPolicy;
use veripress_api::providers::{
    ArchiveLookup, ArchiveSnapshot, ClassLabel, FactCheckProvider, ImageClassifier, LanguageModel,
    ProviderError, Providers, SearchProvider,
};
use veripress_api::services::ServiceContext;
use veripress_api::AppState;

pub const BOUNDARY: &str = "veripress-test-boundary";

pub struct MockFactCheck(pub Option<FactCheckMatch>);

#[async_trait]
impl FactCheckProvider for MockFactCheck {
    fn name(&self) -> &'static str {
        "mock_fact_check"
    }
    async fn lookup(&self, _claim: &str) -> Result<Option<FactCheckMatch>, ProviderError> {
        Ok(self.0.clone())
    }
}

pub struct MockSearch(pub Vec<SearchResult>);

#[async_trait]
impl SearchProvider for MockSearch {
    fn name(&self) -> &'static str {
        "mock_search"
    }
    async fn search(&self, _claim: &str) -> Result<Vec<SearchResult>, ProviderError> {
        Ok(self.0.clone())
    }
}

/// Search provider that never answers in time
pub struct StalledSearch;

#[async_trait]
impl SearchProvider for StalledSearch {
    fn name(&self) -> &'static str {
        "stalled_search"
    }
    async fn search(&self, _claim: &str) -> Result<Vec<SearchResult>, ProviderError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(Vec::new())
    }
}

/// Language model with a canned reply that counts its calls
pub struct MockModel {
    pub reply: String,
    pub calls: AtomicUsize,
}

impl MockModel {
    pub fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LanguageModel for MockModel {
    fn model(&self) -> &str {
        "mock-llm"
    }
    async fn complete(
        &self,
        _prompt: &str,
        _temperature: f32,
        _max_tokens: Option<u32>,
        _json_mode: bool,
    ) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reply.clone())
    }
}

pub struct MockClassifier(pub Vec<ClassLabel>);

#[async_trait]
impl ImageClassifier for MockClassifier {
    fn name(&self) -> &'static str {
        "mock_classifier"
    }
    async fn classify(&self, _image: &[u8]) -> Result<Vec<ClassLabel>, ProviderError> {
        Ok(self.0.clone())
    }
}

pub struct MockArchive(pub Option<ArchiveSnapshot>);

#[async_trait]
impl ArchiveLookup for MockArchive {
    fn name(&self) -> &'static str {
        "mock_archive"
    }
    async fn closest_snapshot(&self, _url: &str) -> Result<Option<ArchiveSnapshot>, ProviderError> {
        Ok(self.0.clone())
    }
}

pub fn search_result(source: &str, title: &str, snippet: &str) -> SearchResult {
    SearchResult {
        title: title.to_string(),
        snippet: snippet.to_string(),
        source: source.to_string(),
        link: format!("https://{}/article", source),
        date: Some("1 day ago".to_string()),
    }
}

/// Fact-check match reviewed `days_ago` days before now
pub fn fact_check(rating: &str, days_ago: i64) -> FactCheckMatch {
    let reviewed = Utc::now() - ChronoDuration::days(days_ago);
    FactCheckMatch {
        publisher: "PolitiFact".to_string(),
        rating: rating.to_string(),
        review_date: Some(reviewed.format("%Y-%m-%d").to_string()),
        url: "https://www.politifact.com/factchecks/example".to_string(),
    }
}

/// Single-connection in-memory database with tables created
pub async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");
    veripress_api::db::init_tables(&pool)
        .await
        .expect("Failed to initialize database schema");
    pool
}

pub fn context(providers: Providers) -> ServiceContext {
    ServiceContext::new(providers, FusionPolicy::default(), Duration::from_millis(500))
}

/// Router plus its pool, with the given providers
pub async fn create_test_app(providers: Providers) -> (axum::Router, SqlitePool) {
    create_test_app_with_quota(providers, 100).await
}

pub async fn create_test_app_with_quota(
    providers: Providers,
    claims_per_minute: u32,
) -> (axum::Router, SqlitePool) {
    let pool = memory_pool().await;
    let state = AppState::new(pool.clone(), context(providers), claims_per_minute);
    (veripress_api::build_router(state), pool)
}

pub fn json_post(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// multipart/form-data request with one `file` field
pub fn multipart_post(uri: &str, filename: &str, content_type: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
            filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Small PNG without any metadata
pub fn png_bytes() -> Vec<u8> {
    use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
    let img = DynamicImage::ImageRgb8(RgbImage::from_fn(16, 16, |x, y| {
        Rgb([(x * 16) as u8, (y * 16) as u8, 128])
    }));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, ImageOutputFormat::Png).unwrap();
    out.into_inner()
}
