//! Service configuration for veripress-api
//!
//! TOML file (every section optional) plus environment overrides for API
//! keys. API keys resolve ENV → TOML; anything blank counts as missing.

use crate::fusion::FusionPolicy;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";
pub const DEFAULT_LLM_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_IMAGE_MODEL: &str = "umm-maybe/AI-image-detector";

/// Top-level TOML configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub root_folder: Option<PathBuf>,
    pub server: ServerConfig,
    pub providers: ProviderKeys,
    pub rate_limit: RateLimitConfig,
    pub policy: FusionPolicy,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Upper bound on request bodies (uploads included)
    pub max_upload_bytes: usize,
    /// Per-call timeout for every outbound provider request
    pub provider_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            max_upload_bytes: 20 * 1024 * 1024,
            provider_timeout_secs: 10,
        }
    }
}

impl ServerConfig {
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs.max(1))
    }
}

/// `[providers]` section as written in the TOML file
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderKeys {
    pub google_fact_check_key: Option<String>,
    pub serper_api_key: Option<String>,
    pub claimbuster_api_key: Option<String>,
    pub groq_api_key: Option<String>,
    pub hf_api_key: Option<String>,
    pub llm_model: String,
    pub image_model: String,
}

impl Default for ProviderKeys {
    fn default() -> Self {
        Self {
            google_fact_check_key: None,
            serper_api_key: None,
            claimbuster_api_key: None,
            groq_api_key: None,
            hf_api_key: None,
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Claim verifications allowed per client address per minute
    pub claims_per_minute: u32,
    /// Seconds between sweeps that forget idle client addresses
    pub prune_interval_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            claims_per_minute: 10,
            prune_interval_secs: 60,
        }
    }
}

impl RateLimitConfig {
    pub fn prune_interval(&self) -> Duration {
        Duration::from_secs(self.prune_interval_secs.max(1))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string() }
    }
}

/// Fully resolved provider settings handed to `Providers::from_config`
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub google_fact_check_key: Option<String>,
    pub serper_api_key: Option<String>,
    pub claimbuster_api_key: Option<String>,
    pub groq_api_key: Option<String>,
    pub hf_api_key: Option<String>,
    pub llm_model: String,
    pub image_model: String,
    pub timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        let keys = ProviderKeys::default();
        Self {
            google_fact_check_key: None,
            serper_api_key: None,
            claimbuster_api_key: None,
            groq_api_key: None,
            hf_api_key: None,
            llm_model: keys.llm_model,
            image_model: keys.image_model,
            timeout: ServerConfig::default().provider_timeout(),
        }
    }
}

impl ServiceConfig {
    /// Load from an explicit path, or the default location if present
    pub fn load(explicit: Option<&Path>) -> veripress_common::Result<Self> {
        veripress_common::config::load_toml_config(explicit)
    }

    pub fn bind_addr(&self) -> veripress_common::Result<SocketAddr> {
        self.server.bind_addr.parse().map_err(|e| {
            veripress_common::Error::Config(format!(
                "Invalid bind address '{}': {}",
                self.server.bind_addr, e
            ))
        })
    }

    /// Resolve every provider key (ENV → TOML) into a `ProviderConfig`
    pub fn provider_config(&self) -> ProviderConfig {
        let keys = &self.providers;
        ProviderConfig {
            google_fact_check_key: resolve_api_key(
                "Google Fact Check",
                "GOOGLE_FACT_CHECK_KEY",
                keys.google_fact_check_key.as_deref(),
            ),
            serper_api_key: resolve_api_key(
                "Serper",
                "SERPER_API_KEY",
                keys.serper_api_key.as_deref(),
            ),
            claimbuster_api_key: resolve_api_key(
                "ClaimBuster",
                "CLAIMBUSTER_API_KEY",
                keys.claimbuster_api_key.as_deref(),
            ),
            groq_api_key: resolve_api_key("Groq", "GROQ_API_KEY", keys.groq_api_key.as_deref()),
            hf_api_key: resolve_api_key("Hugging Face", "HF_API_KEY", keys.hf_api_key.as_deref()),
            llm_model: keys.llm_model.clone(),
            image_model: keys.image_model.clone(),
            timeout: self.server.provider_timeout(),
        }
    }
}

/// Resolve one API key
///
/// **Priority:** ENV → TOML. Warns when both hold a usable key.
pub fn resolve_api_key(provider: &str, env_var: &str, toml_key: Option<&str>) -> Option<String> {
    let env_key = std::env::var(env_var).ok().filter(|k| is_valid_key(k));
    let toml_key = toml_key.filter(|k| is_valid_key(k));

    if env_key.is_some() && toml_key.is_some() {
        warn!(
            "{} API key found in multiple sources: environment, TOML. Using environment ({}).",
            provider, env_var
        );
    }

    if let Some(key) = env_key {
        info!("{} API key loaded from environment variable", provider);
        return Some(key.trim().to_string());
    }

    if let Some(key) = toml_key {
        info!("{} API key loaded from TOML config", provider);
        return Some(key.trim().to_string());
    }

    None
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}
