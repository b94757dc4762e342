// Fusion Policy - named, overridable thresholds
//
// Loaded from the `[policy]` table of the service TOML; every field
// defaults to the production value so partial overrides are allowed.

use super::claim_verdict::SearchResult;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Thresholds and constants for both fusion pipelines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionPolicy {
    // --- Claim pipeline ---
    /// Fact-check reviews older than this many days are stale
    pub freshness_window_days: i64,
    /// Volatile-event terms; a match in search results suppresses fact-checks
    pub breaking_news_lexicon: Vec<String>,
    /// Score for a fresh fact-check whose rating contains "true"
    pub fact_check_true_score: i64,
    /// Score for any other fresh fact-check rating
    pub fact_check_false_score: i64,
    /// An AI "false" verdict scoring above this is forced down
    pub ai_false_ceiling: i64,
    /// An AI "true" verdict scoring below this is forced up
    pub ai_true_floor: i64,
    /// Forced score for an inconsistent "false" verdict
    pub ai_forced_false_score: i64,
    /// Forced score for an inconsistent "true" verdict
    pub ai_forced_true_score: i64,
    /// Score used when nothing can be concluded
    pub neutral_score: i64,
    /// Search results consumed per claim
    pub max_search_results: usize,

    // --- Media pipeline ---
    /// AI confidence above which camera metadata is considered spoofed
    pub spoof_override_confidence: f64,
    /// AI confidence above which an image is labelled AI generated
    pub ai_generated_confidence: f64,
    /// AI confidence at or above which an image is suspicious
    pub suspicious_confidence: f64,
    /// Score for an image with genuine camera metadata
    pub camera_authentic_score: i64,
    /// Score for camera metadata overridden by near-certain AI evidence
    pub metadata_spoofed_score: i64,
    /// Score for a suspicious image without camera metadata
    pub suspicious_score: i64,
    /// Score for a web image without camera metadata and no AI pattern
    pub web_authentic_score: i64,
}

impl Default for FusionPolicy {
    fn default() -> Self {
        Self {
            freshness_window_days: 90,
            breaking_news_lexicon: [
                "died",
                "dies",
                "dead",
                "death",
                "killed",
                "passed away",
                "injured",
                "injury",
                "hospitalized",
                "confirmed",
                "confirms",
                "breaking",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            fact_check_true_score: 95,
            fact_check_false_score: 10,
            ai_false_ceiling: 40,
            ai_true_floor: 60,
            ai_forced_false_score: 10,
            ai_forced_true_score: 90,
            neutral_score: 50,
            max_search_results: 6,
            spoof_override_confidence: 98.0,
            ai_generated_confidence: 80.0,
            suspicious_confidence: 50.0,
            camera_authentic_score: 95,
            metadata_spoofed_score: 10,
            suspicious_score: 40,
            web_authentic_score: 80,
        }
    }
}

impl FusionPolicy {
    /// Word-boundary, case-insensitive matcher for the breaking-news lexicon
    ///
    /// None when the lexicon is empty (guard disabled).
    pub fn breaking_news_matcher(&self) -> Option<Regex> {
        let terms: Vec<String> = self
            .breaking_news_lexicon
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(regex::escape)
            .collect();
        if terms.is_empty() {
            return None;
        }

        let pattern = format!(r"(?i)\b(?:{})\b", terms.join("|"));
        match Regex::new(&pattern) {
            Ok(re) => Some(re),
            Err(e) => {
                warn!("Breaking-news lexicon did not compile, guard disabled: {}", e);
                None
            }
        }
    }

    /// First lexicon term found in any result title or snippet
    pub fn breaking_news_hit(&self, results: &[SearchResult]) -> Option<String> {
        let matcher = self.breaking_news_matcher()?;
        results.iter().find_map(|r| {
            matcher
                .find(&r.title)
                .or_else(|| matcher.find(&r.snippet))
                .map(|m| m.as_str().to_lowercase())
        })
    }
}
