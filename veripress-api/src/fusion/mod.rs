// Fusion Module - Evidence fusion and credibility scoring
//
// Signals (each optional) → precedence policy → clamped score → verdict label
// Two pipelines share the same shape: claim verdicts and media forensics.

pub mod claim_verdict;
pub mod media_verdict;
pub mod policy;
pub mod score;
pub mod trust;

use serde::{Deserialize, Serialize};

pub use claim_verdict::{ClaimSignals, ClaimVerdict, FusionBranch};
pub use media_verdict::{ImageReport, ImageSignals, LayerReport, LayerStatus};
pub use policy::FusionPolicy;
pub use score::{normalize_score, RawScore};
pub use trust::is_high_trust;

/// Credibility score, always an integer in 0..=100
///
/// 0 = certainly false/fabricated, 100 = certainly authentic/true,
/// 50 = unverified. Every constructor clamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub struct CredibilityScore(u8);

impl CredibilityScore {
    pub const MIN: Self = Self(0);
    pub const NEUTRAL: Self = Self(50);
    pub const MAX: Self = Self(100);

    /// Clamp an integer into range
    pub fn new(raw: i64) -> Self {
        Self(raw.clamp(0, 100) as u8)
    }

    /// Round and clamp a float; NaN is treated as unverified
    pub fn from_f64(raw: f64) -> Self {
        if raw.is_nan() {
            return Self::NEUTRAL;
        }
        Self(raw.round().clamp(0.0, 100.0) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for CredibilityScore {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

impl From<i64> for CredibilityScore {
    fn from(raw: i64) -> Self {
        Self::new(raw)
    }
}

impl From<CredibilityScore> for i64 {
    fn from(score: CredibilityScore) -> Self {
        i64::from(score.0)
    }
}

impl std::fmt::Display for CredibilityScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Displayable provenance record attached to a verification result
///
/// Serialized into the claim record as part of an ordered JSON array;
/// order is priority order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceItem {
    /// Source label, prefixed with the trust marker for high-authority sources
    pub name: String,
    /// Reference locator (may be empty for model-generated entries)
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}
