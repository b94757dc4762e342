// Claim Verdict Fusion - precedence policy for text claims
//
// 1. Breaking-news guard (suppresses fact-check reliance)
// 2. Fresh fact-check wins outright (binary 95 / 10)
// 3. AI judge over live search evidence, score-corrected for consistency
// 4. Nothing found → Unverified / 50

use super::score::{normalize_score, RawScore};
use super::trust::{is_high_trust, label_source, DIGEST_TRUST_MARKER};
use super::{CredibilityScore, EvidenceItem, FusionPolicy};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use veripress_common::time::parse_loose_date;

/// Marker prefixed to evidence entries produced by a language model
pub const AI_MARKER: &str = "🤖";

/// Longest diagnostic kept from an unparsable AI response
pub const MAX_DIAGNOSTIC_CHARS: usize = 100;

pub const VERDICT_UNVERIFIED: &str = "Unverified";
pub const VERDICT_ERROR: &str = "Error";

const CHECK_WORTHINESS_SOURCE: &str = "ClaimBuster Check-Worthiness";
const CHECK_WORTHINESS_URL: &str = "https://idir.uta.edu/claimbuster/";

/// Fact-check database match (publisher review of a matching claim)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactCheckMatch {
    pub publisher: String,
    /// Publisher's own textual rating ("False", "Mostly True", ...)
    pub rating: String,
    /// Review date as published (RFC 3339 or YYYY-MM-DD)
    pub review_date: Option<String>,
    pub url: String,
}

/// One live search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub snippet: String,
    /// Source name (usually the bare domain)
    pub source: String,
    pub link: String,
    pub date: Option<String>,
}

/// Structured AI judgment, score still raw
#[derive(Debug, Clone, PartialEq)]
pub struct AiJudgment {
    pub verdict: String,
    pub explanation: String,
    pub raw_score: RawScore,
    /// Model that produced the judgment (for evidence labelling)
    pub model: String,
}

/// Result of asking the AI judge
#[derive(Debug, Clone, PartialEq)]
pub enum AiOutcome {
    /// Well-formed judgment
    Judged(AiJudgment),
    /// The model answered but the answer did not decode; carries the raw text
    Malformed(String),
}

/// Signals gathered for one claim (each independently optional)
#[derive(Debug, Clone, Default)]
pub struct ClaimSignals {
    pub fact_check: Option<FactCheckMatch>,
    /// Results in provider order; only the first `max_search_results` are used
    pub search_results: Vec<SearchResult>,
    /// Display-only check-worthiness score (0.0-1.0)
    pub check_worthiness: Option<f64>,
}

impl ClaimSignals {
    /// Search results the policy consumes
    pub fn capped_results(&self, policy: &FusionPolicy) -> &[SearchResult] {
        let n = self.search_results.len().min(policy.max_search_results);
        &self.search_results[..n]
    }
}

/// Which precedence rule decided the verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FusionBranch {
    FactCheck,
    AiFallback,
    NoEvidence,
}

/// Fused claim result
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimVerdict {
    pub verdict: String,
    pub explanation: String,
    pub score: CredibilityScore,
    /// Ordered evidence, highest priority first
    pub evidence: Vec<EvidenceItem>,
    pub branch: FusionBranch,
    /// Lexicon term that tripped the breaking-news guard, if any
    pub breaking_news_term: Option<String>,
}

/// Whether a fact-check review is inside the freshness window
///
/// A missing or unparsable review date is treated as stale.
pub fn fact_check_is_fresh(
    fact_check: &FactCheckMatch,
    policy: &FusionPolicy,
    now: DateTime<Utc>,
) -> bool {
    let Some(reviewed) = fact_check.review_date.as_deref().and_then(parse_loose_date) else {
        return false;
    };
    now.signed_duration_since(reviewed) <= Duration::days(policy.freshness_window_days)
}

/// Decide which precedence rule applies (steps 1, 2 and 4)
pub fn select_branch(
    signals: &ClaimSignals,
    policy: &FusionPolicy,
    now: DateTime<Utc>,
) -> FusionBranch {
    let results = signals.capped_results(policy);
    let breaking = policy.breaking_news_hit(results);

    if let Some(fc) = &signals.fact_check {
        if let Some(term) = &breaking {
            info!(term = %term, publisher = %fc.publisher, "Breaking-news guard suppressed fact-check");
        } else if fact_check_is_fresh(fc, policy, now) {
            return FusionBranch::FactCheck;
        } else {
            debug!(publisher = %fc.publisher, review_date = ?fc.review_date, "Fact-check outside freshness window");
        }
    }

    if results.is_empty() {
        FusionBranch::NoEvidence
    } else {
        FusionBranch::AiFallback
    }
}

/// Evidence digest handed to the AI judge
///
/// One line per result; trusted sources carry the high-authority marker.
pub fn evidence_digest(results: &[SearchResult]) -> String {
    results
        .iter()
        .map(|r| {
            let line = format!("{} ({}): {}", r.source, r.link, r.snippet);
            if is_high_trust(&r.link) {
                format!("{} {}", DIGEST_TRUST_MARKER, line)
            } else {
                line
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Force the AI score to agree with its own verdict label
///
/// "false" above the ceiling → forced false score; otherwise "true" below the
/// floor → forced true score. "false" is checked first.
pub fn consistent_ai_score(
    verdict: &str,
    score: CredibilityScore,
    policy: &FusionPolicy,
) -> CredibilityScore {
    let label = verdict.to_lowercase();
    let raw = i64::from(score);

    if label.contains("false") {
        if raw > policy.ai_false_ceiling {
            return CredibilityScore::new(policy.ai_forced_false_score);
        }
    } else if label.contains("true") && raw < policy.ai_true_floor {
        return CredibilityScore::new(policy.ai_forced_true_score);
    }
    score
}

/// Score for a fresh fact-check rating (binary, no middle ground)
///
/// "false" wins over "true" so mixed ratings ("Half true, mostly false")
/// score the same way the AI consistency rule does.
pub fn fact_check_score(rating: &str, policy: &FusionPolicy) -> CredibilityScore {
    let rating = rating.to_lowercase();
    if !rating.contains("false") && rating.contains("true") {
        CredibilityScore::new(policy.fact_check_true_score)
    } else {
        CredibilityScore::new(policy.fact_check_false_score)
    }
}

/// Fuse gathered signals (plus the AI outcome, when one was requested)
///
/// `ai` is consulted only on the AI fallback branch; `None` there means the
/// judge was unavailable.
pub fn fuse_claim(
    signals: &ClaimSignals,
    ai: Option<AiOutcome>,
    policy: &FusionPolicy,
    now: DateTime<Utc>,
) -> ClaimVerdict {
    let results = signals.capped_results(policy);
    let branch = select_branch(signals, policy, now);
    let breaking_news_term = policy.breaking_news_hit(results);
    let neutral = CredibilityScore::new(policy.neutral_score);

    let mut lead: Vec<EvidenceItem> = Vec::new();

    let (verdict, explanation, score) = match (branch, signals.fact_check.as_ref()) {
        (FusionBranch::FactCheck, Some(fc)) => {
            lead.push(fact_check_evidence(fc));
            (
                fc.rating.clone(),
                format!("Fact-checked by {}: rated \"{}\".", fc.publisher, fc.rating),
                fact_check_score(&fc.rating, policy),
            )
        }
        (FusionBranch::AiFallback, _) => match ai {
            Some(AiOutcome::Judged(judgment)) => {
                let normalized = normalize_score(judgment.raw_score.clone());
                let score = consistent_ai_score(&judgment.verdict, normalized, policy);
                if score != normalized {
                    debug!(
                        verdict = %judgment.verdict,
                        raw = %normalized,
                        corrected = %score,
                        "AI score corrected for verdict consistency"
                    );
                }
                lead.push(EvidenceItem {
                    name: format!("{} AI Analysis ({})", AI_MARKER, judgment.model),
                    url: String::new(),
                    snippet: Some(judgment.explanation.clone()),
                    date: None,
                });
                (judgment.verdict, judgment.explanation, score)
            }
            Some(AiOutcome::Malformed(raw)) => (
                VERDICT_ERROR.to_string(),
                format!(
                    "AI response could not be parsed: {}",
                    truncate_chars(&raw, MAX_DIAGNOSTIC_CHARS)
                ),
                neutral,
            ),
            None => (
                VERDICT_UNVERIFIED.to_string(),
                "AI analysis unavailable; review the sources below.".to_string(),
                neutral,
            ),
        },
        _ => (
            VERDICT_UNVERIFIED.to_string(),
            "No data found".to_string(),
            neutral,
        ),
    };

    let mut evidence = lead;
    evidence.extend(results.iter().map(search_evidence));
    if let Some(cw) = signals.check_worthiness {
        evidence.push(EvidenceItem {
            name: CHECK_WORTHINESS_SOURCE.to_string(),
            url: CHECK_WORTHINESS_URL.to_string(),
            snippet: Some(format!("Check-worthiness score: {:.2}", cw)),
            date: None,
        });
    }

    info!(branch = ?branch, verdict = %verdict, score = %score, evidence = evidence.len(), "Claim fused");

    ClaimVerdict {
        verdict,
        explanation,
        score,
        evidence,
        branch,
        breaking_news_term,
    }
}

fn fact_check_evidence(fc: &FactCheckMatch) -> EvidenceItem {
    EvidenceItem {
        name: label_source(&format!("{} (Fact Check)", fc.publisher), &fc.url),
        url: fc.url.clone(),
        snippet: Some(format!("Rating: {}", fc.rating)),
        date: fc.review_date.clone(),
    }
}

fn search_evidence(result: &SearchResult) -> EvidenceItem {
    EvidenceItem {
        name: label_source(&result.source, &result.link),
        url: result.link.clone(),
        snippet: if result.snippet.is_empty() {
            None
        } else {
            Some(result.snippet.clone())
        },
        date: result.date.clone(),
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    let flat = text.replace('\n', " ");
    let trimmed = flat.trim();
    if trimmed.chars().count() <= max {
        return trimmed.to_string();
    }
    let mut out: String = trimmed.chars().take(max).collect();
    out.push_str("...");
    out
}
