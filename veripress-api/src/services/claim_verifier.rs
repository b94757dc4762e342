//! Claim verification pipeline
//!
//! fact-check ∥ web search ∥ check-worthiness → branch selection → AI judge
//! (fallback branch only) → claim fusion → persistence.

use super::{bounded, ServiceContext};
use crate::db::{claims, NewClaim};
use crate::error::ApiError;
use crate::fusion::claim_verdict::{evidence_digest, fuse_claim, select_branch, AiOutcome};
use crate::fusion::{ClaimSignals, ClaimVerdict, CredibilityScore, EvidenceItem, FusionBranch};
use crate::providers::AiJudge;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{error, info};
use veripress_common::text_hash;

/// Claim result as returned to clients
///
/// `id` is absent when the record could not be persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub verdict: String,
    pub explanation: String,
    pub sources: Vec<EvidenceItem>,
    pub credibility_score: CredibilityScore,
    pub hash: String,
    pub created_at: String,
}

/// Gather every claim signal concurrently
pub async fn gather_signals(ctx: &ServiceContext, claim: &str) -> ClaimSignals {
    let timeout = ctx.call_timeout;
    let providers = &ctx.providers;

    let fact_check = async {
        match &providers.fact_check {
            Some(p) => bounded(p.name(), timeout, p.lookup(claim)).await.flatten(),
            None => None,
        }
    };
    let search = async {
        match &providers.search {
            Some(p) => bounded(p.name(), timeout, p.search(claim)).await.unwrap_or_default(),
            None => Vec::new(),
        }
    };
    let check_worthiness = async {
        match &providers.check_worthiness {
            Some(p) => bounded(p.name(), timeout, p.score(claim)).await.flatten(),
            None => None,
        }
    };

    let (fact_check, search_results, check_worthiness) =
        tokio::join!(fact_check, search, check_worthiness);

    ClaimSignals {
        fact_check,
        search_results,
        check_worthiness,
    }
}

/// Verify a claim: gather, judge if needed, fuse
///
/// Empty (or whitespace-only) claim text is rejected before any provider
/// is called.
pub async fn verify_claim(ctx: &ServiceContext, claim: &str) -> Result<ClaimVerdict, ApiError> {
    let claim = claim.trim();
    if claim.is_empty() {
        return Err(ApiError::BadRequest("Claim text is empty".to_string()));
    }

    let signals = gather_signals(ctx, claim).await;
    let now = veripress_common::time::now();
    let policy = ctx.policy.as_ref();

    let ai = match select_branch(&signals, policy, now) {
        FusionBranch::AiFallback => judge(ctx, claim, &signals).await,
        _ => None,
    };

    Ok(fuse_claim(&signals, ai, policy, now))
}

async fn judge(ctx: &ServiceContext, claim: &str, signals: &ClaimSignals) -> Option<AiOutcome> {
    let model = ctx.providers.language_model.clone()?;
    let judge = AiJudge::new(model);
    let digest = evidence_digest(signals.capped_results(&ctx.policy));
    bounded("ai_judge", ctx.call_timeout, judge.judge_claim(claim, &digest)).await
}

/// Persist a fused verdict and build the client response
///
/// A failed write is logged and leaves `id` empty; the verdict is still
/// returned.
pub async fn record_claim(db: &SqlitePool, claim: &str, verdict: ClaimVerdict) -> ClaimResult {
    let claim = claim.trim();
    let hash = text_hash(claim);
    let created_at = veripress_common::time::now_rfc3339();

    let record = NewClaim {
        claim_text: claim,
        verdict: &verdict.verdict,
        explanation: &verdict.explanation,
        sources: &verdict.evidence,
        credibility_score: verdict.score,
        hash: &hash,
        created_at: &created_at,
    };

    let id = match claims::save_claim(db, &record).await {
        Ok(id) => {
            info!(claim_id = id, verdict = %verdict.verdict, score = %verdict.score, "Claim verified");
            Some(id)
        }
        Err(e) => {
            error!(error = %e, hash = %hash, "Failed to persist claim record");
            None
        }
    };

    ClaimResult {
        id,
        verdict: verdict.verdict,
        explanation: verdict.explanation,
        sources: verdict.evidence,
        credibility_score: verdict.score,
        hash,
        created_at,
    }
}
