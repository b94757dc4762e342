//! AI judge: prompts and the parse-then-validate boundary
//!
//! Model output is untrusted text. A reply that does not decode to an
//! object with a non-empty `verdict` becomes [`AiOutcome::Malformed`]
//! instead of being guessed at.

use super::{LanguageModel, ProviderError};
use crate::fusion::claim_verdict::{AiJudgment, AiOutcome};
use crate::fusion::score::RawScore;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Characters of document text shown to the model
pub const DOCUMENT_PREVIEW_CHARS: usize = 200;

pub struct AiJudge {
    model: Arc<dyn LanguageModel>,
}

impl AiJudge {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    pub fn model_name(&self) -> &str {
        self.model.model()
    }

    /// Judge a claim against the evidence digest
    ///
    /// Transport failures are errors (the signal is absent); a reply that
    /// arrives but cannot be decoded is a `Malformed` outcome.
    pub async fn judge_claim(&self, claim: &str, digest: &str) -> Result<AiOutcome, ProviderError> {
        let prompt = claim_prompt(claim, digest);
        let content = self.model.complete(&prompt, 0.1, Some(400), true).await?;
        let outcome = parse_judgment(&content, self.model.model());
        if let AiOutcome::Malformed(_) = &outcome {
            warn!(model = %self.model.model(), "AI judge returned an unparsable verdict");
        }
        Ok(outcome)
    }

    /// Free-text credibility assessment of a document's metadata and opening text
    pub async fn assess_document(
        &self,
        filename: &str,
        metadata: &BTreeMap<String, String>,
        text_preview: &str,
    ) -> Result<String, ProviderError> {
        let meta_json = serde_json::to_string(metadata)
            .map_err(|e| ProviderError::Parse(e.to_string()))?;
        let preview: String = text_preview.chars().take(DOCUMENT_PREVIEW_CHARS).collect();
        let prompt = format!(
            "Analyze this document metadata for \"{filename}\".\n\
             Metadata: {meta_json}\n\
             Text Preview: \"{preview}...\"\n\n\
             Task:\n\
             1. Is the metadata suspicious? (e.g. generic Author \"User\" vs an official name).\n\
             2. Does the text preview look like a legitimate report or spam?\n\
             3. Give a credibility rating (Low/Medium/High)."
        );
        self.model.complete(&prompt, 0.3, Some(150), false).await
    }

    /// One-sentence credibility check of a domain or URL
    pub async fn assess_domain(&self, url: &str) -> Result<String, ProviderError> {
        let prompt = format!(
            "Is the domain '{url}' generally considered a credible news source or a known \
             disinformation site? Answer in 1 sentence."
        );
        self.model.complete(&prompt, 0.0, Some(120), false).await
    }
}

/// Prompt asking for a JSON verdict over the evidence digest
pub fn claim_prompt(claim: &str, digest: &str) -> String {
    format!(
        "You are a fact-checking assistant for journalists. Judge the CLAIM using only the \
         EVIDENCE below. Lines marked [HIGH AUTHORITY] come from established news agencies, \
         government, academic or fact-checking organisations and deserve more weight.\n\n\
         CLAIM: {claim}\n\nEVIDENCE:\n{digest}\n\n\
         Respond with a JSON object with exactly these keys:\n\
         \"verdict\": one of \"True\", \"Mostly True\", \"Misleading\", \"Mostly False\", \"False\", \"Unverified\";\n\
         \"explanation\": two or three sentences citing the evidence;\n\
         \"score\": integer credibility 0-100 (0 = false, 100 = true)."
    )
}

/// Decode a model reply into a judgment
pub fn parse_judgment(content: &str, model: &str) -> AiOutcome {
    let body = strip_code_fence(content);

    let value: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) => {
            debug!("AI reply is not JSON: {}", e);
            return AiOutcome::Malformed(content.to_string());
        }
    };

    let Some(object) = value.as_object() else {
        return AiOutcome::Malformed(content.to_string());
    };

    let verdict = match object.get("verdict").and_then(Value::as_str).map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => return AiOutcome::Malformed(content.to_string()),
    };

    let explanation = object
        .get("explanation")
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .unwrap_or_default();

    AiOutcome::Judged(AiJudgment {
        verdict,
        explanation,
        raw_score: RawScore::from(object.get("score")),
        model: model.to_string(),
    })
}

/// Remove a surrounding ``` / ```json fence if the model added one
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}
