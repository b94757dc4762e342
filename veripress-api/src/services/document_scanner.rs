//! Document scan pipeline (PDF / DOCX)

use super::{bounded, ServiceContext};
use crate::error::ApiError;
use crate::forensics::document::{inspect_document, DocumentKind};
use crate::fusion::CredibilityScore;
use crate::providers::AiJudge;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;
use veripress_common::content_hash;

pub const UNSUPPORTED_DOCUMENT: &str = "Unsupported file type. Use PDF or DOCX.";
pub const AI_NOT_CONFIGURED: &str = "AI Analysis unavailable.";
pub const AI_FAILED: &str = "Analysis unavailable.";

#[derive(Debug, Clone, Serialize)]
pub struct DocumentReport {
    pub filename: String,
    #[serde(rename = "type")]
    pub kind: DocumentKind,
    pub hash: String,
    pub score: CredibilityScore,
    pub metadata: BTreeMap<String, String>,
    pub risk_flags: Vec<String>,
    pub ai_analysis: String,
}

pub async fn scan_document(
    ctx: &ServiceContext,
    filename: &str,
    bytes: Vec<u8>,
) -> Result<DocumentReport, ApiError> {
    let kind = DocumentKind::from_filename(filename)
        .ok_or_else(|| ApiError::BadRequest(UNSUPPORTED_DOCUMENT.to_string()))?;
    let hash = content_hash(&bytes);

    let evidence = tokio::task::spawn_blocking(move || inspect_document(kind, &bytes))
        .await
        .map_err(|e| ApiError::Internal(format!("Document analysis task failed: {}", e)))??;

    let ai_analysis = match &ctx.providers.language_model {
        Some(model) => {
            let judge = AiJudge::new(model.clone());
            bounded(
                "ai_document_review",
                ctx.call_timeout,
                judge.assess_document(filename, &evidence.metadata, &evidence.text_preview),
            )
            .await
            .map(|text| text.trim().to_string())
            .unwrap_or_else(|| AI_FAILED.to_string())
        }
        None => AI_NOT_CONFIGURED.to_string(),
    };

    let score = evidence.integrity_score();
    info!(
        filename,
        kind = kind.as_str(),
        score = %score,
        risk_flags = evidence.risk_flags.len(),
        "Document scanned"
    );

    Ok(DocumentReport {
        filename: filename.to_string(),
        kind,
        hash,
        score,
        metadata: evidence.metadata,
        risk_flags: evidence.risk_flags,
        ai_analysis,
    })
}
