//! Claim record persistence
//!
//! Records are append-only. Each saved claim gets exactly one archive row
//! keyed by the same content hash, written in the same transaction.

use crate::fusion::{CredibilityScore, EvidenceItem};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use veripress_common::Result;

/// Upper bound for `recent_claims`
pub const MAX_LISTING: i64 = 100;

/// A claim result ready to be written
#[derive(Debug, Clone)]
pub struct NewClaim<'a> {
    pub claim_text: &'a str,
    pub verdict: &'a str,
    pub explanation: &'a str,
    pub sources: &'a [EvidenceItem],
    pub credibility_score: CredibilityScore,
    pub hash: &'a str,
    pub created_at: &'a str,
}

/// A persisted claim record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimRecord {
    pub id: i64,
    pub claim_text: String,
    pub verdict: String,
    pub explanation: String,
    pub sources: Vec<EvidenceItem>,
    pub credibility_score: CredibilityScore,
    pub hash: String,
    pub created_at: String,
}

/// Insert a claim record and its archive entry; returns the claim id
pub async fn save_claim(pool: &SqlitePool, claim: &NewClaim<'_>) -> Result<i64> {
    let sources = serde_json::to_string(claim.sources)?;

    let mut tx = pool.begin().await?;

    let claim_id = sqlx::query(
        r#"
        INSERT INTO claims (
            claim_text, verdict, explanation, sources,
            credibility_score, hash, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(claim.claim_text)
    .bind(claim.verdict)
    .bind(claim.explanation)
    .bind(&sources)
    .bind(i64::from(claim.credibility_score))
    .bind(claim.hash)
    .bind(claim.created_at)
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    sqlx::query("INSERT INTO archive (claim_id, hash, archived_at) VALUES (?, ?, ?)")
        .bind(claim_id)
        .bind(claim.hash)
        .bind(claim.created_at)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::debug!(claim_id, hash = %claim.hash, "Claim record saved");
    Ok(claim_id)
}

/// Most recent claim records, newest first
pub async fn recent_claims(pool: &SqlitePool, limit: i64) -> Result<Vec<ClaimRecord>> {
    let limit = limit.clamp(1, MAX_LISTING);

    let rows = sqlx::query(
        r#"
        SELECT id, claim_text, verdict, explanation, sources,
               credibility_score, hash, created_at
        FROM claims
        ORDER BY created_at DESC, id DESC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.iter().map(record_from_row).collect()
}

/// Most recent claim record whose archive entry carries `hash`
pub async fn find_by_hash(pool: &SqlitePool, hash: &str) -> Result<Option<ClaimRecord>> {
    let row = sqlx::query(
        r#"
        SELECT c.id, c.claim_text, c.verdict, c.explanation, c.sources,
               c.credibility_score, c.hash, c.created_at
        FROM archive a
        JOIN claims c ON c.id = a.claim_id
        WHERE a.hash = ?
        ORDER BY a.archived_at DESC, a.id DESC
        LIMIT 1
        "#,
    )
    .bind(hash)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(record_from_row).transpose()
}

/// Number of archive rows for a hash
pub async fn archive_count(pool: &SqlitePool, hash: &str) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM archive WHERE hash = ?")
        .bind(hash)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

fn record_from_row(row: &SqliteRow) -> Result<ClaimRecord> {
    let sources: String = row.get("sources");
    let sources: Vec<EvidenceItem> = serde_json::from_str(&sources)?;

    Ok(ClaimRecord {
        id: row.get("id"),
        claim_text: row.get("claim_text"),
        verdict: row.get("verdict"),
        explanation: row.get("explanation"),
        sources,
        credibility_score: CredibilityScore::new(row.get::<i64, _>("credibility_score")),
        hash: row.get("hash"),
        created_at: row.get("created_at"),
    })
}
