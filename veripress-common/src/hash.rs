//! Content hashing
//!
//! Claim text and uploaded files are identified by the same function:
//! SHA-256 over the raw bytes, lowercase hex encoded.

use sha2::{Digest, Sha256};

/// SHA-256 of raw bytes, hex encoded (64 lowercase characters)
pub fn content_hash(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// SHA-256 of UTF-8 text, hex encoded
pub fn text_hash(text: &str) -> String {
    content_hash(text.as_bytes())
}
