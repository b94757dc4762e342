//! Artifact forensics: decoding uploads into fusion signals
//!
//! **Image:** EXIF tags, edge-noise statistic, type sniffing
//! **Document:** PDF/DOCX metadata, embedded-script flags, text preview

pub mod document;
pub mod image;

use thiserror::Error;

/// Forensics errors
///
/// `UnsupportedType` is the client's fault (400); `Decode` means the
/// artifact claimed a supported type but is unusable (500).
#[derive(Debug, Error)]
pub enum ForensicsError {
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("{0}")]
    Decode(String),
}
