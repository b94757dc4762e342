//! Document forensics (PDF / DOCX)
//!
//! Pulls authoring metadata, flags embedded scripts and extracts a short
//! text preview for the AI assessment. Scoring is a fixed deduction table.

use super::ForensicsError;
use crate::fusion::CredibilityScore;
use lopdf::Object;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use tracing::debug;

pub const RISK_EMBEDDED_JAVASCRIPT: &str =
    "Contains Embedded JavaScript (Potential Malware/Tracking)";

const BASE_SCORE: i64 = 80;
const NO_METADATA_PENALTY: i64 = 20;
const RISK_FLAG_PENALTY: i64 = 40;
const GENERIC_AUTHOR_PENALTY: i64 = 10;

/// Paragraphs of DOCX body text kept for the preview
const DOCX_PREVIEW_PARAGRAPHS: usize = 5;

static CORE_PROPERTY: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(
        r"<(?:dc|cp|dcterms):(creator|created|modified|lastModifiedBy|revision)\b[^>]*>([^<]*)</",
    )
    .ok()
});

static TEXT_RUN: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>").ok());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DocumentKind {
    #[serde(rename = "PDF")]
    Pdf,
    #[serde(rename = "DOCX")]
    Docx,
}

impl DocumentKind {
    /// Kind from the upload's file name (extension, case-insensitive)
    pub fn from_filename(filename: &str) -> Option<Self> {
        let lowered = filename.to_lowercase();
        if lowered.ends_with(".pdf") {
            Some(DocumentKind::Pdf)
        } else if lowered.ends_with(".docx") {
            Some(DocumentKind::Docx)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "PDF",
            DocumentKind::Docx => "DOCX",
        }
    }
}

/// Everything extracted from one document
#[derive(Debug, Clone, Default)]
pub struct DocumentEvidence {
    pub metadata: BTreeMap<String, String>,
    pub risk_flags: Vec<String>,
    pub text_preview: String,
}

impl DocumentEvidence {
    /// Integrity score: 80, minus deductions for missing metadata, risk
    /// flags and a generic "User" author
    pub fn integrity_score(&self) -> CredibilityScore {
        let mut score = BASE_SCORE;
        if self.metadata.is_empty() {
            score -= NO_METADATA_PENALTY;
        }
        if !self.risk_flags.is_empty() {
            score -= RISK_FLAG_PENALTY;
        }
        if self
            .metadata
            .get("Author")
            .is_some_and(|author| author.contains("User"))
        {
            score -= GENERIC_AUTHOR_PENALTY;
        }
        CredibilityScore::new(score)
    }
}

/// Inspect a document of a known kind
pub fn inspect_document(
    kind: DocumentKind,
    bytes: &[u8],
) -> Result<DocumentEvidence, ForensicsError> {
    match kind {
        DocumentKind::Pdf => inspect_pdf(bytes),
        DocumentKind::Docx => inspect_docx(bytes),
    }
}

fn inspect_pdf(bytes: &[u8]) -> Result<DocumentEvidence, ForensicsError> {
    let doc = lopdf::Document::load_mem(bytes)
        .map_err(|e| ForensicsError::Decode(format!("Failed to parse document: {}", e)))?;

    let mut evidence = DocumentEvidence::default();

    let info = match doc.trailer.get(b"Info") {
        Ok(Object::Reference(id)) => doc.get_dictionary(*id).ok(),
        Ok(Object::Dictionary(dict)) => Some(dict),
        _ => None,
    };
    if let Some(info) = info {
        for (key, value) in info.iter() {
            if let Some(text) = pdf_value_text(value) {
                let key = String::from_utf8_lossy(key).trim_start_matches('/').to_string();
                evidence.metadata.insert(key, text);
            }
        }
    }

    let has_script = doc.objects.values().any(|obj| match obj {
        Object::Dictionary(dict) => dict.has(b"JS") || dict.has(b"JavaScript"),
        Object::Stream(stream) => stream.dict.has(b"JS") || stream.dict.has(b"JavaScript"),
        _ => false,
    });
    if has_script {
        evidence.risk_flags.push(RISK_EMBEDDED_JAVASCRIPT.to_string());
    }

    if let Some(first_page) = doc.get_pages().keys().next().copied() {
        evidence.text_preview = doc.extract_text(&[first_page]).unwrap_or_else(|e| {
            debug!("PDF text extraction failed: {}", e);
            String::new()
        });
    }

    Ok(evidence)
}

fn pdf_value_text(value: &Object) -> Option<String> {
    let text = match value {
        Object::String(bytes, _) => decode_pdf_string(bytes),
        Object::Name(name) => String::from_utf8_lossy(name).to_string(),
        Object::Integer(i) => i.to_string(),
        Object::Real(r) => r.to_string(),
        Object::Boolean(b) => b.to_string(),
        _ => return None,
    };
    Some(text)
}

/// PDF text strings are UTF-16BE with a BOM, or single-byte otherwise
fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

fn inspect_docx(bytes: &[u8]) -> Result<DocumentEvidence, ForensicsError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ForensicsError::Decode(format!("Failed to parse document: {}", e)))?;

    let mut evidence = DocumentEvidence::default();

    if let Some(core) = read_zip_entry(&mut archive, "docProps/core.xml")? {
        evidence.metadata = docx_core_properties(&core);
    }

    let body = read_zip_entry(&mut archive, "word/document.xml")?.ok_or_else(|| {
        ForensicsError::Decode("Failed to parse document: missing word/document.xml".to_string())
    })?;
    evidence.text_preview = docx_preview(&body, DOCX_PREVIEW_PARAGRAPHS);

    Ok(evidence)
}

fn read_zip_entry(
    archive: &mut zip::ZipArchive<Cursor<&[u8]>>,
    name: &str,
) -> Result<Option<String>, ForensicsError> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => {
            return Err(ForensicsError::Decode(format!(
                "Failed to parse document: {}",
                e
            )))
        }
    };
    let mut content = String::new();
    entry
        .read_to_string(&mut content)
        .map_err(|e| ForensicsError::Decode(format!("Failed to parse document: {}", e)))?;
    Ok(Some(content))
}

/// Core properties (docProps/core.xml) under display names
pub fn docx_core_properties(core_xml: &str) -> BTreeMap<String, String> {
    let mut props = BTreeMap::new();
    let Some(pattern) = CORE_PROPERTY.as_ref() else {
        return props;
    };
    for caps in pattern.captures_iter(core_xml) {
        let key = match &caps[1] {
            "creator" => "Author",
            "created" => "Created",
            "modified" => "Modified",
            "lastModifiedBy" => "LastModifiedBy",
            _ => "Revision",
        };
        let value = unescape_xml(caps[2].trim());
        if !value.is_empty() {
            props.entry(key.to_string()).or_insert(value);
        }
    }
    props
}

/// Text of the first `paragraphs` paragraphs of word/document.xml
pub fn docx_preview(document_xml: &str, paragraphs: usize) -> String {
    let Some(run) = TEXT_RUN.as_ref() else {
        return String::new();
    };

    document_xml
        .split("</w:p>")
        .filter(|chunk| chunk.contains("<w:p"))
        .take(paragraphs)
        .map(|para| {
            run.captures_iter(para)
                .map(|c| unescape_xml(&c[1]))
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Resolve the five predefined XML entities and numeric character references
///
/// Single pass, so `&amp;lt;` stays `&lt;`. Unknown or malformed references
/// are kept verbatim.
fn unescape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let resolved = tail
            .find(';')
            .filter(|&end| end <= 10)
            .and_then(|end| resolve_entity(&tail[1..end]).map(|c| (c, end)));
        match resolved {
            Some((c, end)) => {
                out.push(c);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn resolve_entity(name: &str) -> Option<char> {
    match name {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "amp" => Some('&'),
        _ => {
            let code = match name.strip_prefix('#')? {
                hex if hex.starts_with(['x', 'X']) => u32::from_str_radix(&hex[1..], 16).ok()?,
                dec => dec.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;
    use std::io::Write;

    fn build_pdf(author: Option<&str>, with_script: bool) -> Vec<u8> {
        let mut doc = lopdf::Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        if let Some(author) = author {
            let info_id = doc.add_object(dictionary! {
                "Author" => Object::string_literal(author),
                "Producer" => Object::string_literal("Newsroom Writer 3.1"),
            });
            doc.trailer.set("Info", info_id);
        }
        if with_script {
            doc.add_object(dictionary! {
                "S" => "JavaScript",
                "JS" => Object::string_literal("app.alert('hi')"),
            });
        }

        let mut out = Vec::new();
        doc.save_to(&mut out).unwrap();
        out
    }

    fn build_docx(core: Option<&str>, body: &str) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::FileOptions::default();
        if let Some(core) = core {
            writer.start_file("docProps/core.xml", options).unwrap();
            writer.write_all(core.as_bytes()).unwrap();
        }
        writer.start_file("word/document.xml", options).unwrap();
        writer.write_all(body.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    const CORE_XML: &str = r#"<?xml version="1.0"?>
<cp:coreProperties xmlns:cp="x" xmlns:dc="y" xmlns:dcterms="z">
<dc:creator>Jane Reporter</dc:creator>
<cp:lastModifiedBy>Desk &amp; Copy</cp:lastModifiedBy>
<cp:revision>4</cp:revision>
<dcterms:created xsi:type="dcterms:W3CDTF">2024-01-02T10:00:00Z</dcterms:created>
</cp:coreProperties>"#;

    const BODY_XML: &str = r#"<w:document><w:body>
<w:p><w:r><w:t>Quarterly</w:t></w:r><w:r><w:t xml:space="preserve"> report</w:t></w:r></w:p>
<w:p><w:r><w:t>Second paragraph</w:t></w:r></w:p>
</w:body></w:document>"#;

    #[test]
    fn test_kind_from_filename() {
        assert_eq!(DocumentKind::from_filename("Report.PDF"), Some(DocumentKind::Pdf));
        assert_eq!(DocumentKind::from_filename("memo.docx"), Some(DocumentKind::Docx));
        assert_eq!(DocumentKind::from_filename("notes.txt"), None);
        assert_eq!(DocumentKind::from_filename("legacy.doc"), None);
    }

    #[test]
    fn test_score_table() {
        let mut evidence = DocumentEvidence::default();
        assert_eq!(evidence.integrity_score().value(), 60);

        evidence.metadata.insert("Author".to_string(), "Jane".to_string());
        assert_eq!(evidence.integrity_score().value(), 80);

        evidence.metadata.insert("Author".to_string(), "User".to_string());
        assert_eq!(evidence.integrity_score().value(), 70);

        evidence.risk_flags.push(RISK_EMBEDDED_JAVASCRIPT.to_string());
        assert_eq!(evidence.integrity_score().value(), 30);

        evidence.metadata.clear();
        assert_eq!(evidence.integrity_score().value(), 20);
    }

    #[test]
    fn test_pdf_metadata_and_clean() {
        let evidence = inspect_document(DocumentKind::Pdf, &build_pdf(Some("Jane Reporter"), false)).unwrap();
        assert_eq!(evidence.metadata.get("Author").map(String::as_str), Some("Jane Reporter"));
        assert!(evidence.risk_flags.is_empty());
        assert_eq!(evidence.integrity_score().value(), 80);
    }

    #[test]
    fn test_pdf_script_flagged() {
        let evidence = inspect_document(DocumentKind::Pdf, &build_pdf(None, true)).unwrap();
        assert_eq!(evidence.risk_flags, vec![RISK_EMBEDDED_JAVASCRIPT.to_string()]);
        assert!(evidence.metadata.is_empty());
        assert_eq!(evidence.integrity_score().value(), 20);
    }

    #[test]
    fn test_garbage_pdf_is_decode_error() {
        let result = inspect_document(DocumentKind::Pdf, b"%PDF-1.4 this is not really a pdf");
        assert!(matches!(result, Err(ForensicsError::Decode(_))));
    }

    #[test]
    fn test_docx_properties_and_preview() {
        let evidence = inspect_document(DocumentKind::Docx, &build_docx(Some(CORE_XML), BODY_XML)).unwrap();
        assert_eq!(evidence.metadata["Author"], "Jane Reporter");
        assert_eq!(evidence.metadata["LastModifiedBy"], "Desk & Copy");
        assert_eq!(evidence.metadata["Revision"], "4");
        assert_eq!(evidence.metadata["Created"], "2024-01-02T10:00:00Z");
        assert_eq!(evidence.text_preview, "Quarterly report\nSecond paragraph");
    }

    #[test]
    fn test_docx_without_body_is_decode_error() {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("docProps/core.xml", zip::write::FileOptions::default())
            .unwrap();
        writer.write_all(CORE_XML.as_bytes()).unwrap();
        let bytes = writer.finish().unwrap().into_inner();
        assert!(matches!(
            inspect_document(DocumentKind::Docx, &bytes),
            Err(ForensicsError::Decode(_))
        ));
        assert!(matches!(
            inspect_document(DocumentKind::Docx, b"not a zip"),
            Err(ForensicsError::Decode(_))
        ));
    }

    #[test]
    fn test_unescape_character_references() {
        assert_eq!(unescape_xml("Smith &amp; Sons"), "Smith & Sons");
        assert_eq!(unescape_xml("it&#8217;s"), "it\u{2019}s");
        assert_eq!(unescape_xml("&#x201C;quoted&#X201D;"), "\u{201C}quoted\u{201D}");
        assert_eq!(unescape_xml("&amp;lt;tag&amp;gt;"), "&lt;tag&gt;");
        assert_eq!(unescape_xml("AT&T &unknown; &#xZZ; & done"), "AT&T &unknown; &#xZZ; & done");
        assert_eq!(unescape_xml("&#1114112;"), "&#1114112;");

        let core = r#"<cp:coreProperties><dc:creator>O&#8217;Brien</dc:creator></cp:coreProperties>"#;
        assert_eq!(
            docx_core_properties(core).get("Author").map(String::as_str),
            Some("O\u{2019}Brien")
        );
    }

    #[test]
    fn test_decode_utf16_pdf_string() {
        let bytes = [0xFE, 0xFF, 0x00, 0x4A, 0x00, 0x6F];
        assert_eq!(decode_pdf_string(&bytes), "Jo");
        assert_eq!(decode_pdf_string(b"Plain"), "Plain");
    }
}
