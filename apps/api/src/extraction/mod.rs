//! Document Extractor: turns an uploaded resume into normalized text with
//! section boundaries.
//!
//! Parsing is deterministic, so none of the failures here are retried.

pub mod doc;
pub mod docx;
pub mod pdf;
pub mod profile;
pub mod text;

use bytes::Bytes;
use thiserror::Error;

pub use text::{ExtractedText, SectionKind};

/// Largest accepted resume, enforced server-side regardless of client checks.
pub const MAX_DOCUMENT_BYTES: usize = 5 * 1024 * 1024;

const PDF_MIME: &str = "application/pdf";
const DOC_MIME: &str = "application/msword";
const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const PDF_MAGIC: &[u8] = b"%PDF-";
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("{0}")]
    UnsupportedFormat(String),

    #[error("{0}")]
    CorruptDocument(String),

    #[error("no extractable text")]
    EmptyContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Pdf,
    Doc,
    Docx,
}

impl MediaType {
    pub fn label(&self) -> &'static str {
        match self {
            MediaType::Pdf => "PDF",
            MediaType::Doc => "DOC",
            MediaType::Docx => "DOCX",
        }
    }

    /// Parses a MIME type, ignoring parameters such as `; charset=`.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or("").trim().to_lowercase();
        match essence.as_str() {
            PDF_MIME => Some(MediaType::Pdf),
            DOC_MIME => Some(MediaType::Doc),
            DOCX_MIME => Some(MediaType::Docx),
            _ => None,
        }
    }

    pub fn from_file_name(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        match ext.to_lowercase().as_str() {
            "pdf" => Some(MediaType::Pdf),
            "doc" => Some(MediaType::Doc),
            "docx" => Some(MediaType::Docx),
            _ => None,
        }
    }

    /// Resolves the declared type of an upload. Generic or missing content
    /// types fall back to the file-name extension.
    pub fn resolve(
        content_type: Option<&str>,
        file_name: Option<&str>,
    ) -> Result<Self, ExtractionError> {
        let generic = content_type
            .map(|ct| ct.trim().is_empty() || ct.starts_with("application/octet-stream"))
            .unwrap_or(true);

        let resolved = if generic {
            file_name.and_then(MediaType::from_file_name)
        } else {
            content_type.and_then(MediaType::from_mime)
        };

        resolved.ok_or_else(|| {
            ExtractionError::UnsupportedFormat(
                "Invalid file format. Only PDF, DOC and DOCX files are supported".to_string(),
            )
        })
    }

    /// Identifies a supported format from its leading bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(PDF_MAGIC) {
            Some(MediaType::Pdf)
        } else if bytes.starts_with(ZIP_MAGIC) {
            Some(MediaType::Docx)
        } else if bytes.starts_with(OLE_MAGIC) {
            Some(MediaType::Doc)
        } else {
            None
        }
    }
}

/// An uploaded resume. Lives for one request only.
#[derive(Debug, Clone)]
pub struct Document {
    pub bytes: Bytes,
    pub media_type: MediaType,
}

impl Document {
    pub fn new(bytes: Bytes, media_type: MediaType) -> Self {
        Self { bytes, media_type }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Extracts normalized text from a document. CPU-bound; call it from a
/// blocking task.
pub fn extract(document: &Document) -> Result<ExtractedText, ExtractionError> {
    let declared = document.media_type;

    match MediaType::sniff(&document.bytes) {
        None => {
            return Err(ExtractionError::CorruptDocument(format!(
                "The file is not a readable {} document",
                declared.label()
            )))
        }
        Some(actual) if actual != declared => {
            return Err(ExtractionError::UnsupportedFormat(format!(
                "The file was declared as {} but its content is {}",
                declared.label(),
                actual.label()
            )))
        }
        Some(_) => {}
    }

    let raw = match declared {
        MediaType::Pdf => pdf::extract_text(&document.bytes)?,
        MediaType::Docx => docx::extract_text(&document.bytes)?,
        MediaType::Doc => doc::extract_text(&document.bytes)?,
    };

    let extracted = ExtractedText::from_raw(&raw);
    if extracted.is_empty() {
        return Err(ExtractionError::EmptyContent);
    }

    Ok(extracted)
}
