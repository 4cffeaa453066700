//! Text extraction from uploaded files
//!
//! Each recognized file type has an extractor turning raw bytes into plain
//! text. Extractors are looked up through [`Extractors`], which the document
//! index owns and which tests can repopulate with doubles.

mod docx;
mod pdf;
mod text;

pub use docx::DocxExtractor;
pub use pdf::PdfExtractor;
pub use text::PlainTextExtractor;

use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub const MIME_PLAIN_TEXT: &str = "text/plain";
pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// File types accepted for ingestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Txt,
    Pdf,
    Docx,
}

impl FileType {
    pub const ALL: [FileType; 3] = [FileType::Txt, FileType::Pdf, FileType::Docx];

    /// Canonical MIME string stored with documents
    pub fn mime(&self) -> &'static str {
        match self {
            FileType::Txt => MIME_PLAIN_TEXT,
            FileType::Pdf => MIME_PDF,
            FileType::Docx => MIME_DOCX,
        }
    }

    /// Short alias used by search filters
    pub fn alias(&self) -> &'static str {
        match self {
            FileType::Txt => "txt",
            FileType::Pdf => "pdf",
            FileType::Docx => "docx",
        }
    }

    /// Resolve an uploaded MIME type. Parameters such as `; charset=utf-8`
    /// are ignored; anything else fails with `UnsupportedMediaType`.
    pub fn from_mime(mime: &str) -> Result<Self> {
        let essence = mime
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        FileType::ALL
            .into_iter()
            .find(|t| t.mime() == essence)
            .ok_or_else(|| Error::UnsupportedMediaType(mime.to_string()))
    }

    /// Resolve a filter alias (`txt`, `pdf`, `docx`)
    pub fn from_alias(alias: &str) -> Result<Self> {
        alias.parse()
    }

    /// Parse a comma separated alias list such as `"txt,pdf"`
    pub fn parse_alias_list(list: &str) -> Result<Vec<Self>> {
        let mut types = Vec::new();
        for part in list.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let ft = Self::from_alias(part)?;
            if !types.contains(&ft) {
                types.push(ft);
            }
        }
        Ok(types)
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.alias())
    }
}

impl FromStr for FileType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "txt" => Ok(FileType::Txt),
            "pdf" => Ok(FileType::Pdf),
            "docx" => Ok(FileType::Docx),
            other => Err(Error::InvalidArgument(format!(
                "Unknown file type '{}'; expected one of txt, pdf, docx",
                other
            ))),
        }
    }
}

/// Converts the bytes of one file type into plain text
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Extract the text; malformed input fails with `Error::Extraction`
    async fn extract(&self, bytes: &[u8]) -> Result<String>;
}

/// Extractor lookup by file type
#[derive(Clone)]
pub struct Extractors {
    by_type: HashMap<FileType, Arc<dyn TextExtractor>>,
}

impl Extractors {
    /// An empty registry
    pub fn empty() -> Self {
        Self {
            by_type: HashMap::new(),
        }
    }

    /// Register or replace the extractor for a file type
    pub fn with(mut self, file_type: FileType, extractor: Arc<dyn TextExtractor>) -> Self {
        self.by_type.insert(file_type, extractor);
        self
    }

    /// Extract text for the given type
    pub async fn extract(&self, file_type: FileType, bytes: &[u8]) -> Result<String> {
        let extractor = self.by_type.get(&file_type).ok_or_else(|| {
            Error::UnsupportedMediaType(format!("no extractor registered for {}", file_type.mime()))
        })?;
        extractor.extract(bytes).await
    }
}

impl Default for Extractors {
    fn default() -> Self {
        Self::empty()
            .with(FileType::Txt, Arc::new(PlainTextExtractor))
            .with(FileType::Pdf, Arc::new(PdfExtractor))
            .with(FileType::Docx, Arc::new(DocxExtractor))
    }
}

/// Check if content appears to be binary
pub fn is_binary_content(data: &[u8]) -> bool {
    let check_len = std::cmp::min(data.len(), 8192);
    data[..check_len].iter().any(|&b| b == 0)
}
