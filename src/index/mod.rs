//! Document ingestion and lookup
//!
//! Ingestion resolves the MIME type to an extractor, turns the bytes into
//! text, derives the [`TokenVector`] and stores everything in one write.

mod tokenizer;

pub use tokenizer::{query_terms, tokenize, TokenVector};

use crate::db::{Database, Document, DocumentDraft};
use crate::error::{Error, Result};
use crate::extract::{Extractors, FileType};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Format a sequence value as a document identifier (`file001`, `file1234`)
pub fn file_id_for_sequence(seq: i64) -> String {
    format!("file{:03}", seq)
}

/// Document details returned by lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentView {
    pub file_id: String,
    pub name: String,
    pub file_type: String,
    pub content: Option<String>,
    pub content_length: usize,
    /// Token representation in `'term':pos,...` form
    pub search_vector: String,
    pub created_at: String,
    pub retrieved_at: String,
}

/// Stores and retrieves documents
#[derive(Clone)]
pub struct DocumentIndex {
    db: Database,
    extractors: Extractors,
}

impl DocumentIndex {
    /// Index with the default extractors
    pub fn new(db: Database) -> Self {
        Self::with_extractors(db, Extractors::default())
    }

    pub fn with_extractors(db: Database, extractors: Extractors) -> Self {
        Self { db, extractors }
    }

    /// Extract, tokenize and store an uploaded file
    pub async fn ingest(&self, name: &str, mime_type: &str, bytes: &[u8]) -> Result<Document> {
        let file_type = FileType::from_mime(mime_type)?;
        debug!("Extracting {} ({}, {} bytes)", name, file_type, bytes.len());

        let text = self.extractors.extract(file_type, bytes).await?;
        let tokens = TokenVector::from_text(&text);

        let draft = DocumentDraft {
            name: name.to_string(),
            file_type: file_type.mime().to_string(),
            content: Some(text),
            tokens,
        };
        let doc = self.db.insert_document(&draft).await?;

        info!(
            "Ingested {} as {} ({} tokens)",
            doc.name, doc.file_id, doc.token_count
        );
        Ok(doc)
    }

    /// Fetch a stored document
    pub async fn lookup(&self, file_id: &str) -> Result<Document> {
        self.db
            .get_document(file_id)
            .await?
            .ok_or_else(|| Error::not_found("Document", file_id))
    }

    /// Fetch a stored document with derived display fields
    pub async fn view(&self, file_id: &str) -> Result<DocumentView> {
        let doc = self.lookup(file_id).await?;
        let search_vector = doc.tokens()?.to_display_string();

        Ok(DocumentView {
            content_length: doc.content.as_deref().map_or(0, |c| c.chars().count()),
            file_id: doc.file_id,
            name: doc.name,
            file_type: doc.file_type,
            content: doc.content,
            search_vector,
            created_at: doc.created_at,
            retrieved_at: crate::db::format_timestamp(Utc::now()),
        })
    }
}
