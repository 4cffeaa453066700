//! PDF text extraction (requires the `pdf` feature)

use super::TextExtractor;
use crate::error::{Error, Result};
use async_trait::async_trait;

/// PDF documents, extracted with `pdf-extract` on a blocking thread
pub struct PdfExtractor;

#[async_trait]
impl TextExtractor for PdfExtractor {
    #[cfg(feature = "pdf")]
    async fn extract(&self, bytes: &[u8]) -> Result<String> {
        let pdf_bytes = bytes.to_vec();
        tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&pdf_bytes))
            .await
            .map_err(|e| Error::Extraction(format!("PDF extraction task failed: {}", e)))?
            .map_err(|e| Error::Extraction(format!("PDF extraction error: {}", e)))
    }

    #[cfg(not(feature = "pdf"))]
    async fn extract(&self, _bytes: &[u8]) -> Result<String> {
        Err(Error::Extraction(
            "PDF support is not enabled in this build (enable the `pdf` feature)".to_string(),
        ))
    }
}
