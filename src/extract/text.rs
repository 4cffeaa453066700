//! Plain text extraction

use super::{is_binary_content, TextExtractor};
use crate::error::{Error, Result};
use async_trait::async_trait;

const UTF8_BOM: &str = "\u{feff}";

/// UTF-8 plain text files
pub struct PlainTextExtractor;

#[async_trait]
impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, bytes: &[u8]) -> Result<String> {
        if is_binary_content(bytes) {
            return Err(Error::Extraction(
                "plain text upload contains binary data".to_string(),
            ));
        }

        let text = std::str::from_utf8(bytes)
            .map_err(|e| Error::Extraction(format!("plain text is not valid UTF-8: {}", e)))?;

        Ok(text.strip_prefix(UTF8_BOM).unwrap_or(text).replace("\r\n", "\n"))
    }
}
