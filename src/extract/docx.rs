//! DOCX text extraction (requires the `docx` feature)
//!
//! A DOCX file is a zip container; the body lives in `word/document.xml`.
//! Paragraph text is the concatenation of its `<w:t>` runs, and paragraphs
//! are joined with newlines.

use super::TextExtractor;
use crate::error::{Error, Result};
use async_trait::async_trait;
use regex::Regex;
use std::sync::OnceLock;

/// Word documents in the Office Open XML format
pub struct DocxExtractor;

#[async_trait]
impl TextExtractor for DocxExtractor {
    #[cfg(feature = "docx")]
    async fn extract(&self, bytes: &[u8]) -> Result<String> {
        let xml = read_document_xml(bytes)?;
        Ok(plaintext_from_document_xml(&xml))
    }

    #[cfg(not(feature = "docx"))]
    async fn extract(&self, _bytes: &[u8]) -> Result<String> {
        Err(Error::Extraction(
            "DOCX support is not enabled in this build (enable the `docx` feature)".to_string(),
        ))
    }
}

#[cfg(feature = "docx")]
fn read_document_xml(bytes: &[u8]) -> Result<String> {
    use std::io::Read;

    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))
        .map_err(|e| Error::Extraction(format!("DOCX is not a valid zip container: {}", e)))?;
    let mut entry = archive
        .by_name("word/document.xml")
        .map_err(|e| Error::Extraction(format!("DOCX has no word/document.xml: {}", e)))?;

    let mut xml = String::new();
    entry
        .read_to_string(&mut xml)
        .map_err(|e| Error::Extraction(format!("Failed to read word/document.xml: {}", e)))?;
    Ok(xml)
}

fn paragraph_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<w:p\b[^>]*?(?:/>|>(.*?)</w:p>)").expect("valid regex"))
}

fn run_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)<w:t\b[^>]*?(?:/>|>(.*?)</w:t>)|<w:tab\b[^>]*/>|<w:br\b[^>]*/>")
            .expect("valid regex")
    })
}

/// Pull paragraph text out of a `word/document.xml` body
pub(crate) fn plaintext_from_document_xml(xml: &str) -> String {
    let mut paragraphs = Vec::new();

    for para in paragraph_re().captures_iter(xml) {
        let body = para.get(1).map(|m| m.as_str()).unwrap_or("");
        let mut line = String::new();
        for run in run_re().captures_iter(body) {
            let whole = run.get(0).map(|m| m.as_str()).unwrap_or("");
            if whole.starts_with("<w:tab") {
                line.push('\t');
            } else if whole.starts_with("<w:br") {
                line.push('\n');
            } else if let Some(text) = run.get(1) {
                line.push_str(&decode_entities(text.as_str()));
            }
        }
        paragraphs.push(line);
    }

    paragraphs.join("\n")
}

fn entity_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"&(?:#[xX]([0-9A-Fa-f]{1,6})|#([0-9]{1,7})|(lt|gt|quot|apos|amp));")
            .expect("valid regex")
    })
}

/// Decode the predefined XML entities and numeric character references in
/// one pass; references to invalid code points are kept verbatim
fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    entity_re()
        .replace_all(text, |caps: &regex::Captures| {
            let decoded = if let Some(hex) = caps.get(1) {
                u32::from_str_radix(hex.as_str(), 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = caps.get(2) {
                dec.as_str().parse::<u32>().ok().and_then(char::from_u32)
            } else {
                match caps.get(3).map(|m| m.as_str()) {
                    Some("lt") => Some('<'),
                    Some("gt") => Some('>'),
                    Some("quot") => Some('"'),
                    Some("apos") => Some('\''),
                    Some("amp") => Some('&'),
                    _ => None,
                }
            };
            match decoded {
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>
<w:p><w:pPr><w:pStyle w:val="Title"/></w:pPr><w:r><w:t>SEO basics</w:t></w:r></w:p>
<w:p><w:r><w:t xml:space="preserve">Search engine </w:t></w:r><w:r><w:t>optimization &amp; ranking</w:t></w:r></w:p>
<w:p/>
<w:p><w:r><w:t>Col A</w:t><w:tab/><w:t>Col B</w:t></w:r></w:p>
</w:body></w:document>"#;

    #[test]
    fn test_plaintext_from_document_xml() {
        let text = plaintext_from_document_xml(BODY);
        assert_eq!(
            text,
            "SEO basics\nSearch engine optimization & ranking\n\nCol A\tCol B"
        );
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("a &lt;b&gt; &amp;lt;"), "a <b> &lt;");
    }

    #[test]
    fn test_decode_numeric_references() {
        assert_eq!(decode_entities("it&#8217;s"), "it\u{2019}s");
        assert_eq!(decode_entities("a&#xA0;b &#X41;"), "a\u{a0}b A");
        assert_eq!(decode_entities("&#38;amp;"), "&amp;");
        assert_eq!(decode_entities("bad &#xD800; &#1114112; &nbsp;"), "bad &#xD800; &#1114112; &nbsp;");
    }

    #[cfg(feature = "docx")]
    #[tokio::test]
    async fn test_extract_from_zip() {
        use std::io::Write;
        use zip::write::SimpleFileOptions;

        let mut buf = std::io::Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut buf);
            writer
                .start_file("word/document.xml", SimpleFileOptions::default())
                .unwrap();
            writer.write_all(BODY.as_bytes()).unwrap();
            writer.finish().unwrap();
        }

        let text = DocxExtractor.extract(buf.get_ref()).await.unwrap();
        assert!(text.starts_with("SEO basics\n"));
    }

    #[tokio::test]
    async fn test_rejects_non_zip() {
        let err = DocxExtractor.extract(b"plain bytes").await.unwrap_err();
        assert!(matches!(err, Error::Extraction(_)));
    }
}
