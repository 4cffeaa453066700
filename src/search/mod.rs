//! Ranked, filtered, paginated document search
//!
//! A query is tokenized like document text; every distinct term must be
//! present for a document to match. Matches are ranked by the share of the
//! document's tokens that are query terms.

use crate::db::{Database, DocumentQuery, SearchHit};
use crate::error::{Error, Result};
use crate::extract::FileType;
use crate::index::query_terms;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Result ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Highest rank first, ties by file id
    #[default]
    Relevance,
    /// Display name ascending, ties by file id
    Name,
}

impl FromStr for SortMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "relevance" => Ok(SortMode::Relevance),
            "name" => Ok(SortMode::Name),
            other => Err(Error::InvalidArgument(format!(
                "Invalid sort mode '{}'; expected 'relevance' or 'name'",
                other
            ))),
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortMode::Relevance => write!(f, "relevance"),
            SortMode::Name => write!(f, "name"),
        }
    }
}

/// Parameters of one search
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: String,
    /// Restrict to these types (empty = all)
    pub file_types: Vec<FileType>,
    pub sort: SortMode,
    /// 1-based page number
    pub page: u32,
    pub limit: u32,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            file_types: Vec::new(),
            sort: SortMode::Relevance,
            page: 1,
            limit: 10,
        }
    }
}

/// One page of search results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPage {
    pub results: Vec<SearchHit>,
    pub total_count: u64,
    pub total_pages: u64,
    pub page: u32,
    pub limit: u32,
}

/// `ceil(total / limit)`
pub fn total_pages(total: u64, limit: u32) -> u64 {
    if limit == 0 {
        return 0;
    }
    total.div_ceil(u64::from(limit))
}

/// Runs searches against the document store
#[derive(Clone)]
pub struct SearchEngine {
    db: Database,
}

impl SearchEngine {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Execute a search
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchPage> {
        if request.page < 1 || request.limit < 1 {
            return Err(Error::InvalidArgument(
                "Page and limit must be positive integers".to_string(),
            ));
        }

        let terms = query_terms(&request.query);
        debug!("Search terms: {:?}", terms);

        let query = DocumentQuery {
            terms,
            file_types: request
                .file_types
                .iter()
                .map(|t| t.mime().to_string())
                .collect(),
            sort: request.sort,
            limit: i64::from(request.limit),
            offset: (i64::from(request.page) - 1) * i64::from(request.limit),
        };

        let (results, total) = self.db.search_documents(&query).await?;
        let total_count = total.max(0) as u64;

        Ok(SearchPage {
            results,
            total_count,
            total_pages: total_pages(total_count, request.limit),
            page: request.page,
            limit: request.limit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{MIME_PDF, MIME_PLAIN_TEXT};
    use crate::index::TokenVector;
    use crate::db::DocumentDraft;
    use tempfile::TempDir;

    async fn setup_engine(docs: &[(&str, &str, &str)]) -> (SearchEngine, TempDir) {
        let tmp = TempDir::new().unwrap();
        let db = Database::new(&tmp.path().join("search.db")).await.unwrap();
        for (name, mime, text) in docs {
            db.insert_document(&DocumentDraft {
                name: name.to_string(),
                file_type: mime.to_string(),
                content: Some(text.to_string()),
                tokens: TokenVector::from_text(text),
            })
            .await
            .unwrap();
        }
        (SearchEngine::new(db), tmp)
    }

    #[test]
    fn test_sort_mode_parse() {
        assert_eq!("relevance".parse::<SortMode>().unwrap(), SortMode::Relevance);
        assert_eq!("Name".parse::<SortMode>().unwrap(), SortMode::Name);
        assert!(matches!(
            "date".parse::<SortMode>(),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(1, 1), 1);
    }

    #[tokio::test]
    async fn test_relevance_and_name_ordering() {
        let (engine, _tmp) = setup_engine(&[
            ("zeta.txt", MIME_PLAIN_TEXT, "ranking ranking signals"),
            ("alpha.txt", MIME_PLAIN_TEXT, "ranking factors for search engines today"),
            ("mid.txt", MIME_PLAIN_TEXT, "unrelated words"),
        ])
        .await;

        let mut request = SearchRequest::new("ranking");
        let page = engine.search(&request).await.unwrap();
        assert_eq!(page.total_count, 2);
        assert_eq!(page.results[0].name, "zeta.txt");

        request.sort = SortMode::Name;
        let page = engine.search(&request).await.unwrap();
        let names: Vec<_> = page.results.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["alpha.txt", "zeta.txt"]);
    }

    #[tokio::test]
    async fn test_equal_rank_ties_by_file_id() {
        let (engine, _tmp) = setup_engine(&[
            ("b.txt", MIME_PLAIN_TEXT, "rust"),
            ("a.txt", MIME_PLAIN_TEXT, "rust"),
        ])
        .await;

        let page = engine.search(&SearchRequest::new("rust")).await.unwrap();
        let ids: Vec<_> = page.results.iter().map(|h| h.file_id.as_str()).collect();
        assert_eq!(ids, vec!["file001", "file002"]);
    }

    #[tokio::test]
    async fn test_type_filter() {
        let (engine, _tmp) = setup_engine(&[
            ("notes.txt", MIME_PLAIN_TEXT, "seo notes"),
            ("paper.pdf", MIME_PDF, "seo paper"),
        ])
        .await;

        let mut request = SearchRequest::new("seo");
        request.file_types = vec![FileType::Pdf];
        let page = engine.search(&request).await.unwrap();
        assert_eq!(page.total_count, 1);
        assert_eq!(page.results[0].file_type, MIME_PDF);

        request.file_types = vec![FileType::Docx];
        let page = engine.search(&request).await.unwrap();
        assert_eq!(page.total_count, 0);
    }

    #[tokio::test]
    async fn test_pagination() {
        let docs: Vec<(String, String)> = (0..5)
            .map(|i| (format!("doc{}.txt", i), format!("shared term {}", i)))
            .collect();
        let refs: Vec<(&str, &str, &str)> = docs
            .iter()
            .map(|(n, t)| (n.as_str(), MIME_PLAIN_TEXT, t.as_str()))
            .collect();
        let (engine, _tmp) = setup_engine(&refs).await;

        let mut request = SearchRequest::new("shared");
        request.limit = 2;
        request.page = 3;
        let page = engine.search(&request).await.unwrap();
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.total_count, 5);
        assert_eq!(page.total_pages, 3);

        request.page = 9;
        let page = engine.search(&request).await.unwrap();
        assert!(page.results.is_empty());
        assert_eq!(page.total_count, 5);

        request.page = 0;
        assert!(matches!(
            engine.search(&request).await,
            Err(Error::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_inflected_query_matches() {
        let (engine, _tmp) = setup_engine(&[(
            "seo.txt",
            MIME_PLAIN_TEXT,
            "SEO means search engine optimization",
        )])
        .await;

        for query in ["optimize engines", "searching", "optimization"] {
            let page = engine.search(&SearchRequest::new(query)).await.unwrap();
            assert_eq!(page.total_count, 1, "query {:?}", query);
            assert_eq!(page.results[0].file_id, "file001");
        }
    }

    #[tokio::test]
    async fn test_empty_and_unmatched_queries() {
        let (engine, _tmp) =
            setup_engine(&[("a.txt", MIME_PLAIN_TEXT, "content here")]).await;

        let page = engine.search(&SearchRequest::new("the and of")).await.unwrap();
        assert_eq!(page.total_count, 0);
        assert_eq!(page.total_pages, 0);
        assert!(page.results.is_empty());

        let page = engine.search(&SearchRequest::new("content missing")).await.unwrap();
        assert_eq!(page.total_count, 0);
    }
}
