//! Search and document lookup commands

use crate::config::Config;
use crate::error::Result;
use crate::extract::FileType;
use crate::index::{DocumentIndex, DocumentView};
use crate::search::{SearchEngine, SearchPage, SearchRequest, SortMode};
use tracing::info;

/// Options for the search command
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Comma separated type aliases (`txt,pdf`)
    pub types: Option<String>,
    pub sort: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Run a search, filling unset options from the config
pub async fn cmd_search(
    config: &Config,
    engine: &SearchEngine,
    query: &str,
    options: SearchOptions,
) -> Result<SearchPage> {
    info!("Searching for: {}", query);

    let sort = match options.sort.as_deref() {
        Some(s) => s.parse::<SortMode>()?,
        None => config.default_sort_mode()?,
    };
    let file_types = match options.types.as_deref() {
        Some(list) => FileType::parse_alias_list(list)?,
        None => Vec::new(),
    };

    let request = SearchRequest {
        query: query.to_string(),
        file_types,
        sort,
        page: options.page.unwrap_or(1),
        limit: options.limit.unwrap_or(config.search.default_limit),
    };

    engine.search(&request).await
}

/// Look up one document
pub async fn cmd_document(index: &DocumentIndex, file_id: &str) -> Result<DocumentView> {
    index.view(file_id).await
}

/// Print search results to console
pub fn print_search_results(query: &str, page: &SearchPage) {
    println!("\n🔍 Query: {}\n", query);
    println!(
        "Found {} documents (page {} of {}):\n",
        page.total_count,
        page.page,
        page.total_pages.max(1)
    );

    let offset = (page.page.saturating_sub(1) as usize) * page.limit as usize;
    for (i, hit) in page.results.iter().enumerate() {
        println!(
            "{}. [rank: {:.4}] {}  {}",
            offset + i + 1,
            hit.relevance,
            hit.file_id,
            hit.name
        );
        println!("   Type: {}", hit.file_type);
    }
}

/// Print a document to console
pub fn print_document(doc: &DocumentView) {
    println!("\n📄 {} ({})\n", doc.name, doc.file_id);
    println!("Type: {}", doc.file_type);
    println!("Created: {}", doc.created_at);
    println!("Length: {} characters", doc.content_length);

    let content = doc.content.as_deref().unwrap_or("").trim();
    if content.is_empty() {
        println!("\n(no text content)");
    } else {
        let preview: String = content.chars().take(500).collect();
        let ellipsis = if content.chars().count() > 500 { "..." } else { "" };
        println!("\n{}{}", preview, ellipsis);
    }
}
