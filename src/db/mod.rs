//! Persistent storage using SQLite
//!
//! This module handles all storage including:
//! - Documents and their inverted term index
//! - Quizzes and their questions
//! - Quiz submissions
//! - Identifier sequences

mod quizzes;
mod schema;
mod submissions;

pub use quizzes::*;
pub use schema::*;
pub use submissions::*;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::index::{file_id_for_sequence, TokenVector};
use crate::search::SortMode;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Render a timestamp in the fixed-width form stored in every `created_at`
/// column, so that string comparison orders chronologically.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Current time in storage form
pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

/// A stored document
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Document {
    pub file_id: String,
    pub name: String,
    pub file_type: String,
    pub content: Option<String>,
    pub search_vector: String,
    pub token_count: i64,
    pub created_at: String,
}

impl Document {
    /// Decode the stored search vector
    pub fn tokens(&self) -> Result<TokenVector> {
        Ok(serde_json::from_str(&self.search_vector)?)
    }
}

/// Everything needed to store a new document except its identifier
#[derive(Debug, Clone)]
pub struct DocumentDraft {
    pub name: String,
    pub file_type: String,
    pub content: Option<String>,
    pub tokens: TokenVector,
}

/// A filtered, sorted, paginated document read
#[derive(Debug, Clone)]
pub struct DocumentQuery {
    /// Distinct terms that must all be present
    pub terms: Vec<String>,
    /// Allowed MIME types (empty = all)
    pub file_types: Vec<String>,
    pub sort: SortMode,
    pub limit: i64,
    pub offset: i64,
}

/// One document matching a query
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    pub file_id: String,
    pub name: String,
    pub file_type: String,
    pub relevance: f64,
}

/// Database handle
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to the database configured in `config`
    pub async fn connect(config: &Config) -> Result<Self> {
        let db = Self::open_pool(&config.paths.db_file).await?;
        Ok(db)
    }

    /// Open (creating if needed) the database at `db_path` and apply the schema
    pub async fn new(db_path: &Path) -> Result<Self> {
        let db = Self::open_pool(db_path).await?;
        db.init_schema().await?;
        Ok(db)
    }

    async fn open_pool(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(10));

        debug!("Connecting to SQLite database at {:?}", db_path);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Initialize the database schema
    pub async fn init_schema(&self) -> Result<()> {
        info!("Initializing database schema");
        sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // ===== Document Operations =====

    /// Allocate the next `fileNNN` identifier and store the document with its
    /// term rows, all inside one write transaction. The sequence update is the
    /// transaction's first statement, so concurrent writers queue on the
    /// database write lock instead of reading the same maximum.
    pub async fn insert_document(&self, draft: &DocumentDraft) -> Result<Document> {
        let search_vector = serde_json::to_string(&draft.tokens)?;
        let token_count = draft.tokens.token_count() as i64;

        let mut tx = self.pool.begin().await?;

        let seq: i64 = sqlx::query_scalar(
            "UPDATE id_sequences SET value = value + 1 WHERE name = ? RETURNING value",
        )
        .bind(DOCUMENT_SEQUENCE)
        .fetch_one(&mut *tx)
        .await?;

        let doc = Document {
            file_id: file_id_for_sequence(seq),
            name: draft.name.clone(),
            file_type: draft.file_type.clone(),
            content: draft.content.clone(),
            search_vector,
            token_count,
            created_at: now_timestamp(),
        };

        sqlx::query(
            r#"
            INSERT INTO documents (file_id, name, file_type, content, search_vector, token_count, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&doc.file_id)
        .bind(&doc.name)
        .bind(&doc.file_type)
        .bind(&doc.content)
        .bind(&doc.search_vector)
        .bind(doc.token_count)
        .bind(&doc.created_at)
        .execute(&mut *tx)
        .await?;

        for (term, frequency) in draft.tokens.frequencies() {
            sqlx::query("INSERT INTO document_terms (term, file_id, frequency) VALUES (?, ?, ?)")
                .bind(term)
                .bind(&doc.file_id)
                .bind(frequency as i64)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        debug!(
            "Stored document {} ({} distinct terms)",
            doc.file_id,
            draft.tokens.distinct_terms()
        );
        Ok(doc)
    }

    /// Get document by file ID
    pub async fn get_document(&self, file_id: &str) -> Result<Option<Document>> {
        let doc = sqlx::query_as::<_, Document>("SELECT * FROM documents WHERE file_id = ?")
            .bind(file_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(doc)
    }

    /// Fetch several documents; missing ids are simply absent from the result
    pub async fn get_documents(&self, file_ids: &[String]) -> Result<Vec<Document>> {
        if file_ids.is_empty() {
            return Ok(Vec::new());
        }

        let query = format!(
            "SELECT * FROM documents WHERE file_id IN ({})",
            placeholders(file_ids.len())
        );
        let mut query_builder = sqlx::query_as::<_, Document>(&query);
        for id in file_ids {
            query_builder = query_builder.bind(id);
        }
        Ok(query_builder.fetch_all(&self.pool).await?)
    }

    /// Conjunctive term search with optional type filter, returning one page
    /// of hits and the total match count from the same snapshot.
    pub async fn search_documents(&self, query: &DocumentQuery) -> Result<(Vec<SearchHit>, i64)> {
        if query.terms.is_empty() {
            return Ok((Vec::new(), 0));
        }

        let type_clause = if query.file_types.is_empty() {
            String::new()
        } else {
            format!("AND d.file_type IN ({})", placeholders(query.file_types.len()))
        };

        let matching = format!(
            r#"
            SELECT d.file_id, d.name, d.file_type,
                   CAST(SUM(t.frequency) AS REAL) / d.token_count AS relevance
            FROM documents d
            JOIN document_terms t ON t.file_id = d.file_id
            WHERE t.term IN ({terms})
            {type_clause}
            GROUP BY d.file_id
            HAVING COUNT(t.term) = ?
            "#,
            terms = placeholders(query.terms.len()),
            type_clause = type_clause,
        );

        let order = match query.sort {
            SortMode::Relevance => "relevance DESC, file_id ASC",
            SortMode::Name => "name ASC, file_id ASC",
        };
        let page_sql = format!(
            "SELECT * FROM ({}) ORDER BY {} LIMIT ? OFFSET ?",
            matching, order
        );
        let count_sql = format!("SELECT COUNT(*) FROM ({})", matching);

        let mut tx = self.pool.begin().await?;

        let mut page_query = sqlx::query_as::<_, SearchHit>(&page_sql);
        for term in &query.terms {
            page_query = page_query.bind(term);
        }
        for ft in &query.file_types {
            page_query = page_query.bind(ft);
        }
        let hits = page_query
            .bind(query.terms.len() as i64)
            .bind(query.limit)
            .bind(query.offset)
            .fetch_all(&mut *tx)
            .await?;

        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        for term in &query.terms {
            count_query = count_query.bind(term);
        }
        for ft in &query.file_types {
            count_query = count_query.bind(ft);
        }
        let total = count_query
            .bind(query.terms.len() as i64)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok((hits, total))
    }

    // ===== Statistics =====

    /// Get global statistics
    pub async fn get_global_stats(&self) -> Result<GlobalStats> {
        let count = |table: &'static str| {
            let pool = self.pool.clone();
            async move {
                sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
                    .fetch_one(&pool)
                    .await
            }
        };

        let (documents, quizzes, questions, submissions) = futures::try_join!(
            count("documents"),
            count("quizzes"),
            count("questions"),
            count("quiz_submissions"),
        )?;

        Ok(GlobalStats {
            document_count: documents as usize,
            quiz_count: quizzes as usize,
            question_count: questions as usize,
            submission_count: submissions as usize,
        })
    }
}

/// Global statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalStats {
    pub document_count: usize,
    pub quiz_count: usize,
    pub question_count: usize,
    pub submission_count: usize,
}

/// `?, ?, ?` with `n` placeholders
pub(crate) fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

/// Map a unique-constraint violation to an invalid-argument error
pub(crate) fn map_unique_violation(err: sqlx::Error, what: &str) -> Error {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            Error::InvalidArgument(format!("{} already exists", what))
        }
        _ => Error::Persistence(err),
    }
}
