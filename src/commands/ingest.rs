//! Ingest command implementation

use crate::extract::FileType;
use crate::index::DocumentIndex;
use crate::error::Result;
use crate::progress::{advance_progress, finish_progress, start_progress_bar};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// One stored file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestedFile {
    pub path: String,
    pub file_id: String,
    pub name: String,
    pub file_type: String,
    pub token_count: i64,
}

/// Statistics from an ingestion run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestStats {
    pub ingested: Vec<IngestedFile>,
    pub skipped: Vec<String>,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    /// MIME type to use instead of guessing from the file name
    pub mime: Option<String>,
}

/// Guess the MIME type of a path from its extension
pub fn guess_mime(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|s| s.starts_with('.'))
            .unwrap_or(false)
}

/// Expand the given paths into files. Directory members whose type is not
/// supported are reported as skipped; explicit files are always attempted.
fn collect_files(paths: &[PathBuf], options: &IngestOptions, stats: &mut IngestStats) -> Vec<(PathBuf, String)> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            let walker = WalkDir::new(path)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|e| !is_hidden(e));
            for entry in walker {
                match entry {
                    Ok(e) if e.file_type().is_file() => {
                        let mime = options.mime.clone().unwrap_or_else(|| guess_mime(e.path()));
                        if FileType::from_mime(&mime).is_ok() {
                            files.push((e.path().to_path_buf(), mime));
                        } else {
                            debug!("Skipping {:?} ({})", e.path(), mime);
                            stats.skipped.push(e.path().display().to_string());
                        }
                    }
                    Ok(_) => {}
                    Err(e) => stats.errors.push(e.to_string()),
                }
            }
        } else {
            let mime = options.mime.clone().unwrap_or_else(|| guess_mime(path));
            files.push((path.clone(), mime));
        }
    }

    files
}

/// Ingest files and directories into the document index
pub async fn cmd_ingest(index: &DocumentIndex, paths: &[PathBuf], options: IngestOptions) -> Result<IngestStats> {
    let mut stats = IngestStats::default();
    let files = collect_files(paths, &options, &mut stats);
    info!("Found {} files to ingest", files.len());

    let progress = start_progress_bar(files.len(), "Ingesting files");

    for (path, mime) in files {
        let display_path = path.display().to_string();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| display_path.clone());

        let outcome = match tokio::fs::read(&path).await {
            Ok(bytes) => index.ingest(&name, &mime, &bytes).await,
            Err(e) => Err(e.into()),
        };

        match outcome {
            Ok(doc) => stats.ingested.push(IngestedFile {
                path: display_path,
                file_id: doc.file_id,
                name: doc.name,
                file_type: doc.file_type,
                token_count: doc.token_count,
            }),
            Err(e) => {
                warn!("Failed to ingest {}: {}", display_path, e);
                stats.errors.push(format!("{}: {}", display_path, e));
            }
        }
        advance_progress(&progress);
    }

    finish_progress(progress, "Files ingested");
    Ok(stats)
}

/// Print ingestion results
pub fn print_ingest_stats(stats: &IngestStats) {
    for file in &stats.ingested {
        println!("  {}  {} ({} tokens)", file.file_id, file.path, file.token_count);
    }

    println!("\n✓ Ingestion complete");
    println!("  Documents stored: {}", stats.ingested.len());
    if !stats.skipped.is_empty() {
        println!("  Skipped (unsupported type): {}", stats.skipped.len());
    }
    if !stats.errors.is_empty() {
        println!("  Errors: {}", stats.errors.len());
        for e in &stats.errors {
            println!("    ✗ {}", e);
        }
    }
}
