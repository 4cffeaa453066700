//! Status command implementation

use crate::config::Config;
use crate::db::{Database, GlobalStats};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Status information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusInfo {
    pub config_path: String,
    pub db_path: String,
    pub generation_url: String,
    pub generation_model: String,
    pub api_key_set: bool,
    pub db_stats: GlobalStats,
}

/// Get system status
pub async fn cmd_status(config: &Config, db: &Database) -> Result<StatusInfo> {
    info!("Getting status");

    let db_stats = db.get_global_stats().await?;

    Ok(StatusInfo {
        config_path: config.paths.config_file.display().to_string(),
        db_path: config.paths.db_file.display().to_string(),
        generation_url: config.generation.base_url.clone(),
        generation_model: config.generation.model.clone(),
        api_key_set: config.generation.api_key().is_some(),
        db_stats,
    })
}

/// Print status to console
pub fn print_status(status: &StatusInfo) {
    println!("\n📊 study-helper Status\n");
    println!("Configuration: {}", status.config_path);
    println!("Database: {}", status.db_path);
    println!("\nGeneration:");
    println!("  URL: {}", status.generation_url);
    println!("  Model: {}", status.generation_model);
    let key_status = if status.api_key_set {
        "✓ API key set"
    } else {
        "⚠ API key not set"
    };
    println!("  Status: {}", key_status);
    println!("\nDatabase Stats:");
    println!("  Documents: {}", status.db_stats.document_count);
    println!("  Quizzes: {}", status.db_stats.quiz_count);
    println!("  Questions: {}", status.db_stats.question_count);
    println!("  Submissions: {}", status.db_stats.submission_count);
}
