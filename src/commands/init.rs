//! Init command implementation

use crate::config::Config;
use crate::db::Database;
use crate::error::{Error, Result};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone)]
pub struct InitOptions {
    pub base_dir: PathBuf,
    pub force: bool,
}

/// Write the default configuration and create the database
pub async fn cmd_init(options: InitOptions) -> Result<Config> {
    let mut config = Config::default();
    config.init_paths(Some(options.base_dir));

    if config.paths.config_file.exists() && !options.force {
        return Err(Error::Config(format!(
            "Config already exists at {}. Use --force to overwrite.",
            config.paths.config_file.display()
        )));
    }

    config.validate()?;
    config.save()?;

    Database::new(&config.paths.db_file).await?;
    info!("Created database at {:?}", config.paths.db_file);

    Ok(config)
}

/// Print the outcome of `init`
pub fn print_init(config: &Config) {
    println!("✓ Initialized study-helper at {:?}", config.paths.base_dir);
    println!("\nConfiguration: {:?}", config.paths.config_file);
    println!("Database: {:?}", config.paths.db_file);
    println!("\nNext steps:");
    println!("  export {}=...                        # Generation API key", config.generation.api_key_env);
    println!("  study-helper ingest ./notes            # Index documents");
    println!("  study-helper search \"seo ranking\"      # Search the index");
    println!("  study-helper quiz create file001 --name Basics --topic SEO");
}
