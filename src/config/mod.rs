//! Configuration management for study-helper
//!
//! TOML configuration with serde defaults for every field.

mod defaults;

pub use defaults::*;

use crate::error::{Error, Result};
use crate::search::SortMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Generation service configuration
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Search defaults
    #[serde(default)]
    pub search: SearchConfig,

    /// Paths configuration (internal, not user-editable)
    #[serde(skip)]
    pub paths: PathsConfig,
}

/// Generation service (OpenAI-compatible chat endpoint) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Base URL of the chat completions API
    #[serde(default = "default_generation_base_url")]
    pub base_url: String,

    /// Model identifier sent with every request
    #[serde(default = "default_generation_model")]
    pub model: String,

    /// Environment variable name holding the API key
    #[serde(default = "default_generation_api_key_env")]
    pub api_key_env: String,

    /// Request timeout in seconds
    #[serde(default = "default_generation_timeout")]
    pub timeout_secs: u64,

    /// Sampling temperature
    #[serde(default = "default_generation_temperature")]
    pub temperature: Option<f32>,
}

/// Search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Page size used when none is given
    #[serde(default = "default_search_limit")]
    pub default_limit: u32,

    /// Sort mode used when none is given
    #[serde(default = "default_search_sort")]
    pub default_sort: String,
}

/// Internal paths configuration
#[derive(Debug, Clone, Default)]
pub struct PathsConfig {
    /// Base directory for study-helper data
    pub base_dir: PathBuf,

    /// Path to config file
    pub config_file: PathBuf,

    /// Path to SQLite database
    pub db_file: PathBuf,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: default_generation_base_url(),
            model: default_generation_model(),
            api_key_env: default_generation_api_key_env(),
            timeout_secs: default_generation_timeout(),
            temperature: default_generation_temperature(),
        }
    }
}

impl GenerationConfig {
    /// Request timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Option<String> {
        if self.api_key_env.is_empty() {
            return None;
        }
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: default_search_limit(),
            default_sort: default_search_sort(),
        }
    }
}

impl Config {
    /// Get the default base directory for study-helper (~/.study-helper)
    pub fn default_base_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".study-helper")
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        Self::default_base_dir().join("config.toml")
    }

    /// Initialize paths configuration
    pub fn init_paths(&mut self, base_dir: Option<PathBuf>) {
        let base = base_dir.unwrap_or_else(Self::default_base_dir);
        self.paths = PathsConfig {
            config_file: base.join("config.toml"),
            db_file: base.join(default_db_file_name()),
            base_dir: base,
        };
    }

    /// Load configuration from a specific file path
    pub fn load(config_path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", config_path);

        if !config_path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                config_path.display()
            )));
        }

        let content = std::fs::read_to_string(config_path)?;
        let mut config: Config = toml::from_str(&content)?;

        // The database sits next to whichever config file was loaded
        let base = config_path.parent().map(Path::to_path_buf);
        config.init_paths(base);
        config.paths.config_file = config_path.to_path_buf();

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.paths.config_file.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&self.paths.config_file, content)?;
        info!("Saved config to {:?}", self.paths.config_file);
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.generation.model.trim().is_empty() {
            return Err(Error::Config("generation.model must not be empty".to_string()));
        }

        url::Url::parse(&self.generation.base_url).map_err(|e| {
            Error::Config(format!(
                "generation.base_url '{}' is not a valid URL: {}",
                self.generation.base_url, e
            ))
        })?;

        if self.generation.timeout_secs == 0 {
            return Err(Error::Config(
                "generation.timeout_secs must be positive".to_string(),
            ));
        }

        if let Some(t) = self.generation.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(Error::Config(
                    "generation.temperature must be between 0.0 and 2.0".to_string(),
                ));
            }
        }

        if self.search.default_limit == 0 {
            return Err(Error::Config(
                "search.default_limit must be positive".to_string(),
            ));
        }

        self.default_sort_mode()?;

        Ok(())
    }

    /// Parsed default sort mode
    pub fn default_sort_mode(&self) -> Result<SortMode> {
        self.search
            .default_sort
            .parse()
            .map_err(|_| Error::Config(format!(
                "search.default_sort must be 'relevance' or 'name', got '{}'",
                self.search.default_sort
            )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.generation.model, "gpt-4");
        assert_eq!(config.generation.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.search.default_limit, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_save_load() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.init_paths(Some(tmp.path().to_path_buf()));
        config.generation.model = "gpt-4o-mini".to_string();

        config.save().unwrap();
        assert!(config.paths.config_file.exists());

        let loaded = Config::load(&config.paths.config_file).unwrap();
        assert_eq!(loaded.generation.model, "gpt-4o-mini");
        assert_eq!(loaded.paths.db_file, tmp.path().join("study-helper.db"));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[search]\ndefault_limit = 25\n").unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.search.default_limit, 25);
        assert_eq!(loaded.search.default_sort, "relevance");
        assert_eq!(loaded.generation.timeout_secs, 120);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        config.search.default_sort = "date".to_string();
        assert!(config.validate().is_err());
        config.search.default_sort = "name".to_string();
        assert!(config.validate().is_ok());

        config.generation.timeout_secs = 0;
        assert!(config.validate().is_err());
        config.generation.timeout_secs = 30;

        config.generation.temperature = Some(3.5);
        assert!(config.validate().is_err());
        config.generation.temperature = Some(0.2);
        assert!(config.validate().is_ok());

        config.generation.base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }
}
