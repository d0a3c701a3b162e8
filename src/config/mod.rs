//! Configuration management.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `PAPER_SHELF_*` environment variables (`__` separates sections, e.g.
//! `PAPER_SHELF_CHAT__ENDPOINT`).

mod file_config;

pub use file_config::{ConfigFile, ConfigFileError};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::utils::CitationFormat;

/// Application directory name under the platform config/data dirs
pub const APP_DIR: &str = "paper-shelf";

/// Environment variable prefix
pub const ENV_PREFIX: &str = "PAPER_SHELF";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub index: IndexConfig,

    #[serde(default)]
    pub chat: ChatConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub export: ExportConfig,

    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Paper index settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexConfig {
    #[serde(default = "default_index_url")]
    pub base_url: String,

    /// Semantic Scholar API key (optional, for higher rate limits)
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_limit")]
    pub default_limit: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            base_url: default_index_url(),
            api_key: std::env::var("SEMANTIC_SCHOLAR_API_KEY").ok(),
            default_limit: default_limit(),
        }
    }
}

fn default_index_url() -> String {
    "https://api.semanticscholar.org/graph/v1".to_string()
}

fn default_limit() -> usize {
    10
}

/// Chat endpoint settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_chat_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            timeout_seconds: default_chat_timeout(),
        }
    }
}

fn default_chat_timeout() -> u64 {
    60
}

/// Storage settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory for the list store and search history
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

impl StorageConfig {
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }

    pub fn store_path(&self) -> PathBuf {
        self.data_dir().join("lists.json")
    }

    pub fn history_path(&self) -> PathBuf {
        self.data_dir().join("history.jsonl")
    }
}

/// Citation export settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default)]
    pub default_format: CitationFormat,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            default_format: CitationFormat::default(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Display settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Abstracts longer than this many characters are truncated; 0 disables
    #[serde(default = "default_abstract_length")]
    pub abstract_length: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            abstract_length: default_abstract_length(),
        }
    }
}

fn default_abstract_length() -> usize {
    300
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Platform data directory for the store and history
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Platform config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
}

/// Find a config file: `./paper-shelf.toml`, then the platform config dir
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("paper-shelf.toml");
    if local.is_file() {
        return Some(local);
    }
    default_config_path().filter(|p| p.is_file())
}

/// Load configuration from a file with environment overrides
pub fn load_config(path: &Path) -> Result<Config, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize()
}

/// Configuration from environment variables and defaults only
pub fn get_config() -> Result<Config, config::ConfigError> {
    config::Config::builder()
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?
        .try_deserialize()
}
