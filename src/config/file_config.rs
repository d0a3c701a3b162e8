//! Configuration file support.
//!
//! Reads and writes the TOML file format; environment overrides are applied
//! by [`super::load_config`] instead.
//!
//! # Configuration File Format
//!
//! ```toml
//! [index]
//! base_url = "https://api.semanticscholar.org/graph/v1"
//! api_key = "your-api-key"
//! default_limit = 10
//!
//! [chat]
//! endpoint = "https://project.example.com/functions/v1/chat-with-papers"
//! api_key = "anon-key"
//! timeout_seconds = 60
//!
//! [storage]
//! data_dir = "~/.local/share/paper-shelf"
//!
//! [export]
//! default_format = "bibtex"
//! output_dir = "."
//!
//! [display]
//! abstract_length = 300
//!
//! [logging]
//! level = "info"
//! ```

use std::path::Path;

use super::Config;

/// TOML configuration file
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConfigFile {
    pub config: Config,
}

impl ConfigFile {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigFileError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigFileError::Io(e.to_string()))?;

        let config = toml::from_str(&content).map_err(|e| ConfigFileError::Parse(e.to_string()))?;
        Ok(Self { config })
    }

    /// Save configuration to a TOML file, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ConfigFileError> {
        let content = toml::to_string_pretty(&self.config)
            .map_err(|e| ConfigFileError::Serialize(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigFileError::Io(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| ConfigFileError::Io(e.to_string()))
    }
}

/// Configuration file errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialize error: {0}")]
    Serialize(String),
}
