//! Configuration management for Calm News.
//!
//! Configuration is read from `~/.config/calmnews/config.toml`.
//! If the file doesn't exist, a default configuration with comments is created.

use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::fetcher::DEFAULT_WORKERS;
use crate::sources::Region;

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fetch: FetchConfig,
    pub sources: SourcesConfig,
    pub storage: StorageConfig,
}

/// HTTP fetching options.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Maximum concurrent feed fetches
    pub workers: usize,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            timeout_secs: 10,
            user_agent: concat!("calmnews/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// How logical sources become fetch URLs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// URL template wrapping every feed URL, e.g.
    /// `https://api.allorigins.win/raw?url={url}`. The feed URL is
    /// percent-encoded before substitution.
    pub proxy: Option<String>,
    /// Region for topic sections
    pub topic_region: Region,
    /// Region for discovery lookups
    pub discovery_region: Region,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            proxy: None,
            topic_region: Region::Us,
            discovery_region: Region::In,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database path; defaults to `<data_dir>/calmnews/calmnews.db`
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// If the config file exists but is invalid, returns an error.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            Self::create_default_config(config_path)?;
            return Ok(Self::default());
        }

        let content = fs::read_to_string(config_path).map_err(|e| ConfigError::Io {
            path: config_path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: config_path.to_path_buf(),
            source: e,
        })?;

        Ok(config)
    }

    /// Get the default config file path: `~/.config/calmnews/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("calmnews").join("config.toml"))
    }

    /// Resolve the database path, creating its parent directory.
    pub fn database_path(&self) -> Result<PathBuf, ConfigError> {
        let path = match &self.storage.path {
            Some(p) => p.clone(),
            None => {
                let data_dir = dirs::data_dir().ok_or(ConfigError::NoDataDir)?;
                data_dir.join("calmnews").join("calmnews.db")
            }
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        Ok(path)
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# Calm News Configuration

[fetch]
# Maximum number of feeds fetched at the same time
workers = 10

# Request timeout in seconds
timeout_secs = 10

# user_agent = "calmnews/0.1.0"

[sources]
# Optional URL template wrapping every feed URL. The feed URL is
# percent-encoded and substituted for {url}.
# proxy = "https://api.allorigins.win/raw?url={url}"

# Google News edition used for topics and discovery: "US" or "IN"
topic_region = "US"
discovery_region = "IN"

[storage]
# SQLite database location (default: <data dir>/calmnews/calmnews.db)
# path = "/home/me/.local/share/calmnews/calmnews.db"
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Could not determine data directory")]
    NoDataDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
