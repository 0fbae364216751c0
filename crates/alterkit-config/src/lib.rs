//! Configuration file handling for alterkit.
//!
//! Looks for `.config/alterkit.styx` in the current directory or any parent
//! directory:
//!
//! ```text
//! api {
//!     base_url "https://bytes.example.com"
//!     user_agent "schema-editor/1.0"
//! }
//! ```

use facet::Facet;
use std::path::{Path, PathBuf};

/// Location of the config file, relative to the directory it is found in.
pub const CONFIG_FILE: &str = ".config/alterkit.styx";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct Config {
    /// Backend edit API
    pub api: ApiConfig,
}

/// Where and how to reach the backend edit API.
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct ApiConfig {
    /// Root URL; edit endpoints are resolved relative to it
    pub base_url: String,

    /// Overrides the HTTP client's `User-Agent`
    #[facet(default)]
    pub user_agent: Option<String>,
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No config file in any parent directory
    #[error("no {CONFIG_FILE} found in current directory or any parent")]
    NotFound,

    /// I/O error reading the file
    #[error("failed to read {}: {message}", path.display())]
    Io { path: PathBuf, message: String },

    /// Parse error in the Styx file
    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

/// Load configuration, searching up the directory tree from the current directory.
pub fn load() -> Result<(Config, PathBuf), ConfigError> {
    let cwd = std::env::current_dir().map_err(|e| ConfigError::Io {
        path: PathBuf::from("."),
        message: e.to_string(),
    })?;
    load_from(&cwd)
}

/// Load configuration starting from a specific directory.
pub fn load_from(start: &Path) -> Result<(Config, PathBuf), ConfigError> {
    let config_path = find_config_file(start)?;
    let content = std::fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
        path: config_path.clone(),
        message: e.to_string(),
    })?;

    let config = parse(&content).map_err(|message| ConfigError::Parse {
        path: config_path.clone(),
        message,
    })?;

    Ok((config, config_path))
}

/// Parse configuration from Styx source.
pub fn parse(source: &str) -> Result<Config, String> {
    facet_styx::from_str(source).map_err(|e| e.to_string())
}

/// Find the config file by searching up the directory tree.
pub fn find_config_file(start: &Path) -> Result<PathBuf, ConfigError> {
    let mut current = start.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE);
        if config_path.exists() {
            return Ok(config_path);
        }

        if !current.pop() {
            return Err(ConfigError::NotFound);
        }
    }
}
