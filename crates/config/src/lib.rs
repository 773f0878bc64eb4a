//! Configuration loading, validation, and management for HubMatch.
//!
//! Loads configuration from `~/.hubmatch/config.toml` with environment
//! variable overrides, and the alias table from a JSON file (or the bundled
//! defaults). Validates all settings at startup.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use hubmatch_core::{AliasTable, SelectionPolicy, ThresholdConfig};
use serde::{Deserialize, Serialize};

/// Bundled alias table: English, Chinese and pinyin floors, rooms and
/// device domains.
pub const DEFAULT_ALIASES_JSON: &str = include_str!("../assets/aliases.json");

/// The root configuration structure.
///
/// Maps directly to `~/.hubmatch/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Matching thresholds and selection policy
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Where the alias table comes from
    #[serde(default)]
    pub aliases: AliasSource,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolverConfig {
    #[serde(default)]
    pub thresholds: ThresholdConfig,

    #[serde(default)]
    pub policy: SelectionPolicy,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AliasSource {
    /// Alias JSON file. `~/` is expanded. Bundled defaults when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(ConfigError::ValidationError(format!(
                "unknown log format '{other}' (expected \"text\" or \"json\")"
            ))),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.hubmatch/config.toml).
    ///
    /// Environment overrides:
    /// - `HUBMATCH_ALIAS_FILE` replaces `aliases.path`
    /// - `HUBMATCH_LOG_FORMAT` replaces `logging.format`
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(&Self::config_path())?;

        if let Ok(path) = std::env::var("HUBMATCH_ALIAS_FILE")
            && !path.trim().is_empty()
        {
            config.aliases.path = Some(PathBuf::from(path));
        }

        if let Ok(format) = std::env::var("HUBMATCH_LOG_FORMAT") {
            config.logging.format = format.parse()?;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".hubmatch")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Where `onboard` writes the editable alias table.
    pub fn default_alias_path() -> PathBuf {
        Self::config_dir().join("aliases.json")
    }

    /// Validate thresholds and policy.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.resolver
            .thresholds
            .validate()
            .map_err(hubmatch_core::Error::from)?;
        self.resolver
            .policy
            .validate()
            .map_err(hubmatch_core::Error::from)?;
        Ok(())
    }

    /// The configured alias table, or the bundled one when no path is set.
    pub fn alias_table(&self) -> Result<AliasTable, ConfigError> {
        match &self.aliases.path {
            Some(path) => load_alias_table(&expand_home(path)),
            None => default_alias_table(),
        }
    }
}

/// Read an alias JSON file.
pub fn load_alias_table(path: &Path) -> Result<AliasTable, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let table: AliasTable =
        serde_json::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    tracing::debug!(
        path = %path.display(),
        synonyms = table.synonym_count(),
        "Alias table loaded"
    );
    Ok(table)
}

/// The bundled alias table.
pub fn default_alias_table() -> Result<AliasTable, ConfigError> {
    Ok(AliasTable::from_json(DEFAULT_ALIASES_JSON)?)
}

fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs_home().join(rest),
        Err(_) => path.to_path_buf(),
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("Invalid matching configuration: {0}")]
    Invalid(#[from] hubmatch_core::Error),
}
