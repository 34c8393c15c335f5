// Duck Secrets Configuration Module
//
// This module handles loading and parsing the configuration from a YAML file.
// Every section is optional; missing values fall back to the defaults below.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::credentials::{validate_name, SecretKind};

/// Database path meaning "in-process, in-memory"
pub const IN_MEMORY: &str = ":memory:";

/// Database configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path to the DuckDB file, or ":memory:"
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: IN_MEMORY.to_string(),
        }
    }
}

/// Secret configuration - everything except the credentials themselves
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SecretConfig {
    /// Name of the secret inside DuckDB
    pub name: String,

    /// Provider tag ("s3" or "gcs")
    pub kind: SecretKind,

    /// Storage region
    pub region: String,

    /// Environment variable holding the access key id
    pub key_id_env: String,

    /// Environment variable holding the secret access key
    pub secret_env: String,
}

impl Default for SecretConfig {
    fn default() -> Self {
        Self {
            name: "s3_secret".to_string(),
            kind: SecretKind::S3,
            region: "us-east-1".to_string(),
            key_id_env: "ACCESS_KEY".to_string(),
            secret_env: "SECRET_KEY".to_string(),
        }
    }
}

/// Object-storage source queried after registration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SourceConfig {
    pub bucket: String,
    pub prefix: String,

    /// Row limit for the preview query
    pub limit: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            bucket: "my-bucket".to_string(),
            prefix: "data".to_string(),
            limit: 1,
        }
    }
}

/// Log output format
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter, overridden by RUST_LOG
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

/// Main configuration structure
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub secret: SecretConfig,
    pub source: SourceConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))
    }

    /// Parse configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        // An empty document deserializes to unit, not to an empty mapping
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Load from `path` if given, otherwise use the defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.database.path.is_empty() {
            anyhow::bail!("Database path cannot be empty (use ':memory:' for in-memory)");
        }

        validate_name(&self.secret.name)?;

        if self.secret.region.is_empty() {
            anyhow::bail!("Secret region cannot be empty");
        }
        if self.secret.key_id_env.is_empty() {
            anyhow::bail!("key_id_env cannot be empty");
        }
        if self.secret.secret_env.is_empty() {
            anyhow::bail!("secret_env cannot be empty");
        }

        if self.source.bucket.is_empty() {
            anyhow::bail!("Source bucket cannot be empty");
        }
        if self.source.limit == 0 {
            anyhow::bail!("Source limit must be greater than zero");
        }

        Ok(())
    }

    /// Get the absolute path for the database file, or None for in-memory
    pub fn database_path(&self) -> Result<Option<PathBuf>> {
        if self.database.path == IN_MEMORY {
            return Ok(None);
        }

        let path = Path::new(&self.database.path);
        if path.is_absolute() {
            return Ok(Some(path.to_path_buf()));
        }

        // Expand ~ to home directory if present
        if let Some(rest) = self.database.path.strip_prefix('~') {
            let home = dirs::home_dir().context("Failed to determine home directory")?;
            let rest = rest.trim_start_matches(['/', '\\']);
            return Ok(Some(home.join(rest)));
        }

        std::env::current_dir()
            .map(|dir| Some(dir.join(&self.database.path)))
            .with_context(|| "Failed to get current directory")
    }
}
