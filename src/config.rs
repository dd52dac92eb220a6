//! Configuration module for uptree.

use serde::Deserialize;
use std::path::Path;

use crate::{Result, UptreeError};

/// Upload storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FilesConfig {
    /// Base directory of the local object store.
    #[serde(default = "default_storage_path")]
    pub storage_path: String,
    /// Maximum aggregate upload size in megabytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_mb: u64,
    /// Owner namespace that uploads are stored under.
    #[serde(default = "default_owner")]
    pub owner: String,
}

fn default_storage_path() -> String {
    "data/uploads".to_string()
}

fn default_max_upload_size() -> u64 {
    250
}

fn default_owner() -> String {
    "local".to_string()
}

impl FilesConfig {
    /// Maximum aggregate upload size in bytes.
    pub fn max_upload_size_bytes(&self) -> u64 {
        self.max_upload_size_mb.saturating_mul(1024 * 1024)
    }
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
            max_upload_size_mb: default_max_upload_size(),
            owner: default_owner(),
        }
    }
}

/// Navigation configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct NavigationConfig {
    /// Label of the first breadcrumb.
    #[serde(default = "default_root_label")]
    pub root_label: String,
}

fn default_root_label() -> String {
    "Home".to_string()
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            root_label: default_root_label(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/uptree.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Upload storage configuration.
    #[serde(default)]
    pub files: FilesConfig,
    /// Navigation configuration.
    #[serde(default)]
    pub navigation: NavigationConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(UptreeError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| UptreeError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `UPTREE_STORAGE_PATH`: Override the object store directory
    /// - `UPTREE_OWNER`: Override the owner namespace
    pub fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("UPTREE_STORAGE_PATH") {
            if !path.is_empty() {
                self.files.storage_path = path;
            }
        }
        if let Ok(owner) = std::env::var("UPTREE_OWNER") {
            if !owner.is_empty() {
                self.files.owner = owner;
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - The owner namespace is empty or contains a path separator
    /// - The root breadcrumb label is empty
    /// - The upload size cap is zero
    pub fn validate(&self) -> Result<()> {
        if self.files.owner.trim().is_empty() || self.files.owner.contains('/') {
            return Err(UptreeError::Config(
                "files.owner must be a non-empty name without '/'".to_string(),
            ));
        }
        if self.navigation.root_label.is_empty() {
            return Err(UptreeError::Config(
                "navigation.root_label must not be empty".to_string(),
            ));
        }
        if self.files.max_upload_size_mb == 0 {
            return Err(UptreeError::Config(
                "files.max_upload_size_mb must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
