#![deny(unsafe_code)]

//! Configuration loading and validation for Quarry.
//!
//! Loads `quarry.toml` files and validates them after parsing. The
//! [`AppConfig`] type carries discovery defaults (tags, class-name pattern,
//! classpath scanning), runtime detection settings, and logging.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Top-level application configuration.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Discovery defaults merged into every request.
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Runtime version detection.
    #[serde(default)]
    pub runtime: RuntimeConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Discovery defaults.
///
/// Values here are the baseline; command-line flags add tags and may
/// replace the class-name pattern.
///
/// ## TOML Example
///
/// ```toml
/// [discovery]
/// scan_classpath = true
/// class_name_pattern = ".*Tests"
/// include_tags = ["fast"]
/// exclude_tags = ["slow", "flaky"]
/// extra_roots = ["build/test-classes"]
/// ```
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Run all tests found under the classpath roots instead of named ones.
    #[serde(default)]
    pub scan_classpath: bool,

    /// Regular expression every qualified name must fully match.
    #[serde(default)]
    pub class_name_pattern: Option<String>,

    /// Tags a candidate must carry at least one of.
    #[serde(default)]
    pub include_tags: Vec<String>,

    /// Tags that exclude a candidate outright.
    #[serde(default)]
    pub exclude_tags: Vec<String>,

    /// Additional root directories scanned alongside the classpath.
    #[serde(default)]
    pub extra_roots: Vec<PathBuf>,
}

/// Runtime detection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Fixed runtime version, bypassing detection (e.g. "11.0.2").
    #[serde(default)]
    pub version: Option<String>,

    /// Command used to detect the runtime version.
    #[serde(default = "default_java_command")]
    pub java_command: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            version: None,
            java_command: default_java_command(),
        }
    }
}

fn default_java_command() -> String {
    "java".to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g. "info", "debug", "trace").
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

impl AppConfig {
    /// Load configuration from a TOML file at the given path using async I/O.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = tokio::fs::read_to_string(path).await?;
        let config = Self::parse(&content)?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::Validation(format!(
                "logging.level must be one of {:?}, got {:?}",
                valid_levels, self.logging.level
            )));
        }

        if let Some(pattern) = &self.discovery.class_name_pattern {
            if pattern.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "discovery.class_name_pattern must not be blank".to_string(),
                ));
            }
        }

        for (i, tag) in self.discovery.include_tags.iter().enumerate() {
            if tag.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "discovery.include_tags[{i}] must not be blank"
                )));
            }
        }
        for (i, tag) in self.discovery.exclude_tags.iter().enumerate() {
            if tag.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "discovery.exclude_tags[{i}] must not be blank"
                )));
            }
        }

        for (i, root) in self.discovery.extra_roots.iter().enumerate() {
            if root.as_os_str().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "discovery.extra_roots[{i}] must not be empty"
                )));
            }
        }

        if let Some(version) = &self.runtime.version {
            if version.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "runtime.version must not be blank".to_string(),
                ));
            }
        }
        if self.runtime.java_command.is_empty() {
            return Err(ConfigError::Validation(
                "runtime.java_command must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
