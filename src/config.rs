//! Configuration loading and management
//!
//! Handles parsing of `.relnotes.toml` configuration files.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Name of the configuration file inside a workspace directory
pub const CONFIG_FILE: &str = ".relnotes.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Publish configuration
    #[serde(default)]
    pub publish: PublishConfig,

    /// Fallback author configuration
    #[serde(default)]
    pub author: AuthorConfig,
}

/// Key/value store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Namespace every key is written under
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// How long to wait for the store lock, in milliseconds
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

fn default_namespace() -> String {
    "tidy_release_notes".to_string()
}

fn default_lock_timeout_ms() -> u64 {
    crate::lock::DEFAULT_LOCK_TIMEOUT_MS
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

/// Where and how published changelogs land in the document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    /// Page holding the aggregated changelog history
    #[serde(default = "default_page_name")]
    pub page_name: String,

    /// Frame on that page that collects aggregated tables, newest first
    #[serde(default = "default_frame_name")]
    pub frame_name: String,

    /// Suffix appended to a component set name to name its artifact
    #[serde(default = "default_artifact_suffix")]
    pub artifact_suffix: String,

    /// Title shown at the top of each changelog
    #[serde(default = "default_title")]
    pub title: String,

    /// Horizontal gap between a component set and its changelog
    #[serde(default = "default_gap")]
    pub gap: f64,
}

fn default_page_name() -> String {
    "Release notes".to_string()
}

fn default_frame_name() -> String {
    "release-notes-frame".to_string()
}

fn default_artifact_suffix() -> String {
    "-release-notes".to_string()
}

fn default_title() -> String {
    "Changelog".to_string()
}

fn default_gap() -> f64 {
    100.0
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            page_name: default_page_name(),
            frame_name: default_frame_name(),
            artifact_suffix: default_artifact_suffix(),
            title: default_title(),
            gap: default_gap(),
        }
    }
}

impl PublishConfig {
    /// Name of the per-component artifact for a component set
    pub fn artifact_name(&self, component_name: &str) -> String {
        format!("{component_name}{}", self.artifact_suffix)
    }
}

/// Author used when the host cannot tell who is editing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorConfig {
    #[serde(default = "default_author_id")]
    pub id: String,

    #[serde(default = "default_author_name")]
    pub name: String,
}

fn default_author_id() -> String {
    "unknown".to_string()
}

fn default_author_name() -> String {
    "Unknown User".to_string()
}

impl Default for AuthorConfig {
    fn default() -> Self {
        Self {
            id: default_author_id(),
            name: default_author_name(),
        }
    }
}

impl Config {
    /// Load configuration from a `.relnotes.toml` file
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a workspace directory, or return defaults
    pub fn load_from_dir(dir: &Path) -> Self {
        let config_path = dir.join(CONFIG_FILE);
        if !config_path.exists() {
            return Self::default();
        }
        match Self::load(&config_path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %config_path.display(), error = %err, "ignoring invalid config");
                Self::default()
            }
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> crate::error::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> crate::error::Result<()> {
        if self.store.namespace.trim().is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "store.namespace cannot be empty".to_string(),
            ));
        }
        if self.publish.page_name.trim().is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "publish.page_name cannot be empty".to_string(),
            ));
        }
        if self.publish.frame_name.trim().is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "publish.frame_name cannot be empty".to_string(),
            ));
        }
        if self.publish.artifact_suffix.is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "publish.artifact_suffix cannot be empty".to_string(),
            ));
        }
        if !self.publish.gap.is_finite() || self.publish.gap < 0.0 {
            return Err(crate::error::Error::InvalidConfig(format!(
                "publish.gap must be a non-negative number, got {}",
                self.publish.gap
            )));
        }
        Ok(())
    }
}
