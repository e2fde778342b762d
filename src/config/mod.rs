//! # Settings for the admin tool
//!
//! The tool keeps its own settings in a small TOML file, separate from the
//! Chatipelago client configuration it edits over the admin API.
//!
//! ## Sections
//!
//! - [`ApiConfig`] - where the admin API lives and how long to wait for it
//! - [`BuilderConfig`] - the bundle builder service
//! - [`LoggingConfig`] - local log level and optional log file
//! - [`ValidationConfig`] - which rule profile the checks use
//! - [`ConsoleConfig`] - history size for the live console
//!
//! Every section and field has a default, so a partial file (or an empty
//! one) loads fine.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use chatipelago_admin::config::AdminConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     AdminConfig::create_default("chatipelago-admin.toml").await?;
//!     let config = AdminConfig::load("chatipelago-admin.toml").await?;
//!     println!("Admin API: {}", config.api.base_url);
//!     Ok(())
//! }
//! ```
//!
//! ## File format
//!
//! ```toml
//! [api]
//! base_url = "http://localhost:8015"
//! timeout_seconds = 10
//!
//! [builder]
//! base_url = "http://localhost:8123"
//!
//! [logging]
//! level = "info"
//!
//! [validation]
//! profile = "current"
//!
//! [console]
//! max_messages = 1000
//! ```

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::console::DEFAULT_MAX_MESSAGES;
use crate::validation::{FlatCounts, ValidationProfile, VariableSet};

pub const DEFAULT_CONFIG_FILE: &str = "chatipelago-admin.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8015".to_string(),
            timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    pub base_url: String,
    /// Builds can take a while; this is much longer than the API timeout.
    pub timeout_seconds: u64,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8123".to_string(),
            timeout_seconds: 120,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub profile: ValidationProfile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub max_messages: usize,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            max_messages: DEFAULT_MAX_MESSAGES,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub api: ApiConfig,
    pub builder: BuilderConfig,
    pub logging: LoggingConfig,
    pub validation: ValidationConfig,
    pub console: ConsoleConfig,
}

impl AdminConfig {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: AdminConfig = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        Ok(config)
    }

    /// Load the file when it exists, otherwise fall back to defaults.
    pub async fn load_or_default(path: &str) -> Result<Self> {
        if fs::try_exists(path).await.unwrap_or(false) {
            Self::load(path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = AdminConfig::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    pub fn flat_counts(&self) -> FlatCounts {
        self.validation.profile.flat_counts()
    }

    pub fn variables(&self) -> VariableSet {
        self.validation.profile.variables()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AdminConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:8015");
        assert_eq!(config.api.timeout_seconds, 10);
        assert_eq!(config.builder.base_url, "http://localhost:8123");
        assert_eq!(config.console.max_messages, 1000);
        assert_eq!(config.validation.profile, ValidationProfile::Current);
        assert_eq!(config.flat_counts(), FlatCounts::current());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: AdminConfig = toml::from_str(
            r#"
            [api]
            base_url = "http://streampc:8015"

            [validation]
            profile = "legacy"
            "#,
        )
        .unwrap();
        assert_eq!(config.api.base_url, "http://streampc:8015");
        assert_eq!(config.api.timeout_seconds, 10);
        assert_eq!(config.flat_counts(), FlatCounts::legacy());
        assert!(config.variables().contains("{count}"));
    }

    #[test]
    fn test_unknown_profile_is_rejected() {
        let parsed = toml::from_str::<AdminConfig>("[validation]\nprofile = \"strict\"\n");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_default_serializes_and_parses_back() {
        let text = toml::to_string_pretty(&AdminConfig::default()).unwrap();
        let parsed: AdminConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, AdminConfig::default());
    }
}
