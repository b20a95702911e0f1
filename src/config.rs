//! Configuration types for the application shell.

use crate::error::{Result, WispError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Top-level configuration, persisted as `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WispConfig {
    /// Auto-update settings.
    pub update: UpdateConfig,
    /// Window presentation settings.
    pub window: WindowConfig,
}

impl WispConfig {
    /// Returns the path to the config file (`<config_dir>/config.toml`).
    pub fn config_file_path() -> PathBuf {
        crate::wisp_dirs::config_dir().join("config.toml")
    }

    /// Load configuration from disk. Returns the default configuration if
    /// the file is missing or cannot be parsed.
    pub fn load() -> Self {
        Self::load_from(&Self::config_file_path())
    }

    /// Load configuration from an explicit path, falling back to defaults.
    pub fn load_from(path: &Path) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(_) => return Self::default(),
        };

        match toml::from_str(&raw) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("cannot parse {}: {e}; using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Persist the current configuration to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be created or the
    /// file cannot be written.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                WispError::Config(format!(
                    "cannot create config directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let toml = toml::to_string_pretty(self)
            .map_err(|e| WispError::Config(format!("cannot serialize config: {e}")))?;

        std::fs::write(&path, toml).map_err(|e| {
            WispError::Config(format!("cannot write config to {}: {e}", path.display()))
        })?;

        Ok(())
    }
}

/// Update feed provider kind.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateProvider {
    /// Generic HTTP feed server (JSON responses).
    #[default]
    Generic,
}

/// Auto-update configuration, handed verbatim to the selected backend.
///
/// Immutable once the backend is constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateConfig {
    /// Feed provider kind.
    pub provider: UpdateProvider,
    /// Base URL of the update feed.
    pub url: String,
    /// Extra headers sent with every feed and download request.
    pub request_headers: BTreeMap<String, String>,
    /// Bearer token registered as the `Authorization` header.
    pub auth_token: Option<String>,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        let mut request_headers = BTreeMap::new();
        request_headers.insert("raka".to_owned(), "true".to_owned());
        Self {
            provider: UpdateProvider::Generic,
            url: "http://api.localhost.io:5000/v1/agents/update".to_owned(),
            request_headers,
            auth_token: Some("comeone".to_owned()),
        }
    }
}

/// Window presentation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title.
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Wisp".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn default_config_has_generic_provider() {
        let config = UpdateConfig::default();
        assert_eq!(config.provider, UpdateProvider::Generic);
        assert!(config.url.starts_with("http://"));
        assert_eq!(config.request_headers.get("raka").map(String::as_str), Some("true"));
        assert!(config.auth_token.is_some());
    }

    #[test]
    fn config_toml_round_trip() {
        let mut config = WispConfig::default();
        config.update.url = "https://updates.example.com/feed".to_owned();
        config.update.auth_token = Some("secret".to_owned());
        config.window.title = "Test".to_owned();

        let toml = toml::to_string_pretty(&config).unwrap();
        let restored: WispConfig = toml::from_str(&toml).unwrap();

        assert_eq!(restored.update.url, "https://updates.example.com/feed");
        assert_eq!(restored.update.auth_token.as_deref(), Some("secret"));
        assert_eq!(restored.window.title, "Test");
    }

    #[test]
    fn provider_serde_value_is_lowercase() {
        let toml = toml::to_string(&WispConfig::default()).unwrap();
        assert!(toml.contains("provider = \"generic\""), "unexpected toml: {toml}");
    }

    #[test]
    fn load_from_missing_file_returns_default() {
        let config = WispConfig::load_from(&PathBuf::from("/nonexistent/wisp-config.toml"));
        assert_eq!(config.update.url, UpdateConfig::default().url);
    }

    #[test]
    fn load_from_unparsable_file_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not [valid toml").unwrap();

        let config = WispConfig::load_from(&path);
        assert_eq!(config.update.url, UpdateConfig::default().url);
    }

    #[test]
    fn partial_toml_uses_field_defaults() {
        let config: WispConfig = toml::from_str("[update]\nurl = \"https://u.example\"\n").unwrap();
        assert_eq!(config.update.url, "https://u.example");
        assert_eq!(config.update.provider, UpdateProvider::Generic);
        assert_eq!(config.window.title, "Wisp");
    }
}
