//! Application configuration management.
//!
//! Handles loading, saving, and validating user settings: the API key, how
//! requests reach the API, formatting defaults and the history size.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::client::{DEFAULT_REQUEST_TIMEOUT_SECS, TransportConfig};
use crate::error::{Error, Result};
use crate::format::FormatOptions;
use crate::gateway::{DEFAULT_MAX_PAGES, FetchOptions};
use crate::history::DEFAULT_HISTORY_LIMIT;
use crate::stats::{MissingDetailsPolicy, PlaybackSpeed};

/// Environment variable the command line reads the API key from.
pub const API_KEY_ENV_VAR: &str = "YOUTUBE_API_KEY";

const fn default_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

const fn default_max_pages() -> usize {
    DEFAULT_MAX_PAGES
}

const fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// YouTube Data API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Direct or proxied access to the API.
    #[serde(default)]
    pub transport: TransportConfig,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Pagination guard for misbehaving upstreams.
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
    /// Default line format.
    #[serde(default)]
    pub format: FormatOptions,
    /// Default projection speed.
    #[serde(default)]
    pub playback_speed: PlaybackSpeed,
    /// How videos without details count towards the average.
    #[serde(default)]
    pub missing_details: MissingDetailsPolicy,
    /// Number of history entries kept.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            transport: TransportConfig::default(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_pages: DEFAULT_MAX_PAGES,
            format: FormatOptions::default(),
            playback_speed: PlaybackSpeed::NORMAL,
            missing_details: MissingDetailsPolicy::default(),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from `path`, or defaults if the file is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, parsed or
    /// validated.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| Error::FileSystem {
            path: path.to_path_buf(),
            reason: format!("Failed to read config file: {e}"),
        })?;

        let config: Self = serde_json::from_str(&content)
            .map_err(|e| Error::Configuration(format!("Failed to parse config file: {e}")))?;
        config.validate()?;

        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&config_file_path())
    }

    /// Save configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| Error::FileSystem {
                path: parent.to_path_buf(),
                reason: format!("Failed to create config directory: {e}"),
            })?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| Error::FileSystem {
            path: path.to_path_buf(),
            reason: format!("Failed to write config file: {e}"),
        })?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.request_timeout_secs == 0 {
            return Err(Error::Configuration(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.max_pages == 0 {
            return Err(Error::Configuration(
                "max_pages must be greater than zero".to_string(),
            ));
        }
        if self.history_limit == 0 {
            return Err(Error::Configuration(
                "history_limit must be greater than zero".to_string(),
            ));
        }
        match &self.transport {
            TransportConfig::Direct { base_url } if base_url.trim().is_empty() => Err(
                Error::Configuration("transport.base_url must not be empty".to_string()),
            ),
            TransportConfig::Proxied { proxy_url } if proxy_url.trim().is_empty() => Err(
                Error::Configuration("transport.proxy_url must not be empty".to_string()),
            ),
            _ => Ok(()),
        }
    }

    /// Set the stored API key; a blank key clears it.
    pub fn set_api_key(&mut self, key: &str) {
        let key = key.trim();
        self.api_key = (!key.is_empty()).then(|| key.to_string());
        info!("API key {}", if self.api_key.is_some() { "updated" } else { "cleared" });
    }

    /// Set the default playback speed.
    pub fn set_playback_speed(&mut self, speed: f64) -> Result<()> {
        self.playback_speed = PlaybackSpeed::new(speed)?;
        info!("Default playback speed set to {}", self.playback_speed);
        Ok(())
    }

    /// The key to use: an explicit one (flag or environment), then the file.
    ///
    /// Blank values at either level count as absent.
    #[must_use]
    pub fn resolve_api_key(&self, explicit: Option<&str>) -> Option<String> {
        [explicit, self.api_key.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|k| !k.is_empty())
            .map(str::to_string)
    }

    /// Request timeout as a [`Duration`].
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Gateway options derived from this configuration.
    #[must_use]
    pub const fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            max_pages: self.max_pages,
        }
    }

    /// Path of the default config file.
    #[must_use]
    pub fn config_file_path() -> PathBuf {
        config_file_path()
    }
}

/// Base directory for Tubetally's files.
#[must_use]
pub fn app_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| dirs::data_local_dir().unwrap_or_else(|| PathBuf::from(".")))
        .join("tubetally")
}

fn config_file_path() -> PathBuf {
    app_config_dir().join("config.json")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.api_key.is_none());
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.max_pages, 200);
        assert_eq!(config.history_limit, 20);
        assert_eq!(config.playback_speed, PlaybackSpeed::NORMAL);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip_on_disk() {
        let temp_dir = TempDir::new().expect("Should create temp dir");
        let path = temp_dir.path().join("nested").join("config.json");

        let mut config = AppConfig {
            transport: TransportConfig::Proxied {
                proxy_url: "https://example.org/api/youtube-proxy".to_string(),
            },
            ..Default::default()
        };
        config.set_api_key("  abc123  ");
        config.set_playback_speed(1.5).expect("valid speed");

        config.save_to(&path).expect("Should save");
        let loaded = AppConfig::load_from(&path).expect("Should load");

        assert_eq!(loaded, config);
        assert_eq!(loaded.api_key.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().expect("Should create temp dir");
        let loaded =
            AppConfig::load_from(&temp_dir.path().join("absent.json")).expect("Should load");
        assert_eq!(loaded, AppConfig::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp_dir = TempDir::new().expect("Should create temp dir");
        let path = temp_dir.path().join("config.json");
        fs::write(&path, r#"{"playback_speed": 2.0, "format": {"includeChannels": true}}"#)
            .expect("write");

        let loaded = AppConfig::load_from(&path).expect("Should load");
        assert_eq!(loaded.playback_speed.value(), 2.0);
        assert!(loaded.format.include_channels);
        assert!(loaded.format.include_numbers);
        assert_eq!(loaded.max_pages, DEFAULT_MAX_PAGES);
    }

    #[test]
    fn test_invalid_speed_in_file_is_rejected() {
        let temp_dir = TempDir::new().expect("Should create temp dir");
        let path = temp_dir.path().join("config.json");
        fs::write(&path, r#"{"playback_speed": 0}"#).expect("write");

        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        let config = AppConfig {
            max_pages: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = AppConfig {
            request_timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_blank_key_clears() {
        let mut config = AppConfig::default();
        config.set_api_key("key");
        config.set_api_key("   ");
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_explicit_key_wins() {
        let config = AppConfig {
            api_key: Some("stored".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.resolve_api_key(Some("explicit")).as_deref(),
            Some("explicit")
        );
        // a blank explicit key falls through instead of masking the stored one
        assert_eq!(
            config.resolve_api_key(Some("  ")).as_deref(),
            Some("stored")
        );
        assert!(AppConfig::default().resolve_api_key(None).is_none());
    }

    #[test]
    fn test_transport_serialization_is_tagged() {
        let json = serde_json::to_string(&TransportConfig::default()).expect("serialize");
        assert!(json.contains(r#""mode":"direct""#));
    }
}
