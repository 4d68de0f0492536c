// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Sync Configuration
//!
//! Options file of a sync job, in the JSON layout of a Home Assistant
//! add-on `options.json`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::network::{Endpoint, ReconnectPolicy, TransportConfig};
use crate::todo::resolve_entity_id;

/// Options file location inside an add-on container.
pub const DEFAULT_CONFIG_PATH: &str = "/data/options.json";

/// Options file location when running from a checkout.
pub const FALLBACK_CONFIG_PATH: &str = "data/options.json";

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {reason}")]
    Io { path: PathBuf, reason: String },

    #[error("Failed to parse {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Missing required option: {0}")]
    Missing(&'static str),

    #[error("Invalid option: {0}")]
    Invalid(String),
}

fn default_sync_interval_secs() -> u64 {
    60
}

fn default_io_timeout_secs() -> u64 {
    30
}

fn default_reconnect_attempts() -> u32 {
    3
}

fn default_reconnect_delay_secs() -> u64 {
    5
}

/// Configuration of one sync job.
#[derive(Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// WebSocket API URL, e.g. `ws://homeassistant.local:8123/api/websocket`.
    #[serde(default)]
    pub ha_url: String,
    /// Long-lived access token.
    #[serde(default)]
    pub ha_token: String,
    /// Target to-do entity; derived from the language when unset.
    #[serde(default)]
    pub list_entity_id: Option<String>,
    /// Instance language, e.g. `de-CH`.
    #[serde(default)]
    pub language: Option<String>,
    /// JSON file with the items to sync.
    #[serde(default)]
    pub items_file: Option<PathBuf>,
    /// Seconds between sync cycles in watch mode.
    #[serde(default = "default_sync_interval_secs")]
    pub sync_interval_secs: u64,
    /// Socket read/write timeout in seconds.
    #[serde(default = "default_io_timeout_secs")]
    pub io_timeout_secs: u64,
    /// Connection attempts before giving up.
    #[serde(default = "default_reconnect_attempts")]
    pub reconnect_attempts: u32,
    /// Seconds between connection attempts.
    #[serde(default = "default_reconnect_delay_secs")]
    pub reconnect_delay_secs: u64,
}

impl std::fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncConfig")
            .field("ha_url", &self.ha_url)
            .field("ha_token", &"<redacted>")
            .field("list_entity_id", &self.list_entity_id)
            .field("language", &self.language)
            .field("items_file", &self.items_file)
            .field("sync_interval_secs", &self.sync_interval_secs)
            .field("io_timeout_secs", &self.io_timeout_secs)
            .field("reconnect_attempts", &self.reconnect_attempts)
            .field("reconnect_delay_secs", &self.reconnect_delay_secs)
            .finish()
    }
}

impl SyncConfig {
    /// Creates a config with the given server and defaults elsewhere.
    pub fn new(ha_url: impl Into<String>, ha_token: impl Into<String>) -> Self {
        SyncConfig {
            ha_url: ha_url.into(),
            ha_token: ha_token.into(),
            list_entity_id: None,
            language: None,
            items_file: None,
            sync_interval_secs: default_sync_interval_secs(),
            io_timeout_secs: default_io_timeout_secs(),
            reconnect_attempts: default_reconnect_attempts(),
            reconnect_delay_secs: default_reconnect_delay_secs(),
        }
    }

    /// Loads and validates the options file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_json(&content).map_err(|e| match e {
            ConfigError::Parse { reason, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })
    }

    /// Parses and validates options JSON.
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: SyncConfig =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse {
                path: PathBuf::new(),
                reason: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Picks the options file: `explicit` if given, else the add-on
    /// location, else the checkout location.
    pub fn locate(explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }
        let default = PathBuf::from(DEFAULT_CONFIG_PATH);
        if default.exists() {
            default
        } else {
            PathBuf::from(FALLBACK_CONFIG_PATH)
        }
    }

    /// Checks required options and value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.ha_url.trim();
        if url.is_empty() {
            return Err(ConfigError::Missing("ha_url"));
        }
        if self.ha_token.trim().is_empty() {
            return Err(ConfigError::Missing("ha_token"));
        }
        if !url.starts_with("ws://") && !url.starts_with("wss://") {
            return Err(ConfigError::Invalid(format!(
                "ha_url must start with ws:// or wss://, got {}",
                url
            )));
        }
        if self.sync_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "sync_interval_secs must be positive".into(),
            ));
        }
        if self.io_timeout_secs == 0 {
            return Err(ConfigError::Invalid("io_timeout_secs must be positive".into()));
        }
        Ok(())
    }

    /// Returns the session endpoint.
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.ha_url.trim(), self.ha_token.trim())
    }

    /// Returns the transport settings.
    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            io_timeout: Duration::from_secs(self.io_timeout_secs),
            ..TransportConfig::default()
        }
    }

    /// Returns the reconnect policy.
    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy::new(
            self.reconnect_attempts,
            Duration::from_secs(self.reconnect_delay_secs),
        )
    }

    /// Returns the interval between sync cycles.
    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs)
    }

    /// Returns the target entity id.
    pub fn entity_id(&self) -> String {
        resolve_entity_id(self.list_entity_id.as_deref(), self.language.as_deref())
    }
}
