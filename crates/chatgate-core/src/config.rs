//! Configuration for applications embedding Chatgate.
//!
//! Provides the [`GateConfig`] struct that loads from TOML files,
//! environment variables, and defaults using the `confyg` crate.
//!
//! # Loading Priority
//!
//! 1. Explicit config path
//! 2. `CHATGATE_CONFIG` environment variable
//! 3. XDG default: `~/.config/chatgate/config.toml`
//! 4. Built-in defaults
//!
//! `CHATGATE_SERVER_*` and `CHATGATE_STORE_*` environment variables overlay
//! whatever the file provides.

use confyg::{Confygery, env};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::state::ACCESS_STORE_KEY;
use crate::{Error, Result};

// ============================================================================
// Configuration structs
// ============================================================================

/// Main configuration for Chatgate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Config endpoint settings.
    pub server: ServerSettings,

    /// Persistence settings.
    pub store: StoreSettings,
}

/// Where the server config is fetched from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Base URL of the chat backend.
    pub base_url: String,

    /// Path of the config endpoint, relative to `base_url`.
    pub config_path: String,
}

/// Where access state is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Directory for the JSON file store. `None` keeps state in memory.
    pub path: Option<String>,

    /// Namespaced key the state is stored under.
    pub key: String,
}

// ============================================================================
// Default implementations
// ============================================================================

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_string(),
            config_path: "/api/config".to_string(),
        }
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            path: None,
            key: ACCESS_STORE_KEY.to_string(),
        }
    }
}

// ============================================================================
// Config loading
// ============================================================================

impl GateConfig {
    /// Load configuration from file, environment, and defaults.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder =
            Confygery::new().map_err(|e| Error::config(format!("config init: {e}")))?;

        if let Some(path) = Self::resolve_config_path(config_path) {
            if path.exists() {
                log::debug!("Loading config from {}", path.display());
                builder
                    .add_file(&path.to_string_lossy())
                    .map_err(|e| Error::config(format!("config file: {e}")))?;
            }
        }

        let mut env_opts = env::Options::with_top_level("CHATGATE");
        env_opts.add_section("server");
        env_opts.add_section("store");
        builder
            .add_env(env_opts)
            .map_err(|e| Error::config(format!("config env: {e}")))?;

        let config: Self = builder
            .build()
            .map_err(|e| Error::config(format!("config build: {e}")))?;

        Ok(config)
    }

    /// Resolve the config file path from explicit path, env var, or XDG default.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(PathBuf::from(path));
        }

        if let Ok(path) = std::env::var("CHATGATE_CONFIG") {
            return Some(PathBuf::from(path));
        }

        Self::default_config_path()
    }

    /// Return the XDG default config path.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("chatgate").join("config.toml"))
    }

    /// Full URL of the config endpoint.
    pub fn config_url(&self) -> String {
        format!(
            "{}/{}",
            self.server.base_url.trim_end_matches('/'),
            self.server.config_path.trim_start_matches('/')
        )
    }

    /// Serialize this config to a pretty-printed TOML string.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }
}

// ============================================================================
// Tests
// ============================================================================
