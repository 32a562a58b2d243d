//! TOML-based application configuration.
//!
//! Holds the endpoints the app talks to:
//! - Realtime database base URL and polling interval for study rooms
//! - Chat-completions endpoint and model for the AI assistant
//!
//! Configuration is stored at `~/.config/studify/config.toml`. The
//! assistant API key is deliberately not part of the file; it comes from
//! the environment.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::store::data_dir;

/// Study-room realtime database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Base URL of the hosted realtime database, e.g.
    /// `https://studify-default-rtdb.firebaseio.com`.
    #[serde(default)]
    pub base_url: String,
    /// Poll interval for the REST `subscribe` fallback, in seconds.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

/// AI assistant endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    #[serde(default = "default_assistant_api_url")]
    pub api_url: String,
    #[serde(default = "default_assistant_model")]
    pub model: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/studify/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub room: RoomConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
}

// Default functions
fn default_poll_interval_secs() -> u64 {
    5
}
fn default_assistant_api_url() -> String {
    "https://api.groq.com/openai/v1/chat/completions".into()
}
fn default_assistant_model() -> String {
    "llama-3.3-70b-versatile".into()
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            api_url: default_assistant_api_url(),
            model: default_assistant_model(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            room: RoomConfig::default(),
            assistant: AssistantConfig::default(),
        }
    }
}

impl AppConfig {
    fn path() -> Result<PathBuf, Box<dyn std::error::Error>> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: AppConfig = toml::from_str(&content)?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(Self::path()?, content)?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}
