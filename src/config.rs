//! Client configuration with file-based defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_BASE_URL: &str = "https://musicbrainz.org/ws/2";
const DEFAULT_USER_AGENT: &str = "linernotes/0.1 (+https://example.com)";
const DEFAULT_TIMEOUT_SECS: u64 = 15;
// Slightly over the 1 req/s MusicBrainz asks for.
const DEFAULT_RATE_LIMIT_MS: u64 = 1100;
const DEFAULT_SEARCH_LIMIT: u32 = 10;
const DEFAULT_PROBE_LIMIT: usize = 6;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Settings for the MusicBrainz client.
///
/// Every field is optional in the file; unset fields resolve to built-in
/// defaults through the accessor methods.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit_ms: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_limit: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub probe_limit: Option<usize>,
}

impl ClientConfig {
    /// Create a new empty config (all defaults).
    pub fn new() -> Self {
        ClientConfig::default()
    }

    /// Load config from a specific file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Load config from the first known path that exists
    /// (`linernotes.toml` beside the binary, then
    /// `~/.config/linernotes/config.toml`).  Missing files yield defaults.
    pub fn load() -> Result<Self, ConfigError> {
        for path in Self::known_paths() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }
        Ok(ClientConfig::new())
    }

    fn known_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("linernotes.toml")];
        if let Some(home) = std::env::var_os("HOME") {
            paths.push(
                PathBuf::from(home)
                    .join(".config")
                    .join("linernotes")
                    .join("config.toml"),
            );
        }
        paths
    }

    /// Merge this config with another, preferring values from `other`.
    pub fn merge(&mut self, other: &ClientConfig) {
        if other.base_url.is_some() {
            self.base_url = other.base_url.clone();
        }
        if other.user_agent.is_some() {
            self.user_agent = other.user_agent.clone();
        }
        if other.timeout_secs.is_some() {
            self.timeout_secs = other.timeout_secs;
        }
        if other.rate_limit_ms.is_some() {
            self.rate_limit_ms = other.rate_limit_ms;
        }
        if other.search_limit.is_some() {
            self.search_limit = other.search_limit;
        }
        if other.probe_limit.is_some() {
            self.probe_limit = other.probe_limit;
        }
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn rate_limit_ms(&self) -> u64 {
        self.rate_limit_ms.unwrap_or(DEFAULT_RATE_LIMIT_MS)
    }

    pub fn search_limit(&self) -> u32 {
        self.search_limit.unwrap_or(DEFAULT_SEARCH_LIMIT)
    }

    pub fn probe_limit(&self) -> usize {
        self.probe_limit.unwrap_or(DEFAULT_PROBE_LIMIT)
    }
}
