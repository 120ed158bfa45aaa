//! Application configuration management.
//!
//! This module handles loading the application configuration:
//! the server origin, the API base path, the transport timeout and an
//! optional session cookie to seed the HTTP client with.
//!
//! Configuration is stored at `~/.config/cmdb/config.json`. Values from the
//! environment (`CMDB_*`, optionally loaded from a `.env` file) override the
//! file. Everything is resolved once at process start.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Application name used for the config directory path
const APP_NAME: &str = "cmdb";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// API base path used when none is configured.
pub const DEFAULT_API_PATH: &str = "/api";

const DEFAULT_SERVER_URL: &str = "http://localhost:8080";

/// Transport timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

const ENV_SERVER_URL: &str = "CMDB_SERVER_URL";
const ENV_API_PATH: &str = "CMDB_API_PATH";
const ENV_SESSION_COOKIE: &str = "CMDB_SESSION_COOKIE";
const ENV_TIMEOUT_SECS: &str = "CMDB_TIMEOUT_SECS";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Origin the dashboard is served from, e.g. `https://cmdb.example.org`.
    pub server_url: String,
    /// Base path of the REST API under the origin.
    pub api_path: String,
    pub request_timeout_secs: u64,
    /// Raw `name=value` cookie carrying an existing session.
    pub session_cookie: Option<String>,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            api_path: DEFAULT_API_PATH.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            session_cookie: None,
            log_file: None,
        }
    }
}

impl Config {
    /// Load the config file (if any) and apply environment overrides.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Apply overrides from a key lookup. Empty values count as unset.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_SERVER_URL) {
            self.server_url = url;
        }
        if let Some(path) = get(ENV_API_PATH) {
            self.api_path = path;
        }
        if let Some(cookie) = get(ENV_SESSION_COOKIE) {
            self.session_cookie = Some(cookie);
        }
        if let Some(secs) = get(ENV_TIMEOUT_SECS) {
            self.request_timeout_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("{} must be a number of seconds", ENV_TIMEOUT_SECS))?;
        }
        Ok(())
    }

    /// The API base path with a leading `/` and no trailing `/`.
    ///
    /// A blank setting falls back to `/api`; a bare `/` means the API is
    /// served at the origin root and yields an empty prefix.
    pub fn api_path(&self) -> String {
        let trimmed = self.api_path.trim();
        if trimmed.is_empty() {
            return DEFAULT_API_PATH.to_string();
        }
        let inner = trimmed.trim_matches('/');
        if inner.is_empty() {
            String::new()
        } else {
            format!("/{}", inner)
        }
    }

    /// The server origin as a parsed URL.
    pub fn origin(&self) -> Result<Url> {
        Url::parse(self.server_url.trim())
            .with_context(|| format!("Invalid server URL: {}", self.server_url))
    }

    /// Absolute API base, e.g. `https://cmdb.example.org/api`.
    pub fn api_base(&self) -> Result<String> {
        let origin = self.origin()?;
        let origin = origin.as_str().trim_end_matches('/');
        Ok(format!("{}{}", origin, self.api_path()))
    }
}
