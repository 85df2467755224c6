//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.fbmessenger/config.json`) and environment.
//! Tokens from the environment take precedence over the file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Graph API base URL (without trailing slash).
pub const DEFAULT_API_BASE_URL: &str = "https://graph.facebook.com/v10.0";

/// Top-level config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Page access token. Overridden by FB_TOKEN env.
    pub access_token: Option<String>,

    /// Webhook verify token compared against `hub.verify_token`. Overridden by FB_VERIFY_TOKEN env.
    pub verify_token: Option<String>,

    /// Directory attachments are copied into before sending. When unset, files are used in place.
    pub attachment_location: Option<PathBuf>,

    /// Public URL prefix under which staged attachments are served; file names are appended verbatim.
    pub public_attachment_url: Option<String>,

    /// Graph API base URL (default https://graph.facebook.com/v10.0).
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Per-request timeout for Send API calls, in seconds (default 30).
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Webhook server settings.
    #[serde(default)]
    pub server: ServerConfig,
}

/// Webhook listener bind and port.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// Port for the webhook (default 8080).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bind address (default "0.0.0.0"; the platform must reach the webhook).
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_port() -> u16 {
    8080
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: default_bind(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            access_token: None,
            verify_token: None,
            attachment_location: None,
            public_attachment_url: None,
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            server: ServerConfig::default(),
        }
    }
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

fn non_empty(s: &str) -> Option<String> {
    let t = s.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}

fn env_or(var: &str, fallback: Option<&String>) -> Option<String> {
    std::env::var(var)
        .ok()
        .and_then(|s| non_empty(&s))
        .or_else(|| fallback.and_then(|s| non_empty(s)))
}

/// Resolve the page access token: env FB_TOKEN overrides config.
pub fn resolve_access_token(config: &Config) -> Option<String> {
    env_or("FB_TOKEN", config.access_token.as_ref())
}

/// Resolve the webhook verify token: env FB_VERIFY_TOKEN overrides config.
pub fn resolve_verify_token(config: &Config) -> Option<String> {
    env_or("FB_VERIFY_TOKEN", config.verify_token.as_ref())
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("FBMESSENGER_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".fbmessenger").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the given path, the default path, or FBMESSENGER_CONFIG_PATH. Missing file => default config.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}
