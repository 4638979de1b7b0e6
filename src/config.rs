//! Configuration management for subwrap
//!
//! All upstream base URLs, the language order, and the default charset are
//! explicit configuration injected into the clients at construction: tests
//! point them at local mock servers instead of the real sites.
//!
//! Defaults are compiled in; a TOML file (via `--config` or `SUBWRAP_CONFIG`)
//! and a few environment variables override them.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Primary provider addon base URL (tried before any fallback)
    pub primary_base: String,
    /// Metadata service base URL (Cinemeta-compatible)
    pub meta_base: String,
    /// Subtitle index base URL (search + detail pages)
    pub index_base: String,
    /// Language codes in strict priority order
    pub languages: Vec<String>,
    /// Charset assumed for fetched subtitles unless a link overrides it
    pub default_charset: String,
    /// Max detail links taken from one search result page
    pub search_result_cap: usize,
    /// Max concurrent query attempts within one language tier
    pub fallback_fan_out: usize,
    /// Per-request timeout for every outbound call, in seconds
    pub request_timeout_secs: u64,
    /// Listen port
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            primary_base: "https://2ecbbd610840-podnapisi.baby-beamup.club".to_string(),
            meta_base: "https://v3-cinemeta.strem.io".to_string(),
            index_base: "https://www.podnapisi.net".to_string(),
            languages: vec!["sl".to_string(), "en".to_string()],
            default_charset: "cp1250".to_string(),
            search_result_cap: 5,
            fallback_fan_out: 4,
            request_timeout_secs: 15,
            port: 7000,
        }
    }
}

impl Config {
    /// Load config with the override chain:
    /// 1. Compiled-in defaults
    /// 2. TOML file at `path` (or `SUBWRAP_CONFIG`), if it exists
    /// 3. Environment variables (`SUBWRAP_PORT`, `SUBWRAP_PRIMARY_BASE`)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match Self::resolve_path(path) {
            Some(p) if p.exists() => {
                let raw = std::fs::read_to_string(&p)
                    .with_context(|| format!("read config {}", p.display()))?;
                toml::from_str(&raw).with_context(|| format!("parse config {}", p.display()))?
            }
            _ => Self::default(),
        };

        if let Ok(port) = std::env::var("SUBWRAP_PORT") {
            config.port = port.parse().context("SUBWRAP_PORT must be a port number")?;
        }
        if let Ok(base) = std::env::var("SUBWRAP_PRIMARY_BASE") {
            config.primary_base = base;
        }

        Ok(config)
    }

    fn resolve_path(path: Option<&Path>) -> Option<std::path::PathBuf> {
        path.map(Path::to_path_buf)
            .or_else(|| std::env::var("SUBWRAP_CONFIG").ok().map(Into::into))
    }

    /// Outbound request timeout as a [`Duration`]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
