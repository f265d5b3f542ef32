/*!
common/src/lib.rs

Shared configuration types for AgriSmart.

This file provides:
- Config data structures (deserialized from TOML)
- A defaults + override loader that merges two files table by table
*/

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// HTTP server binding
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

/// Keyword-search news API tried first
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrimaryNewsConfig {
    pub url: String,
    pub max_results: usize,
    pub safesearch: String,
    pub region: String,
    /// Upper bound on the whole request, body included
    pub timeout_seconds: u64,
}

impl Default for PrimaryNewsConfig {
    fn default() -> Self {
        Self {
            url: "https://oevortex-webscout.hf.space/api/news".to_string(),
            max_results: 15,
            safesearch: "moderate".to_string(),
            region: "wt-wt".to_string(),
            timeout_seconds: 10,
        }
    }
}

/// Credentialed aggregator tried when the primary source fails
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecondaryNewsConfig {
    pub url: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    pub max_results: usize,
}

impl Default for SecondaryNewsConfig {
    fn default() -> Self {
        Self {
            url: "https://newsapi.org/v2/everything".to_string(),
            api_key_env: "NEWS_API_KEY".to_string(),
            max_results: 20,
        }
    }
}

impl SecondaryNewsConfig {
    /// Reads the API key from the configured environment variable.
    /// An unset or blank variable yields `None`.
    pub fn api_key(&self) -> Option<String> {
        read_env_key(&self.api_key_env)
    }
}

/// RSS feeds scraped when both APIs are unavailable
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RssConfig {
    pub feeds: Vec<String>,
    pub max_items_per_feed: usize,
    pub snippet_chars: usize,
}

impl Default for RssConfig {
    fn default() -> Self {
        Self {
            feeds: vec![
                "https://www.fao.org/newsroom/rss/en/".to_string(),
                "https://www.farmprogress.com/rss.xml".to_string(),
                "https://news.google.com/rss/search?q=agriculture+climate&hl=en-US&gl=US&ceid=US:en"
                    .to_string(),
            ],
            max_items_per_feed: 10,
            snippet_chars: 200,
        }
    }
}

/// News resolution settings grouping every source of the chain
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    /// Topic keywords sent to the remote APIs
    pub query: String,
    pub user_agent: String,
    pub primary: PrimaryNewsConfig,
    pub secondary: SecondaryNewsConfig,
    pub rss: RssConfig,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            query: "Agriculture and climate".to_string(),
            user_agent: "AgriSmart/1.0".to_string(),
            primary: PrimaryNewsConfig::default(),
            secondary: SecondaryNewsConfig::default(),
            rss: RssConfig::default(),
        }
    }
}

/// Current-weather passthrough
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub url: String,
    pub api_key_env: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            url: "https://api.openweathermap.org/data/2.5/weather".to_string(),
            api_key_env: "OPENWEATHER_API_KEY".to_string(),
        }
    }
}

impl WeatherConfig {
    pub fn api_key(&self) -> Option<String> {
        read_env_key(&self.api_key_env)
    }
}

/// Top-level application configuration (deserialized from config.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub news: NewsConfig,
    pub weather: WeatherConfig,
}

impl Config {
    /// Load configuration with an optional default file and an optional override file.
    /// If both are present, they are merged (override takes precedence).
    /// Missing files are skipped; with neither present the built-in defaults apply.
    pub async fn load_with_defaults(
        default_path: Option<&Path>,
        override_path: Option<&Path>,
    ) -> Result<Self> {
        let mut config_value = toml::Value::Table(toml::map::Map::new());

        for path in [default_path, override_path].into_iter().flatten() {
            if !path.exists() {
                continue;
            }
            let data = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            let val: toml::Value = toml::from_str(&data)
                .with_context(|| format!("Failed to parse configuration: {}", path.display()))?;
            merge_toml(&mut config_value, val);
        }

        let cfg: Config = config_value
            .try_into()
            .context("Failed to parse merged configuration")?;
        Ok(cfg)
    }
}

fn merge_toml(a: &mut toml::Value, b: toml::Value) {
    match (a, b) {
        (toml::Value::Table(a_map), toml::Value::Table(b_map)) => {
            for (k, v) in b_map {
                if let Some(a_val) = a_map.get_mut(&k) {
                    merge_toml(a_val, v);
                } else {
                    a_map.insert(k, v);
                }
            }
        }
        (a_val, b_val) => *a_val = b_val,
    }
}

fn read_env_key(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
