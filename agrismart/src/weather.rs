use anyhow::{Context, Result};
use serde_json::Value;

use common::WeatherConfig;

/// Result of a weather lookup that reached the upstream API
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherReply {
    /// Upstream body, passed through untouched
    Found(Value),
    /// Upstream answered with a non-success status code
    Upstream(u16),
}

/// Single-shot passthrough to a current-weather API (OpenWeatherMap shape).
pub struct WeatherClient {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl WeatherClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(cfg: &WeatherConfig) -> Self {
        Self::new(&cfg.url, cfg.api_key())
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub async fn current(&self, city: &str) -> Result<WeatherReply> {
        let api_key = self
            .api_key
            .as_deref()
            .context("weather API key not configured")?;

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("q", city), ("appid", api_key)])
            .send()
            .await
            .context("weather HTTP request failed")?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(city, status = status.as_u16(), "weather API returned an error");
            return Ok(WeatherReply::Upstream(status.as_u16()));
        }

        let body = response
            .json::<Value>()
            .await
            .context("Failed to parse weather response")?;
        Ok(WeatherReply::Found(body))
    }
}
