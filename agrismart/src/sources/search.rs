use anyhow::{bail, Context, Result};
use chrono::Utc;
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::Deserialize;
use std::time::Duration;

use super::NewsSource;
use crate::article::{Article, ArticleParts};
use common::NewsConfig;

/// Keyword-search news API, first link of the chain.
///
/// The whole exchange (connect, headers and body) is bounded by `timeout`.
pub struct SearchApiSource {
    url: String,
    query: String,
    max_results: usize,
    safesearch: String,
    region: String,
    user_agent: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl SearchApiSource {
    pub fn new(url: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            query: query.into(),
            max_results: 15,
            safesearch: "moderate".to_string(),
            region: "wt-wt".to_string(),
            user_agent: "AgriSmart/1.0".to_string(),
            timeout: Duration::from_secs(10),
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(news: &NewsConfig) -> Self {
        let primary = &news.primary;
        Self::new(&primary.url, &news.query)
            .with_max_results(primary.max_results)
            .with_timeout(Duration::from_secs(primary.timeout_seconds))
            .with_safesearch(&primary.safesearch)
            .with_region(&primary.region)
            .with_user_agent(&news.user_agent)
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_safesearch(mut self, safesearch: impl Into<String>) -> Self {
        self.safesearch = safesearch.into();
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    async fn request(&self) -> Result<SearchResponse> {
        let max_results = self.max_results.to_string();
        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("q", self.query.as_str()),
                ("max_results", max_results.as_str()),
                ("safesearch", self.safesearch.as_str()),
                ("region", self.region.as_str()),
            ])
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await
            .context("search API HTTP request failed")?;

        let status = response.status();
        if !status.is_success() {
            bail!("search API error {}", status);
        }

        response
            .json::<SearchResponse>()
            .await
            .context("Failed to parse search API response")
    }
}

#[async_trait::async_trait]
impl NewsSource for SearchApiSource {
    fn name(&self) -> &str {
        "search"
    }

    async fn fetch(&self) -> Result<Vec<Article>> {
        let body = tokio::time::timeout(self.timeout, self.request())
            .await
            .with_context(|| format!("search API request timed out after {:?}", self.timeout))??;

        let now = Utc::now();
        let articles: Vec<Article> = body
            .results
            .unwrap_or_default()
            .into_iter()
            .filter_map(|r| Article::normalize(r.into_parts(), now))
            .take(self.max_results)
            .collect();

        tracing::debug!(count = articles.len(), "search API articles normalized");
        Ok(articles)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Option<Vec<SearchResult>>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    title: Option<String>,
    url: Option<String>,
    date: Option<String>,
    snippet: Option<String>,
    body: Option<String>,
    description: Option<String>,
    source: Option<String>,
    image: Option<String>,
}

impl SearchResult {
    fn into_parts(self) -> ArticleParts {
        ArticleParts {
            title: self.title,
            url: self.url,
            published: self.date,
            published_at: None,
            snippet: [self.snippet, self.body, self.description]
                .into_iter()
                .flatten()
                .find(|s| !s.trim().is_empty()),
            source: self.source,
            image_url: self.image,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_snippet(json: &str) -> Option<String> {
        let body: SearchResponse = serde_json::from_str(json).expect("parse search response");
        let result = body.results.unwrap_or_default().into_iter().next()?;
        result.into_parts().snippet
    }

    #[test]
    fn snippet_and_body_can_both_be_present() {
        let json = r#"{"results": [{"title": "T", "url": "https://a.test", "snippet": "from snippet", "body": "from body"}]}"#;
        assert_eq!(first_snippet(json).as_deref(), Some("from snippet"));
    }

    #[test]
    fn blank_snippet_falls_back_to_body_then_description() {
        let json = r#"{"results": [{"title": "T", "snippet": "  ", "body": "from body", "description": "d"}]}"#;
        assert_eq!(first_snippet(json).as_deref(), Some("from body"));

        let json = r#"{"results": [{"title": "T", "description": "from description"}]}"#;
        assert_eq!(first_snippet(json).as_deref(), Some("from description"));
    }
}
