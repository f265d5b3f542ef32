use anyhow::{bail, Context, Result};
use chrono::Utc;
use reqwest::header::USER_AGENT;
use serde::Deserialize;

use super::NewsSource;
use crate::article::{is_removed, Article, ArticleParts};
use common::NewsConfig;

/// Credentialed news aggregator (NewsAPI `everything` endpoint).
///
/// Without an API key the source reports itself unavailable and is never
/// contacted.
pub struct NewsApiSource {
    url: String,
    query: String,
    api_key: Option<String>,
    max_results: usize,
    user_agent: String,
    client: reqwest::Client,
}

impl NewsApiSource {
    pub fn new(url: impl Into<String>, query: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            url: url.into(),
            query: query.into(),
            api_key,
            max_results: 20,
            user_agent: "AgriSmart/1.0".to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Reads the key from the environment variable named in `[news.secondary]`.
    pub fn from_config(news: &NewsConfig) -> Self {
        let secondary = &news.secondary;
        Self::new(&secondary.url, &news.query, secondary.api_key())
            .with_max_results(secondary.max_results)
            .with_user_agent(&news.user_agent)
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

#[async_trait::async_trait]
impl NewsSource for NewsApiSource {
    fn name(&self) -> &str {
        "newsapi"
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    async fn fetch(&self) -> Result<Vec<Article>> {
        let api_key = self
            .api_key
            .as_deref()
            .context("news aggregator API key not configured")?;

        let page_size = self.max_results.to_string();
        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("q", self.query.as_str()),
                ("language", "en"),
                ("sortBy", "publishedAt"),
                ("pageSize", page_size.as_str()),
                ("apiKey", api_key),
            ])
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await
            .context("news aggregator HTTP request failed")?;

        let status = response.status();
        if !status.is_success() {
            bail!("news aggregator error {}", status);
        }

        let body: NewsApiResponse = response
            .json()
            .await
            .context("Failed to parse news aggregator response")?;

        if body.status.as_deref().is_some_and(|s| s != "ok") {
            bail!(
                "news aggregator returned status {:?}: {}",
                body.status,
                body.message.unwrap_or_default()
            );
        }

        let now = Utc::now();
        let mut removed = 0usize;
        let articles: Vec<Article> = body
            .articles
            .into_iter()
            .map(NewsApiArticle::into_parts)
            .filter(|parts| {
                let keep = !is_removed(parts);
                if !keep {
                    removed += 1;
                }
                keep
            })
            .filter_map(|parts| Article::normalize(parts, now))
            .take(self.max_results)
            .collect();

        tracing::debug!(count = articles.len(), removed, "news aggregator articles normalized");
        Ok(articles)
    }
}

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    status: Option<String>,
    message: Option<String>,
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsApiArticle {
    source: Option<NewsApiSourceRef>,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    url_to_image: Option<String>,
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewsApiSourceRef {
    name: Option<String>,
}

impl NewsApiArticle {
    fn into_parts(self) -> ArticleParts {
        ArticleParts {
            title: self.title,
            url: self.url,
            published: self.published_at,
            published_at: None,
            snippet: self.description,
            source: self.source.and_then(|s| s.name),
            image_url: self.url_to_image,
        }
    }
}
