use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use feed_rs::parser;
use reqwest::header::USER_AGENT;
use tracing::{info, warn};

use super::NewsSource;
use crate::article::{Article, ArticleParts};
use crate::markup::{strip_markup, truncate_chars};
use common::NewsConfig;

/// Scrapes a fixed list of RSS/Atom feeds, in order.
///
/// A feed that fails to download or parse is skipped; the source only fails
/// when every feed does.
pub struct RssSource {
    feeds: Vec<String>,
    max_items_per_feed: usize,
    snippet_chars: usize,
    user_agent: String,
    client: reqwest::Client,
}

impl RssSource {
    pub fn new(feeds: Vec<String>) -> Self {
        Self {
            feeds,
            max_items_per_feed: 10,
            snippet_chars: 200,
            user_agent: "AgriSmart/1.0".to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(news: &NewsConfig) -> Self {
        let rss = &news.rss;
        Self::new(rss.feeds.clone())
            .with_limits(rss.max_items_per_feed, rss.snippet_chars)
            .with_user_agent(&news.user_agent)
    }

    pub fn with_limits(mut self, max_items_per_feed: usize, snippet_chars: usize) -> Self {
        self.max_items_per_feed = max_items_per_feed;
        self.snippet_chars = snippet_chars;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    async fn fetch_feed(&self, url: &str) -> Result<Vec<Article>> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await
            .context("feed HTTP request failed")?;

        let status = response.status();
        if !status.is_success() {
            bail!("feed fetch failed with status: {}", status);
        }

        let bytes = response.bytes().await.context("failed to read feed body")?;
        parse_feed(
            bytes.as_ref(),
            url,
            Utc::now(),
            self.max_items_per_feed,
            self.snippet_chars,
        )
    }
}

#[async_trait::async_trait]
impl NewsSource for RssSource {
    fn name(&self) -> &str {
        "rss"
    }

    fn is_available(&self) -> bool {
        !self.feeds.is_empty()
    }

    async fn fetch(&self) -> Result<Vec<Article>> {
        let mut articles = Vec::new();
        let mut failures = 0usize;

        for url in &self.feeds {
            match self.fetch_feed(url).await {
                Ok(items) => {
                    info!(feed = %url, count = items.len(), "rss: feed parsed");
                    articles.extend(items);
                }
                Err(e) => {
                    warn!(feed = %url, error = %format!("{:#}", e), "rss: feed skipped");
                    failures += 1;
                }
            }
        }

        if failures == self.feeds.len() {
            bail!("all {} RSS feeds failed", failures);
        }
        Ok(articles)
    }
}

/// Parses an RSS or Atom document into normalized articles.
///
/// Title and description lose all markup; descriptions are cut to
/// `snippet_chars`. Items pointing at placeholder domains are dropped.
pub fn parse_feed(
    bytes: &[u8],
    feed_url: &str,
    now: DateTime<Utc>,
    max_items: usize,
    snippet_chars: usize,
) -> Result<Vec<Article>> {
    let feed = parser::parse(bytes).context("failed to parse feed")?;

    let source = feed
        .title
        .as_ref()
        .map(|t| strip_markup(&t.content))
        .filter(|t| !t.is_empty())
        .or_else(|| {
            url::Url::parse(feed_url)
                .ok()
                .and_then(|u| u.host_str().map(str::to_string))
        });

    let articles = feed
        .entries
        .into_iter()
        .filter_map(|entry| {
            let description = entry
                .summary
                .as_ref()
                .map(|s| s.content.clone())
                .or_else(|| entry.content.as_ref().and_then(|c| c.body.clone()))
                .map(|d| truncate_chars(&strip_markup(&d), snippet_chars));

            let parts = ArticleParts {
                title: entry.title.as_ref().map(|t| strip_markup(&t.content)),
                url: entry.links.first().map(|l| l.href.clone()),
                published: None,
                published_at: entry.published.or(entry.updated),
                snippet: description,
                source: source.clone(),
                image_url: None,
            };
            Article::normalize(parts, now)
        })
        .take(max_items)
        .collect();

    Ok(articles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Farm &amp; Field Wire</title>
    <link>https://farmwire.test</link>
    <description>Agriculture news</description>
    <item>
      <title><![CDATA[<b>Wheat</b> futures climb]]></title>
      <link>https://farmwire.test/wheat</link>
      <description>&lt;p&gt;Dry weather across the &lt;em&gt;plains&lt;/em&gt; lifted prices. Analysts expect the rally to continue as harvest estimates shrink further, and exporters report steady demand from North Africa and Asia despite a stronger dollar and higher freight costs this quarter.&lt;/p&gt;</description>
      <pubDate>Tue, 04 Mar 2025 09:00:00 GMT</pubDate>
    </item>
    <item>
      <title>Story no longer available</title>
      <link>https://removed.com</link>
      <description>gone</description>
    </item>
    <item>
      <title>   </title>
      <link>https://farmwire.test/untitled</link>
    </item>
    <item>
      <title>Cover crops gain ground</title>
      <link>https://farmwire.test/cover-crops</link>
    </item>
  </channel>
</rss>"#;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 5, 0, 0, 0).unwrap()
    }

    #[test]
    fn strips_markup_and_truncates_descriptions() {
        let articles = parse_feed(SAMPLE.as_bytes(), "https://farmwire.test/rss", now(), 10, 200)
            .expect("parse sample");

        assert_eq!(articles.len(), 2);
        let wheat = &articles[0];
        assert_eq!(wheat.title, "Wheat futures climb");
        assert_eq!(wheat.url, "https://farmwire.test/wheat");
        assert_eq!(wheat.source, "Farm & Field Wire");
        assert_eq!(wheat.published_at, Utc.with_ymd_and_hms(2025, 3, 4, 9, 0, 0).unwrap());
        assert!(wheat.snippet.starts_with("Dry weather across the plains lifted prices."));
        assert!(!wheat.snippet.contains('<'));
        assert!(wheat.snippet.chars().count() <= 200);
        assert!(wheat.snippet.ends_with("..."));
    }

    #[test]
    fn items_without_date_or_description_get_defaults() {
        let articles = parse_feed(SAMPLE.as_bytes(), "https://farmwire.test/rss", now(), 10, 200)
            .expect("parse sample");

        let cover = &articles[1];
        assert_eq!(cover.title, "Cover crops gain ground");
        assert_eq!(cover.published_at, now());
        assert_eq!(cover.snippet, crate::article::DEFAULT_SNIPPET);
    }

    #[test]
    fn respects_per_feed_item_cap() {
        let articles = parse_feed(SAMPLE.as_bytes(), "https://farmwire.test/rss", now(), 1, 200)
            .expect("parse sample");
        assert_eq!(articles.len(), 1);
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let err = parse_feed(b"<html>nope", "https://farmwire.test/rss", now(), 10, 200).unwrap_err();
        assert!(err.to_string().contains("failed to parse feed"));
    }
}
