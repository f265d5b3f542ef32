use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// Snippet used when a source provides no description
pub const DEFAULT_SNIPPET: &str = "Latest information on agriculture and climate.";

/// Source label used when a source does not name the publisher
pub const DEFAULT_SOURCE: &str = "Agricultural News";

/// Link shown for articles whose URL cannot be displayed
pub const UNUSABLE_URL: &str = "#";

/// Hosts that upstream APIs substitute for removed or invalid articles.
/// Subdomains match as well.
const PLACEHOLDER_DOMAINS: &[&str] = &["removed.com", "example.com", "example.org", "example.net"];

/// Markers aggregators put in place of deleted content
const REMOVED_MARKERS: &[&str] = &["[removed]", "[deleted]"];

/// A normalized news item as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub title: String,
    pub url: String,
    /// `false` when `url` is the `#` placeholder
    pub url_valid: bool,
    pub published_at: DateTime<Utc>,
    pub snippet: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Raw fields as extracted from an upstream payload, before normalization.
#[derive(Debug, Clone, Default)]
pub struct ArticleParts {
    pub title: Option<String>,
    pub url: Option<String>,
    /// Date as sent by JSON APIs, parsed during normalization
    pub published: Option<String>,
    /// Date already parsed by the feed reader; wins over `published`
    pub published_at: Option<DateTime<Utc>>,
    pub snippet: Option<String>,
    pub source: Option<String>,
    pub image_url: Option<String>,
}

/// Outcome of checking an article link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkCheck {
    /// Absolute http(s) URL with a host
    Usable(String),
    /// Missing, relative or otherwise malformed; kept but flagged
    Unusable,
    /// Known placeholder domain; the article must be discarded
    Placeholder,
}

pub fn check_link(raw: Option<&str>) -> LinkCheck {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return LinkCheck::Unusable;
    };
    let Ok(parsed) = Url::parse(raw) else {
        return LinkCheck::Unusable;
    };
    if !matches!(parsed.scheme(), "http" | "https") {
        return LinkCheck::Unusable;
    }
    let Some(host) = parsed.host_str() else {
        return LinkCheck::Unusable;
    };
    let host = host.trim_start_matches("www.").to_ascii_lowercase();
    let is_placeholder = PLACEHOLDER_DOMAINS
        .iter()
        .any(|d| host == *d || host.ends_with(&format!(".{}", d)));
    if is_placeholder {
        LinkCheck::Placeholder
    } else {
        LinkCheck::Usable(parsed.to_string())
    }
}

/// True when any text field carries a removed-content marker.
pub fn is_removed(parts: &ArticleParts) -> bool {
    [&parts.title, &parts.snippet, &parts.url]
        .into_iter()
        .flatten()
        .any(|field| {
            let lower = field.to_lowercase();
            REMOVED_MARKERS.iter().any(|m| lower.contains(m))
        })
}

/// Parses RFC 3339 first, then RFC 2822 (RSS pubDate).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_rfc2822(raw))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Article {
    /// Builds an article from raw parts.
    ///
    /// Returns `None` when the title is blank or the link points at a
    /// placeholder domain. A missing or malformed link is kept as `#` with
    /// `url_valid = false`. `now` stands in for a missing or unparsable date.
    pub fn normalize(parts: ArticleParts, now: DateTime<Utc>) -> Option<Article> {
        let title = non_blank(parts.title)?;

        let (url, url_valid) = match check_link(parts.url.as_deref()) {
            LinkCheck::Usable(url) => (url, true),
            LinkCheck::Unusable => (UNUSABLE_URL.to_string(), false),
            LinkCheck::Placeholder => return None,
        };

        let published_at = parts
            .published_at
            .or_else(|| parts.published.as_deref().and_then(parse_timestamp))
            .unwrap_or(now);

        Some(Article {
            title,
            url,
            url_valid,
            published_at,
            snippet: non_blank(parts.snippet).unwrap_or_else(|| DEFAULT_SNIPPET.to_string()),
            source: non_blank(parts.source).unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
            image_url: non_blank(parts.image_url),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn parts(title: &str, url: &str) -> ArticleParts {
        ArticleParts {
            title: Some(title.to_string()),
            url: Some(url.to_string()),
            ..ArticleParts::default()
        }
    }

    #[test]
    fn normalize_trims_and_fills_defaults() {
        let article = Article::normalize(parts("  Drought hits corn  ", "https://news.test/a"), now())
            .expect("valid article");
        assert_eq!(article.title, "Drought hits corn");
        assert_eq!(article.url, "https://news.test/a");
        assert!(article.url_valid);
        assert_eq!(article.published_at, now());
        assert_eq!(article.snippet, DEFAULT_SNIPPET);
        assert_eq!(article.source, DEFAULT_SOURCE);
        assert_eq!(article.image_url, None);
    }

    #[test]
    fn blank_title_is_discarded() {
        assert!(Article::normalize(parts("   ", "https://news.test/a"), now()).is_none());
        assert!(Article::normalize(ArticleParts::default(), now()).is_none());
    }

    #[test]
    fn placeholder_domains_are_discarded() {
        assert!(Article::normalize(parts("Gone", "https://removed.com"), now()).is_none());
        assert!(Article::normalize(parts("Gone", "http://www.example.com/x"), now()).is_none());
        assert!(Article::normalize(parts("Gone", "https://cdn.example.org/x"), now()).is_none());
    }

    #[test]
    fn malformed_links_are_flagged_not_dropped() {
        for url in ["#", "/relative/path", "ftp://files.test/a", "not a url"] {
            let article = Article::normalize(parts("Kept", url), now()).expect("kept");
            assert_eq!(article.url, UNUSABLE_URL);
            assert!(!article.url_valid, "{url} should be flagged");
        }
    }

    #[test]
    fn timestamps_accept_rfc3339_and_rfc2822() {
        let mut p = parts("Dated", "https://news.test/a");
        p.published = Some("2024-06-01T08:30:00Z".to_string());
        let a = Article::normalize(p.clone(), now()).unwrap();
        assert_eq!(a.published_at, Utc.with_ymd_and_hms(2024, 6, 1, 8, 30, 0).unwrap());

        p.published = Some("Sat, 01 Jun 2024 10:30:00 +0200".to_string());
        let a = Article::normalize(p.clone(), now()).unwrap();
        assert_eq!(a.published_at, Utc.with_ymd_and_hms(2024, 6, 1, 8, 30, 0).unwrap());

        p.published = Some("yesterday".to_string());
        let a = Article::normalize(p, now()).unwrap();
        assert_eq!(a.published_at, now());
    }

    #[test]
    fn parsed_timestamp_is_used_as_is() {
        let when = Utc.with_ymd_and_hms(2024, 11, 5, 6, 0, 0).unwrap();
        let mut p = parts("Dated", "https://news.test/a");
        p.published_at = Some(when);
        p.published = Some("2020-01-01T00:00:00Z".to_string());
        let a = Article::normalize(p, now()).unwrap();
        assert_eq!(a.published_at, when);
    }

    #[test]
    fn removed_markers_match_any_field() {
        let mut p = parts("[Removed]", "https://news.test/a");
        assert!(is_removed(&p));
        p.title = Some("Fine".to_string());
        p.snippet = Some("This item was [DELETED]".to_string());
        assert!(is_removed(&p));
        p.snippet = None;
        assert!(!is_removed(&p));
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let article = Article::normalize(parts("T", "https://news.test/a"), now()).unwrap();
        let json = serde_json::to_value(&article).unwrap();
        assert!(json.get("publishedAt").is_some());
        assert!(json.get("urlValid").is_some());
        assert!(json.get("imageUrl").is_none());
    }
}
