use chrono::Utc;
use tracing::{info, warn};

use crate::article::Article;
use crate::fallback;
use crate::sources::{NewsApiSource, NewsSource, RssSource, SearchApiSource};
use common::NewsConfig;

/// Origin reported when the curated list was served
pub const FALLBACK_ORIGIN: &str = "fallback";

/// Articles for one request and the source that produced them.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub origin: String,
    pub articles: Vec<Article>,
}

/// Tries each source in priority order and returns the first non-empty
/// result. Every source is attempted at most once per call; failures never
/// reach the caller, the curated list terminates the chain.
pub struct NewsResolver {
    sources: Vec<Box<dyn NewsSource>>,
}

impl NewsResolver {
    pub fn new(sources: Vec<Box<dyn NewsSource>>) -> Self {
        Self { sources }
    }

    /// Standard chain: search API, news aggregator, RSS feeds.
    pub fn from_config(news: &NewsConfig) -> Self {
        Self::new(vec![
            Box::new(SearchApiSource::from_config(news)),
            Box::new(NewsApiSource::from_config(news)),
            Box::new(RssSource::from_config(news)),
        ])
    }

    pub fn source_names(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.name().to_string()).collect()
    }

    pub async fn resolve(&self) -> Resolution {
        for source in &self.sources {
            let name = source.name();
            if !source.is_available() {
                info!(source = name, "news source unavailable, skipping");
                continue;
            }

            match source.fetch().await {
                Ok(articles) if !articles.is_empty() => {
                    info!(source = name, count = articles.len(), "news resolved");
                    return Resolution {
                        origin: name.to_string(),
                        articles,
                    };
                }
                Ok(_) => warn!(source = name, "news source returned no usable articles"),
                Err(e) => warn!(source = name, error = %format!("{:#}", e), "news source failed"),
            }
        }

        let articles = fallback::articles(Utc::now());
        info!(
            count = articles.len(),
            version = fallback::FALLBACK_VERSION,
            "all news sources failed, serving curated fallback"
        );
        Resolution {
            origin: FALLBACK_ORIGIN.to_string(),
            articles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::ArticleParts;
    use anyhow::{anyhow, Result};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    enum Behavior {
        Fail,
        Empty,
        Articles(usize),
    }

    struct FakeSource {
        name: &'static str,
        available: bool,
        behavior: Behavior,
        calls: Arc<AtomicUsize>,
    }

    impl FakeSource {
        fn boxed(name: &'static str, behavior: Behavior) -> (Box<dyn NewsSource>, Arc<AtomicUsize>) {
            Self::boxed_with(name, true, behavior)
        }

        fn boxed_with(
            name: &'static str,
            available: bool,
            behavior: Behavior,
        ) -> (Box<dyn NewsSource>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let source = FakeSource {
                name,
                available,
                behavior,
                calls: calls.clone(),
            };
            (Box::new(source), calls)
        }
    }

    #[async_trait::async_trait]
    impl NewsSource for FakeSource {
        fn name(&self) -> &str {
            self.name
        }

        fn is_available(&self) -> bool {
            self.available
        }

        async fn fetch(&self) -> Result<Vec<Article>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behavior {
                Behavior::Fail => Err(anyhow!("{} exploded", self.name)),
                Behavior::Empty => Ok(Vec::new()),
                Behavior::Articles(n) => Ok((0..n)
                    .filter_map(|i| {
                        Article::normalize(
                            ArticleParts {
                                title: Some(format!("{} #{}", self.name, i)),
                                url: Some(format!("https://{}.test/{}", self.name, i)),
                                ..ArticleParts::default()
                            },
                            Utc::now(),
                        )
                    })
                    .collect()),
            }
        }
    }

    #[tokio::test]
    async fn first_success_wins_and_later_sources_are_untouched() {
        let (a, a_calls) = FakeSource::boxed("a", Behavior::Articles(2));
        let (b, b_calls) = FakeSource::boxed("b", Behavior::Articles(5));
        let resolver = NewsResolver::new(vec![a, b]);

        let res = resolver.resolve().await;
        assert_eq!(res.origin, "a");
        assert_eq!(res.articles.len(), 2);
        assert_eq!(a_calls.load(Ordering::SeqCst), 1);
        assert_eq!(b_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failures_and_empty_results_fall_through_once_each() {
        let (a, a_calls) = FakeSource::boxed("a", Behavior::Fail);
        let (b, b_calls) = FakeSource::boxed("b", Behavior::Empty);
        let (c, c_calls) = FakeSource::boxed("c", Behavior::Articles(3));
        let resolver = NewsResolver::new(vec![a, b, c]);

        let res = resolver.resolve().await;
        assert_eq!(res.origin, "c");
        assert_eq!(res.articles.len(), 3);
        for calls in [a_calls, b_calls, c_calls] {
            assert_eq!(calls.load(Ordering::SeqCst), 1);
        }
    }

    #[tokio::test]
    async fn unavailable_sources_are_never_fetched() {
        let (a, a_calls) = FakeSource::boxed_with("a", false, Behavior::Articles(4));
        let (b, b_calls) = FakeSource::boxed("b", Behavior::Articles(1));
        let resolver = NewsResolver::new(vec![a, b]);

        let res = resolver.resolve().await;
        assert_eq!(res.origin, "b");
        assert_eq!(a_calls.load(Ordering::SeqCst), 0);
        assert_eq!(b_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhausted_chain_serves_curated_list() {
        let (a, _) = FakeSource::boxed("a", Behavior::Fail);
        let (b, _) = FakeSource::boxed("b", Behavior::Empty);
        let resolver = NewsResolver::new(vec![a, b]);

        let res = resolver.resolve().await;
        assert_eq!(res.origin, FALLBACK_ORIGIN);
        assert!(!res.articles.is_empty());
        assert!(res.articles.iter().all(|a| !a.title.is_empty()));
    }

    #[tokio::test]
    async fn empty_chain_still_answers() {
        let resolver = NewsResolver::new(Vec::new());
        let res = resolver.resolve().await;
        assert_eq!(res.origin, FALLBACK_ORIGIN);
        assert!(!res.articles.is_empty());
    }

    #[test]
    fn config_chain_order() {
        let resolver = NewsResolver::from_config(&NewsConfig::default());
        assert_eq!(resolver.source_names(), vec!["search", "newsapi", "rss"]);
    }
}
