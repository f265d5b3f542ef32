use anyhow::Result;

use crate::article::Article;

pub mod newsapi;
pub mod rss;
pub mod search;

/// One link of the news fallback chain (remote API, feed list, ...)
#[async_trait::async_trait]
pub trait NewsSource: Send + Sync {
    /// Short identifier used in logs and in the resolution origin
    fn name(&self) -> &str;

    /// Whether the source can be attempted at all (e.g. credentials present).
    /// Unavailable sources are skipped without any network traffic.
    fn is_available(&self) -> bool {
        true
    }

    /// Fetches and normalizes articles. An empty list counts as a miss.
    async fn fetch(&self) -> Result<Vec<Article>>;
}

pub use newsapi::NewsApiSource;
pub use rss::RssSource;
pub use search::SearchApiSource;
