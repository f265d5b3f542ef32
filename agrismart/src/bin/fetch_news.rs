//! Runs the news chain once and prints the result, for checking upstream
//! sources from a shell.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;

use agrismart::fallback::relative_age;
use agrismart::resolver::NewsResolver;
use agrismart::server::{ArticlesEnvelope, NewsEnvelope};
use common::Config;

#[derive(Parser, Debug)]
#[command(name = "fetch_news", about = "Resolve agricultural news once and print it")]
struct Args {
    /// Path to config.toml (merged over config.default.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print `{ "news": [...] }` JSON
    #[arg(long, conflicts_with = "v1")]
    json: bool,

    /// Print `{ "articles": [...], "totalResults": n, "status": "ok" }` JSON
    #[arg(long)]
    v1: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(tracing::Level::INFO)
        .init();

    let default_path = PathBuf::from("config.default.toml");
    let config = Config::load_with_defaults(Some(default_path.as_path()), args.config.as_deref()).await?;

    let resolver = NewsResolver::from_config(&config.news);
    let resolution = resolver.resolve().await;

    if args.v1 {
        let body = ArticlesEnvelope::from(resolution.articles);
        println!("{}", serde_json::to_string_pretty(&body).context("failed to encode articles")?);
        return Ok(());
    }
    if args.json {
        let body = NewsEnvelope {
            news: resolution.articles,
        };
        println!("{}", serde_json::to_string_pretty(&body).context("failed to encode news")?);
        return Ok(());
    }

    let now = Utc::now();
    println!("{}", "=".repeat(60));
    println!("Source: {} ({} articles)", resolution.origin, resolution.articles.len());
    println!("{}", "=".repeat(60));
    for (i, article) in resolution.articles.iter().enumerate() {
        println!("{}. {}", i + 1, article.title);
        println!("   {} | {}", article.source, relative_age(article.published_at, now));
        if article.url_valid {
            println!("   URL: {}", article.url);
        } else {
            println!("   URL: (unavailable)");
        }
    }
    Ok(())
}
