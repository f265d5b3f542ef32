use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use rocket::figment::Figment;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{get, routes, Build, Rocket, State};
use serde::Serialize;
use serde_json::{json, Value};

use common::{Config, ServerConfig};

use crate::article::Article;
use crate::fallback::FALLBACK_VERSION;
use crate::resolver::NewsResolver;
use crate::weather::{WeatherClient, WeatherReply};

/// Application state stored inside Rocket managed state.
#[derive(Clone)]
pub struct AppState {
    pub started_at: DateTime<Utc>,
    pub resolver: Arc<NewsResolver>,
    pub weather: Arc<WeatherClient>,
}

impl AppState {
    pub fn new(resolver: NewsResolver, weather: WeatherClient) -> Self {
        Self {
            started_at: Utc::now(),
            resolver: Arc::new(resolver),
            weather: Arc::new(weather),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            NewsResolver::from_config(&config.news),
            WeatherClient::from_config(&config.weather),
        )
    }
}

/// Response structure for `/api/v1/status`.
#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
    uptime_seconds: i64,
    news_sources: Vec<String>,
    fallback_version: &'static str,
    weather_configured: bool,
}

/// `{ "news": [...] }`, the shape consumed by the dashboard
#[derive(Serialize)]
pub struct NewsEnvelope {
    pub news: Vec<Article>,
}

/// `{ "articles": [...], "totalResults": n, "status": "ok" }`
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticlesEnvelope {
    pub articles: Vec<Article>,
    pub total_results: usize,
    pub status: &'static str,
}

impl From<Vec<Article>> for ArticlesEnvelope {
    fn from(articles: Vec<Article>) -> Self {
        Self {
            total_results: articles.len(),
            articles,
            status: "ok",
        }
    }
}

#[get("/health")]
async fn health() -> &'static str {
    "OK"
}

/// Status endpoint returning uptime and the configured news chain.
#[get("/api/v1/status")]
async fn status(state: &State<AppState>) -> Json<StatusResponse> {
    let uptime = (Utc::now() - state.started_at).num_seconds();

    Json(StatusResponse {
        status: "ok",
        uptime_seconds: uptime,
        news_sources: state.resolver.source_names(),
        fallback_version: FALLBACK_VERSION,
        weather_configured: state.weather.is_configured(),
    })
}

/// Agricultural news. Always 200 with a non-empty list.
#[get("/api/news")]
async fn news(state: &State<AppState>) -> Json<NewsEnvelope> {
    let resolution = state.resolver.resolve().await;
    tracing::debug!(origin = %resolution.origin, "serving /api/news");
    Json(NewsEnvelope {
        news: resolution.articles,
    })
}

#[get("/api/v1/news")]
async fn news_v1(state: &State<AppState>) -> Json<ArticlesEnvelope> {
    let resolution = state.resolver.resolve().await;
    tracing::debug!(origin = %resolution.origin, "serving /api/v1/news");
    Json(ArticlesEnvelope::from(resolution.articles))
}

fn message(status: Status, text: &str) -> (Status, Json<Value>) {
    (status, Json(json!({ "message": text })))
}

/// Current weather for `city`, passed through from the upstream API.
#[get("/api/weather?<city>")]
async fn weather(state: &State<AppState>, city: Option<String>) -> (Status, Json<Value>) {
    let Some(city) = city.map(|c| c.trim().to_string()).filter(|c| !c.is_empty()) else {
        return message(Status::BadRequest, "City parameter is required");
    };

    if !state.weather.is_configured() {
        return message(Status::ServiceUnavailable, "Weather service is not configured");
    }

    match state.weather.current(&city).await {
        Ok(WeatherReply::Found(body)) => (Status::Ok, Json(body)),
        Ok(WeatherReply::Upstream(code)) => message(
            Status::from_code(code).unwrap_or(Status::BadGateway),
            "City not found or weather service unavailable",
        ),
        Err(e) => {
            tracing::error!(city = %city, error = %format!("{:#}", e), "weather lookup failed");
            message(
                Status::InternalServerError,
                "An error occurred while fetching weather data",
            )
        }
    }
}

/// Rocket figment with `[server] bind/port` merged over Rocket's own sources.
pub fn figment_for(server: &ServerConfig) -> Figment {
    rocket::Config::figment()
        .merge(("address", server.bind.clone()))
        .merge(("port", server.port))
}

/// Mounts every route on a Rocket instance managing `state`.
pub fn build_rocket(state: AppState, figment: Figment) -> Rocket<Build> {
    rocket::custom(figment)
        .manage(state)
        .mount("/", routes![health, status, news, news_v1, weather])
}

/// Build and launch the Rocket server.
///
/// This function blocks until the Rocket server shuts down (it awaits `rocket.launch().await`)
/// and returns an error if Rocket fails to start.
pub async fn launch_rocket(state: AppState, server: &ServerConfig) -> Result<()> {
    tracing::info!(bind = %server.bind, port = server.port, "Starting Rocket HTTP server");
    build_rocket(state, figment_for(server))
        .launch()
        .await
        .map_err(|e| anyhow!("Rocket failed: {}", e))?;

    tracing::info!("Rocket HTTP server has shut down");
    Ok(())
}
