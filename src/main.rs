mod config;
mod errors;
mod models;
mod relay;
mod routes;
mod service;
mod upstream;

use tracing::{info, warn};

use crate::config::AppConfig;
use crate::service::chat_service::ChatService;
use crate::upstream::AnthropicClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (development convenience)
    dotenvy::dotenv().ok();

    // Initialise tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chat_relay=debug,tower_http=debug".into()),
        )
        .init();

    // ── Configuration ─────────────────────────────────────────────────────────
    let config = AppConfig::from_env();
    match &config.api_key {
        Some(key) => info!(key = ?key, model = %config.model, "upstream credential loaded"),
        None => warn!("ANTHROPIC_API_KEY is not set; /api/chat will fail until it is"),
    }
    if config.log_payloads {
        warn!("RELAY_LOG_PAYLOADS is on: message contents will be logged");
    }

    // ── Dependency wiring ─────────────────────────────────────────────────────
    let client = AnthropicClient::new(&config);
    let chat_service = ChatService::new(client, config.log_payloads);
    let app = routes::router(chat_service);

    // ── Listen ────────────────────────────────────────────────────────────────
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{addr}/");

    axum::serve(listener, app).await?;
    Ok(())
}
