use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use entity_browser::app::{app, AppState};
use entity_browser::auth::HttpAuthGateway;
use entity_browser::config::AppConfig;
use entity_browser::sdk::HttpEntityApi;

const CACHE_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up PROJECT_ID, ENTITY_API_URL, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("entity_browser=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env();
    tracing::info!("Starting entity browser in {:?} mode", config.environment);

    let project_id = config.api.project_id.clone().unwrap_or_default();
    if project_id.is_empty() {
        tracing::warn!("PROJECT_ID is not set; every entity page will be not found");
    }

    let api = HttpEntityApi::new(&config.api, project_id)?;
    let auth = HttpAuthGateway::new(&config.auth)?;
    let bind_addr = config.bind_addr();

    let state = AppState::new(config, Arc::new(api), Arc::new(auth));

    let sweeper = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CACHE_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            sweeper.sweep_caches();
        }
    });

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Entity browser listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}
