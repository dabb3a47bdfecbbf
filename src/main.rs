use anyhow::Context;
use tracing_subscriber::EnvFilter;

use bento_profile_api::{config, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("bento_profile_api=info,tower_http=info")),
        )
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    tracing::info!("Starting Bento Profile API in {:?} mode", config.environment);
    if bento_profile_api::is_development!() {
        tracing::warn!("Development mode: in-memory store unless STORE_BACKEND=postgres, built-in JWT secret unless JWT_SECRET is set");
    }

    let state = server::AppState::from_config(config).await?;
    let app = server::app(state, config);

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Bento Profile API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
