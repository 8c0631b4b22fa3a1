//! Service entrypoint: logging, configuration, database pool, store
//! hydration, notification worker, then serve.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use haz_api::state::{AppConfig, AppState};
use haz_notify::{SendGridConfig, SendGridGateway};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();
    let port = config.port;

    let db_pool = haz_api::db::init_pool().await?;
    let mut state = AppState::with_config(config.clone(), db_pool.clone());

    if let Some(pool) = &db_pool {
        haz_api::db::hydrate(&state, pool).await?;
    }

    // Mail gateway is optional; without an API key, notifications are
    // logged no-ops and every business operation still works.
    match &config.sendgrid_api_key {
        Some(api_key) => {
            let gateway = SendGridGateway::new(SendGridConfig::new(
                api_key.clone(),
                config.from_email.clone(),
            ))
            .map_err(|e| anyhow::anyhow!("mail gateway construction failed: {e}"))?;
            state.notifications = haz_api::notifications::spawn_worker(
                Arc::new(gateway),
                state.shipments.clone(),
                db_pool,
            );
            tracing::info!("notification worker started");
        }
        None => {
            tracing::warn!("SENDGRID_API_KEY not set — client notifications disabled");
        }
    }

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "haz-api listening");

    axum::serve(listener, haz_api::app(state)).await?;
    Ok(())
}
