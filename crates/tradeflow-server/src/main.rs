//! TradeFlow server.
//!
//! Accepts exported workflow graphs and checks trades against balance and
//! slippage limits.

mod config;
mod routes;

use config::{ConfigError, ServerConfig};
use routes::AppState;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tradeflow_server=info,tower_http=info".into()),
        )
        .init();

    let config = ServerConfig::from_env()?;
    info!(
        max_balance = %config.limits.max_balance,
        max_slippage = %config.limits.max_slippage,
        "Trade limits loaded"
    );

    let app = routes::router(AppState::new(config.limits));

    let listener = TcpListener::bind(config.addr).await?;
    info!("TradeFlow server listening on {}", config.addr);

    axum::serve(listener, app).await?;
    Ok(())
}
