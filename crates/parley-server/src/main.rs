//! # parley-server
//!
//! HTTP backend glue for the Parley chat.
//!
//! This binary provides:
//! - **Channel listing** (`GET /api/channels`) returning every open
//!   conversation, with a fixed JSON error envelope on failure
//! - **Health check** (`GET /health`)

mod api;
mod channels;
mod config;
mod error;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::api::AppState;
use crate::channels::InMemoryConversations;
use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,parley_server=debug")),
        )
        .init();

    info!("Starting Parley server v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ServerConfig::from_env();
    info!(?config, "Loaded configuration");

    // -----------------------------------------------------------------------
    // 3. Load conversations
    // -----------------------------------------------------------------------
    let lister = match &config.channels_seed_path {
        Some(path) => InMemoryConversations::from_seed_file(path).await?,
        None => {
            info!("No CHANNELS_SEED_PATH set, serving an empty channel list");
            InMemoryConversations::default()
        }
    };

    let http_addr = config.http_addr;
    let app_state = AppState {
        lister: Arc::new(lister),
        config: Arc::new(config),
    };

    // -----------------------------------------------------------------------
    // 4. Run the HTTP API server (blocks until shutdown)
    // -----------------------------------------------------------------------
    tokio::select! {
        result = api::serve(app_state, http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
