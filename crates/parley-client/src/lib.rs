//! # parley-client
//!
//! Client-side logic of the Parley chat: conversation registry wiring,
//! the conversation timeline, history pagination, message search and
//! real-time event routing. Rendering is left to the host; it consumes
//! [`events::ViewEffect`]s and reads state from [`state::ChatClient`].

pub mod api;
pub mod composer;
pub mod config;
pub mod error;
pub mod events;
pub mod format;
pub mod resolver;
pub mod search;
pub mod state;
pub mod stream;
pub mod view;

use tracing_subscriber::{fmt, EnvFilter};

pub use error::{ClientError, Result};
pub use state::ChatClient;

/// Install the default log subscriber. Respects `RUST_LOG`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("parley_client=debug,parley_store=info,warn"));

    let installed = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();

    if installed.is_ok() {
        tracing::info!("Starting Parley client v{}", env!("CARGO_PKG_VERSION"));
    }
}
