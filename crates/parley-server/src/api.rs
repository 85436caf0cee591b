use std::net::SocketAddr;
use std::sync::Arc;

use axum::{extract::State, http::Method, routing::get, Json, Router};
use parley_shared::models::Conversation;
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::channels::{ChannelFilter, ConversationLister};
use crate::config::ServerConfig;
use crate::error::ServerError;

pub struct AppState<L> {
    pub lister: Arc<L>,
    pub config: Arc<ServerConfig>,
}

impl<L> Clone for AppState<L> {
    fn clone(&self) -> Self {
        Self {
            lister: self.lister.clone(),
            config: self.config.clone(),
        }
    }
}

pub fn build_router<L: ConversationLister>(state: AppState<L>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check::<L>))
        .route("/api/channels", get(get_channels::<L>))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    name: String,
    version: &'static str,
}

async fn health_check<L: ConversationLister>(
    State(state): State<AppState<L>>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        name: state.config.instance_name.clone(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// List every channel.
async fn get_channels<L: ConversationLister>(
    State(state): State<AppState<L>>,
) -> Result<Json<Vec<Conversation>>, ServerError> {
    let channels = state.lister.list_channels(&ChannelFilter::default()).await?;
    Ok(Json(channels))
}

pub async fn serve<L: ConversationLister>(state: AppState<L>, addr: SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "HTTP API listening");
    axum::serve(listener, app).await?;
    Ok(())
}
