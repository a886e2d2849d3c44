//! Browser chat front end.
//!
//! The server is stateless: the page keeps the visible transcript and posts
//! it back as `history` with every message.

mod dto;
mod handlers;
mod page;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;
use tracing::info;

use persona_runtime::ChatEngine;

pub use dto::{ChatReply, ChatRequest, ErrorResponse, HistoryRole, HistoryTurn, PageInfo};

/// Shared state for every handler.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ChatEngine>,
    pub page: Arc<PageInfo>,
}

impl AppState {
    pub fn new(engine: Arc<ChatEngine>, page: PageInfo) -> Self {
        Self {
            engine,
            page: Arc::new(page),
        }
    }
}

/// Routes:
/// - `GET /`: chat page
/// - `GET /api/profile`: title, description and greeting as JSON
/// - `POST /api/chat`: one conversation turn
/// - `GET /healthz`
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/healthz", get(handlers::healthz))
        .route("/api/profile", get(handlers::profile))
        .route("/api/chat", post(handlers::chat))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(state: AppState, addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    info!(addr = %listener.local_addr()?, "chat UI listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await
        .context("HTTP server error")
}
