//! HTTP proxy in front of the assistant provider.
//!
//! Exposes the provider to browser-style clients without leaking the API
//! key. Run streams are forwarded byte for byte: the proxy never parses
//! them, so a malformed frame reaches the client exactly as sent.
//!
//! - `POST /api/threads` -> `{threadId}`
//! - `POST /api/threads/:id/messages` `{content}` -> run stream
//! - `GET  /api/threads/:id/messages` -> provider message list
//! - `POST /api/threads/:id/actions` `{runId, toolCallOutputs}` -> run stream
//! - `GET  /api/files/:file_id` -> file content

mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};

use crate::provider::AssistantProvider;

/// Shared state for the proxy handlers.
#[derive(Clone)]
pub struct ServerState {
    pub provider: Arc<dyn AssistantProvider>,
}

pub fn router(state: ServerState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/threads", post(handlers::create_thread))
        .route(
            "/api/threads/:thread_id/messages",
            post(handlers::post_message).get(handlers::list_messages),
        )
        .route(
            "/api/threads/:thread_id/actions",
            post(handlers::submit_actions),
        )
        .route("/api/files/:file_id", get(handlers::file_content))
        .layer(cors)
        .with_state(state)
}

/// Bind `addr` and serve in a background task.
///
/// Returns the task handle and the bound address, so tests can bind port 0.
pub async fn start_server_on(
    addr: SocketAddr,
    state: ServerState,
) -> color_eyre::Result<(JoinHandle<()>, SocketAddr)> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    tracing::info!("Proxy listening on http://{}", actual_addr);

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("Proxy server error: {}", e);
        }
    });

    Ok((handle, actual_addr))
}
