//! Route handlers for the proxy server.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::ServerState;
use crate::provider::ProviderError;
use crate::sse::ToolOutput;
use crate::traits::ByteStream;

/// Error body returned with status 500
#[derive(Debug, Serialize)]
pub struct ApiError {
    error: &'static str,
    details: String,
}

impl ApiError {
    fn new(error: &'static str, cause: ProviderError) -> Self {
        tracing::warn!("{}: {}", error, cause);
        Self {
            error,
            details: cause.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, Json(self)).into_response()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedThread {
    thread_id: String,
}

#[derive(Debug, Deserialize)]
pub struct PostMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitActions {
    run_id: String,
    tool_call_outputs: Vec<ToolOutput>,
}

fn stream_response(bytes: ByteStream) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(bytes),
    )
        .into_response()
}

pub async fn create_thread(State(state): State<ServerState>) -> Result<Json<CreatedThread>, ApiError> {
    let thread_id = state
        .provider
        .create_thread()
        .await
        .map_err(|e| ApiError::new("Failed to create thread", e))?;
    Ok(Json(CreatedThread { thread_id }))
}

pub async fn post_message(
    State(state): State<ServerState>,
    Path(thread_id): Path<String>,
    Json(body): Json<PostMessage>,
) -> Result<Response, ApiError> {
    let bytes = state
        .provider
        .stream_user_message(&thread_id, &body.content)
        .await
        .map_err(|e| ApiError::new("Failed to send message", e))?;
    Ok(stream_response(bytes))
}

pub async fn list_messages(
    State(state): State<ServerState>,
    Path(thread_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let list = state
        .provider
        .list_messages(&thread_id)
        .await
        .map_err(|e| ApiError::new("Failed to fetch messages", e))?;
    Ok(Json(list))
}

pub async fn submit_actions(
    State(state): State<ServerState>,
    Path(thread_id): Path<String>,
    Json(body): Json<SubmitActions>,
) -> Result<Response, ApiError> {
    let bytes = state
        .provider
        .stream_tool_outputs(&thread_id, &body.run_id, &body.tool_call_outputs)
        .await
        .map_err(|e| ApiError::new("Failed to submit tool outputs", e))?;
    Ok(stream_response(bytes))
}

pub async fn file_content(
    State(state): State<ServerState>,
    Path(file_id): Path<String>,
) -> Result<Response, ApiError> {
    let file = state
        .provider
        .file_content(&file_id)
        .await
        .map_err(|e| ApiError::new("Failed to fetch file", e))?;
    let content_type = file
        .header("content-type")
        .unwrap_or("application/octet-stream")
        .to_string();
    Ok(([(header::CONTENT_TYPE, content_type)], file.body).into_response())
}
