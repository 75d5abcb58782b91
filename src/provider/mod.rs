//! Assistant provider: the hosted conversation/run API.
//!
//! [`AssistantProvider`] is the seam between the chat flow and the hosted
//! API. Run-producing calls return the raw SSE body so the proxy server can
//! forward it untouched; the chat flow decodes it with
//! [`crate::sse::decode_events`].

mod client;
mod history;

pub use client::{AssistantsApiClient, DEFAULT_API_URL};
pub use history::messages_from_list;

use async_trait::async_trait;

use crate::sse::ToolOutput;
use crate::traits::{ByteStream, HttpError, Response};

/// Error type for assistant provider operations
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(HttpError),
    #[error("Provider error ({status}): {message}")]
    ServerError { status: u16, message: String },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl From<HttpError> for ProviderError {
    fn from(e: HttpError) -> Self {
        match e {
            HttpError::ServerError { status, message } => {
                ProviderError::ServerError { status, message }
            }
            other => ProviderError::Http(other),
        }
    }
}

#[async_trait]
pub trait AssistantProvider: Send + Sync {
    /// Create an empty thread and return its provider-issued id.
    async fn create_thread(&self) -> Result<String, ProviderError>;

    /// The thread's message list as returned by the provider.
    async fn list_messages(&self, thread_id: &str) -> Result<serde_json::Value, ProviderError>;

    /// Post a user message and start a streaming run.
    async fn stream_user_message(
        &self,
        thread_id: &str,
        content: &str,
    ) -> Result<ByteStream, ProviderError>;

    /// Submit tool outputs for a paused run and resume streaming.
    async fn stream_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: &[ToolOutput],
    ) -> Result<ByteStream, ProviderError>;

    /// Raw content of a provider-hosted file.
    async fn file_content(&self, file_id: &str) -> Result<Response, ProviderError>;
}
