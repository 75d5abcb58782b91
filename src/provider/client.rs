//! HTTP client for an Assistants-v2-compatible API.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use super::{AssistantProvider, ProviderError};
use crate::sse::ToolOutput;
use crate::traits::{ByteStream, Headers, HttpClient, Response};

/// Default URL for the assistant API
pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Deserialize)]
struct CreatedObject {
    id: String,
}

/// Client for the hosted assistant API.
///
/// # Example
///
/// ```ignore
/// let client = AssistantsApiClient::new(DEFAULT_API_URL, "asst_123", http)
///     .with_api_key(key);
/// let thread_id = client.create_thread().await?;
/// ```
pub struct AssistantsApiClient {
    pub base_url: String,
    assistant_id: String,
    api_key: Option<String>,
    http: Arc<dyn HttpClient>,
}

impl AssistantsApiClient {
    pub fn new(
        base_url: impl Into<String>,
        assistant_id: impl Into<String>,
        http: Arc<dyn HttpClient>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            assistant_id: assistant_id.into(),
            api_key: None,
            http,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn assistant_id(&self) -> &str {
        &self.assistant_id
    }

    fn headers(&self, streaming: bool) -> Headers {
        let mut headers = Headers::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("OpenAI-Beta".to_string(), "assistants=v2".to_string());
        if streaming {
            headers.insert("Accept".to_string(), "text/event-stream".to_string());
        }
        if let Some(ref key) = self.api_key {
            headers.insert("Authorization".to_string(), format!("Bearer {}", key));
        }
        headers
    }

    fn thread_url(&self, thread_id: &str, rest: &str) -> String {
        format!(
            "{}/threads/{}{}",
            self.base_url,
            urlencoding::encode(thread_id),
            rest
        )
    }

    fn check(response: Response) -> Result<Response, ProviderError> {
        if response.is_success() {
            Ok(response)
        } else {
            Err(ProviderError::ServerError {
                status: response.status,
                message: response.text_lossy(),
            })
        }
    }
}

#[async_trait]
impl AssistantProvider for AssistantsApiClient {
    /// POST /threads
    async fn create_thread(&self) -> Result<String, ProviderError> {
        let url = format!("{}/threads", self.base_url);
        let response = self.http.post(&url, "{}", &self.headers(false)).await?;
        let created: CreatedObject = Self::check(response)?.json()?;
        tracing::info!("Created thread {}", created.id);
        Ok(created.id)
    }

    /// GET /threads/{id}/messages, oldest first
    async fn list_messages(&self, thread_id: &str) -> Result<serde_json::Value, ProviderError> {
        let url = self.thread_url(thread_id, "/messages?order=asc&limit=100");
        let response = self.http.get(&url, &self.headers(false)).await?;
        Ok(Self::check(response)?.json()?)
    }

    /// POST /threads/{id}/messages, then POST /threads/{id}/runs with stream
    async fn stream_user_message(
        &self,
        thread_id: &str,
        content: &str,
    ) -> Result<ByteStream, ProviderError> {
        let message_url = self.thread_url(thread_id, "/messages");
        let body = serde_json::json!({ "role": "user", "content": content }).to_string();
        let response = self
            .http
            .post(&message_url, &body, &self.headers(false))
            .await?;
        Self::check(response)?;

        let run_url = self.thread_url(thread_id, "/runs");
        let body =
            serde_json::json!({ "assistant_id": self.assistant_id, "stream": true }).to_string();
        tracing::debug!("Starting run on thread {}", thread_id);
        Ok(self
            .http
            .post_stream(&run_url, &body, &self.headers(true))
            .await?)
    }

    /// POST /threads/{id}/runs/{run}/submit_tool_outputs with stream
    async fn stream_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: &[ToolOutput],
    ) -> Result<ByteStream, ProviderError> {
        let url = self.thread_url(
            thread_id,
            &format!("/runs/{}/submit_tool_outputs", urlencoding::encode(run_id)),
        );
        let body = serde_json::json!({ "tool_outputs": outputs, "stream": true }).to_string();
        tracing::debug!(
            "Submitting {} tool output(s) for run {}",
            outputs.len(),
            run_id
        );
        Ok(self.http.post_stream(&url, &body, &self.headers(true)).await?)
    }

    /// GET /files/{id}/content
    async fn file_content(&self, file_id: &str) -> Result<Response, ProviderError> {
        let url = format!(
            "{}/files/{}/content",
            self.base_url,
            urlencoding::encode(file_id)
        );
        let response = self.http.get(&url, &self.headers(false)).await?;
        Self::check(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{MockHttpClient, MockResponse};
    use futures_util::StreamExt;

    const BASE: &str = "https://provider.test/v1";

    fn client(mock: &MockHttpClient) -> AssistantsApiClient {
        AssistantsApiClient::new(BASE, "asst_1", Arc::new(mock.clone())).with_api_key("sk-test")
    }

    #[tokio::test]
    async fn test_create_thread() {
        let mock = MockHttpClient::new();
        mock.set_response(
            "https://provider.test/v1/threads",
            MockResponse::json(200, serde_json::json!({"id": "thread_abc", "object": "thread"})),
        );

        let id = client(&mock).create_thread().await.unwrap();

        assert_eq!(id, "thread_abc");
        let request = &mock.get_requests()[0];
        assert_eq!(
            request.headers.get("Authorization"),
            Some(&"Bearer sk-test".to_string())
        );
        assert_eq!(
            request.headers.get("OpenAI-Beta"),
            Some(&"assistants=v2".to_string())
        );
    }

    #[tokio::test]
    async fn test_create_thread_error_status() {
        let mock = MockHttpClient::new();
        mock.set_response(
            "https://provider.test/v1/threads",
            MockResponse::json(401, serde_json::json!({"error": {"message": "bad key"}})),
        );

        let result = client(&mock).create_thread().await;
        assert!(matches!(
            result,
            Err(ProviderError::ServerError { status: 401, .. })
        ));
    }

    #[tokio::test]
    async fn test_stream_user_message_posts_then_streams() {
        let mock = MockHttpClient::new();
        mock.set_response(
            "https://provider.test/v1/threads/t1/messages",
            MockResponse::json(200, serde_json::json!({"id": "msg_1"})),
        );
        mock.set_response(
            "https://provider.test/v1/threads/t1/runs",
            MockResponse::sse(["event: done\ndata: [DONE]\n\n"]),
        );

        let mut stream = client(&mock)
            .stream_user_message("t1", "hello")
            .await
            .unwrap();
        let chunk = stream.next().await.unwrap().unwrap();
        assert!(chunk.starts_with(b"event: done"));

        let requests = mock.get_requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(
            requests[0].json_body().unwrap(),
            serde_json::json!({"role": "user", "content": "hello"})
        );
        assert_eq!(
            requests[1].json_body().unwrap(),
            serde_json::json!({"assistant_id": "asst_1", "stream": true})
        );
    }

    #[tokio::test]
    async fn test_stream_user_message_stops_when_post_fails() {
        let mock = MockHttpClient::new();
        mock.set_response(
            "https://provider.test/v1/threads/t1/messages",
            MockResponse::json(404, serde_json::json!({"error": "no thread"})),
        );

        let result = client(&mock).stream_user_message("t1", "hello").await;

        assert!(matches!(
            result,
            Err(ProviderError::ServerError { status: 404, .. })
        ));
        assert_eq!(mock.get_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_stream_tool_outputs_body() {
        let mock = MockHttpClient::new();
        mock.set_response(
            "https://provider.test/v1/threads/t1/runs/run_1/submit_tool_outputs",
            MockResponse::sse(["event: done\ndata: [DONE]\n\n"]),
        );

        let outputs = vec![ToolOutput {
            output: "sunny".to_string(),
            tool_call_id: "call_1".to_string(),
        }];
        client(&mock)
            .stream_tool_outputs("t1", "run_1", &outputs)
            .await
            .unwrap();

        assert_eq!(
            mock.get_requests()[0].json_body().unwrap(),
            serde_json::json!({
                "tool_outputs": [{"output": "sunny", "tool_call_id": "call_1"}],
                "stream": true
            })
        );
    }

    #[tokio::test]
    async fn test_list_messages_requests_ascending_order() {
        let mock = MockHttpClient::new();
        mock.set_response(
            "https://provider.test/v1/threads/t1/messages",
            MockResponse::json(200, serde_json::json!({"data": []})),
        );

        let value = client(&mock).list_messages("t1").await.unwrap();

        assert_eq!(value, serde_json::json!({"data": []}));
        assert!(mock.get_requests()[0].url.contains("order=asc"));
    }
}
