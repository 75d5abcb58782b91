//! Recording HTTP double.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::traits::{ByteStream, Headers, HttpClient, HttpError, Response};

/// A recorded HTTP request for verification in tests.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP method (GET or POST)
    pub method: String,
    /// Request URL
    pub url: String,
    /// Request headers
    pub headers: Headers,
    /// Request body (for POST requests)
    pub body: Option<String>,
}

impl RecordedRequest {
    /// Parse the recorded body as JSON.
    pub fn json_body(&self) -> Option<serde_json::Value> {
        self.body
            .as_deref()
            .and_then(|body| serde_json::from_str(body).ok())
    }
}

/// Configuration for a mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return a successful response
    Success(Response),
    /// Return an error
    Error(HttpError),
    /// Return a stream of bytes
    Stream(Vec<Bytes>),
}

impl MockResponse {
    /// Shorthand for a JSON response with the given status.
    pub fn json(status: u16, value: serde_json::Value) -> Self {
        MockResponse::Success(Response::json_body(status, &value))
    }

    /// Shorthand for an SSE body split into the given chunks.
    pub fn sse<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MockResponse::Stream(
            chunks
                .into_iter()
                .map(|chunk| Bytes::from(chunk.into()))
                .collect(),
        )
    }
}

/// Scripted transport for unit and integration tests.
///
/// A response is looked up by `METHOD url`, then by `url`, then by the
/// longest configured URL prefix (so a route can ignore query strings).
/// Every request is recorded, including ones that found no response.
///
/// ```ignore
/// let mock = MockHttpClient::new();
/// mock.set_response(
///     "https://backend.test/chat_threads",
///     MockResponse::json(200, serde_json::json!({"threads": ["t1"]})),
/// );
/// let ids = BackendClient::new("https://backend.test", Arc::new(mock.clone()))
///     .list_threads("user")
///     .await?;
/// assert_eq!(mock.get_requests().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockHttpClient {
    state: Arc<Mutex<MockState>>,
}

#[derive(Debug, Default)]
struct MockState {
    routes: HashMap<String, MockResponse>,
    requests: Vec<RecordedRequest>,
}

impl MockState {
    fn lookup(&self, method: &str, url: &str) -> Option<MockResponse> {
        let exact = self
            .routes
            .get(&format!("{} {}", method, url))
            .or_else(|| self.routes.get(url));
        if let Some(response) = exact {
            return Some(response.clone());
        }

        let method_prefix = format!("{} ", method);
        self.routes
            .iter()
            .filter_map(|(key, response)| {
                let pattern = match key.strip_prefix(&method_prefix) {
                    Some(rest) => rest,
                    None if key.contains(' ') => return None,
                    None => key.as_str(),
                };
                url.starts_with(pattern).then_some((pattern.len(), response))
            })
            .max_by_key(|(len, _)| *len)
            .map(|(_, response)| response.clone())
    }
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        // A panicking test must not poison the mock for the rest of the suite
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Answer `url` (or any URL it prefixes) for every method.
    pub fn set_response(&self, url: &str, response: MockResponse) {
        self.state().routes.insert(url.to_string(), response);
    }

    /// Answer `url` for one method only; wins over [`Self::set_response`].
    pub fn set_method_response(&self, method: &str, url: &str, response: MockResponse) {
        self.state()
            .routes
            .insert(format!("{} {}", method, url), response);
    }

    pub fn get_requests(&self) -> Vec<RecordedRequest> {
        self.state().requests.clone()
    }

    /// Recorded requests for one method whose URL starts with `prefix`.
    pub fn requests_matching(&self, method: &str, prefix: &str) -> Vec<RecordedRequest> {
        self.state()
            .requests
            .iter()
            .filter(|r| r.method == method && r.url.starts_with(prefix))
            .cloned()
            .collect()
    }

    pub fn clear_requests(&self) {
        self.state().requests.clear();
    }

    /// Record the request and return whatever is scripted for it.
    fn exchange(
        &self,
        method: &str,
        url: &str,
        headers: &Headers,
        body: Option<&str>,
    ) -> Result<MockResponse, HttpError> {
        let mut state = self.state();
        state.requests.push(RecordedRequest {
            method: method.to_string(),
            url: url.to_string(),
            headers: headers.clone(),
            body: body.map(str::to_string),
        });
        state
            .lookup(method, url)
            .ok_or_else(|| HttpError::Other(format!("No mock response for {} {}", method, url)))
    }

    fn buffered(scripted: MockResponse) -> Result<Response, HttpError> {
        match scripted {
            MockResponse::Success(response) => Ok(response),
            MockResponse::Error(err) => Err(err),
            MockResponse::Stream(chunks) => Ok(Response::new(200, chunks.concat())),
        }
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn get(&self, url: &str, headers: &Headers) -> Result<Response, HttpError> {
        Self::buffered(self.exchange("GET", url, headers, None)?)
    }

    async fn post(&self, url: &str, body: &str, headers: &Headers) -> Result<Response, HttpError> {
        Self::buffered(self.exchange("POST", url, headers, Some(body))?)
    }

    async fn post_stream(
        &self,
        url: &str,
        body: &str,
        headers: &Headers,
    ) -> Result<ByteStream, HttpError> {
        let chunks = match self.exchange("POST", url, headers, Some(body))? {
            MockResponse::Stream(chunks) => chunks,
            MockResponse::Success(response) if response.is_success() => vec![response.body],
            MockResponse::Success(response) => {
                return Err(HttpError::ServerError {
                    status: response.status,
                    message: response.text_lossy(),
                })
            }
            MockResponse::Error(err) => return Err(err),
        };
        Ok(Box::pin(futures::stream::iter(chunks.into_iter().map(Ok))))
    }
}
