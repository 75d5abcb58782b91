//! `HttpClient` over reqwest.

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Method, RequestBuilder};
use std::time::Duration;

use crate::traits::{ByteStream, Headers, HttpClient, HttpError, Response};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Production transport for the provider, backend and function handler.
///
/// There is no overall request timeout: a run stream stays open for as long
/// as the assistant keeps producing output.
///
/// ```ignore
/// use assistant_chat::adapters::ReqwestHttpClient;
/// use assistant_chat::traits::{Headers, HttpClient};
///
/// let http = ReqwestHttpClient::new();
/// let response = http.get("http://localhost:8000/chat_threads", &Headers::new()).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(concat!("assistant-chat/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Falling back to default HTTP client: {}", e);
                reqwest::Client::new()
            });
        Self { client }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn request(&self, method: Method, url: &str, body: Option<&str>, headers: &Headers) -> RequestBuilder {
        let mut builder = self.client.request(method, url);
        for (name, value) in headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        match body {
            Some(body) => builder.body(body.to_string()),
            None => builder,
        }
    }

    async fn send(builder: RequestBuilder) -> Result<reqwest::Response, HttpError> {
        builder.send().await.map_err(classify)
    }

    async fn buffered(response: reqwest::Response) -> Result<Response, HttpError> {
        let status = response.status().as_u16();
        let headers: Headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| Some((name.to_string(), value.to_str().ok()?.to_string())))
            .collect();
        let body = response.bytes().await.map_err(classify)?;
        Ok(Response::with_headers(status, headers, body))
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a reqwest failure onto the transport error kinds the retry policy
/// understands.
fn classify(err: reqwest::Error) -> HttpError {
    if err.is_timeout() {
        HttpError::Timeout(err.to_string())
    } else if err.is_connect() {
        HttpError::ConnectionFailed(err.to_string())
    } else if err.is_builder() {
        HttpError::InvalidUrl(err.to_string())
    } else if err.is_body() || err.is_decode() {
        HttpError::Io(err.to_string())
    } else {
        HttpError::Other(err.to_string())
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str, headers: &Headers) -> Result<Response, HttpError> {
        let response = Self::send(self.request(Method::GET, url, None, headers)).await?;
        Self::buffered(response).await
    }

    async fn post(&self, url: &str, body: &str, headers: &Headers) -> Result<Response, HttpError> {
        let response = Self::send(self.request(Method::POST, url, Some(body), headers)).await?;
        Self::buffered(response).await
    }

    async fn post_stream(
        &self,
        url: &str,
        body: &str,
        headers: &Headers,
    ) -> Result<ByteStream, HttpError> {
        let response = Self::send(self.request(Method::POST, url, Some(body), headers)).await?;

        // A run that fails to start answers with a JSON error, not a stream
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(HttpError::ServerError {
                status: status.as_u16(),
                message,
            });
        }

        Ok(Box::pin(response.bytes_stream().map(|chunk| chunk.map_err(classify))))
    }
}
