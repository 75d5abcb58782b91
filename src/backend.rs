//! Backend API client: thread registry and token metering endpoints.
//!
//! - `GET  /chat_threads` (Authorization: user token) -> `{threads: [id...]}`
//! - `POST /chat_threads` `{thread_id, fingerprint}`
//! - `POST /tokens` `{fingerprint, utoken}` -> `{tokens: n}`
//! - `POST /tokens/decrease` `{utoken, decrement_by}`

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::retry::{RetryPolicy, Retryable};
use crate::traits::{Headers, HttpClient, HttpError, Response};

/// Error type for backend client operations
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Retryable for BackendError {
    fn is_retryable(&self) -> bool {
        match self {
            BackendError::Http(e) => e.is_retryable(),
            BackendError::ServerError { status, .. } => *status >= 500 || *status == 429,
            BackendError::Json(_) => false,
        }
    }
}

/// Response from `GET /chat_threads`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadListResponse {
    #[serde(default)]
    pub threads: Vec<String>,
}

#[derive(Debug, Serialize)]
struct RegisterThreadRequest<'a> {
    thread_id: &'a str,
    fingerprint: &'a str,
}

#[derive(Debug, Serialize)]
struct TokensRequest<'a> {
    fingerprint: &'a str,
    utoken: &'a str,
}

/// Response from `POST /tokens`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokensResponse {
    pub tokens: i64,
}

#[derive(Debug, Serialize)]
struct DecreaseTokensRequest<'a> {
    utoken: &'a str,
    decrement_by: u64,
}

/// Client for the thread registry and token endpoints.
pub struct BackendClient {
    pub base_url: String,
    http: Arc<dyn HttpClient>,
    retry: RetryPolicy,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>, http: Arc<dyn HttpClient>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
            retry: RetryPolicy::default(),
        }
    }

    /// Override the retry policy used for registration and decrement.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn headers(user_token: Option<&str>) -> Headers {
        let mut headers = Headers::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        if let Some(token) = user_token {
            headers.insert("Authorization".to_string(), token.to_string());
        }
        headers
    }

    fn check(response: Response) -> Result<Response, BackendError> {
        if response.is_success() {
            Ok(response)
        } else {
            Err(BackendError::ServerError {
                status: response.status,
                message: response.text_lossy(),
            })
        }
    }

    /// Fetch the authoritative list of thread ids for a user.
    ///
    /// GET /chat_threads
    pub async fn list_threads(&self, user_token: &str) -> Result<Vec<String>, BackendError> {
        let url = format!("{}/chat_threads", self.base_url);
        let response = self.http.get(&url, &Self::headers(Some(user_token))).await?;
        let list: ThreadListResponse = Self::check(response)?.json()?;
        Ok(list.threads)
    }

    /// Register a thread id for this user and device.
    ///
    /// POST /chat_threads
    pub async fn register_thread(
        &self,
        user_token: &str,
        thread_id: &str,
        fingerprint: &str,
    ) -> Result<(), BackendError> {
        let url = format!("{}/chat_threads", self.base_url);
        let body = serde_json::to_string(&RegisterThreadRequest {
            thread_id,
            fingerprint,
        })?;
        let headers = Self::headers(Some(user_token));

        self.retry
            .run("register_thread", || async {
                let response = self.http.post(&url, &body, &headers).await?;
                Self::check(response).map(|_| ())
            })
            .await
    }

    /// Ask the backend how many tokens this user has left.
    ///
    /// POST /tokens
    pub async fn fetch_tokens(&self, fingerprint: &str, user_token: &str) -> Result<i64, BackendError> {
        let url = format!("{}/tokens", self.base_url);
        let body = serde_json::to_string(&TokensRequest {
            fingerprint,
            utoken: user_token,
        })?;
        let response = self.http.post(&url, &body, &Self::headers(None)).await?;
        let tokens: TokensResponse = Self::check(response)?.json()?;
        Ok(tokens.tokens)
    }

    /// Deduct consumed tokens from the user's quota.
    ///
    /// POST /tokens/decrease
    pub async fn decrease_tokens(&self, user_token: &str, decrement_by: u64) -> Result<(), BackendError> {
        let url = format!("{}/tokens/decrease", self.base_url);
        let body = serde_json::to_string(&DecreaseTokensRequest {
            utoken: user_token,
            decrement_by,
        })?;
        let headers = Self::headers(None);

        self.retry
            .run("decrease_tokens", || async {
                let response = self.http.post(&url, &body, &headers).await?;
                Self::check(response).map(|_| ())
            })
            .await
    }
}
