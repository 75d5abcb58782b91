//! Function-call handlers for `requires_action` batches.
//!
//! A handler turns one tool call into the output string submitted back to
//! the provider. Handlers never fail: an error becomes a JSON error output so
//! the run can still be resumed and the assistant can explain the failure.

use async_trait::async_trait;
use std::sync::Arc;

use crate::traits::{Headers, HttpClient};

#[async_trait]
pub trait FunctionHandler: Send + Sync {
    /// Execute `name` with the raw JSON `arguments` and return its output.
    async fn call(&self, name: &str, arguments: &str) -> String;
}

fn error_output(message: impl std::fmt::Display) -> String {
    serde_json::json!({ "error": message.to_string() }).to_string()
}

/// Forwards calls to an HTTP endpoint as `POST {name, arguments}`.
pub struct HttpFunctionHandler {
    url: String,
    http: Arc<dyn HttpClient>,
}

impl HttpFunctionHandler {
    pub fn new(url: impl Into<String>, http: Arc<dyn HttpClient>) -> Self {
        Self {
            url: url.into(),
            http,
        }
    }
}

#[async_trait]
impl FunctionHandler for HttpFunctionHandler {
    async fn call(&self, name: &str, arguments: &str) -> String {
        // Arguments arrive as a JSON string; pass them through structured
        // when they parse, verbatim otherwise.
        let arguments = serde_json::from_str::<serde_json::Value>(arguments)
            .unwrap_or_else(|_| serde_json::Value::String(arguments.to_string()));
        let body = serde_json::json!({ "name": name, "arguments": arguments }).to_string();

        let mut headers = Headers::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());

        match self.http.post(&self.url, &body, &headers).await {
            Ok(response) if response.is_success() => response.text_lossy(),
            Ok(response) => {
                tracing::warn!(
                    "Function {} returned status {}",
                    name,
                    response.status
                );
                error_output(format!(
                    "function {} failed with status {}",
                    name, response.status
                ))
            }
            Err(e) => {
                tracing::warn!("Function {} call failed: {}", name, e);
                error_output(e)
            }
        }
    }
}

/// Used when no function endpoint is configured.
#[derive(Debug, Default, Clone)]
pub struct NoFunctionHandler;

#[async_trait]
impl FunctionHandler for NoFunctionHandler {
    async fn call(&self, name: &str, _arguments: &str) -> String {
        tracing::warn!("No function handler configured for {}", name);
        error_output(format!("no handler configured for function {}", name))
    }
}
