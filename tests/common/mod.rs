//! Common test utilities for integration tests.
//!
//! Every remote collaborator is served by one wiremock server: the assistant
//! API under `/v1`, the thread registry and token endpoints under `/backend`.
//!
//! ```ignore
//! let harness = Harness::start().await;
//! let mut view = harness.view(Some(USER_TOKEN));
//! ```

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use assistant_chat::adapters::ReqwestHttpClient;
use assistant_chat::backend::BackendClient;
use assistant_chat::cache::LocalCache;
use assistant_chat::fingerprint::Fingerprinter;
use assistant_chat::functions::NoFunctionHandler;
use assistant_chat::meter::TokenMeter;
use assistant_chat::provider::{AssistantProvider, AssistantsApiClient};
use assistant_chat::retry::RetryPolicy;
use assistant_chat::run::RunDriver;
use assistant_chat::sync::ThreadSynchronizer;
use assistant_chat::traits::HttpClient;
use assistant_chat::view::{ChatServices, ChatView};
use wiremock::MockServer;

pub const USER_TOKEN: &str = "user-token-1";
pub const ASSISTANT_ID: &str = "asst_test";

/// A mock server plus the services wired against it.
pub struct Harness {
    pub server: MockServer,
    pub cache: LocalCache,
    pub services: Arc<ChatServices>,
}

impl Harness {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let cache = LocalCache::in_memory();
        let services = Arc::new(services_for(&server, cache.clone()));
        Self {
            server,
            cache,
            services,
        }
    }

    pub fn view(&self, user_token: Option<&str>) -> ChatView {
        ChatView::new(
            self.services.clone(),
            user_token.map(str::to_string),
            true,
        )
    }

    pub fn api_path(&self, rest: &str) -> String {
        format!("/v1{}", rest)
    }

    pub fn backend_path(&self, rest: &str) -> String {
        format!("/backend{}", rest)
    }
}

pub fn provider_for(server: &MockServer) -> Arc<dyn AssistantProvider> {
    let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());
    Arc::new(
        AssistantsApiClient::new(format!("{}/v1", server.uri()), ASSISTANT_ID, http)
            .with_api_key("sk-test"),
    )
}

pub fn services_for(server: &MockServer, cache: LocalCache) -> ChatServices {
    let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());
    let provider = provider_for(server);
    let backend = Arc::new(
        BackendClient::new(format!("{}/backend", server.uri()), http).with_retry(RetryPolicy {
            max_attempts: 2,
            base_delay: Duration::ZERO,
        }),
    );
    let fingerprinter = Arc::new(Fingerprinter::new(cache.clone()));
    let sync = ThreadSynchronizer::new(backend.clone(), cache.clone(), fingerprinter.clone());
    let meter = Arc::new(TokenMeter::new(backend, fingerprinter));
    let driver = Arc::new(RunDriver::new(provider.clone(), Arc::new(NoFunctionHandler)));

    ChatServices {
        cache,
        provider,
        sync,
        meter,
        driver,
    }
}

/// One SSE frame
pub fn frame(event: &str, data: serde_json::Value) -> String {
    format!("event: {}\ndata: {}\n\n", event, data)
}

/// A run that streams `parts` as one text message and completes.
pub fn text_run(parts: &[&str], completion_tokens: u64) -> String {
    let mut body = frame(
        "thread.message.created",
        serde_json::json!({"id": "msg_1", "object": "thread.message"}),
    );
    for part in parts {
        body.push_str(&frame(
            "thread.message.delta",
            serde_json::json!({"id": "msg_1", "delta": {"content": [
                {"index": 0, "type": "text", "text": {"value": part}}
            ]}}),
        ));
    }
    body.push_str(&frame(
        "thread.run.completed",
        serde_json::json!({"id": "run_1", "status": "completed",
            "usage": {"prompt_tokens": 5, "completion_tokens": completion_tokens,
                      "total_tokens": 5 + completion_tokens}}),
    ));
    body.push_str("event: done\ndata: [DONE]\n\n");
    body
}
