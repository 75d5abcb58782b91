//! Thread synchronizer: keeps the backend registry aware of local threads.
//!
//! Three sources hold thread ids: the view, the local cache's known-id set,
//! and the backend registry. [`ThreadSynchronizer::ensure_registered`] makes
//! sure the registry learns about each thread exactly once, checking the
//! cheap sources first. Synchronization is best effort: failures are logged
//! and reported as [`SyncOutcome::Failed`], never raised into the chat flow.

use std::sync::Arc;

use crate::backend::{BackendClient, BackendError};
use crate::cache::{CacheError, LocalCache};
use crate::fingerprint::Fingerprinter;

/// Result of one synchronization attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The local known-id set already had the id; no network traffic
    AlreadyKnownLocally,
    /// The registry already listed the id; the local set was refreshed
    AlreadyKnownRemotely,
    /// The id was registered with the backend
    Registered,
    /// Something failed; the reason was logged
    Failed(String),
}

#[derive(Debug, thiserror::Error)]
enum SyncError {
    #[error("backend: {0}")]
    Backend(#[from] BackendError),
    #[error("cache: {0}")]
    Cache(#[from] CacheError),
}

#[derive(Clone)]
pub struct ThreadSynchronizer {
    backend: Arc<BackendClient>,
    cache: LocalCache,
    fingerprinter: Arc<Fingerprinter>,
}

impl ThreadSynchronizer {
    pub fn new(
        backend: Arc<BackendClient>,
        cache: LocalCache,
        fingerprinter: Arc<Fingerprinter>,
    ) -> Self {
        Self {
            backend,
            cache,
            fingerprinter,
        }
    }

    /// Make sure the registry knows `thread_id` for this user.
    pub async fn ensure_registered(&self, thread_id: &str, user_token: &str) -> SyncOutcome {
        match self.try_ensure_registered(thread_id, user_token).await {
            Ok(outcome) => {
                tracing::debug!("Thread {} sync: {:?}", thread_id, outcome);
                outcome
            }
            Err(e) => {
                tracing::warn!("Failed to sync thread {}: {}", thread_id, e);
                SyncOutcome::Failed(e.to_string())
            }
        }
    }

    async fn try_ensure_registered(
        &self,
        thread_id: &str,
        user_token: &str,
    ) -> Result<SyncOutcome, SyncError> {
        // An unreadable cache is treated as empty; the registry is authoritative
        let known = self.cache.known_thread_ids().unwrap_or_else(|e| {
            tracing::warn!("Could not read known thread ids: {}", e);
            Vec::new()
        });
        if known.iter().any(|id| id == thread_id) {
            return Ok(SyncOutcome::AlreadyKnownLocally);
        }

        let remote = self.remote_thread_ids(user_token).await?;
        if remote.iter().any(|id| id == thread_id) {
            return Ok(SyncOutcome::AlreadyKnownRemotely);
        }

        let fingerprint = self.fingerprinter.fingerprint();
        self.backend
            .register_thread(user_token, thread_id, fingerprint)
            .await?;
        self.cache.add_known_thread_id(thread_id)?;
        tracing::info!("Registered thread {}", thread_id);
        Ok(SyncOutcome::Registered)
    }

    /// Fetch the registry's id list and make it the local known-id set.
    pub async fn remote_thread_ids(&self, user_token: &str) -> Result<Vec<String>, BackendError> {
        let ids = self.backend.list_threads(user_token).await?;
        if let Err(e) = self.cache.set_known_thread_ids(&ids) {
            tracing::warn!("Could not cache thread ids: {}", e);
        }
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{MockHttpClient, MockResponse};
    use crate::retry::RetryPolicy;

    const THREADS_URL: &str = "https://backend.test/chat_threads";

    fn synchronizer(mock: &MockHttpClient, cache: &LocalCache) -> ThreadSynchronizer {
        let backend = BackendClient::new("https://backend.test", Arc::new(mock.clone()))
            .with_retry(RetryPolicy::none());
        ThreadSynchronizer::new(
            Arc::new(backend),
            cache.clone(),
            Arc::new(Fingerprinter::new(cache.clone())),
        )
    }

    #[tokio::test]
    async fn test_locally_known_id_skips_network() {
        let mock = MockHttpClient::new();
        let cache = LocalCache::in_memory();
        cache
            .set_known_thread_ids(&["a".to_string(), "b".to_string()])
            .unwrap();

        let outcome = synchronizer(&mock, &cache).ensure_registered("a", "u").await;

        assert_eq!(outcome, SyncOutcome::AlreadyKnownLocally);
        assert!(mock.get_requests().is_empty());
    }

    #[tokio::test]
    async fn test_remotely_known_id_is_cached_without_post() {
        let mock = MockHttpClient::new();
        mock.set_method_response(
            "GET",
            THREADS_URL,
            MockResponse::json(200, serde_json::json!({"threads": ["a", "b", "c"]})),
        );
        let cache = LocalCache::in_memory();
        cache
            .set_known_thread_ids(&["a".to_string(), "b".to_string()])
            .unwrap();

        let outcome = synchronizer(&mock, &cache).ensure_registered("c", "u").await;

        assert_eq!(outcome, SyncOutcome::AlreadyKnownRemotely);
        assert!(mock.requests_matching("POST", THREADS_URL).is_empty());
        assert!(cache.known_thread_ids().unwrap().contains(&"c".to_string()));
    }

    #[tokio::test]
    async fn test_unknown_id_is_registered_with_fingerprint() {
        let mock = MockHttpClient::new();
        mock.set_method_response(
            "GET",
            THREADS_URL,
            MockResponse::json(200, serde_json::json!({"threads": ["a"]})),
        );
        mock.set_method_response(
            "POST",
            THREADS_URL,
            MockResponse::json(200, serde_json::json!({"ok": true})),
        );
        let cache = LocalCache::in_memory();
        let sync = synchronizer(&mock, &cache);

        let outcome = sync.ensure_registered("new", "u").await;

        assert_eq!(outcome, SyncOutcome::Registered);
        let posts = mock.requests_matching("POST", THREADS_URL);
        assert_eq!(posts.len(), 1);
        let body = posts[0].json_body().unwrap();
        assert_eq!(body["thread_id"], "new");
        assert_eq!(body["fingerprint"].as_str().unwrap().len(), 64);
        assert_eq!(cache.known_thread_ids().unwrap(), vec!["a", "new"]);

        // second call is answered locally
        mock.clear_requests();
        assert_eq!(
            sync.ensure_registered("new", "u").await,
            SyncOutcome::AlreadyKnownLocally
        );
        assert!(mock.get_requests().is_empty());
    }

    #[tokio::test]
    async fn test_registry_failure_is_swallowed() {
        let mock = MockHttpClient::new();
        mock.set_method_response(
            "GET",
            THREADS_URL,
            MockResponse::json(500, serde_json::json!({"error": "down"})),
        );
        let cache = LocalCache::in_memory();

        let outcome = synchronizer(&mock, &cache).ensure_registered("x", "u").await;

        assert!(matches!(outcome, SyncOutcome::Failed(_)));
        assert!(cache.known_thread_ids().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_registration_failure_leaves_id_unknown() {
        let mock = MockHttpClient::new();
        mock.set_method_response(
            "GET",
            THREADS_URL,
            MockResponse::json(200, serde_json::json!({"threads": []})),
        );
        mock.set_method_response(
            "POST",
            THREADS_URL,
            MockResponse::json(400, serde_json::json!({"error": "bad"})),
        );
        let cache = LocalCache::in_memory();

        let outcome = synchronizer(&mock, &cache).ensure_registered("x", "u").await;

        assert!(matches!(outcome, SyncOutcome::Failed(_)));
        assert!(cache.known_thread_ids().unwrap().is_empty());
    }
}
