//! Token meter: remote quota gate in front of every send.
//!
//! The backend is the only authority on quota. The client asks before each
//! send and reports completion-token usage after each run; the last answer
//! is kept only for display.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use crate::backend::{BackendClient, BackendError};
use crate::fingerprint::Fingerprinter;

/// Shown in place of a reply when the user has no tokens left
pub const UPSELL_MESSAGE: &str = "You've used all of your free messages. \
Upgrade your plan to keep chatting with the assistant.";

const UNKNOWN: i64 = i64::MIN;

/// Outcome of a quota check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaDecision {
    Allowed { remaining: i64 },
    Exhausted,
}

#[derive(Debug, thiserror::Error)]
pub enum MeterError {
    #[error("Could not check your remaining tokens: {0}")]
    Check(#[source] BackendError),
    #[error("Could not record token usage: {0}")]
    Record(#[source] BackendError),
}

pub struct TokenMeter {
    backend: Arc<BackendClient>,
    fingerprinter: Arc<Fingerprinter>,
    last_known: AtomicI64,
}

impl TokenMeter {
    pub fn new(backend: Arc<BackendClient>, fingerprinter: Arc<Fingerprinter>) -> Self {
        Self {
            backend,
            fingerprinter,
            last_known: AtomicI64::new(UNKNOWN),
        }
    }

    /// Ask the backend whether this user may send another message.
    pub async fn check(&self, user_token: &str) -> Result<QuotaDecision, MeterError> {
        let fingerprint = self.fingerprinter.fingerprint();
        let tokens = self
            .backend
            .fetch_tokens(fingerprint, user_token)
            .await
            .map_err(MeterError::Check)?;
        self.last_known.store(tokens, Ordering::Relaxed);

        if tokens > 0 {
            Ok(QuotaDecision::Allowed { remaining: tokens })
        } else {
            tracing::info!("Quota exhausted ({} tokens)", tokens);
            Ok(QuotaDecision::Exhausted)
        }
    }

    /// Deduct a completed run's completion tokens. Zero usage is not sent.
    pub async fn record_usage(&self, user_token: &str, completion_tokens: u64) -> Result<(), MeterError> {
        if completion_tokens == 0 {
            return Ok(());
        }
        self.backend
            .decrease_tokens(user_token, completion_tokens)
            .await
            .map_err(MeterError::Record)?;

        let used = i64::try_from(completion_tokens).unwrap_or(i64::MAX);
        let lowered = self
            .last_known
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
                (current != UNKNOWN).then(|| current.saturating_sub(used).max(0))
            });
        if let Err(UNKNOWN) = lowered {
            // Nothing to lower until a check has reported a quota
            tracing::debug!("No known quota to lower");
        }
        tracing::debug!("Recorded {} completion tokens", completion_tokens);
        Ok(())
    }

    /// Most recent quota seen, for display
    pub fn last_known(&self) -> Option<i64> {
        match self.last_known.load(Ordering::Relaxed) {
            UNKNOWN => None,
            tokens => Some(tokens),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{MockHttpClient, MockResponse};
    use crate::cache::LocalCache;
    use crate::retry::RetryPolicy;

    fn meter(mock: &MockHttpClient) -> TokenMeter {
        let backend = BackendClient::new("https://backend.test", Arc::new(mock.clone()))
            .with_retry(RetryPolicy::none());
        TokenMeter::new(
            Arc::new(backend),
            Arc::new(Fingerprinter::new(LocalCache::in_memory())),
        )
    }

    #[tokio::test]
    async fn test_positive_quota_allows() {
        let mock = MockHttpClient::new();
        mock.set_response(
            "https://backend.test/tokens",
            MockResponse::json(200, serde_json::json!({"tokens": 5})),
        );
        let meter = meter(&mock);

        assert_eq!(
            meter.check("u").await.unwrap(),
            QuotaDecision::Allowed { remaining: 5 }
        );
        assert_eq!(meter.last_known(), Some(5));
    }

    #[tokio::test]
    async fn test_zero_quota_is_exhausted() {
        let mock = MockHttpClient::new();
        mock.set_response(
            "https://backend.test/tokens",
            MockResponse::json(200, serde_json::json!({"tokens": 0})),
        );
        assert_eq!(meter(&mock).check("u").await.unwrap(), QuotaDecision::Exhausted);
    }

    #[tokio::test]
    async fn test_check_failure_is_error() {
        let mock = MockHttpClient::new();
        mock.set_response(
            "https://backend.test/tokens",
            MockResponse::json(502, serde_json::json!({})),
        );
        let meter = meter(&mock);

        assert!(matches!(meter.check("u").await, Err(MeterError::Check(_))));
        assert_eq!(meter.last_known(), None);
    }

    #[tokio::test]
    async fn test_zero_usage_is_not_sent() {
        let mock = MockHttpClient::new();
        meter(&mock).record_usage("u", 0).await.unwrap();
        assert!(mock.get_requests().is_empty());
    }

    #[tokio::test]
    async fn test_usage_without_known_quota_keeps_it_unknown() {
        let mock = MockHttpClient::new();
        mock.set_response(
            "https://backend.test/tokens/decrease",
            MockResponse::json(200, serde_json::json!({})),
        );
        let meter = meter(&mock);

        meter.record_usage("u", 30).await.unwrap();

        assert_eq!(meter.last_known(), None);
        assert_eq!(mock.get_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_usage_lowers_display_quota() {
        let mock = MockHttpClient::new();
        mock.set_response(
            "https://backend.test/tokens/decrease",
            MockResponse::json(200, serde_json::json!({})),
        );
        mock.set_response(
            "https://backend.test/tokens",
            MockResponse::json(200, serde_json::json!({"tokens": 100})),
        );
        let meter = meter(&mock);
        meter.check("u").await.unwrap();

        meter.record_usage("u", 30).await.unwrap();

        assert_eq!(meter.last_known(), Some(70));
        let decrease = mock.requests_matching("POST", "https://backend.test/tokens/decrease");
        assert_eq!(
            decrease[0].json_body().unwrap(),
            serde_json::json!({"utoken": "u", "decrement_by": 30})
        );
    }
}
