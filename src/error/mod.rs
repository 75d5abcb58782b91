//! Unified error type for the chat client.
//!
//! Each component keeps its own error enum (`ProviderError`, `BackendError`,
//! `CacheError`, `MeterError`, `ConfigError`). [`ChatError`] wraps them where
//! errors cross into the view, which only needs a category and a message a
//! person can act on.
//!
//! | Category | Retryable |
//! |---|---|
//! | Network | Yes |
//! | Server | Yes |
//! | Protocol | No |
//! | Storage | No |
//! | Configuration | No |

mod category;

pub use category::ErrorCategory;

use crate::backend::BackendError;
use crate::cache::CacheError;
use crate::config::ConfigError;
use crate::logging::LoggingError;
use crate::meter::MeterError;
use crate::provider::ProviderError;
use crate::traits::HttpError;

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Meter(#[from] MeterError),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Logging(#[from] LoggingError),
}

pub type ChatResult<T> = Result<T, ChatError>;

fn http_category(e: &HttpError) -> ErrorCategory {
    match e {
        HttpError::ServerError { .. } => ErrorCategory::Server,
        HttpError::InvalidUrl(_) => ErrorCategory::Configuration,
        HttpError::Other(_) => ErrorCategory::Protocol,
        HttpError::ConnectionFailed(_) | HttpError::Timeout(_) | HttpError::Io(_) => {
            ErrorCategory::Network
        }
    }
}

fn backend_category(e: &BackendError) -> ErrorCategory {
    match e {
        BackendError::Http(e) => http_category(e),
        BackendError::ServerError { .. } => ErrorCategory::Server,
        BackendError::Json(_) => ErrorCategory::Protocol,
    }
}

impl ChatError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ChatError::Provider(e) => match e {
                ProviderError::Http(e) => http_category(e),
                ProviderError::ServerError { .. } => ErrorCategory::Server,
                ProviderError::Json(_) | ProviderError::UnexpectedResponse(_) => {
                    ErrorCategory::Protocol
                }
            },
            ChatError::Backend(e) => backend_category(e),
            ChatError::Meter(MeterError::Check(e) | MeterError::Record(e)) => backend_category(e),
            ChatError::Cache(_) | ChatError::Logging(_) => ErrorCategory::Storage,
            ChatError::Config(_) => ErrorCategory::Configuration,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }

    /// One-line message for an alert or the status line.
    pub fn user_message(&self) -> String {
        format!("{}. {}.", self, self.category().recovery_hint())
    }
}
