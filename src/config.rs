//! Runtime configuration.
//!
//! Read from the environment once at startup; every field has a builder
//! setter so tests can construct a config without touching the process
//! environment.
//!
//! | Variable | Default |
//! |---|---|
//! | `ASSISTANT_API_URL` | `https://api.openai.com/v1` |
//! | `ASSISTANT_API_KEY` | none |
//! | `ASSISTANT_ID` | required |
//! | `CHAT_BACKEND_URL` | `http://localhost:8000` |
//! | `CHAT_FUNCTIONS_URL` | none (tool calls get an error output) |
//! | `CHAT_DATA_DIR` | `<data dir>/assistant-chat` |
//! | `CHAT_SERVER_ADDR` | `127.0.0.1:3000` |

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::provider::DEFAULT_API_URL;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const DEFAULT_SERVER_ADDR: &str = "127.0.0.1:3000";

const APP_DIR: &str = "assistant-chat";
const CACHE_FILE: &str = "cache.json";
const LOG_FILE: &str = "assistant-chat.log";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{name} is not a valid socket address: {value}")]
    InvalidAddr { name: &'static str, value: String },
}

/// Configuration for the chat client and proxy server.
///
/// # Example
///
/// ```ignore
/// let config = Config::new("asst_123")
///     .with_backend_url("https://backend.example.com")
///     .with_data_dir("/tmp/chat");
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the assistant API
    pub api_url: String,
    pub api_key: Option<String>,
    pub assistant_id: String,
    /// Base URL of the thread registry and token endpoints
    pub backend_url: String,
    /// Endpoint that executes function tool calls
    pub functions_url: Option<String>,
    /// Where the local cache and log file live
    pub data_dir: PathBuf,
    /// Bind address for `serve`
    pub server_addr: SocketAddr,
}

impl Config {
    pub fn new(assistant_id: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            assistant_id: assistant_id.into(),
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            functions_url: None,
            data_dir: default_data_dir(),
            server_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
        }
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_backend_url(mut self, url: impl Into<String>) -> Self {
        self.backend_url = url.into();
        self
    }

    pub fn with_functions_url(mut self, url: impl Into<String>) -> Self {
        self.functions_url = Some(url.into());
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_server_addr(mut self, addr: SocketAddr) -> Self {
        self.server_addr = addr;
        self
    }

    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let assistant_id = get("ASSISTANT_ID").ok_or(ConfigError::Missing("ASSISTANT_ID"))?;
        let mut config = Self::new(assistant_id);

        if let Some(url) = get("ASSISTANT_API_URL") {
            config = config.with_api_url(url);
        }
        if let Some(key) = get("ASSISTANT_API_KEY") {
            config = config.with_api_key(key);
        }
        if let Some(url) = get("CHAT_BACKEND_URL") {
            config = config.with_backend_url(url);
        }
        if let Some(url) = get("CHAT_FUNCTIONS_URL") {
            config = config.with_functions_url(url);
        }
        if let Some(dir) = get("CHAT_DATA_DIR") {
            config = config.with_data_dir(dir);
        }
        if let Some(addr) = get("CHAT_SERVER_ADDR") {
            let parsed = addr.parse().map_err(|_| ConfigError::InvalidAddr {
                name: "CHAT_SERVER_ADDR",
                value: addr.clone(),
            })?;
            config = config.with_server_addr(parsed);
        }
        Ok(config)
    }

    pub fn cache_path(&self) -> PathBuf {
        self.data_dir.join(CACHE_FILE)
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR)
}
