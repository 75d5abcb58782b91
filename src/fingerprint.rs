//! Device fingerprint
//!
//! A stable per-installation identifier used to deduplicate thread
//! registration and quota checks. Derived from the hostname, the OS user and
//! a random salt persisted in the local cache, so two installs on one
//! machine stay distinct while one install keeps its id across restarts.

use once_cell::sync::OnceCell;
use sha2::{Digest, Sha256};

use crate::cache::LocalCache;

#[derive(Debug)]
pub struct Fingerprinter {
    cache: LocalCache,
    value: OnceCell<String>,
}

impl Fingerprinter {
    pub fn new(cache: LocalCache) -> Self {
        Self {
            cache,
            value: OnceCell::new(),
        }
    }

    /// The fingerprint for this installation, computed once per process.
    pub fn fingerprint(&self) -> &str {
        self.value.get_or_init(|| {
            let host = hostname::get()
                .map(|h| h.to_string_lossy().to_string())
                .unwrap_or_else(|_| "unknown".to_string());
            let user = std::env::var("USER")
                .or_else(|_| std::env::var("USERNAME"))
                .unwrap_or_default();
            compute_fingerprint(&host, &user, &self.salt())
        })
    }

    fn salt(&self) -> String {
        match self.cache.device_salt() {
            Ok(Some(salt)) => return salt,
            Ok(None) => {}
            Err(e) => tracing::warn!("Could not read device salt, generating a new one: {}", e),
        }
        let salt = uuid::Uuid::new_v4().to_string();
        if let Err(e) = self.cache.set_device_salt(&salt) {
            tracing::warn!("Could not persist device salt: {}", e);
        }
        salt
    }
}

/// Hex SHA-256 over the identifying parts
pub fn compute_fingerprint(host: &str, user: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(host.as_bytes());
    hasher.update([0u8]);
    hasher.update(user.as_bytes());
    hasher.update([0u8]);
    hasher.update(std::env::consts::OS.as_bytes());
    hasher.update([0u8]);
    hasher.update(salt.as_bytes());
    hex::encode(hasher.finalize())
}
