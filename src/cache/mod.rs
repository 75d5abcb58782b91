//! Local persisted cache
//!
//! Key/value persistence scoped to this installation. Holds the user identity
//! token, the set of thread ids known to be registered remotely, per-thread
//! message arrays, and the currently selected thread. Every value is a
//! JSON-encoded string under a stable key, namespaced by user token or thread
//! id where applicable.

mod error;
mod store;
mod thread;

pub use error::CacheError;
pub use store::{FileStore, KeyValueStore, MemoryStore, ValueUpdate};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

/// Stable key names
pub mod keys {
    pub const USER_TOKEN: &str = "user_token";
    pub const THREAD_IDS: &str = "thread_ids";
    pub const DEVICE_SALT: &str = "device_salt";

    pub fn threads(user_token: &str) -> String {
        format!("threads:{}", user_token)
    }

    pub fn messages(thread_id: &str) -> String {
        format!("messages:{}", thread_id)
    }

    pub fn current_thread(user_token: &str) -> String {
        format!("current_thread:{}", user_token)
    }
}

/// Typed accessors over a [`KeyValueStore`]
///
/// Cheap to clone; clones share the same store.
#[derive(Debug, Clone)]
pub struct LocalCache {
    store: Arc<dyn KeyValueStore>,
}

impl LocalCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Open (or create) a file-backed cache
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CacheError> {
        Ok(Self::new(Arc::new(FileStore::open(path)?)))
    }

    /// A cache that lives only as long as the process
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        match self.store.get(key)? {
            Some(raw) => decode(key, &raw).map(Some),
            None => Ok(None),
        }
    }

    pub fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        self.store.set(key, encode(key, value)?)
    }

    /// Modify the value under `key` atomically with respect to other writers
    /// sharing this store. A missing value starts as `T::default()`.
    ///
    /// `modify` returns whether it changed the value; unchanged values are not
    /// written back. The returned flag is the one `modify` produced.
    pub fn update_json<T, F>(&self, key: &str, mut modify: F) -> Result<bool, CacheError>
    where
        T: Serialize + DeserializeOwned + Default,
        F: FnMut(&mut T) -> bool,
    {
        let mut changed = false;
        self.store.update(key, &mut |raw| {
            let mut value: T = match raw {
                Some(raw) => decode(key, raw)?,
                None => T::default(),
            };
            changed = modify(&mut value);
            if changed {
                encode(key, &value).map(Some)
            } else {
                Ok(None)
            }
        })?;
        Ok(changed)
    }

    pub fn remove(&self, key: &str) -> Result<(), CacheError> {
        self.store.remove(key)
    }

    pub fn user_token(&self) -> Result<Option<String>, CacheError> {
        self.get_json(keys::USER_TOKEN)
    }

    pub fn set_user_token(&self, token: &str) -> Result<(), CacheError> {
        self.set_json(keys::USER_TOKEN, token)
    }

    pub fn device_salt(&self) -> Result<Option<String>, CacheError> {
        self.get_json(keys::DEVICE_SALT)
    }

    pub fn set_device_salt(&self, salt: &str) -> Result<(), CacheError> {
        self.set_json(keys::DEVICE_SALT, salt)
    }
}

fn decode<T: DeserializeOwned>(key: &str, raw: &str) -> Result<T, CacheError> {
    serde_json::from_str(raw).map_err(|source| CacheError::Decode {
        key: key.to_string(),
        source,
    })
}

fn encode<T: Serialize + ?Sized>(key: &str, value: &T) -> Result<String, CacheError> {
    serde_json::to_string(value).map_err(|source| CacheError::Decode {
        key: key.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_token_round_trip() {
        let cache = LocalCache::in_memory();
        assert_eq!(cache.user_token().unwrap(), None);
        cache.set_user_token("u-123").unwrap();
        assert_eq!(cache.user_token().unwrap(), Some("u-123".to_string()));
    }

    #[test]
    fn test_values_are_json_encoded() {
        let store = Arc::new(MemoryStore::new());
        let cache = LocalCache::new(store.clone());
        cache.set_user_token("u-123").unwrap();
        assert_eq!(store.get(keys::USER_TOKEN).unwrap(), Some("\"u-123\"".to_string()));
    }

    #[test]
    fn test_corrupt_value_is_decode_error() {
        let store = Arc::new(MemoryStore::new());
        store.set(keys::THREAD_IDS, "[not json".to_string()).unwrap();
        let cache = LocalCache::new(store);
        assert!(matches!(
            cache.known_thread_ids(),
            Err(CacheError::Decode { .. })
        ));
    }

    #[test]
    fn test_key_namespacing() {
        assert_eq!(keys::threads("u1"), "threads:u1");
        assert_eq!(keys::messages("thread_a"), "messages:thread_a");
        assert_eq!(keys::current_thread("u1"), "current_thread:u1");
    }
}
