//! Thread and message persistence methods for LocalCache

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Message, Thread};

use super::{keys, CacheError, LocalCache};

/// Thread list entry; messages live under their own key
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThreadRecord {
    id: String,
    title: String,
    last_message: String,
    last_updated: DateTime<Utc>,
}

impl From<&Thread> for ThreadRecord {
    fn from(thread: &Thread) -> Self {
        Self {
            id: thread.id.clone(),
            title: thread.title.clone(),
            last_message: thread.last_message.clone(),
            last_updated: thread.last_updated,
        }
    }
}

impl LocalCache {
    /// Thread ids known to be registered with the backend
    pub fn known_thread_ids(&self) -> Result<Vec<String>, CacheError> {
        Ok(self.get_json(keys::THREAD_IDS)?.unwrap_or_default())
    }

    pub fn set_known_thread_ids(&self, ids: &[String]) -> Result<(), CacheError> {
        self.set_json(keys::THREAD_IDS, ids)
    }

    /// Add one id to the known set; returns false if it was already there
    pub fn add_known_thread_id(&self, thread_id: &str) -> Result<bool, CacheError> {
        self.update_json(keys::THREAD_IDS, |ids: &mut Vec<String>| {
            if ids.iter().any(|id| id == thread_id) {
                return false;
            }
            ids.push(thread_id.to_string());
            true
        })
    }

    pub fn messages(&self, thread_id: &str) -> Result<Option<Vec<Message>>, CacheError> {
        self.get_json(&keys::messages(thread_id))
    }

    pub fn save_messages(&self, thread_id: &str, messages: &[Message]) -> Result<(), CacheError> {
        self.set_json(&keys::messages(thread_id), messages)
    }

    /// Load a user's threads, rejoining each with its message array
    pub fn threads(&self, user_token: &str) -> Result<Vec<Thread>, CacheError> {
        let records: Vec<ThreadRecord> = self
            .get_json(&keys::threads(user_token))?
            .unwrap_or_default();

        records
            .into_iter()
            .map(|record| {
                let messages = self.messages(&record.id)?.unwrap_or_default();
                Ok(Thread {
                    id: record.id,
                    title: record.title,
                    last_message: record.last_message,
                    last_updated: record.last_updated,
                    messages,
                })
            })
            .collect()
    }

    /// Replace a user's whole thread list, including message arrays
    pub fn save_threads(&self, user_token: &str, threads: &[Thread]) -> Result<(), CacheError> {
        for thread in threads {
            self.save_messages(&thread.id, &thread.messages)?;
        }
        let records: Vec<ThreadRecord> = threads.iter().map(ThreadRecord::from).collect();
        self.set_json(&keys::threads(user_token), &records)
    }

    /// Upsert one thread. New threads go to the front of the list.
    pub fn save_thread(&self, user_token: &str, thread: &Thread) -> Result<(), CacheError> {
        self.save_messages(&thread.id, &thread.messages)?;

        self.update_json(&keys::threads(user_token), |records: &mut Vec<ThreadRecord>| {
            match records.iter_mut().find(|r| r.id == thread.id) {
                Some(existing) => *existing = ThreadRecord::from(thread),
                None => records.insert(0, ThreadRecord::from(thread)),
            }
            true
        })?;
        Ok(())
    }

    pub fn current_thread(&self, user_token: &str) -> Result<Option<String>, CacheError> {
        self.get_json(&keys::current_thread(user_token))
    }

    pub fn set_current_thread(&self, user_token: &str, thread_id: &str) -> Result<(), CacheError> {
        self.set_json(&keys::current_thread(user_token), thread_id)
    }
}
