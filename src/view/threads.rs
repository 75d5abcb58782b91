//! Thread list operations for ChatView: load, create, select.

use futures::future::join_all;

use super::{AppMessage, ChatView};
use crate::error::ChatError;
use crate::models::Thread;
use crate::provider::{messages_from_list, ProviderError};

impl ChatView {
    pub fn current_thread(&self) -> Option<&Thread> {
        let id = self.current_thread_id.as_deref()?;
        self.threads.iter().find(|t| t.id == id)
    }

    pub fn current_thread_mut(&mut self) -> Option<&mut Thread> {
        let id = self.current_thread_id.as_deref()?;
        self.threads.iter_mut().find(|t| t.id == id)
    }

    /// Load the user's threads from the registry and hydrate each from the
    /// provider. Selects the first thread, or creates one if there are none.
    ///
    /// A registry failure falls back to the locally cached thread list.
    pub async fn load(&mut self) {
        let Some(token) = self.user_token.clone() else {
            return;
        };
        self.loading = true;
        self.mark_dirty();

        let threads = match self.services.sync.remote_thread_ids(&token).await {
            Ok(ids) => self.hydrate(&ids).await,
            Err(e) => {
                tracing::warn!("Could not fetch thread list, using cached threads: {}", e);
                self.services.cache.threads(&token).unwrap_or_else(|e| {
                    tracing::warn!("Could not read cached threads: {}", e);
                    Vec::new()
                })
            }
        };
        tracing::info!("Loaded {} thread(s)", threads.len());

        if let Err(e) = self.services.cache.save_threads(&token, &threads) {
            tracing::warn!("Could not cache threads: {}", e);
        }
        self.threads = threads;
        self.current_thread_id = None;

        match self.threads.first().map(|t| t.id.clone()) {
            Some(first) => {
                self.select_thread(&first);
            }
            None => {
                if let Err(e) = self.create_thread().await {
                    let err = ChatError::from(e);
                    tracing::warn!(
                        category = %err.category(),
                        "Could not create initial thread: {}",
                        err
                    );
                    self.status = Some(format!(
                        "Could not start a conversation. {}.",
                        err.category().recovery_hint()
                    ));
                }
            }
        }

        self.loading = false;
        self.mark_dirty();
    }

    /// Fetch every thread's history concurrently, keeping registry order.
    async fn hydrate(&self, ids: &[String]) -> Vec<Thread> {
        let provider = &self.services.provider;
        let lists = join_all(ids.iter().map(|id| provider.list_messages(id))).await;

        ids.iter()
            .zip(lists)
            .map(|(id, list)| match list {
                Ok(list) => Thread::from_history(id.clone(), messages_from_list(&list)),
                Err(e) => {
                    tracing::warn!("Could not load history for {}: {}", id, e);
                    let cached = self
                        .services
                        .cache
                        .messages(id)
                        .ok()
                        .flatten()
                        .unwrap_or_default();
                    Thread::from_history(id.clone(), cached)
                }
            })
            .collect()
    }

    /// Create a thread seeded with the welcome message and select it.
    /// Registration with the backend happens in the background.
    pub async fn create_thread(&mut self) -> Result<(), ProviderError> {
        let Some(token) = self.user_token.clone() else {
            return Ok(());
        };

        let thread_id = self.services.provider.create_thread().await?;
        let thread = Thread::with_welcome(thread_id.clone());
        if let Err(e) = self.services.cache.save_thread(&token, &thread) {
            tracing::warn!("Could not cache new thread: {}", e);
        }
        self.threads.insert(0, thread);
        self.select_thread(&thread_id);
        self.spawn_registration(thread_id, token);
        Ok(())
    }

    fn spawn_registration(&self, thread_id: String, token: String) {
        let sync = self.services.sync.clone();
        let tx = self.message_tx.clone();
        tokio::spawn(async move {
            let outcome = sync.ensure_registered(&thread_id, &token).await;
            let _ = tx.send(AppMessage::ThreadSynced { thread_id, outcome });
        });
    }

    /// Switch to another thread, persisting the one being left.
    ///
    /// Threads missing from memory are restored from the local cache.
    /// Returns false if the id is unknown to both.
    pub fn select_thread(&mut self, thread_id: &str) -> bool {
        if self.current_thread_id.as_deref() == Some(thread_id) {
            return true;
        }

        if !self.threads.iter().any(|t| t.id == thread_id) {
            match self.cached_thread(thread_id) {
                Some(thread) => self.threads.push(thread),
                None => return false,
            }
        }

        self.persist_current();
        self.current_thread_id = Some(thread_id.to_string());
        if let Some(token) = self.user_token.as_deref() {
            if let Err(e) = self.services.cache.set_current_thread(token, thread_id) {
                tracing::warn!("Could not remember current thread: {}", e);
            }
        }
        self.scroll_offset = 0;
        self.mark_dirty();
        true
    }

    fn cached_thread(&self, thread_id: &str) -> Option<Thread> {
        let token = self.user_token.as_deref()?;
        let threads = self.services.cache.threads(token).ok()?;
        threads.into_iter().find(|t| t.id == thread_id)
    }

    /// Write the selected thread to the local cache.
    pub fn persist_current(&self) {
        if let (Some(token), Some(thread)) = (self.user_token.as_deref(), self.current_thread()) {
            if let Err(e) = self.services.cache.save_thread(token, thread) {
                tracing::warn!("Could not persist thread {}: {}", thread.id, e);
            }
        }
    }

    pub fn select_next_thread(&mut self) {
        self.select_relative(1);
    }

    pub fn select_previous_thread(&mut self) {
        self.select_relative(-1);
    }

    fn select_relative(&mut self, step: isize) {
        if self.threads.is_empty() {
            return;
        }
        let len = self.threads.len() as isize;
        let current = self
            .current_thread_id
            .as_deref()
            .and_then(|id| self.threads.iter().position(|t| t.id == id))
            .map(|i| i as isize)
            .unwrap_or(if step > 0 { -1 } else { 0 });
        let next = (current + step).rem_euclid(len) as usize;
        let id = self.threads[next].id.clone();
        self.select_thread(&id);
    }
}
