//! Sending: quota gate, user message, and the background run task.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{AppMessage, ChatView};
use crate::cache::LocalCache;
use crate::error::ChatError;
use crate::meter::{QuotaDecision, UPSELL_MESSAGE};
use crate::models::{Message, Thread};
use crate::run::{RunEnd, RunSink};

/// What a send attempt turned into
#[derive(Debug, Clone, PartialEq)]
pub enum SendPlan {
    /// Nothing to send, or input is disabled
    Nothing,
    /// The quota check failed; an alert is showing
    Blocked,
    /// Quota is exhausted; the upsell message was appended instead
    Upsold,
    /// The user message was appended; the run should start
    Proceed { thread: Thread, content: String },
}

impl ChatView {
    /// Gate `text` on the quota and append it to the current thread.
    pub async fn begin_send(&mut self, text: &str) -> SendPlan {
        let content = text.trim();
        if content.is_empty() || !self.input_enabled {
            return SendPlan::Nothing;
        }
        let Some(token) = self.user_token.clone() else {
            return SendPlan::Nothing;
        };
        if self.current_thread().is_none() {
            return SendPlan::Nothing;
        }

        let decision = match self.services.meter.check(&token).await {
            Ok(decision) => decision,
            Err(e) => {
                let err = ChatError::from(e);
                tracing::warn!(category = %err.category(), "{}", err);
                self.show_alert(err.user_message());
                return SendPlan::Blocked;
            }
        };

        let plan = match decision {
            QuotaDecision::Exhausted => {
                self.quota = Some(0);
                if let Some(thread) = self.current_thread_mut() {
                    thread.push(Message::assistant(UPSELL_MESSAGE));
                }
                SendPlan::Upsold
            }
            QuotaDecision::Allowed { remaining } => {
                self.quota = Some(remaining);
                let Some(thread) = self.current_thread_mut() else {
                    return SendPlan::Nothing;
                };
                thread.push(Message::user(content));
                let thread = thread.clone();
                self.input_enabled = false;
                SendPlan::Proceed {
                    thread,
                    content: content.to_string(),
                }
            }
        };

        self.persist_current();
        self.scroll_offset = 0;
        self.mark_dirty();
        plan
    }

    /// Send the composed input, starting a run if the quota allows.
    pub async fn submit_input(&mut self) -> Option<JoinHandle<()>> {
        let text = self.input.clone();
        match self.begin_send(&text).await {
            SendPlan::Proceed { thread, content } => {
                self.input.clear();
                self.status = None;
                Some(self.start_turn(thread, content))
            }
            SendPlan::Upsold => {
                self.input.clear();
                None
            }
            SendPlan::Nothing | SendPlan::Blocked => None,
        }
    }

    /// Spawn the run for an accepted message.
    ///
    /// The task makes sure the thread is registered, drives the run, records
    /// usage and reports everything back on the view's channel.
    pub fn start_turn(&self, mut thread: Thread, content: String) -> JoinHandle<()> {
        let services = self.services.clone();
        let tx = self.message_tx.clone();
        let token = self.user_token.clone().unwrap_or_default();

        tokio::spawn(async move {
            let outcome = services.sync.ensure_registered(&thread.id, &token).await;
            let _ = tx.send(AppMessage::ThreadSynced {
                thread_id: thread.id.clone(),
                outcome,
            });

            let mut sink = ChannelSink::new(services.cache.clone(), token.clone(), tx.clone());
            let end = services.driver.send(&mut thread, &content, &mut sink).await;

            if let RunEnd::Completed { completion_tokens } = end {
                match services.meter.record_usage(&token, completion_tokens).await {
                    Ok(()) => {
                        let _ = tx.send(AppMessage::QuotaUpdated(services.meter.last_known()));
                    }
                    Err(e) => tracing::warn!("{}", e),
                }
                // The next message is checked against the decremented quota
                let _ = tx.send(AppMessage::InputEnabled(true));
            }

            let _ = tx.send(AppMessage::RunFinished {
                thread_id: thread.id.clone(),
                end,
            });
        })
    }
}

/// Run sink that persists each update and forwards it to the view
pub struct ChannelSink {
    cache: LocalCache,
    user_token: String,
    tx: mpsc::UnboundedSender<AppMessage>,
}

impl ChannelSink {
    pub fn new(cache: LocalCache, user_token: String, tx: mpsc::UnboundedSender<AppMessage>) -> Self {
        Self {
            cache,
            user_token,
            tx,
        }
    }
}

impl RunSink for ChannelSink {
    fn thread_updated(&mut self, thread: &Thread) {
        if let Err(e) = self.cache.save_thread(&self.user_token, thread) {
            tracing::warn!("Could not persist thread {}: {}", thread.id, e);
        }
        let _ = self.tx.send(AppMessage::ThreadUpdated(thread.clone()));
    }

    fn input_enabled(&mut self, enabled: bool) {
        let _ = self.tx.send(AppMessage::InputEnabled(enabled));
    }
}
