//! Message handling for ChatView.

use super::{AppMessage, ChatView};
use crate::run::RunEnd;
use crate::sync::SyncOutcome;

impl ChatView {
    /// Fold a background message into view state
    pub fn handle_message(&mut self, msg: AppMessage) {
        self.mark_dirty();
        match msg {
            AppMessage::ThreadUpdated(thread) => {
                if let Some(existing) = self.threads.iter_mut().find(|t| t.id == thread.id) {
                    *existing = thread;
                } else {
                    tracing::debug!("Update for unknown thread {}", thread.id);
                }
            }
            AppMessage::InputEnabled(enabled) => {
                self.input_enabled = enabled;
            }
            AppMessage::RunFinished { thread_id, end } => {
                tracing::debug!("Run on {} finished: {:?}", thread_id, end);
                self.status = match end {
                    RunEnd::Completed { .. } => None,
                    RunEnd::Interrupted => Some("The response ended early.".to_string()),
                    RunEnd::Failed(reason) => Some(format!("Request failed: {}", reason)),
                    RunEnd::SubmitFailed(reason) => {
                        Some(format!("Could not send tool results: {}", reason))
                    }
                };
            }
            AppMessage::QuotaUpdated(quota) => {
                if quota.is_some() {
                    self.quota = quota;
                }
            }
            AppMessage::ThreadSynced { thread_id, outcome } => {
                if let SyncOutcome::Failed(reason) = outcome {
                    tracing::debug!("Thread {} left unregistered: {}", thread_id, reason);
                }
            }
        }
    }
}
