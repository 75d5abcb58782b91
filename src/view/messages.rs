//! AppMessage enum for async communication with the view.

use crate::models::Thread;
use crate::run::RunEnd;
use crate::sync::SyncOutcome;

/// Messages received from background tasks (runs, registration)
#[derive(Debug, Clone)]
pub enum AppMessage {
    /// A run mutated a thread; carries the full updated thread
    ThreadUpdated(Thread),
    /// A run enabled or disabled input
    InputEnabled(bool),
    /// A run ended
    RunFinished { thread_id: String, end: RunEnd },
    /// The remaining quota changed after usage was recorded
    QuotaUpdated(Option<i64>),
    /// Background registration of a thread finished
    ThreadSynced {
        thread_id: String,
        outcome: SyncOutcome,
    },
}
