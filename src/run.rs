//! Run driver: streams one turn through the reconciler.
//!
//! The driver owns nothing global. The thread being updated and the sink that
//! observes it are passed in by the caller, and everything the caller needs
//! afterwards (usage, failure reason) comes back in [`RunEnd`].

use futures::future::join_all;
use futures::StreamExt;
use std::sync::Arc;

use crate::functions::FunctionHandler;
use crate::models::Thread;
use crate::provider::AssistantProvider;
use crate::reconciler::{Reaction, StreamReconciler};
use crate::sse::{decode_events, EventStream, ToolCallRequest, ToolOutput};

/// Observer for a running turn
pub trait RunSink: Send {
    /// The thread changed. Implementations persist it and redraw.
    fn thread_updated(&mut self, thread: &Thread);
    /// Input should be enabled or disabled
    fn input_enabled(&mut self, enabled: bool);
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEnd {
    /// The provider reported completion. Input is left disabled so the
    /// caller can record usage before the next message is accepted.
    Completed { completion_tokens: u64 },
    /// The stream ended without a completion event
    Interrupted,
    /// The run could not start, failed, or the stream broke
    Failed(String),
    /// Tool outputs could not be submitted; input stays disabled
    SubmitFailed(String),
}

pub struct RunDriver {
    provider: Arc<dyn AssistantProvider>,
    functions: Arc<dyn FunctionHandler>,
    reconciler: StreamReconciler,
}

impl RunDriver {
    pub fn new(provider: Arc<dyn AssistantProvider>, functions: Arc<dyn FunctionHandler>) -> Self {
        Self {
            provider,
            functions,
            reconciler: StreamReconciler::new(),
        }
    }

    /// Post `content` to the thread and drive the resulting run to its end.
    pub async fn send(&self, thread: &mut Thread, content: &str, sink: &mut dyn RunSink) -> RunEnd {
        match self.provider.stream_user_message(&thread.id, content).await {
            Ok(bytes) => self.drive(thread, decode_events(bytes), sink).await,
            Err(e) => {
                tracing::warn!("Failed to start run on thread {}: {}", thread.id, e);
                sink.input_enabled(true);
                RunEnd::Failed(e.to_string())
            }
        }
    }

    /// Consume `events` in arrival order, resuming through tool-output
    /// submissions until the run ends.
    pub async fn drive(
        &self,
        thread: &mut Thread,
        mut events: EventStream,
        sink: &mut dyn RunSink,
    ) -> RunEnd {
        let mut completion_tokens = None;

        loop {
            let mut action = None;

            while let Some(item) = events.next().await {
                let event = match item {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::warn!("Run stream broke on thread {}: {}", thread.id, e);
                        sink.input_enabled(true);
                        return RunEnd::Failed(e.to_string());
                    }
                };
                tracing::trace!("Run event: {}", event.event_type_name());

                match self.reconciler.apply(thread, &event) {
                    Reaction::Updated => sink.thread_updated(thread),
                    Reaction::Ignored => {}
                    Reaction::RequiresAction { run_id, calls } => {
                        action = Some((run_id, calls));
                        break;
                    }
                    Reaction::Completed { usage } => {
                        completion_tokens =
                            Some(usage.map(|u| u.completion_tokens).unwrap_or_default());
                    }
                    Reaction::Failed { message } => {
                        tracing::warn!("Run failed on thread {}: {}", thread.id, message);
                        sink.input_enabled(true);
                        return RunEnd::Failed(message);
                    }
                    Reaction::Finished => break,
                }
            }

            let Some((run_id, calls)) = action else {
                break;
            };

            sink.input_enabled(false);
            let outputs = self.resolve_tool_calls(&calls).await;
            match self
                .provider
                .stream_tool_outputs(&thread.id, &run_id, &outputs)
                .await
            {
                Ok(bytes) => events = decode_events(bytes),
                Err(e) => {
                    tracing::error!("Failed to submit tool outputs for run {}: {}", run_id, e);
                    sink.input_enabled(false);
                    return RunEnd::SubmitFailed(e.to_string());
                }
            }
        }

        match completion_tokens {
            Some(completion_tokens) => RunEnd::Completed { completion_tokens },
            None => {
                tracing::warn!("Run stream on thread {} ended without completing", thread.id);
                sink.input_enabled(true);
                RunEnd::Interrupted
            }
        }
    }

    /// Execute every call of one batch concurrently.
    async fn resolve_tool_calls(&self, calls: &[ToolCallRequest]) -> Vec<ToolOutput> {
        tracing::debug!("Resolving {} tool call(s)", calls.len());
        join_all(calls.iter().map(|call| async move {
            ToolOutput {
                output: self.functions.call(&call.name, &call.arguments).await,
                tool_call_id: call.id.clone(),
            }
        }))
        .await
    }
}
