//! Stream reconciler: folds run events into a thread's message list.
//!
//! The reconciler is a pure state machine over a [`Thread`]. It never does
//! I/O; anything that needs the network (tool calls, usage accounting) is
//! handed back to the caller as a [`Reaction`].

use crate::models::{Message, Thread};
use crate::sse::{Annotation, AssistantEvent, ToolCallKind, ToolCallRequest, Usage};

/// Route prefix under which provider files are served locally
pub const FILE_ROUTE_PREFIX: &str = "/api/files/";

/// Local URL for a provider-hosted file
pub fn file_url(file_id: &str) -> String {
    format!("{}{}", FILE_ROUTE_PREFIX, file_id)
}

/// What the driver should do after an event was applied
#[derive(Debug, Clone, PartialEq)]
pub enum Reaction {
    /// The thread changed and should be persisted and redrawn
    Updated,
    /// Nothing visible changed
    Ignored,
    /// The run paused for tool outputs
    RequiresAction {
        run_id: String,
        calls: Vec<ToolCallRequest>,
    },
    /// The run completed
    Completed { usage: Option<Usage> },
    /// The run ended without completing
    Failed { message: String },
    /// End of this stream
    Finished,
}

#[derive(Debug, Clone, Default)]
pub struct StreamReconciler;

impl StreamReconciler {
    pub fn new() -> Self {
        Self
    }

    /// Apply one event to `thread`.
    pub fn apply(&self, thread: &mut Thread, event: &AssistantEvent) -> Reaction {
        match event {
            AssistantEvent::TextCreated => {
                thread.push(Message::assistant(""));
                Reaction::Updated
            }
            AssistantEvent::TextDelta { value, annotations } => {
                thread.append_to_last(value);
                for annotation in annotations {
                    if let Annotation::FilePath { text, file_id } = annotation {
                        thread.replace_in_last(text, &file_url(file_id));
                    }
                }
                Reaction::Updated
            }
            AssistantEvent::ImageFileDone { file_id } => {
                thread.append_to_last(&format!("\n![{}]({})\n", file_id, file_url(file_id)));
                Reaction::Updated
            }
            AssistantEvent::ToolCallCreated(kind) => match kind {
                ToolCallKind::CodeInterpreter { .. } => {
                    thread.push(Message::code(""));
                    Reaction::Updated
                }
                other => {
                    tracing::debug!("Not displaying {} tool call", other.name());
                    Reaction::Ignored
                }
            },
            AssistantEvent::ToolCallDelta(kind) => match kind {
                ToolCallKind::CodeInterpreter { input: Some(input) } if !input.is_empty() => {
                    thread.append_to_last(input);
                    Reaction::Updated
                }
                _ => Reaction::Ignored,
            },
            AssistantEvent::RequiresAction { run_id, tool_calls } => Reaction::RequiresAction {
                run_id: run_id.clone(),
                calls: tool_calls.clone(),
            },
            AssistantEvent::RunCompleted { usage } => Reaction::Completed { usage: *usage },
            AssistantEvent::RunFailed { status, message } => Reaction::Failed {
                message: if message.is_empty() {
                    format!("Run {}", status)
                } else {
                    message.clone()
                },
            },
            AssistantEvent::Done => Reaction::Finished,
        }
    }
}
