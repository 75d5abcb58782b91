//! Assistant stream event types
//!
//! The typed view of one run's event stream. Events are folded into the
//! message list as they arrive and are never persisted.

use serde::{Deserialize, Serialize};

/// A single SSE line classified by its field name
#[derive(Debug, Clone, PartialEq)]
pub enum SseLine {
    /// `event: <type>`
    Event(String),
    /// `data: <payload>`
    Data(String),
    /// Blank line, terminating an event
    Empty,
    /// `: comment` or an unrecognized field
    Comment(String),
}

/// Annotation attached to a text delta
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    /// The annotated text refers to a file produced by a tool
    FilePath { text: String, file_id: String },
    /// Citations and other kinds the view does not rewrite
    Other { kind: String },
}

/// Tool call classified by kind
///
/// Only code-interpreter calls are displayed; everything else falls through
/// to the non-mutating branches of the reconciler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCallKind {
    CodeInterpreter { input: Option<String> },
    FileSearch,
    Function {
        name: Option<String>,
        arguments: Option<String>,
    },
    Unhandled { kind: String },
}

impl ToolCallKind {
    pub fn name(&self) -> &str {
        match self {
            ToolCallKind::CodeInterpreter { .. } => "code_interpreter",
            ToolCallKind::FileSearch => "file_search",
            ToolCallKind::Function { .. } => "function",
            ToolCallKind::Unhandled { kind } => kind,
        }
    }
}

/// A function call the provider needs the client to execute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCallRequest {
    pub id: String,
    pub name: String,
    pub arguments: String,
}

/// Result of one tool call, submitted back to the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub output: String,
    pub tool_call_id: String,
}

/// Token usage reported with a completed run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

/// Typed events from one assistant run
#[derive(Debug, Clone, PartialEq)]
pub enum AssistantEvent {
    /// A new assistant message started
    TextCreated,
    /// Incremental text for the current message
    TextDelta {
        value: String,
        annotations: Vec<Annotation>,
    },
    /// An image file was attached to the current message
    ImageFileDone { file_id: String },
    /// A tool call appeared in the current run step
    ToolCallCreated(ToolCallKind),
    /// Incremental input for the current tool call
    ToolCallDelta(ToolCallKind),
    /// The run is paused until tool outputs are submitted
    RequiresAction {
        run_id: String,
        tool_calls: Vec<ToolCallRequest>,
    },
    /// The run finished
    RunCompleted { usage: Option<Usage> },
    /// The run ended without completing (failed, cancelled, expired, error)
    RunFailed { status: String, message: String },
    /// End-of-stream sentinel
    Done,
}

impl AssistantEvent {
    /// Get a short name for logging
    pub fn event_type_name(&self) -> &'static str {
        match self {
            AssistantEvent::TextCreated => "text_created",
            AssistantEvent::TextDelta { .. } => "text_delta",
            AssistantEvent::ImageFileDone { .. } => "image_file_done",
            AssistantEvent::ToolCallCreated(_) => "tool_call_created",
            AssistantEvent::ToolCallDelta(_) => "tool_call_delta",
            AssistantEvent::RequiresAction { .. } => "requires_action",
            AssistantEvent::RunCompleted { .. } => "run_completed",
            AssistantEvent::RunFailed { .. } => "run_failed",
            AssistantEvent::Done => "done",
        }
    }
}

/// Errors from decoding one SSE frame
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SseParseError {
    #[error("Invalid JSON for event type '{event_type}': {details}")]
    InvalidJson { event_type: String, details: String },
    #[error("Missing data for event type: {event_type}")]
    MissingData { event_type: String },
    #[error("Missing field '{field}' in event type: {event_type}")]
    MissingField { event_type: String, field: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_name() {
        assert_eq!(AssistantEvent::TextCreated.event_type_name(), "text_created");
        assert_eq!(AssistantEvent::Done.event_type_name(), "done");
        assert_eq!(
            AssistantEvent::ToolCallDelta(ToolCallKind::FileSearch).event_type_name(),
            "tool_call_delta"
        );
    }

    #[test]
    fn test_tool_output_wire_shape() {
        let output = ToolOutput {
            output: "42".to_string(),
            tool_call_id: "call_1".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&output).unwrap(),
            serde_json::json!({"output": "42", "tool_call_id": "call_1"})
        );
    }

    #[test]
    fn test_parse_error_display() {
        let err = SseParseError::MissingData {
            event_type: "thread.message.delta".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Missing data for event type: thread.message.delta"
        );
    }
}
