//! SSE stream parsing logic
//!
//! Contains the stateful SseParser for accumulating lines and emitting events,
//! as well as the core parsing functions.

mod message;
mod run;

use crate::sse::events::{AssistantEvent, SseLine, SseParseError};

use message::{parse_message_created_event, parse_message_delta_event};
use run::{
    parse_error_event, parse_requires_action_event, parse_run_completed_event,
    parse_run_ended_event, parse_run_step_delta_event,
};

/// Parse a single SSE line into its component type
pub fn parse_sse_line(line: &str) -> SseLine {
    if line.is_empty() {
        return SseLine::Empty;
    }

    if let Some(stripped) = line.strip_prefix(':') {
        return SseLine::Comment(stripped.trim().to_string());
    }

    if let Some(rest) = line.strip_prefix("event:") {
        return SseLine::Event(rest.trim().to_string());
    }

    if let Some(rest) = line.strip_prefix("data:") {
        return SseLine::Data(rest.strip_prefix(' ').unwrap_or(rest).to_string());
    }

    // Unknown field (id:, retry:, ...) - ignored like a comment
    SseLine::Comment(line.to_string())
}

/// Parse an SSE event type and data into typed events.
///
/// One frame can carry several content parts, so this returns a list.
/// Event types the view has no use for decode to an empty list.
pub fn parse_sse_event(event_type: &str, data: &str) -> Result<Vec<AssistantEvent>, SseParseError> {
    match event_type {
        "thread.message.created" => parse_message_created_event(event_type, data),
        "thread.message.delta" => parse_message_delta_event(event_type, data),
        "thread.run.step.delta" => parse_run_step_delta_event(event_type, data),
        "thread.run.requires_action" => parse_requires_action_event(event_type, data),
        "thread.run.completed" => parse_run_completed_event(event_type, data),
        "thread.run.failed" | "thread.run.cancelled" | "thread.run.expired"
        | "thread.run.incomplete" => parse_run_ended_event(event_type, data),
        "error" => parse_error_event(event_type, data),
        "done" => Ok(vec![AssistantEvent::Done]),
        _ => Ok(Vec::new()),
    }
}

/// Stateful SSE parser that accumulates lines and emits complete events
#[derive(Debug, Default)]
pub struct SseParser {
    /// Current event type being accumulated
    current_event_type: Option<String>,
    /// Accumulated data lines (SSE allows multiple data: lines)
    data_buffer: Vec<String>,
}

impl SseParser {
    /// Create a new SSE parser
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a line to the parser
    ///
    /// Returns:
    /// - `Ok(events)` - zero or more events completed by this line
    /// - `Err(error)` - the frame ended by this line could not be decoded;
    ///   the parser state is reset either way
    pub fn feed_line(&mut self, line: &str) -> Result<Vec<AssistantEvent>, SseParseError> {
        match parse_sse_line(line) {
            SseLine::Event(event_type) => {
                self.current_event_type = Some(event_type);
                Ok(Vec::new())
            }
            SseLine::Data(data) => {
                self.data_buffer.push(data);
                Ok(Vec::new())
            }
            SseLine::Empty => self.try_emit_event(),
            SseLine::Comment(_) => Ok(Vec::new()),
        }
    }

    fn try_emit_event(&mut self) -> Result<Vec<AssistantEvent>, SseParseError> {
        if self.current_event_type.is_none() && self.data_buffer.is_empty() {
            return Ok(Vec::new());
        }

        let event_type = self.current_event_type.take();
        let data = self.data_buffer.join("\n");
        self.data_buffer.clear();

        match event_type {
            Some(et) if et == "done" => Ok(vec![AssistantEvent::Done]),
            Some(et) if data.is_empty() => Err(SseParseError::MissingData { event_type: et }),
            Some(et) => parse_sse_event(&et, &data),
            // Bare `data: [DONE]` terminates some providers' streams
            None if data.trim() == "[DONE]" => Ok(vec![AssistantEvent::Done]),
            None => Ok(Vec::new()),
        }
    }
}

pub(super) fn invalid_json(event_type: &str, err: serde_json::Error) -> SseParseError {
    SseParseError::InvalidJson {
        event_type: event_type.to_string(),
        details: err.to_string(),
    }
}
