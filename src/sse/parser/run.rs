//! Run and run-step event parsers

use crate::sse::events::{AssistantEvent, SseParseError, ToolCallKind, ToolCallRequest};
use crate::sse::payloads::{ErrorEventPayload, RunPayload, RunStepDeltaPayload, ToolCallDelta};

use super::invalid_json;

fn classify_tool_call(call: &ToolCallDelta) -> ToolCallKind {
    match call.kind.as_deref() {
        Some("code_interpreter") => ToolCallKind::CodeInterpreter {
            input: call
                .code_interpreter
                .as_ref()
                .and_then(|ci| ci.input.clone()),
        },
        Some("file_search") => ToolCallKind::FileSearch,
        Some("function") => ToolCallKind::Function {
            name: call.function.as_ref().and_then(|f| f.name.clone()),
            arguments: call.function.as_ref().and_then(|f| f.arguments.clone()),
        },
        Some(other) => ToolCallKind::Unhandled {
            kind: other.to_string(),
        },
        // Continuation deltas may omit the type; only code_interpreter
        // carries an input payload
        None if call.code_interpreter.is_some() => ToolCallKind::CodeInterpreter {
            input: call
                .code_interpreter
                .as_ref()
                .and_then(|ci| ci.input.clone()),
        },
        None => ToolCallKind::Unhandled {
            kind: "unknown".to_string(),
        },
    }
}

/// Parse a run step delta into tool call lifecycle events.
///
/// The first delta of a call carries its `id` and yields `ToolCallCreated`;
/// any input in that same delta follows as a `ToolCallDelta`.
pub(super) fn parse_run_step_delta_event(
    event_type: &str,
    data: &str,
) -> Result<Vec<AssistantEvent>, SseParseError> {
    let payload: RunStepDeltaPayload =
        serde_json::from_str(data).map_err(|e| invalid_json(event_type, e))?;

    let Some(details) = payload.delta.step_details else {
        return Ok(Vec::new());
    };
    if details.kind != "tool_calls" {
        return Ok(Vec::new());
    }

    let mut events = Vec::new();
    for call in &details.tool_calls {
        let kind = classify_tool_call(call);
        if call.id.is_some() {
            events.push(AssistantEvent::ToolCallCreated(kind.clone()));
            let has_input = matches!(
                &kind,
                ToolCallKind::CodeInterpreter { input: Some(input) } if !input.is_empty()
            );
            if has_input {
                events.push(AssistantEvent::ToolCallDelta(kind));
            }
        } else {
            events.push(AssistantEvent::ToolCallDelta(kind));
        }
    }
    Ok(events)
}

pub(super) fn parse_requires_action_event(
    event_type: &str,
    data: &str,
) -> Result<Vec<AssistantEvent>, SseParseError> {
    let run: RunPayload = serde_json::from_str(data).map_err(|e| invalid_json(event_type, e))?;

    let tool_calls = run
        .required_action
        .and_then(|action| action.submit_tool_outputs)
        .ok_or_else(|| SseParseError::MissingField {
            event_type: event_type.to_string(),
            field: "required_action.submit_tool_outputs".to_string(),
        })?
        .tool_calls
        .into_iter()
        .map(|call| ToolCallRequest {
            id: call.id,
            name: call.function.name,
            arguments: call.function.arguments,
        })
        .collect();

    Ok(vec![AssistantEvent::RequiresAction {
        run_id: run.id,
        tool_calls,
    }])
}

pub(super) fn parse_run_completed_event(
    event_type: &str,
    data: &str,
) -> Result<Vec<AssistantEvent>, SseParseError> {
    let run: RunPayload = serde_json::from_str(data).map_err(|e| invalid_json(event_type, e))?;
    Ok(vec![AssistantEvent::RunCompleted { usage: run.usage }])
}

pub(super) fn parse_run_ended_event(
    event_type: &str,
    data: &str,
) -> Result<Vec<AssistantEvent>, SseParseError> {
    let run: RunPayload = serde_json::from_str(data).map_err(|e| invalid_json(event_type, e))?;
    let status = run
        .status
        .unwrap_or_else(|| event_type.trim_start_matches("thread.run.").to_string());
    let message = run
        .last_error
        .and_then(|e| e.message)
        .unwrap_or_else(|| format!("run {} ended with status {}", run.id, status));
    Ok(vec![AssistantEvent::RunFailed { status, message }])
}

pub(super) fn parse_error_event(
    _event_type: &str,
    data: &str,
) -> Result<Vec<AssistantEvent>, SseParseError> {
    let message = match serde_json::from_str::<ErrorEventPayload>(data) {
        Ok(payload) => payload
            .message
            .or_else(|| payload.error.and_then(|e| e.message))
            .unwrap_or_else(|| "unknown error".to_string()),
        // Some providers send a plain-text error body
        Err(_) => data.to_string(),
    };
    Ok(vec![AssistantEvent::RunFailed {
        status: "error".to_string(),
        message,
    }])
}
