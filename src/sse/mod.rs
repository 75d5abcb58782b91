//! SSE (Server-Sent Events) stream parser
//!
//! Parses the assistant provider's run stream. SSE format consists of:
//! - `event: <type>` - event type line
//! - `data: <json>` - data payload line
//! - Empty line - signals end of event
//! - Lines starting with `:` - comments (ignored)
//!
//! # Module structure
//! - `events` - Event type definitions (AssistantEvent, ToolCallKind, SseParseError)
//! - `payloads` - Internal payload deserialization structs
//! - `parser` - Parsing logic (SseParser, parse_sse_line, parse_sse_event)
//! - `decode` - Byte stream to event stream adapter

mod decode;
mod events;
mod parser;
mod payloads;

pub use decode::{decode_events, EventStream};
pub use events::{
    Annotation, AssistantEvent, SseLine, SseParseError, ToolCallKind, ToolCallRequest, ToolOutput,
    Usage,
};
pub use parser::{parse_sse_event, parse_sse_line, SseParser};
