//! Byte stream to event stream decoding
//!
//! Splits an HTTP body into SSE lines across arbitrary chunk boundaries and
//! feeds them to [`SseParser`]. A frame that fails to decode is logged and
//! skipped so one bad frame never blocks the rest of the run.

use futures::stream::{self, Stream, StreamExt};
use std::collections::VecDeque;
use std::pin::Pin;

use super::events::AssistantEvent;
use super::parser::SseParser;
use crate::traits::{ByteStream, HttpError};

/// A stream of decoded events; transport errors end the stream.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<AssistantEvent, HttpError>> + Send>>;

struct DecodeState {
    bytes: ByteStream,
    buffer: Vec<u8>,
    parser: SseParser,
    pending: VecDeque<Result<AssistantEvent, HttpError>>,
    finished: bool,
}

impl DecodeState {
    fn feed(&mut self, line: &str) {
        match self.parser.feed_line(line) {
            Ok(events) => self.pending.extend(events.into_iter().map(Ok)),
            Err(e) => tracing::warn!("Skipping malformed stream frame: {}", e),
        }
    }

    fn drain_lines(&mut self) {
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim_end_matches(['\n', '\r']);
            self.feed(line);
        }
    }

    fn flush(&mut self) {
        if !self.buffer.is_empty() {
            let rest = std::mem::take(&mut self.buffer);
            let line = String::from_utf8_lossy(&rest).trim_end_matches('\r').to_string();
            self.feed(&line);
        }
        // Terminate a final frame that was not followed by a blank line
        self.feed("");
    }
}

/// Decode a raw SSE body into ordered assistant events.
pub fn decode_events(bytes: ByteStream) -> EventStream {
    let state = DecodeState {
        bytes,
        buffer: Vec::new(),
        parser: SseParser::new(),
        pending: VecDeque::new(),
        finished: false,
    };

    Box::pin(stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.pending.pop_front() {
                return Some((item, state));
            }
            if state.finished {
                return None;
            }
            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    state.buffer.extend_from_slice(&chunk);
                    state.drain_lines();
                }
                Some(Err(e)) => {
                    state.finished = true;
                    state.pending.push_back(Err(e));
                }
                None => {
                    state.finished = true;
                    state.flush();
                }
            }
        }
    }))
}
