//! Message event parsers (created, delta)

use crate::sse::events::{Annotation, AssistantEvent, SseParseError};
use crate::sse::payloads::{ContentDelta, MessageDeltaPayload};

use super::invalid_json;

pub(super) fn parse_message_created_event(
    event_type: &str,
    data: &str,
) -> Result<Vec<AssistantEvent>, SseParseError> {
    serde_json::from_str::<serde_json::Value>(data).map_err(|e| invalid_json(event_type, e))?;
    Ok(vec![AssistantEvent::TextCreated])
}

/// Parse a message delta into text and image events, in content order
pub(super) fn parse_message_delta_event(
    event_type: &str,
    data: &str,
) -> Result<Vec<AssistantEvent>, SseParseError> {
    let payload: MessageDeltaPayload =
        serde_json::from_str(data).map_err(|e| invalid_json(event_type, e))?;

    let events = payload
        .delta
        .content
        .into_iter()
        .filter_map(|part| match part {
            ContentDelta::Text { text: Some(text) } => {
                let annotations = text
                    .annotations
                    .into_iter()
                    .map(|a| match (a.kind == "file_path", a.text, a.file_path) {
                        (true, Some(text), Some(file)) => Annotation::FilePath {
                            text,
                            file_id: file.file_id,
                        },
                        _ => Annotation::Other { kind: a.kind },
                    })
                    .collect();
                Some(AssistantEvent::TextDelta {
                    value: text.value.unwrap_or_default(),
                    annotations,
                })
            }
            ContentDelta::ImageFile {
                image_file: Some(file),
            } => Some(AssistantEvent::ImageFileDone {
                file_id: file.file_id,
            }),
            _ => None,
        })
        .collect();

    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sse::parser::parse_sse_event;

    #[test]
    fn test_parse_text_delta() {
        let data = r#"{"id":"msg_1","delta":{"content":[{"index":0,"type":"text","text":{"value":"Hello"}}]}}"#;
        let events = parse_sse_event("thread.message.delta", data).unwrap();
        assert_eq!(
            events,
            vec![AssistantEvent::TextDelta {
                value: "Hello".to_string(),
                annotations: vec![],
            }]
        );
    }

    #[test]
    fn test_parse_file_path_annotation() {
        let data = r#"{"delta":{"content":[{"index":0,"type":"text","text":{
            "value":"sandbox:/mnt/data/out.csv",
            "annotations":[{"type":"file_path","text":"sandbox:/mnt/data/out.csv",
                "start_index":0,"end_index":25,"file_path":{"file_id":"file-9"}}]}}]}}"#;
        let events = parse_sse_event("thread.message.delta", data).unwrap();
        match &events[0] {
            AssistantEvent::TextDelta { annotations, .. } => assert_eq!(
                annotations,
                &vec![Annotation::FilePath {
                    text: "sandbox:/mnt/data/out.csv".to_string(),
                    file_id: "file-9".to_string(),
                }]
            ),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_parse_citation_annotation_as_other() {
        let data = r#"{"delta":{"content":[{"type":"text","text":{"value":"[1]",
            "annotations":[{"type":"file_citation","text":"[1]","file_citation":{"file_id":"f"}}]}}]}}"#;
        let events = parse_sse_event("thread.message.delta", data).unwrap();
        assert!(matches!(
            &events[0],
            AssistantEvent::TextDelta { annotations, .. }
                if annotations == &vec![Annotation::Other { kind: "file_citation".to_string() }]
        ));
    }

    #[test]
    fn test_parse_image_file_delta() {
        let data = r#"{"delta":{"content":[{"index":1,"type":"image_file","image_file":{"file_id":"file-img"}}]}}"#;
        let events = parse_sse_event("thread.message.delta", data).unwrap();
        assert_eq!(
            events,
            vec![AssistantEvent::ImageFileDone {
                file_id: "file-img".to_string()
            }]
        );
    }

    #[test]
    fn test_unknown_content_part_is_skipped() {
        let data = r#"{"delta":{"content":[{"type":"image_url","image_url":{"url":"x"}}]}}"#;
        assert!(parse_sse_event("thread.message.delta", data).unwrap().is_empty());
    }
}
