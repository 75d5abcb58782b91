//! Conversion of a provider message list into display messages.

use serde_json::Value;

use crate::models::{classify_role, Message, Role};
use crate::reconciler::file_url;

/// Build display messages from a `GET /threads/{id}/messages` payload.
///
/// User messages keep their role; everything else is classified from its
/// text, so a hydrated history may show `Code` messages that were streamed
/// as plain assistant text. Image parts become markdown image references
/// pointing at the local file route.
pub fn messages_from_list(list: &Value) -> Vec<Message> {
    let Some(data) = list.get("data").and_then(Value::as_array) else {
        return Vec::new();
    };

    data.iter()
        .filter_map(|entry| {
            let role = entry.get("role").and_then(Value::as_str).unwrap_or("assistant");
            let text = content_text(entry.get("content")?);
            let role = if role == "user" {
                Role::User
            } else {
                classify_role(&text)
            };
            Some(Message::new(role, text))
        })
        .collect()
}

fn content_text(content: &Value) -> String {
    // Older payloads carry a bare string
    if let Some(text) = content.as_str() {
        return text.to_string();
    }

    let mut text = String::new();
    for part in content.as_array().into_iter().flatten() {
        match part.get("type").and_then(Value::as_str) {
            Some("text") => {
                let value = part
                    .pointer("/text/value")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                text.push_str(value);
            }
            Some("image_file") => {
                if let Some(file_id) = part.pointer("/image_file/file_id").and_then(Value::as_str) {
                    text.push_str(&format!("\n![{}]({})\n", file_id, file_url(file_id)));
                }
            }
            _ => {}
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_messages_from_list_keeps_order_and_roles() {
        let list = json!({
            "data": [
                {"role": "user", "content": [{"type": "text", "text": {"value": "def f(): pass", "annotations": []}}]},
                {"role": "assistant", "content": [{"type": "text", "text": {"value": "Sure thing", "annotations": []}}]},
                {"role": "assistant", "content": [{"type": "text", "text": {"value": "```py\nprint(1)\n```", "annotations": []}}]}
            ]
        });

        let messages = messages_from_list(&list);

        assert_eq!(messages.len(), 3);
        // user text is never reclassified
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[2].role, Role::Code);
    }

    #[test]
    fn test_image_parts_become_file_links() {
        let list = json!({
            "data": [
                {"role": "assistant", "content": [
                    {"type": "text", "text": {"value": "Chart:", "annotations": []}},
                    {"type": "image_file", "image_file": {"file_id": "file_9"}}
                ]}
            ]
        });

        let messages = messages_from_list(&list);
        assert!(messages[0].text.contains("/api/files/file_9"));
        assert!(messages[0].text.starts_with("Chart:"));
    }

    #[test]
    fn test_missing_data_yields_empty() {
        assert!(messages_from_list(&json!({"object": "list"})).is_empty());
        assert!(messages_from_list(&json!([])).is_empty());
    }
}
