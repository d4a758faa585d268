//! Content normalizer: any provider response shape in, a canonical ordered
//! list of [`ContentItem`]s out.
//!
//! Accepted shapes:
//! - a list of tagged items (`{"type":"text"|"blob"|"image"|"resource", ...}`),
//! - untyped maps (`{"uri","mimeType","text"|"blob"}` and `{"data","mimeType"}`),
//! - envelopes carrying either of the above under `contents`, `content`, or
//!   `messages` (each message's `content`),
//! - a text item whose payload is itself JSON with a nested `contents` or
//!   `content` list.
//!
//! Items keep the order the provider sent them in. Text holding a nested
//! content list is expanded in place, and only when no blob was found
//! directly. Callers that want the leading image use [`first_blob`].

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{Map, Value};

use crate::types::content::DEFAULT_BLOB_MIME;
use crate::types::ContentItem;

/// Nesting limit for text-encoded content lists.
pub const MAX_DEPTH: usize = 8;

/// Normalize a raw JSON response.
pub fn normalize(raw: &Value) -> Vec<ContentItem> {
    normalize_at(raw, 0)
}

/// Normalize already-typed items with the same expansion rules.
pub fn normalize_items(items: &[ContentItem]) -> Vec<ContentItem> {
    arrange(items.to_vec(), 0)
}

/// The first blob's bytes and MIME type.
pub fn first_blob(items: &[ContentItem]) -> Option<(&[u8], &str)> {
    items.iter().find_map(|item| match item {
        ContentItem::Blob { bytes, mime_type } => Some((bytes.as_slice(), mime_type.as_str())),
        ContentItem::Text { .. } => None,
    })
}

/// All text payloads joined with newlines.
pub fn joined_text(items: &[ContentItem]) -> String {
    items
        .iter()
        .filter_map(ContentItem::as_text)
        .collect::<Vec<_>>()
        .join("\n")
}

fn normalize_at(raw: &Value, depth: usize) -> Vec<ContentItem> {
    let mut items = Vec::new();
    decode_into(raw, &mut items);
    arrange(items, depth)
}

fn arrange(items: Vec<ContentItem>, depth: usize) -> Vec<ContentItem> {
    if items.iter().any(ContentItem::is_blob) || depth >= MAX_DEPTH {
        return items;
    }

    let mut expanded = Vec::with_capacity(items.len());
    for item in items {
        match nested_structure(&item) {
            Some(nested) => expanded.extend(normalize_at(&nested, depth + 1)),
            None => expanded.push(item),
        }
    }
    expanded
}

/// Decode `raw` (an envelope, a list, or a single entry) into `out`.
fn decode_into(raw: &Value, out: &mut Vec<ContentItem>) {
    match raw {
        Value::Array(entries) => {
            for entry in entries {
                if let Some(item) = decode_entry(entry) {
                    out.push(item);
                }
            }
        }
        Value::Object(obj) => {
            if let Some(contents) = obj.get("contents") {
                decode_into(contents, out);
            } else if let Some(content) = obj.get("content") {
                decode_into(content, out);
            } else if let Some(Value::Array(messages)) = obj.get("messages") {
                for message in messages {
                    if let Some(content) = message.get("content") {
                        decode_into(content, out);
                    }
                }
            } else if let Some(item) = decode_map(obj) {
                out.push(item);
            }
        }
        Value::String(text) => out.push(ContentItem::text(text.clone())),
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

/// Decode one list entry; `None` if unrecognisable.
fn decode_entry(entry: &Value) -> Option<ContentItem> {
    match entry {
        Value::Object(obj) => decode_map(obj),
        Value::String(text) => Some(ContentItem::text(text.clone())),
        _ => None,
    }
}

fn decode_map(obj: &Map<String, Value>) -> Option<ContentItem> {
    let str_field = |key: &str| obj.get(key).and_then(Value::as_str);
    let mime = || {
        str_field("mimeType")
            .unwrap_or(DEFAULT_BLOB_MIME)
            .to_string()
    };

    match str_field("type") {
        Some("text") => str_field("text").map(ContentItem::text),
        Some("blob") | Some("image") => {
            let bytes = decode_base64(str_field("data").or_else(|| str_field("blob"))?)?;
            Some(ContentItem::blob(bytes, mime()))
        }
        Some("resource") => obj
            .get("resource")
            .and_then(Value::as_object)
            .and_then(decode_map),
        Some(_) => None,
        None => {
            if let Some(text) = str_field("text") {
                Some(ContentItem::text(text))
            } else if let Some(blob) = str_field("blob") {
                Some(ContentItem::blob(decode_base64(blob)?, mime()))
            } else if let (Some(data), Some(_)) = (str_field("data"), str_field("mimeType")) {
                Some(ContentItem::blob(decode_base64(data)?, mime()))
            } else {
                None
            }
        }
    }
}

fn decode_base64(encoded: &str) -> Option<Vec<u8>> {
    match STANDARD.decode(encoded.trim()) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            tracing::debug!("Dropping blob with invalid base64: {e}");
            None
        }
    }
}

/// JSON structure encoded in a text item that carries a nested content list.
fn nested_structure(item: &ContentItem) -> Option<Value> {
    let text = item.as_text()?.trim();
    if !text.starts_with('{') {
        return None;
    }
    let value: Value = serde_json::from_str(text).ok()?;
    let carries_list = ["contents", "content"]
        .iter()
        .any(|key| matches!(value.get(key), Some(Value::Array(_))));
    carries_list.then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_untyped_resource_contents() {
        let raw = json!({
            "contents": [
                {"uri": "resource://hello", "mimeType": "text/plain", "text": "hi"},
                {"uri": "resource://logo", "mimeType": "image/png", "blob": "AQID"}
            ]
        });
        assert_eq!(
            normalize(&raw),
            vec![
                ContentItem::text("hi"),
                ContentItem::blob(vec![1, 2, 3], "image/png"),
            ]
        );
    }

    #[test]
    fn test_prompt_messages_envelope() {
        let raw = json!({
            "messages": [{"role": "user", "content": {"type": "text", "text": "Hello"}}]
        });
        assert_eq!(normalize(&raw), vec![ContentItem::text("Hello")]);
    }

    #[test]
    fn test_json_text_without_nested_list_stays_text() {
        let raw = json!([{"type": "text", "text": "{\"total\": 3}"}]);
        assert_eq!(normalize(&raw), vec![ContentItem::text("{\"total\": 3}")]);
    }

    #[test]
    fn test_unrecognisable_entries_dropped() {
        let raw = json!([{"type": "video"}, 42, {"type": "text", "text": "kept"}]);
        assert_eq!(normalize(&raw), vec![ContentItem::text("kept")]);
        assert!(normalize(&json!({"unrelated": true})).is_empty());
    }

    #[test]
    fn test_depth_is_bounded() {
        let mut raw = json!({"content": [{"type": "text", "text": "bottom"}]});
        for _ in 0..(MAX_DEPTH + 4) {
            raw = json!({"content": [{"type": "text", "text": raw.to_string()}]});
        }
        let items = normalize(&raw);
        assert_eq!(items.len(), 1);
        assert_ne!(items[0], ContentItem::text("bottom"));
    }

    #[test]
    fn test_helpers() {
        let items = vec![
            ContentItem::text("a"),
            ContentItem::blob(vec![9], "image/png"),
            ContentItem::text("b"),
        ];
        assert_eq!(first_blob(&items), Some((&[9u8][..], "image/png")));
        assert_eq!(joined_text(&items), "a\nb");
    }
}
