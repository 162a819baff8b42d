//! Pull a short suggestion string out of a provider response body.
//!
//! The documented response path is tried first. Providers reshape their
//! payloads, so when that path is missing the body is walked depth-first for
//! the first non-blank string field named `text` or `content`.

use serde_json::Value;

/// Suggestions are cut to this many words.
pub const MAX_WORDS: usize = 4;

/// Nesting limit for the fallback walk.
pub const MAX_SCAN_DEPTH: usize = 8;

const TEXT_FIELDS: &[&str] = &["text", "content"];

/// Extract and sanitise the suggestion text from `body`.
///
/// `pointer` is the provider's documented JSON pointer to the text field.
/// Returns `None` when no usable text exists.
pub fn extract_suggestion(body: &Value, pointer: &str) -> Option<String> {
    body.pointer(pointer)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .or_else(|| find_first_text(body, 0))
        .map(sanitize)
        .filter(|s| !s.is_empty())
}

/// Depth-first search for the first non-blank text field. Fields of an object
/// are checked before its children are descended into.
pub fn find_first_text(value: &Value, depth: usize) -> Option<&str> {
    if depth > MAX_SCAN_DEPTH {
        return None;
    }
    match value {
        Value::Object(map) => TEXT_FIELDS
            .iter()
            .filter_map(|field| map.get(*field).and_then(Value::as_str))
            .find(|s| !s.trim().is_empty())
            .or_else(|| map.values().find_map(|v| find_first_text(v, depth + 1))),
        Value::Array(items) => items.iter().find_map(|v| find_first_text(v, depth + 1)),
        _ => None,
    }
}

/// Collapse line breaks and runs of whitespace, then keep the first
/// [`MAX_WORDS`] words.
pub fn sanitize(raw: &str) -> String {
    raw.split_whitespace()
        .take(MAX_WORDS)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const GEMINI_PATH: &str = "/candidates/0/content/parts/0/text";

    #[test]
    fn documented_path_wins() {
        let body = json!({
            "text": "decoy",
            "candidates": [{"content": {"parts": [{"text": "Grocery\n"}], "role": "model"}}]
        });
        assert_eq!(
            extract_suggestion(&body, GEMINI_PATH).as_deref(),
            Some("Grocery")
        );
    }

    #[test]
    fn falls_back_to_scan_when_shape_changes() {
        let body = json!({
            "output": {"messages": [{"role": "assistant", "content": "transit"}]}
        });
        assert_eq!(
            extract_suggestion(&body, GEMINI_PATH).as_deref(),
            Some("transit")
        );
    }

    #[test]
    fn blank_documented_text_uses_scan() {
        let body = json!({
            "candidates": [{"content": {"parts": [{"text": "   "}, {"text": "health"}]}}]
        });
        assert_eq!(
            extract_suggestion(&body, GEMINI_PATH).as_deref(),
            Some("health")
        );
    }

    #[test]
    fn no_text_anywhere() {
        let body = json!({"candidates": [{"finishReason": "SAFETY"}]});
        assert_eq!(extract_suggestion(&body, GEMINI_PATH), None);
        assert_eq!(extract_suggestion(&json!(null), GEMINI_PATH), None);
        assert_eq!(extract_suggestion(&json!({"text": 42}), GEMINI_PATH), None);
    }

    #[test]
    fn scan_depth_is_bounded() {
        let mut body = json!({"text": "deep"});
        for _ in 0..=MAX_SCAN_DEPTH {
            body = json!({ "next": body });
        }
        assert_eq!(find_first_text(&body, 0), None);

        let shallow = json!({"a": {"b": [{"text": "ok"}]}});
        assert_eq!(find_first_text(&shallow, 0), Some("ok"));
    }

    #[test]
    fn sanitize_truncates_and_flattens() {
        assert_eq!(sanitize("  Food\r\nand   dining  "), "Food and dining");
        assert_eq!(
            sanitize("The category is definitely grocery items"),
            "The category is definitely"
        );
        assert_eq!(sanitize("\n\n"), "");
    }
}
