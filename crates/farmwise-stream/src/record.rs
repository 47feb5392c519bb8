use crate::errors::RecordError;

/// Prefix that marks a line as carrying a record payload.
pub const DATA_PREFIX: &str = "data: ";

/// Payload that marks the normal end of the stream.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Extracts `choices[0].delta.content` from a record payload.
///
/// Returns `Ok(None)` when the payload is valid JSON without that field, or
/// when the field is not a string or is empty. The chunk shape is read
/// loosely so that role announcements, finish chunks and vendor extras are
/// skipped instead of rejected.
///
/// ```
/// use farmwise_stream::parse_delta_content;
///
/// let text = parse_delta_content(r#"{"choices":[{"delta":{"content":"hi"}}]}"#).unwrap();
/// assert_eq!(text.as_deref(), Some("hi"));
/// assert_eq!(parse_delta_content(r#"{"choices":[]}"#).unwrap(), None);
/// assert!(parse_delta_content(r#"{"choices":[{"del"#).unwrap_err().is_incomplete());
/// ```
pub fn parse_delta_content(payload: &str) -> Result<Option<String>, RecordError> {
    let value: serde_json::Value = serde_json::from_str(payload).map_err(RecordError::from_json)?;
    let content = value
        .pointer("/choices/0/delta/content")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned);
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_nested_content() {
        let payload = serde_json::json!({
            "id": "chatcmpl-1",
            "choices": [{"index": 0, "delta": {"content": "Mulch"}, "finish_reason": null}]
        })
        .to_string();
        assert_eq!(
            parse_delta_content(&payload).expect("parse").as_deref(),
            Some("Mulch")
        );
    }

    #[test]
    fn missing_or_empty_content_is_none() {
        for payload in [
            r#"{"choices":[{"delta":{"role":"assistant"}}]}"#,
            r#"{"choices":[{"delta":{"content":""}}]}"#,
            r#"{"choices":[{"delta":{"content":null}}]}"#,
            r#"{"choices":[{"delta":{"content":7}}]}"#,
            r#"{"choices":null}"#,
            r#"{}"#,
            r#"42"#,
        ] {
            assert_eq!(parse_delta_content(payload).expect(payload), None, "{payload}");
        }
    }

    #[test]
    fn only_first_choice_is_read() {
        let payload = r#"{"choices":[{"delta":{}},{"delta":{"content":"second"}}]}"#;
        assert_eq!(parse_delta_content(payload).expect("parse"), None);
    }

    #[test]
    fn truncated_payload_is_incomplete() {
        let err = parse_delta_content(r#"{"choices":[{"delta""#).expect_err("truncated");
        assert!(err.is_incomplete());
    }

    #[test]
    fn garbage_payload_is_malformed() {
        let err = parse_delta_content("not json").expect_err("garbage");
        assert!(matches!(err, RecordError::Malformed(_)));
    }
}
