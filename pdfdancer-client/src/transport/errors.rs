//! Mapping of non-success responses to client errors.

use serde_json::Value;

use crate::error::PdfDancerError;

/// Best human-readable message from an error body.
///
/// Prefers `_embedded.errors[*].message` (joined with `"; "`), then a
/// top-level `message`, then the raw body, then `HTTP <status>`.
pub(crate) fn extract_error_message(status: u16, body: &[u8]) -> String {
    if let Ok(value) = serde_json::from_slice::<Value>(body) {
        let embedded: Vec<&str> = value
            .pointer("/_embedded/errors")
            .and_then(Value::as_array)
            .map(|errors| {
                errors
                    .iter()
                    .filter_map(|error| error.get("message").and_then(Value::as_str))
                    .collect()
            })
            .unwrap_or_default();
        if !embedded.is_empty() {
            return embedded.join("; ");
        }
        if let Some(message) = value.get("message").and_then(Value::as_str) {
            return message.to_string();
        }
    }

    let text = String::from_utf8_lossy(body);
    if text.trim().is_empty() {
        format!("HTTP {}", status)
    } else {
        text.into_owned()
    }
}

/// Message of a `FontNotFoundException` payload, if the body is one
fn font_not_found_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    if value.get("error").and_then(Value::as_str) != Some("FontNotFoundException") {
        return None;
    }
    Some(
        value
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("Font not found")
            .to_string(),
    )
}

/// Classify a non-success, non-429 response
pub(crate) fn error_for_status(status: u16, body: &[u8]) -> PdfDancerError {
    if status == 404
        && let Some(message) = font_not_found_message(body)
    {
        return PdfDancerError::FontNotFound { message };
    }

    let message = extract_error_message(status, body);
    match status {
        401 | 403 => PdfDancerError::Authentication { message },
        _ => PdfDancerError::Http { status, message },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_errors_are_joined() {
        let body = br#"{"_embedded": {"errors": [{"message": "bad x"}, {"message": "bad y"}]}, "message": "top"}"#;
        assert_eq!(extract_error_message(400, body), "bad x; bad y");
    }

    #[test]
    fn test_message_fallbacks() {
        assert_eq!(
            extract_error_message(400, br#"{"message": "Invalid page"}"#),
            "Invalid page"
        );
        assert_eq!(
            extract_error_message(400, br#"{"_embedded": {"errors": []}}"#),
            r#"{"_embedded": {"errors": []}}"#
        );
        assert_eq!(extract_error_message(502, b"Bad Gateway"), "Bad Gateway");
        assert_eq!(extract_error_message(500, b""), "HTTP 500");
    }

    #[test]
    fn test_font_not_found_needs_payload_marker() {
        let body = br#"{"error": "FontNotFoundException", "message": "Font not found: Comic"}"#;
        assert!(matches!(
            error_for_status(404, body),
            PdfDancerError::FontNotFound { message } if message == "Font not found: Comic"
        ));

        let generic = br#"{"error": "NotFound", "message": "No such session"}"#;
        assert!(matches!(
            error_for_status(404, generic),
            PdfDancerError::Http { status: 404, .. }
        ));
    }

    #[test]
    fn test_auth_statuses() {
        let err = error_for_status(401, br#"{"message": "token expired"}"#);
        assert!(matches!(err, PdfDancerError::Authentication { .. }));
        assert!(err.to_string().contains("token expired"));
        assert!(matches!(
            error_for_status(403, b""),
            PdfDancerError::Authentication { .. }
        ));
    }
}
