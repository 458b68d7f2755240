// Response classification: turns a non-success status code into a
// human-readable category and digs the server's own explanation out of
// the error body when the body is JSON.

use serde_json::Value;
use std::fmt;

/// Broad reason a request was rejected, derived from the status code alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    InvalidParameters,
    InvalidCredential,
    InsufficientPermission,
    NotFound,
    Conflict,
    ValidationFailed,
    RateLimited,
    ServerFailure,
    Unknown,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::InvalidParameters => "invalid parameters",
            ErrorCategory::InvalidCredential => "invalid credential",
            ErrorCategory::InsufficientPermission => "insufficient permission",
            ErrorCategory::NotFound => "not found",
            ErrorCategory::Conflict => "conflict (duplicate name)",
            ErrorCategory::ValidationFailed => "validation failed",
            ErrorCategory::RateLimited => "rate limited",
            ErrorCategory::ServerFailure => "server-side failure",
            ErrorCategory::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a status code to its category. Anything not in the table is `Unknown`.
pub fn classify(status_code: u16) -> ErrorCategory {
    match status_code {
        400 => ErrorCategory::InvalidParameters,
        401 => ErrorCategory::InvalidCredential,
        403 => ErrorCategory::InsufficientPermission,
        404 => ErrorCategory::NotFound,
        409 => ErrorCategory::Conflict,
        422 => ErrorCategory::ValidationFailed,
        429 => ErrorCategory::RateLimited,
        500 | 502 | 503 => ErrorCategory::ServerFailure,
        _ => ErrorCategory::Unknown,
    }
}

/// What could be recovered from an error body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractedMessage {
    /// The body was empty; nothing to show.
    Empty,
    /// The body parsed as a JSON object. Either field may be missing.
    Structured {
        message: Option<String>,
        error: Option<String>,
    },
    /// The body was not a JSON object; callers should show it raw.
    Unstructured,
}

/// Look for a "message" and an "error" field in a JSON error body.
pub fn extract_message(body: &str) -> ExtractedMessage {
    if body.trim().is_empty() {
        return ExtractedMessage::Empty;
    }
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => ExtractedMessage::Structured {
            message: map.get("message").and_then(field_text),
            error: map.get("error").and_then(field_text),
        },
        _ => ExtractedMessage::Unstructured,
    }
}

// Servers sometimes put an object under "error"; render it compactly.
fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
