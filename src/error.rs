// Error types for the folder client. The HTTP layer only knows about
// transport failures; everything the API itself rejects becomes an
// `ApiFailure` carrying the classified status and whatever the server said.

use crate::classify::{classify, extract_message, ErrorCategory, ExtractedMessage};
use crate::http::{ApiResult, RequestSummary};
use std::fmt;
use thiserror::Error;

/// Connection-level failure. A non-2xx status is never a transport error.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else if err.is_builder() {
            TransportError::InvalidRequest(err.to_string())
        } else {
            TransportError::Other(err.to_string())
        }
    }
}

/// A request that reached the server and came back with a non-success status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiFailure {
    pub status_code: u16,
    pub category: ErrorCategory,
    /// The body's "message" field, if any.
    pub message: Option<String>,
    /// The body's "error" field, if any.
    pub details: Option<String>,
    pub raw_body: String,
    /// False when the body could not be parsed as a JSON object.
    pub structured: bool,
    /// The request that was rejected, when known.
    pub request: Option<RequestSummary>,
}

impl ApiFailure {
    pub fn from_result(result: &ApiResult) -> Self {
        let (message, details, structured) = match extract_message(&result.raw_body) {
            ExtractedMessage::Structured { message, error } => (message, error, true),
            ExtractedMessage::Empty => (None, None, true),
            ExtractedMessage::Unstructured => (None, None, false),
        };
        ApiFailure {
            status_code: result.status_code,
            category: classify(result.status_code),
            message,
            details,
            raw_body: result.raw_body.clone(),
            structured,
            request: None,
        }
    }

    pub fn with_request(mut self, request: RequestSummary) -> Self {
        self.request = Some(request);
        self
    }

    /// True when the body carried neither a "message" nor an "error" field,
    /// so the raw body is the only explanation available.
    pub fn needs_raw_body(&self) -> bool {
        self.message.is_none() && self.details.is_none() && !self.raw_body.trim().is_empty()
    }

    /// Best single-line explanation: the server's message, then its error
    /// field, then the raw body.
    pub fn summary(&self) -> &str {
        self.message
            .as_deref()
            .or(self.details.as_deref())
            .unwrap_or(self.raw_body.as_str())
    }
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "request failed with status {} ({}): {}",
            self.status_code,
            self.category,
            self.summary()
        )
    }
}

#[derive(Debug, Error)]
pub enum FolderError {
    #[error("{field} cannot be empty")]
    Validation { field: &'static str },

    #[error("no folder id available; create a folder first or enter a folder id")]
    NoDefaultFolder,

    #[error("network error: {0}")]
    Transport(#[from] TransportError),

    #[error("{0}")]
    Api(ApiFailure),

    #[error("failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FolderError>;
