//! Error types for the posts client.
//!
//! # Design
//! The `Display` text of every `ApiError` is shown to the user as-is in the
//! `Error` UI state, so messages are written for people rather than for
//! matching. Callers that need the category match on the variant instead.

use thiserror::Error;

/// A failure below HTTP: connectivity, DNS, timeout, or an interrupted body.
///
/// Requests the transport could not even construct (a malformed URL, say)
/// are flagged separately; they are not network failures.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
    invalid_request: bool,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            invalid_request: false,
        }
    }

    /// The request was rejected before anything was sent.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            invalid_request: true,
        }
    }

    pub fn is_invalid_request(&self) -> bool {
        self.invalid_request
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Outcome categories of a failed `fetch_posts` round trip.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered 2xx but sent no payload.
    #[error("empty response from server")]
    EmptyBody,

    /// The server returned a non-2xx status.
    #[error("{}", server_message(.status, .body))]
    Server { status: u16, body: String },

    /// No response was received at all.
    #[error("network error: {0}")]
    Network(TransportError),

    /// The request could not be built, so nothing reached the network.
    #[error("unknown error: invalid request: {0}")]
    InvalidRequest(TransportError),

    /// The payload was present but is not a list of posts.
    #[error("unknown error: {0}")]
    Deserialization(String),
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        if err.is_invalid_request() {
            ApiError::InvalidRequest(err)
        } else {
            ApiError::Network(err)
        }
    }
}

impl ApiError {
    /// HTTP status of a server error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Prefer the server's own error text; fall back to the status code.
fn server_message(status: &u16, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        format!("unexpected server error: HTTP {status}")
    } else {
        body.to_string()
    }
}
