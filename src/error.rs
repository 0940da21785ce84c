// Error handling module
// Defines the failure taxonomy surfaced by the request pipeline

use thiserror::Error;

/// Errors that can occur while carrying a request through the pipeline.
///
/// The enum is `Clone` because the refresh coordinator broadcasts one
/// outcome to every waiter of an in-flight refresh.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuthError {
    /// Session check reported the session is no longer valid
    #[error("session is not authenticated")]
    Unauthenticated,

    /// Token issuance endpoint failed during preflight
    #[error("token issuance failed: {0}")]
    IssuanceFailed(String),

    /// Token refresh failed while recovering from a 401/403
    #[error("token refresh failed: {0}")]
    RefreshFailed(String),

    /// A protected request came back 401/403 even after a refreshed retry
    #[error("authorization failed with status {status}")]
    AuthorizationFailed { status: u16 },

    /// Non-success response from an identity endpoint
    #[error("identity endpoint error: {status} - {message}")]
    Upstream { status: u16, message: String },

    /// Connection-level failure; never inspected beyond the message
    #[error("transport error: {0}")]
    Transport(String),
}

impl AuthError {
    /// Classify a transport-level reqwest failure.
    pub fn transport(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            "timeout"
        } else if err.is_connect() {
            "connection_failed"
        } else if err.is_request() {
            "request_error"
        } else if err.is_body() {
            "body_error"
        } else if err.is_decode() {
            "decode_error"
        } else {
            "unknown"
        };

        AuthError::Transport(format!("{} (kind: {})", err, kind))
    }
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, AuthError>;
