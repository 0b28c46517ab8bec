//! # API Error Types
//!
//! Error types for session and API operations.
//!
//! Every failure carries a kind so screens can branch on it instead of
//! pattern-matching message strings:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       API Error Categories                              │
//! │                                                                         │
//! │  Session-fatal          Retryable             Caught pre-network        │
//! │  ─────────────          ─────────             ──────────────────        │
//! │  NoSession              Network               Rule (CoreError)          │
//! │  SessionExpired         Timeout                                         │
//! │                                                                         │
//! │  Surfaced as-is: Api { status, body }, Decode, Storage, TokenDecode    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use keylimar_core::CoreError;

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors produced by the session manager, HTTP client and workflow.
#[derive(Debug, Error)]
pub enum ApiError {
    // =========================================================================
    // Session Errors
    // =========================================================================
    /// No tokens are stored; the caller must route to the login screen.
    #[error("no active session; login is required")]
    NoSession,

    /// The session became invalid (expired refresh, 401/403 from the
    /// backend). Fatal for the current session; a new login is required.
    #[error("session expired: {0}")]
    SessionExpired(String),

    /// The access token could not be decoded at all.
    #[error("malformed access token: {0}")]
    TokenDecode(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// Connection-level failure (DNS, refused, reset).
    #[error("network error: {0}")]
    Network(String),

    /// The request timed out.
    #[error("request timed out")]
    Timeout,

    /// Invalid endpoint URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    // =========================================================================
    // Backend Errors
    // =========================================================================
    /// Non-2xx response that is not an auth failure. The body text is kept
    /// verbatim for the error toast.
    #[error("backend returned {status}: {body}")]
    Api { status: u16, body: String },

    /// 2xx response whose body did not match the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),

    // =========================================================================
    // Local Errors
    // =========================================================================
    /// Token store I/O failure.
    #[error("token storage error: {0}")]
    Storage(String),

    /// A business rule rejected the operation before any request was sent.
    #[error(transparent)]
    Rule(#[from] CoreError),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

impl From<url::ParseError> for ApiError {
    fn from(err: url::ParseError) -> Self {
        ApiError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::Storage(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for ApiError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        ApiError::TokenDecode(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl ApiError {
    /// True when the current session is unrecoverable and the UI must
    /// route to login.
    pub fn is_session_fatal(&self) -> bool {
        matches!(self, ApiError::NoSession | ApiError::SessionExpired(_))
    }

    /// True for transient transport failures worth retrying (reads only;
    /// mutations are never retried automatically).
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::Timeout)
    }

    /// True when the error was raised by a client-side rule before any
    /// network call; suitable for inline display next to the offending
    /// form field.
    pub fn is_rule(&self) -> bool {
        matches!(self, ApiError::Rule(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_fatal_categorization() {
        assert!(ApiError::NoSession.is_session_fatal());
        assert!(ApiError::SessionExpired("401".into()).is_session_fatal());
        assert!(!ApiError::Timeout.is_session_fatal());
    }

    #[test]
    fn test_retryable_categorization() {
        assert!(ApiError::Network("reset".into()).is_retryable());
        assert!(ApiError::Timeout.is_retryable());
        assert!(!ApiError::Api {
            status: 500,
            body: "boom".into()
        }
        .is_retryable());
        assert!(!ApiError::SessionExpired("401".into()).is_retryable());
    }

    #[test]
    fn test_rule_errors_pass_through_message() {
        let err: ApiError = CoreError::EmptyCart.into();
        assert!(err.is_rule());
        assert_eq!(err.to_string(), "cannot create a sale without line items");
    }
}
