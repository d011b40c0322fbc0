//! Handler error type.
//!
//! [`HandlerError`] is what a handler (or a middleware acting on its behalf)
//! returns when it cannot produce a response. The router never inspects it;
//! it propagates out of dispatch to the transport, which renders it with
//! [`HandlerError::into_response`].

use std::time::Duration;

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Response, ResponseExt};

/// Result type returned by handlers.
pub type HandlerResult = Result<Response, HandlerError>;

/// Errors a handler can signal instead of returning a response.
///
/// # Example
///
/// ```
/// use hodos_core::HandlerError;
/// use http::StatusCode;
///
/// let err = HandlerError::not_found("user 42");
/// assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
/// assert_eq!(err.code(), "NOT_FOUND");
/// ```
#[derive(Error, Debug)]
pub enum HandlerError {
    /// The request was malformed.
    #[error("bad request: {message}")]
    BadRequest {
        /// Human-readable error message.
        message: String,
    },

    /// A resource addressed by the request does not exist.
    #[error("not found: {message}")]
    NotFound {
        /// Human-readable error message.
        message: String,
    },

    /// Any other status the handler wants to report.
    #[error("{status}: {message}")]
    Status {
        /// Status code sent to the client.
        status: StatusCode,
        /// Human-readable error message.
        message: String,
    },

    /// The handler panicked and a recovery middleware caught it.
    #[error("handler panicked: {message}")]
    Panic {
        /// The panic payload, if it was a string.
        message: String,
    },

    /// The handler did not finish within its deadline.
    #[error("handler timed out after {elapsed:?}")]
    Timeout {
        /// The deadline that was exceeded.
        elapsed: Duration,
    },

    /// An internal failure.
    #[error("internal error: {message}")]
    Internal {
        /// Human-readable error message.
        message: String,
    },

    /// An error from application code.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// JSON error envelope sent to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// The error details.
    pub error: ErrorBody,
}

/// Body of an [`ErrorEnvelope`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Stable machine-readable code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

impl HandlerError {
    /// Creates a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Creates an error carrying an explicit status code.
    pub fn status(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    /// Creates a panic error.
    pub fn panic(message: impl Into<String>) -> Self {
        Self::Panic {
            message: message.into(),
        }
    }

    /// Creates a timeout error.
    pub fn timeout(elapsed: Duration) -> Self {
        Self::Timeout { elapsed }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns the HTTP status this error is reported with.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Status { status, .. } => *status,
            Self::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            Self::Panic { .. } | Self::Internal { .. } | Self::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the stable machine-readable code for this error.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => "BAD_REQUEST",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Status { .. } => "HANDLER_ERROR",
            Self::Panic { .. } => "HANDLER_PANIC",
            Self::Timeout { .. } => "HANDLER_TIMEOUT",
            Self::Internal { .. } | Self::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// Builds the client-facing envelope.
    ///
    /// Panic and internal error details are not exposed to clients.
    #[must_use]
    pub fn to_envelope(&self) -> ErrorEnvelope {
        let message = match self {
            Self::Panic { .. } | Self::Internal { .. } | Self::Other(_) => {
                "internal server error".to_string()
            }
            Self::BadRequest { message }
            | Self::NotFound { message }
            | Self::Status { message, .. } => message.clone(),
            Self::Timeout { .. } => self.to_string(),
        };

        ErrorEnvelope {
            error: ErrorBody {
                code: self.code().to_string(),
                message,
            },
        }
    }

    /// Renders this error as a JSON response.
    #[must_use]
    pub fn into_response(self) -> Response {
        Response::json(self.status_code(), &self.to_envelope())
    }
}

impl From<StatusCode> for HandlerError {
    fn from(status: StatusCode) -> Self {
        Self::status(status, status.canonical_reason().unwrap_or("error"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            HandlerError::bad_request("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            HandlerError::timeout(Duration::from_secs(1)).status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            HandlerError::panic("boom").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            HandlerError::from(StatusCode::CONFLICT).status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_envelope_hides_internal_details() {
        let envelope = HandlerError::internal("db password is hunter2").to_envelope();
        assert_eq!(envelope.error.code, "INTERNAL_ERROR");
        assert_eq!(envelope.error.message, "internal server error");
    }

    #[test]
    fn test_envelope_keeps_client_errors() {
        let envelope = HandlerError::bad_request("missing field `name`").to_envelope();
        assert_eq!(envelope.error.code, "BAD_REQUEST");
        assert_eq!(envelope.error.message, "missing field `name`");
    }

    #[test]
    fn test_from_anyhow() {
        let err: HandlerError = anyhow::anyhow!("disk full").into();
        assert_eq!(err.to_string(), "disk full");
        assert_eq!(err.code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_into_response() {
        let response = HandlerError::not_found("user 7").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers().get(http::header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }
}
