//! Shared error type across wakametrics crates.

use thiserror::Error;

/// Stable error codes, mapped to HTTP statuses by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// No authenticated principal.
    Unauthorized,
    /// Principal lacks the required role.
    Forbidden,
    /// Invalid input / malformed config.
    BadRequest,
    /// Unsupported config version.
    UnsupportedVersion,
    /// A backing collaborator failed.
    Upstream,
    /// The request was dropped before collection finished.
    Cancelled,
    /// Internal server error.
    Internal,
}

impl ErrorCode {
    /// String representation used in logs and tests.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::BadRequest => "BAD_REQUEST",
            ErrorCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ErrorCode::Upstream => "UPSTREAM",
            ErrorCode::Cancelled => "CANCELLED",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, MetricsError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    /// Failure reported by a collaborator (store, queue, runtime probe).
    #[error("backend: {0}")]
    Backend(String),
    /// A mandatory collaborator call failed while collecting metrics.
    #[error("{call} failed for user '{user}': {reason}")]
    Upstream {
        call: &'static str,
        user: String,
        reason: String,
    },
    #[error("cancelled")]
    Cancelled,
    #[error("internal: {0}")]
    Internal(String),
}

impl MetricsError {
    /// Wrap a collaborator failure with the call that produced it.
    pub fn upstream(call: &'static str, user: &str, err: impl std::fmt::Display) -> Self {
        MetricsError::Upstream {
            call,
            user: user.to_string(),
            reason: err.to_string(),
        }
    }

    /// Map internal error to a stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            MetricsError::Unauthorized => ErrorCode::Unauthorized,
            MetricsError::Forbidden(_) => ErrorCode::Forbidden,
            MetricsError::BadRequest(_) => ErrorCode::BadRequest,
            MetricsError::UnsupportedVersion => ErrorCode::UnsupportedVersion,
            MetricsError::Backend(_) | MetricsError::Upstream { .. } => ErrorCode::Upstream,
            MetricsError::Cancelled => ErrorCode::Cancelled,
            MetricsError::Internal(_) => ErrorCode::Internal,
        }
    }
}
