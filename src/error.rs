// src/error.rs
//! Application error types with structured error handling.
//!
//! Three families of failure reach callers: input rejected before any
//! request ([`ValidationError`]), a non-2xx answer from Notion
//! ([`RemoteError`]), and a transport failure ([`AppError::Connection`]).

use crate::types::ValidationError;
use std::fmt;
use thiserror::Error;

/// Notion API error codes as a typed vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotionErrorCode {
    /// API rate limit exceeded; back off and retry
    RateLimited,
    /// The requested object does not exist or is inaccessible
    ObjectNotFound,
    /// API key is invalid or expired
    Unauthorized,
    /// API key lacks permission for this resource
    RestrictedResource,
    /// Request body contains invalid JSON
    InvalidJson,
    /// Request parameters failed Notion's validation
    ValidationFailed,
    /// Conflict with current state of the resource
    Conflict,
    /// Notion internal server error
    InternalError,
    /// Notion is temporarily unavailable
    ServiceUnavailable,
    /// HTTP status code fallback when the error body is unparseable
    HttpStatus(u16),
    /// An error code this client doesn't recognize yet
    Unknown(String),
}

impl NotionErrorCode {
    /// Parse a Notion API error code string into the typed vocabulary.
    pub fn from_api_response(code: &str) -> Self {
        match code {
            "rate_limited" => Self::RateLimited,
            "object_not_found" => Self::ObjectNotFound,
            "unauthorized" => Self::Unauthorized,
            "restricted_resource" => Self::RestrictedResource,
            "invalid_json" => Self::InvalidJson,
            "validation_error" => Self::ValidationFailed,
            "conflict_error" => Self::Conflict,
            "internal_server_error" => Self::InternalError,
            "service_unavailable" => Self::ServiceUnavailable,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Create from an HTTP status code when the error body is unparseable.
    pub fn from_http_status(status: u16) -> Self {
        Self::HttpStatus(status)
    }
}

impl fmt::Display for NotionErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RateLimited => write!(f, "rate_limited"),
            Self::ObjectNotFound => write!(f, "object_not_found"),
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::RestrictedResource => write!(f, "restricted_resource"),
            Self::InvalidJson => write!(f, "invalid_json"),
            Self::ValidationFailed => write!(f, "validation_error"),
            Self::Conflict => write!(f, "conflict_error"),
            Self::InternalError => write!(f, "internal_server_error"),
            Self::ServiceUnavailable => write!(f, "service_unavailable"),
            Self::HttpStatus(code) => write!(f, "http_{}", code),
            Self::Unknown(code) => write!(f, "{}", code),
        }
    }
}

/// Coarse classification of a remote failure by HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    /// 401: the integration token was rejected
    Authentication,
    /// 404
    NotFound,
    /// 403: the integration has no access to the object
    PermissionDenied,
    /// Any other non-2xx status
    Api,
}

impl RemoteErrorKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => Self::Authentication,
            403 => Self::PermissionDenied,
            404 => Self::NotFound,
            _ => Self::Api,
        }
    }
}

impl fmt::Display for RemoteErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authentication => write!(f, "authentication error"),
            Self::NotFound => write!(f, "not found"),
            Self::PermissionDenied => write!(f, "permission denied"),
            Self::Api => write!(f, "API error"),
        }
    }
}

/// A non-2xx response from Notion.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Notion {kind} (HTTP {status}, {code}): {message}")]
pub struct RemoteError {
    pub kind: RemoteErrorKind,
    pub status: u16,
    pub code: NotionErrorCode,
    pub message: String,
    pub request_id: Option<String>,
}

impl RemoteError {
    pub fn new(status: u16, code: NotionErrorCode, message: impl Into<String>) -> Self {
        Self {
            kind: RemoteErrorKind::from_status(status),
            status,
            code,
            message: message.into(),
            request_id: None,
        }
    }

    /// Whether a retry could plausibly succeed.
    ///
    /// Server-side failures and rate limiting are transient. Authentication
    /// and every other client error are not.
    pub fn is_transient(&self) -> bool {
        self.status >= 500 || self.status == 429 || self.code == NotionErrorCode::RateLimited
    }
}

/// Main application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),
}

impl AppError {
    /// Whether the retry policy should try this call again.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::Connection(_) => true,
            AppError::Remote(remote) => remote.is_transient(),
            _ => false,
        }
    }

    /// Notion refused the call for rate limiting, so it was never applied.
    pub fn is_rate_limited(&self) -> bool {
        self.remote().is_some_and(|remote| {
            remote.status == 429 || remote.code == NotionErrorCode::RateLimited
        })
    }

    /// The remote failure, if this error came from Notion.
    pub fn remote(&self) -> Option<&RemoteError> {
        match self {
            AppError::Remote(remote) => Some(remote),
            _ => None,
        }
    }

    /// The validation failure, if the input was rejected locally.
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            AppError::Validation(validation) => Some(validation),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            AppError::MissingConfiguration(format!("Invalid request: {}", err))
        } else if err.is_decode() {
            AppError::MalformedResponse(err.to_string())
        } else {
            AppError::Connection(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::MalformedResponse(err.to_string())
    }
}

/// Result type alias for convenience
pub type Result<T, E = AppError> = std::result::Result<T, E>;
