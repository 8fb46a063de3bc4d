//! Error types
//!
//! Provides a unified error type hierarchy for account and profile operations.
//!
//! # REST Reference
//! - Identity Toolkit error body: `{"error": {"code": 400, "message": "EMAIL_EXISTS"}}`
//! - Realtime Database error body: `{"error": "Permission denied"}`
//!
//! # Design
//! Uses thiserror for ergonomic error definitions. All errors implement
//! std::error::Error and can be converted to ServiceError via From trait.
//! Remote errors are surfaced as they were reported; nothing is retried.

use std::time::Duration;
use thiserror::Error;

/// Top-level error type
///
/// Wraps module-specific errors (Auth, Database, Validation) into a unified type.
///
/// # Example
/// ```
/// use firebase_account_profiles::{ServiceError, AuthError};
///
/// let err: ServiceError = AuthError::UserNotFound.into();
/// assert!(err.is_not_found());
/// ```
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Failure reported by the identity service
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Failure reported by the profile database
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Local precondition failure, raised before any remote call
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The wait for a single-shot read ended without the read reporting back
    #[error("Wait for database read was interrupted")]
    InterruptedWait,

    /// The single-shot read did not report back within the configured timeout
    #[error("Database read timed out after {0:?}")]
    ReadTimedOut(Duration),

    /// Network/HTTP errors
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid or incomplete configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),

    /// API key not configured
    #[error("API key not configured")]
    ApiKeyNotConfigured,
}

/// Identity service errors
///
/// Maps Identity Toolkit error codes to Rust enum variants.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No account matches the given email or uid
    #[error("User not found")]
    UserNotFound,

    /// Another account already uses this email
    #[error("Email already exists")]
    EmailAlreadyExists,

    /// Email address is missing or malformed
    #[error("Invalid email address")]
    InvalidEmail,

    /// Password rejected by the password policy
    #[error("Weak password: {0}")]
    WeakPassword(String),

    /// Password is missing
    #[error("Missing password")]
    MissingPassword,

    /// Bearer token is malformed, has a bad signature or was revoked
    #[error("Invalid ID token")]
    InvalidIdToken,

    /// Bearer token is past its expiry
    #[error("ID token expired")]
    TokenExpired,

    /// User account has been disabled
    #[error("User account disabled")]
    UserDisabled,

    /// Too many requests
    #[error("Too many requests, try again later")]
    TooManyRequests,

    /// Operation not allowed (e.g., provider disabled)
    #[error("Operation not allowed")]
    OperationNotAllowed,

    /// Invalid API key
    #[error("Invalid API key")]
    InvalidApiKey,

    /// Admin credentials lack permission for the operation
    #[error("Permission denied")]
    PermissionDenied,

    /// Any other code reported by the identity service, kept verbatim
    #[error("Identity service error: {0}")]
    Remote(String),
}

/// Profile database errors
///
/// These are the reasons a single-shot read can be cancelled, and the reasons
/// an acknowledged write can fail.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DatabaseError {
    /// Security rules or credentials rejected the operation
    #[error("Permission denied")]
    PermissionDenied,

    /// Connection to the database was lost or never established
    #[error("Disconnected: {0}")]
    Disconnected(String),

    /// Database temporarily unavailable
    #[error("Service unavailable")]
    Unavailable,

    /// Path is not a valid database location
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Any other failure reported by the database
    #[error("Database failure: {0}")]
    Other(String),
}

/// Local validation errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Profile carries more tags than allowed
    #[error("A profile can have at most {max} tags, got {count}")]
    TooManyTags {
        /// Number of tags supplied
        count: usize,
        /// Maximum allowed
        max: usize,
    },
}

impl ServiceError {
    /// Create an internal error from a string
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Create a configuration error from a string
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Check if error means the account does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Auth(AuthError::UserNotFound))
    }

    /// Check if error is retryable
    ///
    /// Nothing in this crate retries; this is a hint for callers.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_)
            | Self::ReadTimedOut(_)
            | Self::Auth(AuthError::TooManyRequests)
            | Self::Database(DatabaseError::Unavailable)
            | Self::Database(DatabaseError::Disconnected(_)) => true,
            _ => false,
        }
    }

    /// Check if error indicates the caller must authenticate again
    pub fn requires_auth(&self) -> bool {
        matches!(
            self,
            Self::Auth(AuthError::InvalidIdToken)
                | Self::Auth(AuthError::TokenExpired)
                | Self::Auth(AuthError::UserDisabled)
        )
    }
}

impl AuthError {
    /// Create from Identity Toolkit REST API error message
    ///
    /// Messages look like `CODE` or `CODE : human readable detail`. Codes this
    /// crate does not know are kept verbatim in [`AuthError::Remote`].
    pub fn from_error_code(message: &str) -> Self {
        let (code, detail) = match message.split_once(" : ") {
            Some((code, detail)) => (code.trim(), detail.trim()),
            None => (message.trim(), ""),
        };
        match code {
            "USER_NOT_FOUND" | "EMAIL_NOT_FOUND" => Self::UserNotFound,
            "EMAIL_EXISTS" | "DUPLICATE_EMAIL" => Self::EmailAlreadyExists,
            "INVALID_EMAIL" | "MISSING_EMAIL" => Self::InvalidEmail,
            "WEAK_PASSWORD" => Self::WeakPassword(detail.to_string()),
            "MISSING_PASSWORD" => Self::MissingPassword,
            "INVALID_ID_TOKEN" | "MISSING_ID_TOKEN" | "INVALID_IDP_RESPONSE" => Self::InvalidIdToken,
            "TOKEN_EXPIRED" | "USER_TOKEN_EXPIRED" => Self::TokenExpired,
            "USER_DISABLED" => Self::UserDisabled,
            "TOO_MANY_ATTEMPTS_TRY_LATER" | "QUOTA_EXCEEDED" => Self::TooManyRequests,
            "OPERATION_NOT_ALLOWED" => Self::OperationNotAllowed,
            "INVALID_API_KEY" | "API_KEY_INVALID" => Self::InvalidApiKey,
            "PERMISSION_DENIED" | "INSUFFICIENT_PERMISSION" => Self::PermissionDenied,
            _ => Self::Remote(message.to_string()),
        }
    }
}

impl DatabaseError {
    /// Create from a Realtime Database REST status and error body
    pub fn from_status(status: u16, message: &str) -> Self {
        match status {
            401 | 403 => Self::PermissionDenied,
            404 => Self::InvalidPath(message.to_string()),
            429 | 503 => Self::Unavailable,
            _ => Self::Other(format!("HTTP {}: {}", status, message)),
        }
    }
}
