//! Account directory seam
//!
//! The identity service is reached through [`AccountDirectory`]. The REST
//! client ([`crate::auth::Auth`]) and the in-memory directory
//! ([`crate::auth::memory::InMemoryDirectory`]) both implement it.

use crate::auth::types::{AccountRecord, DecodedToken};
use crate::error::ServiceError;
use async_trait::async_trait;

/// Remote account directory
///
/// Implementations report failures as the identity service does. Callers get
/// those errors unchanged; nothing is retried or normalized here.
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// Creates an account and returns its uid.
    ///
    /// # Errors
    ///
    /// `EmailAlreadyExists`, `InvalidEmail` or `WeakPassword` when the service
    /// rejects the request.
    async fn create_account(&self, email: &str, password: &str) -> Result<String, ServiceError>;

    /// Looks up the account registered under `email`.
    ///
    /// # Errors
    ///
    /// `UserNotFound` when no account matches.
    async fn get_account_by_email(&self, email: &str) -> Result<AccountRecord, ServiceError>;

    /// Verifies a bearer token and returns its claims.
    ///
    /// # Errors
    ///
    /// `InvalidIdToken` or `TokenExpired` on any verification failure.
    async fn verify_id_token(&self, token: &str) -> Result<DecodedToken, ServiceError>;

    /// Deletes the account with the given uid.
    async fn delete_account(&self, uid: &str) -> Result<(), ServiceError>;
}
