//! Account operations over an [`AccountDirectory`]

use crate::auth::directory::AccountDirectory;
use crate::auth::types::{AccountRecord, DecodedToken};
use crate::error::{AuthError, ServiceError};
use std::sync::Arc;

/// Account directory adapter
///
/// Translates local calls into directory calls. The only local checks are
/// for required fields; everything else is decided by the directory and its
/// errors are returned unchanged.
#[derive(Clone)]
pub struct AccountService {
    directory: Arc<dyn AccountDirectory>,
}

impl AccountService {
    /// Create a service over a directory
    pub fn new(directory: Arc<dyn AccountDirectory>) -> Self {
        Self { directory }
    }

    /// Underlying directory
    pub fn directory(&self) -> &Arc<dyn AccountDirectory> {
        &self.directory
    }

    /// Create an account and return its uid
    ///
    /// # Example
    /// ```no_run
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// use std::sync::Arc;
    /// use firebase_account_profiles::auth::{AccountService, InMemoryDirectory};
    ///
    /// let accounts = AccountService::new(Arc::new(InMemoryDirectory::new("demo-project")));
    /// let uid = accounts.register("alice@example.com", "secret1").await?;
    /// println!("Created account: {}", uid);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn register(&self, email: &str, password: &str) -> Result<String, ServiceError> {
        require_email(email)?;
        if password.is_empty() {
            return Err(AuthError::MissingPassword.into());
        }

        let uid = self.directory.create_account(email, password).await?;
        tracing::info!(%uid, "account registered");
        Ok(uid)
    }

    /// Look up the account registered under `email`
    ///
    /// # Errors
    /// `UserNotFound` when no account matches.
    pub async fn find_by_email(&self, email: &str) -> Result<AccountRecord, ServiceError> {
        require_email(email)?;
        self.directory.get_account_by_email(email).await
    }

    /// Verify a bearer token and return its claims
    ///
    /// # Errors
    /// `InvalidIdToken` or `TokenExpired`; no claims are returned on failure.
    pub async fn verify_token(&self, token: &str) -> Result<DecodedToken, ServiceError> {
        if token.trim().is_empty() {
            return Err(AuthError::InvalidIdToken.into());
        }
        let decoded = self.directory.verify_id_token(token).await?;
        tracing::debug!(uid = %decoded.uid, "token verified");
        Ok(decoded)
    }

    /// Delete the account registered under `email`
    ///
    /// The lookup and the delete fail independently. The profile document of
    /// the account is left in place.
    pub async fn delete_by_email(&self, email: &str) -> Result<(), ServiceError> {
        let account = self.find_by_email(email).await?;
        self.directory.delete_account(&account.uid).await?;
        tracing::info!(uid = %account.uid, "account deleted");
        Ok(())
    }

    /// Resolve the uid behind `email`
    pub(crate) async fn resolve_uid(&self, email: &str) -> Result<String, ServiceError> {
        Ok(self.find_by_email(email).await?.uid)
    }
}

fn require_email(email: &str) -> Result<(), ServiceError> {
    if email.trim().is_empty() {
        return Err(AuthError::InvalidEmail.into());
    }
    Ok(())
}

impl std::fmt::Debug for AccountService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountService").finish_non_exhaustive()
    }
}
