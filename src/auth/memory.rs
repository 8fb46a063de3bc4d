//! In-memory account directory
//!
//! Behaves like the identity service for the rules this crate relies on:
//! unique emails, email syntax, the 6 character password minimum, and token
//! expiry. Useful for tests and offline development.

use crate::auth::directory::AccountDirectory;
use crate::auth::types::{encode_jwt, AccountMetadata, AccountRecord, DecodedToken};
use crate::error::{AuthError, ServiceError};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use rand::Rng;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

/// Minimum password length enforced by the identity service
pub const MIN_PASSWORD_LENGTH: usize = 6;

const UID_LENGTH: usize = 28;

/// In-memory [`AccountDirectory`]
#[derive(Debug)]
pub struct InMemoryDirectory {
    project_id: String,
    state: RwLock<DirectoryState>,
}

#[derive(Debug, Default)]
struct DirectoryState {
    accounts: HashMap<String, AccountRecord>,
    uid_by_email: HashMap<String, String>,
    issued_signatures: HashSet<String>,
}

impl InMemoryDirectory {
    /// Create an empty directory for the given project
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            state: RwLock::new(DirectoryState::default()),
        }
    }

    /// Number of accounts currently registered
    pub async fn len(&self) -> usize {
        self.state.read().await.accounts.len()
    }

    /// Whether the directory has no accounts
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Issue an ID token for `uid` valid for `ttl` (negative for an already expired token)
    pub async fn issue_token(&self, uid: &str, ttl: Duration) -> Result<String, ServiceError> {
        let mut state = self.state.write().await;
        let Some(account) = state.accounts.get(uid) else {
            return Err(AuthError::UserNotFound.into());
        };

        let now = Utc::now();
        let expires = now + ttl;
        let issued = expires.min(now);
        let claims = serde_json::json!({
            "iss": format!("https://securetoken.google.com/{}", self.project_id),
            "aud": self.project_id,
            "sub": account.uid,
            "user_id": account.uid,
            "iat": issued.timestamp(),
            "exp": expires.timestamp(),
            "auth_time": issued.timestamp(),
            "email": account.email,
            "email_verified": account.email_verified,
            "firebase": { "sign_in_provider": "password" },
        });

        let signature = uuid::Uuid::new_v4().to_string();
        state.issued_signatures.insert(signature.clone());
        Ok(encode_jwt(&claims, &signature))
    }

    /// Mark an account disabled or enabled
    pub async fn set_disabled(&self, uid: &str, disabled: bool) -> Result<(), ServiceError> {
        let mut state = self.state.write().await;
        let account = state.accounts.get_mut(uid).ok_or(AuthError::UserNotFound)?;
        account.disabled = disabled;
        Ok(())
    }
}

fn generate_uid() -> String {
    rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(UID_LENGTH)
        .map(char::from)
        .collect()
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn signature_of(token: &str) -> Option<String> {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    let encoded = token.rsplit('.').next()?;
    let bytes = URL_SAFE_NO_PAD.decode(encoded).ok()?;
    String::from_utf8(bytes).ok()
}

#[async_trait]
impl AccountDirectory for InMemoryDirectory {
    async fn create_account(&self, email: &str, password: &str) -> Result<String, ServiceError> {
        if !is_valid_email(email) {
            return Err(AuthError::InvalidEmail.into());
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::WeakPassword(format!(
                "Password should be at least {} characters",
                MIN_PASSWORD_LENGTH
            ))
            .into());
        }

        let key = normalize_email(email);
        let mut state = self.state.write().await;
        if state.uid_by_email.contains_key(&key) {
            return Err(AuthError::EmailAlreadyExists.into());
        }

        let uid = generate_uid();
        let mut record = AccountRecord::new(uid.clone(), key.clone());
        record.metadata = AccountMetadata {
            created_at: Some(Utc::now()),
            last_sign_in_at: None,
        };
        state.uid_by_email.insert(key, uid.clone());
        state.accounts.insert(uid.clone(), record);
        Ok(uid)
    }

    async fn get_account_by_email(&self, email: &str) -> Result<AccountRecord, ServiceError> {
        let state = self.state.read().await;
        state
            .uid_by_email
            .get(&normalize_email(email))
            .and_then(|uid| state.accounts.get(uid))
            .cloned()
            .ok_or_else(|| AuthError::UserNotFound.into())
    }

    async fn verify_id_token(&self, token: &str) -> Result<DecodedToken, ServiceError> {
        let decoded = DecodedToken::from_jwt(token)?;
        let signature = signature_of(token).ok_or(AuthError::InvalidIdToken)?;

        let state = self.state.read().await;
        if !state.issued_signatures.contains(&signature) {
            return Err(AuthError::InvalidIdToken.into());
        }
        if decoded.is_expired_at(Utc::now()) {
            return Err(AuthError::TokenExpired.into());
        }
        match state.accounts.get(&decoded.uid) {
            None => Err(AuthError::UserNotFound.into()),
            Some(account) if account.disabled => Err(AuthError::UserDisabled.into()),
            Some(_) => Ok(decoded),
        }
    }

    async fn delete_account(&self, uid: &str) -> Result<(), ServiceError> {
        let mut state = self.state.write().await;
        let account = state.accounts.remove(uid).ok_or(AuthError::UserNotFound)?;
        if let Some(email) = account.email {
            state.uid_by_email.remove(&email);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_lookup() {
        let directory = InMemoryDirectory::new("demo-project");
        let uid = directory.create_account("alice@example.com", "secret1").await.unwrap();

        assert_eq!(uid.len(), UID_LENGTH);
        let record = directory.get_account_by_email("alice@example.com").await.unwrap();
        assert_eq!(record.uid, uid);
        assert_eq!(record.email.as_deref(), Some("alice@example.com"));
        assert!(record.metadata.created_at.is_some());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let directory = InMemoryDirectory::new("demo-project");
        directory.create_account("alice@example.com", "secret1").await.unwrap();

        let result = directory.create_account("Alice@Example.com", "secret2").await;
        assert!(matches!(result, Err(ServiceError::Auth(AuthError::EmailAlreadyExists))));
        assert_eq!(directory.len().await, 1);
    }

    #[tokio::test]
    async fn test_invalid_email_and_weak_password() {
        let directory = InMemoryDirectory::new("demo-project");

        let result = directory.create_account("not-an-email", "secret1").await;
        assert!(matches!(result, Err(ServiceError::Auth(AuthError::InvalidEmail))));

        let result = directory.create_account("bob@example.com", "123").await;
        assert!(matches!(result, Err(ServiceError::Auth(AuthError::WeakPassword(_)))));
        assert!(directory.is_empty().await);
    }

    #[tokio::test]
    async fn test_lookup_unknown_email() {
        let directory = InMemoryDirectory::new("demo-project");
        let result = directory.get_account_by_email("ghost@example.com").await;
        assert!(matches!(result, Err(ServiceError::Auth(AuthError::UserNotFound))));
    }

    #[tokio::test]
    async fn test_issued_token_verifies() {
        let directory = InMemoryDirectory::new("demo-project");
        let uid = directory.create_account("alice@example.com", "secret1").await.unwrap();
        let token = directory.issue_token(&uid, Duration::hours(1)).await.unwrap();

        let decoded = directory.verify_id_token(&token).await.unwrap();
        assert_eq!(decoded.uid, uid);
        assert_eq!(decoded.audience, "demo-project");
        assert_eq!(decoded.email.as_deref(), Some("alice@example.com"));
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let directory = InMemoryDirectory::new("demo-project");
        let uid = directory.create_account("alice@example.com", "secret1").await.unwrap();
        let token = directory.issue_token(&uid, Duration::minutes(-5)).await.unwrap();

        let result = directory.verify_id_token(&token).await;
        assert!(matches!(result, Err(ServiceError::Auth(AuthError::TokenExpired))));
    }

    #[tokio::test]
    async fn test_forged_token_rejected() {
        let directory = InMemoryDirectory::new("demo-project");
        let uid = directory.create_account("alice@example.com", "secret1").await.unwrap();
        let token = directory.issue_token(&uid, Duration::hours(1)).await.unwrap();

        let (unsigned, _) = token.rsplit_once('.').unwrap();
        let forged = format!("{}.Zm9yZ2Vk", unsigned);
        let result = directory.verify_id_token(&forged).await;
        assert!(matches!(result, Err(ServiceError::Auth(AuthError::InvalidIdToken))));
    }

    #[tokio::test]
    async fn test_disabled_account_token_rejected() {
        let directory = InMemoryDirectory::new("demo-project");
        let uid = directory.create_account("alice@example.com", "secret1").await.unwrap();
        let token = directory.issue_token(&uid, Duration::hours(1)).await.unwrap();
        directory.set_disabled(&uid, true).await.unwrap();

        let result = directory.verify_id_token(&token).await;
        assert!(matches!(result, Err(ServiceError::Auth(AuthError::UserDisabled))));
    }

    #[tokio::test]
    async fn test_delete_frees_email() {
        let directory = InMemoryDirectory::new("demo-project");
        let uid = directory.create_account("alice@example.com", "secret1").await.unwrap();
        directory.delete_account(&uid).await.unwrap();

        assert!(directory.get_account_by_email("alice@example.com").await.is_err());
        assert!(directory.create_account("alice@example.com", "secret1").await.is_ok());

        let result = directory.delete_account(&uid).await;
        assert!(matches!(result, Err(ServiceError::Auth(AuthError::UserNotFound))));
    }
}
