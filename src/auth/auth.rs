//! Identity Toolkit REST client
//!
//! # REST Reference
//! - `POST /v1/projects/{project}/accounts` - create account
//! - `POST /v1/projects/{project}/accounts:lookup` - look up by email
//! - `POST /v1/projects/{project}/accounts:delete` - delete by uid
//! - `POST /v1/accounts:lookup?key=` - resolve an ID token

use crate::app::AppOptions;
use crate::auth::directory::AccountDirectory;
use crate::auth::types::{AccountMetadata, AccountRecord, DecodedToken};
use crate::error::{AuthError, ServiceError};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;

/// Identity Toolkit client
///
/// Cheap to clone; clones share the HTTP client.
#[derive(Clone)]
pub struct Auth {
    inner: Arc<AuthInner>,
}

struct AuthInner {
    api_key: String,
    project_id: String,
    access_token: Option<String>,
    endpoint: String,
    http_client: reqwest::Client,
}

impl Auth {
    /// Create a client from app options
    pub fn new(options: &AppOptions, http_client: reqwest::Client) -> Self {
        Self {
            inner: Arc::new(AuthInner {
                api_key: options.api_key.clone(),
                project_id: options.project_id.clone(),
                access_token: options.access_token.clone(),
                endpoint: options.identity_endpoint().to_string(),
                http_client,
            }),
        }
    }

    /// Get the API key for this client
    pub fn api_key(&self) -> &str {
        &self.inner.api_key
    }

    /// Get the project ID for this client
    pub fn project_id(&self) -> &str {
        &self.inner.project_id
    }

    /// URL of a project-scoped admin method, e.g. `accounts:lookup`
    fn admin_url(&self, method: &str) -> String {
        format!(
            "{}/projects/{}/{}?key={}",
            self.inner.endpoint, self.inner.project_id, method, self.inner.api_key
        )
    }

    /// URL of a key-scoped public method
    fn public_url(&self, method: &str) -> String {
        format!("{}/{}?key={}", self.inner.endpoint, method, self.inner.api_key)
    }

    async fn post<T: DeserializeOwned>(
        &self,
        url: &str,
        body: serde_json::Value,
        admin: bool,
    ) -> Result<T, ServiceError> {
        let mut request = self.inner.http_client.post(url).json(&body);
        if admin {
            if let Some(token) = &self.inner.access_token {
                request = request.bearer_auth(token);
            }
        }

        let response = request.send().await?;

        // Handle error responses first
        if !response.status().is_success() {
            let status = response.status();
            let error_body: serde_json::Value = response.json().await.unwrap_or_default();
            let error_message = error_body["error"]["message"]
                .as_str()
                .unwrap_or("UNKNOWN_ERROR");
            tracing::debug!(%status, error = error_message, "identity service rejected request");
            return Err(AuthError::from_error_code(error_message).into());
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl AccountDirectory for Auth {
    async fn create_account(&self, email: &str, password: &str) -> Result<String, ServiceError> {
        let response: CreateAccountResponse = self
            .post(
                &self.admin_url("accounts"),
                serde_json::json!({ "email": email, "password": password }),
                true,
            )
            .await?;
        Ok(response.local_id)
    }

    async fn get_account_by_email(&self, email: &str) -> Result<AccountRecord, ServiceError> {
        let response: LookupResponse = self
            .post(
                &self.admin_url("accounts:lookup"),
                serde_json::json!({ "email": [email] }),
                true,
            )
            .await?;

        response
            .users
            .into_iter()
            .next()
            .map(UserResource::into_record)
            .ok_or_else(|| AuthError::UserNotFound.into())
    }

    async fn verify_id_token(&self, token: &str) -> Result<DecodedToken, ServiceError> {
        let response: LookupResponse = self
            .post(
                &self.public_url("accounts:lookup"),
                serde_json::json!({ "idToken": token }),
                false,
            )
            .await?;

        // Error-first: the service must resolve the token to exactly the subject it names
        let Some(user) = response.users.into_iter().next() else {
            return Err(AuthError::InvalidIdToken.into());
        };
        let decoded = DecodedToken::from_jwt(token)?;
        if decoded.uid != user.local_id {
            return Err(AuthError::InvalidIdToken.into());
        }
        if decoded.is_expired_at(Utc::now()) {
            return Err(AuthError::TokenExpired.into());
        }
        if user.disabled {
            return Err(AuthError::UserDisabled.into());
        }

        Ok(decoded)
    }

    async fn delete_account(&self, uid: &str) -> Result<(), ServiceError> {
        let _: serde_json::Value = self
            .post(
                &self.admin_url("accounts:delete"),
                serde_json::json!({ "localId": uid }),
                true,
            )
            .await?;
        Ok(())
    }
}

/// `accounts` create response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateAccountResponse {
    local_id: String,
}

/// `accounts:lookup` response; `users` is omitted when nothing matched
#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<UserResource>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserResource {
    local_id: String,
    email: Option<String>,
    #[serde(default)]
    email_verified: bool,
    display_name: Option<String>,
    #[serde(default)]
    disabled: bool,
    /// Milliseconds since epoch, as a decimal string
    created_at: Option<String>,
    /// Milliseconds since epoch, as a decimal string
    last_login_at: Option<String>,
}

impl UserResource {
    fn into_record(self) -> AccountRecord {
        AccountRecord {
            uid: self.local_id,
            email: self.email,
            email_verified: self.email_verified,
            display_name: self.display_name,
            disabled: self.disabled,
            metadata: AccountMetadata {
                created_at: parse_millis(self.created_at.as_deref()),
                last_sign_in_at: parse_millis(self.last_login_at.as_deref()),
            },
        }
    }
}

fn parse_millis(value: Option<&str>) -> Option<DateTime<Utc>> {
    let millis = value?.parse::<i64>().ok()?;
    Utc.timestamp_millis_opt(millis).single()
}

impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Auth")
            .field("project_id", &self.inner.project_id)
            .field("endpoint", &self.inner.endpoint)
            .field("api_key", &"<redacted>")
            .finish()
    }
}
