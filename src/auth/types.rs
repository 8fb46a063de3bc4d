//! Account and token types
//!
//! # REST Reference
//! - `UserInfo` resource returned by `accounts:lookup`
//! - Firebase ID token claims (`iss`, `aud`, `sub`, `iat`, `exp`, `auth_time`, `firebase`)

use crate::error::AuthError;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Account metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountMetadata {
    /// When the account was created
    pub created_at: Option<DateTime<Utc>>,

    /// When the account last signed in
    pub last_sign_in_at: Option<DateTime<Utc>>,
}

/// Account record held by the identity service
///
/// Never cached by this crate; every lookup goes to the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    /// Unique account identifier
    pub uid: String,

    /// Email address (if available)
    pub email: Option<String>,

    /// Whether email is verified
    pub email_verified: bool,

    /// Display name (if available)
    pub display_name: Option<String>,

    /// Whether the account is disabled
    pub disabled: bool,

    /// Account metadata
    pub metadata: AccountMetadata,
}

impl AccountRecord {
    /// Create a record with only uid and email set
    pub fn new(uid: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: Some(email.into()),
            email_verified: false,
            display_name: None,
            disabled: false,
            metadata: AccountMetadata {
                created_at: None,
                last_sign_in_at: None,
            },
        }
    }
}

/// Claims of a bearer token the identity service accepted
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedToken {
    /// Account uid (`sub`)
    pub uid: String,

    /// Email claim
    pub email: Option<String>,

    /// Email verified claim
    pub email_verified: bool,

    /// Token issuer (`iss`)
    pub issuer: String,

    /// Token audience (`aud`), the project id
    pub audience: String,

    /// Issued at (`iat`)
    pub issued_at: DateTime<Utc>,

    /// Expiry (`exp`)
    pub expires_at: DateTime<Utc>,

    /// Time the user authenticated (`auth_time`)
    pub auth_time: Option<DateTime<Utc>>,

    /// Sign-in provider from the `firebase` claim
    pub sign_in_provider: Option<String>,

    /// Full claim set, including custom claims
    pub claims: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RawClaims {
    #[serde(default)]
    sub: String,
    #[serde(default)]
    iss: String,
    #[serde(default)]
    aud: String,
    iat: i64,
    exp: i64,
    auth_time: Option<i64>,
    email: Option<String>,
    #[serde(default)]
    email_verified: bool,
    firebase: Option<FirebaseClaim>,
}

#[derive(Debug, Deserialize)]
struct FirebaseClaim {
    sign_in_provider: Option<String>,
}

impl DecodedToken {
    /// Decode the payload segment of a JWT
    ///
    /// Does not check the signature; callers only decode tokens the identity
    /// service has already accepted.
    pub fn from_jwt(token: &str) -> Result<Self, AuthError> {
        let mut segments = token.split('.');
        let (Some(_header), Some(payload), Some(_signature), None) =
            (segments.next(), segments.next(), segments.next(), segments.next())
        else {
            return Err(AuthError::InvalidIdToken);
        };

        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|_| AuthError::InvalidIdToken)?;
        let claims: serde_json::Map<String, serde_json::Value> =
            serde_json::from_slice(&bytes).map_err(|_| AuthError::InvalidIdToken)?;
        let raw: RawClaims = serde_json::from_value(serde_json::Value::Object(claims.clone()))
            .map_err(|_| AuthError::InvalidIdToken)?;

        if raw.sub.is_empty() {
            return Err(AuthError::InvalidIdToken);
        }

        Ok(Self {
            uid: raw.sub,
            email: raw.email,
            email_verified: raw.email_verified,
            issuer: raw.iss,
            audience: raw.aud,
            issued_at: timestamp(raw.iat)?,
            expires_at: timestamp(raw.exp)?,
            auth_time: raw.auth_time.map(timestamp).transpose()?,
            sign_in_provider: raw.firebase.and_then(|f| f.sign_in_provider),
            claims,
        })
    }

    /// Whether the token is past its expiry at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

fn timestamp(seconds: i64) -> Result<DateTime<Utc>, AuthError> {
    Utc.timestamp_opt(seconds, 0)
        .single()
        .ok_or(AuthError::InvalidIdToken)
}

/// Build an unsigned-looking JWT from claims, with an opaque signature segment
pub(crate) fn encode_jwt(claims: &serde_json::Value, signature: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    let signature = URL_SAFE_NO_PAD.encode(signature);
    format!("{}.{}.{}", header, payload, signature)
}
