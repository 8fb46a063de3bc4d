//! Integration tests against a live project (or the Auth emulator)
//!
//! These tests interact with real Firebase services and require:
//! 1. A Firebase project with Email/Password sign-in and a Realtime Database
//! 2. Environment variables set in .env file (see `AppOptions::from_env`)
//! 3. Run with: cargo test --features integration-tests -- --test-threads=1

#![cfg(feature = "integration-tests")]

use firebase_account_profiles::{
    App, AppOptions, AuthError, ProfileStore, ProfileStoreOptions, ProfileUpdate, ServiceError,
};
use std::time::Duration;

const PASSWORD: &str = "integration-pass-123";

/// Load environment variables from .env file and build the store
async fn profile_store(app_name: &str) -> ProfileStore {
    dotenvy::dotenv().ok();

    let mut options = AppOptions::from_env().expect("FIREBASE_* variables must be set in .env file");
    options.app_name = Some(app_name.to_string());

    let app = App::create(options).await.expect("Failed to create app");
    app.profile_store(ProfileStoreOptions {
        read_timeout: Some(Duration::from_secs(15)),
    })
    .expect("FIREBASE_DATABASE_URL must be set in .env file")
}

fn unique_email(prefix: &str) -> String {
    format!("{}-{}@example.com", prefix, uuid::Uuid::new_v4().simple())
}

/// Sign in over the public REST endpoint to obtain an ID token
async fn sign_in(options: &AppOptions, email: &str, password: &str) -> String {
    let url = format!(
        "{}/accounts:signInWithPassword?key={}",
        options.identity_endpoint(),
        options.api_key
    );
    let response: serde_json::Value = reqwest::Client::new()
        .post(&url)
        .json(&serde_json::json!({
            "email": email,
            "password": password,
            "returnSecureToken": true,
        }))
        .send()
        .await
        .expect("Sign-in request failed")
        .json()
        .await
        .expect("Sign-in response was not JSON");

    response["idToken"]
        .as_str()
        .expect("Sign-in response has no idToken")
        .to_string()
}

#[tokio::test]
async fn test_register_find_delete() {
    let store = profile_store("it-accounts").await;
    let accounts = store.accounts();
    let email = unique_email("accounts");

    let uid = accounts.register(&email, PASSWORD).await.expect("Failed to register");
    assert!(!uid.is_empty());

    let record = accounts.find_by_email(&email).await.expect("Failed to find account");
    assert_eq!(record.uid, uid);
    assert_eq!(record.email.as_deref(), Some(email.as_str()));

    let err = accounts.register(&email, PASSWORD).await.unwrap_err();
    assert!(matches!(err, ServiceError::Auth(AuthError::EmailAlreadyExists)));

    accounts.delete_by_email(&email).await.expect("Failed to delete");
    assert!(accounts.find_by_email(&email).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_verify_token() {
    let store = profile_store("it-verify").await;
    let app = App::get_instance_with_name("it-verify").await.unwrap();
    let email = unique_email("verify");

    let uid = store.accounts().register(&email, PASSWORD).await.unwrap();
    let token = sign_in(app.options(), &email, PASSWORD).await;

    let decoded = store.accounts().verify_token(&token).await.expect("Failed to verify");
    assert_eq!(decoded.uid, uid);
    assert_eq!(decoded.email.as_deref(), Some(email.as_str()));

    let err = store.accounts().verify_token("not-a-token").await.unwrap_err();
    assert!(err.requires_auth());

    store.accounts().delete_by_email(&email).await.unwrap();
}

#[tokio::test]
async fn test_profile_lifecycle() {
    let store = profile_store("it-profiles").await;
    let email = unique_email("profile");
    store.accounts().register(&email, PASSWORD).await.unwrap();

    assert!(!store.profile_exists(&email).await.unwrap());

    store.create_initial_profile(&email).await.unwrap().await.unwrap();
    let profile = store.get_profile(&email).await.unwrap().expect("profile missing");
    assert_eq!(profile.email, email);

    let update = ProfileUpdate {
        name: "Alice".to_string(),
        birthdate: "1990-01-01".to_string(),
        gender: "F".to_string(),
        bio: "bio text".to_string(),
        mbti: "INFJ".to_string(),
        tags: vec!["hiking".to_string(), "coffee".to_string()],
    };
    store.update_profile(&email, update).await.unwrap().await.unwrap();

    let profile = store.get_profile(&email).await.unwrap().expect("profile missing");
    assert_eq!(profile.name, "Alice");
    assert_eq!(profile.personality.tags, ["hiking", "coffee"]);

    store.accounts().delete_by_email(&email).await.unwrap();
}
