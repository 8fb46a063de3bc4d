//! Firebase account and profile service
//!
//! Account management over the Identity Toolkit REST API and per-user profile
//! documents in the Realtime Database, keyed by the account uid.
//!
//! # Example
//! ```no_run
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! use firebase_account_profiles::{App, AppOptions, ProfileStoreOptions, ProfileUpdate};
//!
//! let app = App::create(AppOptions::from_env()?).await?;
//! let profiles = app.profile_store(ProfileStoreOptions::default())?;
//!
//! let uid = profiles.accounts().register("alice@example.com", "s3cret!").await?;
//! profiles.create_initial_profile("alice@example.com").await?;
//!
//! let update = ProfileUpdate {
//!     name: "Alice".to_string(),
//!     tags: vec!["hiking".to_string()],
//!     ..ProfileUpdate::default()
//! };
//! profiles.update_profile("alice@example.com", update).await?.await?;
//! println!("{} -> {:?}", uid, profiles.get_profile("alice@example.com").await?);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod app;
pub mod blocking;
pub mod database;
pub mod error;
pub mod logging;
pub mod profile;

// Auth module
pub mod auth {
    //! Account directory
    //!
    //! - `auth.rs` → Identity Toolkit REST client
    //! - `memory.rs` → in-process directory for tests and local runs
    //! - `service.rs` → [`AccountService`]

    #[allow(clippy::module_inception)]
    pub mod auth;
    pub mod directory;
    pub mod memory;
    pub mod service;
    pub mod types;

    pub use auth::Auth;
    pub use directory::AccountDirectory;
    pub use memory::InMemoryDirectory;
    pub use service::AccountService;
    pub use types::{AccountMetadata, AccountRecord, DecodedToken};
}

// Re-exports for convenience
pub use app::{App, AppOptions};
pub use error::{AuthError, DatabaseError, ServiceError, ValidationError};

pub use auth::{AccountRecord, AccountService, Auth, DecodedToken};
pub use database::{Database, DatabaseReference, PendingWrite};
pub use profile::{ProfileRead, ProfileStore, ProfileStoreOptions, ProfileUpdate, UserProfile};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_types_exist() {
        // Basic smoke test
        let _err: ServiceError = AuthError::InvalidEmail.into();
        let _err: ServiceError = DatabaseError::PermissionDenied.into();
    }
}
