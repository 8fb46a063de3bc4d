//! Blocking façade
//!
//! For callers without an async runtime. Every call parks the calling thread
//! until the operation finishes. Fire-and-forget writes keep running on the
//! façade's runtime after the call returns.
//!
//! Do not call these methods from inside an async context; blocking on a
//! runtime from one of its own tasks panics.

use crate::auth::types::{AccountRecord, DecodedToken};
use crate::error::ServiceError;
use crate::profile::{ProfileRead, ProfileStore, ProfileUpdate, UserProfile};
use tokio::runtime::Runtime;

const WORKER_THREADS: usize = 2;

/// Account and profile operations as plain blocking calls
pub struct UserService {
    runtime: Runtime,
    profiles: ProfileStore,
}

impl UserService {
    /// Create a façade with its own multi-threaded runtime
    pub fn new(profiles: ProfileStore) -> Result<Self, ServiceError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(WORKER_THREADS)
            .thread_name("account-profiles")
            .enable_all()
            .build()
            .map_err(|e| ServiceError::internal(format!("Failed to start runtime: {}", e)))?;
        Ok(Self { runtime, profiles })
    }

    /// Create an account and return its uid
    pub fn register(&self, email: &str, password: &str) -> Result<String, ServiceError> {
        self.runtime
            .block_on(self.profiles.accounts().register(email, password))
    }

    /// Look up the account registered under `email`
    pub fn find_by_email(&self, email: &str) -> Result<AccountRecord, ServiceError> {
        self.runtime.block_on(self.profiles.accounts().find_by_email(email))
    }

    /// Verify a bearer token and return its claims
    pub fn verify_token(&self, token: &str) -> Result<DecodedToken, ServiceError> {
        self.runtime.block_on(self.profiles.accounts().verify_token(token))
    }

    /// Delete the account registered under `email`
    pub fn delete_by_email(&self, email: &str) -> Result<(), ServiceError> {
        self.runtime.block_on(self.profiles.accounts().delete_by_email(email))
    }

    /// Enqueue the empty profile for `email`
    pub fn create_initial_profile(&self, email: &str) -> Result<(), ServiceError> {
        self.runtime
            .block_on(self.profiles.create_initial_profile(email))
            .map(drop)
    }

    /// Enqueue a full replacement of the profile for `email`
    pub fn update_profile(&self, email: &str, update: ProfileUpdate) -> Result<(), ServiceError> {
        self.runtime
            .block_on(self.profiles.update_profile(email, update))
            .map(drop)
    }

    /// Read the profile; a cancelled read returns `None`
    pub fn get_profile(&self, email: &str) -> Result<Option<UserProfile>, ServiceError> {
        self.runtime.block_on(self.profiles.get_profile(email))
    }

    /// Whether a profile is stored; a cancelled read returns `false`
    pub fn profile_exists(&self, email: &str) -> Result<bool, ServiceError> {
        self.runtime.block_on(self.profiles.profile_exists(email))
    }

    /// Read the profile, keeping a cancelled read distinct from absence
    pub fn read_profile(&self, email: &str) -> Result<ProfileRead, ServiceError> {
        self.runtime.block_on(self.profiles.read_profile(email))
    }
}

impl std::fmt::Debug for UserService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserService")
            .field("profiles", &self.profiles)
            .finish_non_exhaustive()
    }
}
