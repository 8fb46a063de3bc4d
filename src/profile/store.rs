//! Profile store over the account directory and the database
//!
//! Writes are fire-and-forget: each write method returns as soon as the write
//! is enqueued, handing back a [`PendingWrite`] the caller may drop or await.
//! Reads are single-shot and wait for exactly one outcome from the database.

use crate::auth::AccountService;
use crate::database::{Database, DatabaseReference, PendingWrite, ValueEvent};
use crate::error::ServiceError;
use crate::profile::model::{ProfileRead, ProfileUpdate, UserProfile};
use std::time::Duration;

/// Root under which profiles are stored, one child per uid
pub const USERS_ROOT: &str = "users";

/// Profile store settings
#[derive(Debug, Clone, Default)]
pub struct ProfileStoreOptions {
    /// Upper bound on the wait for a read; `None` waits indefinitely
    pub read_timeout: Option<Duration>,
}

/// Profile store adapter
#[derive(Clone, Debug)]
pub struct ProfileStore {
    accounts: AccountService,
    database: Database,
    options: ProfileStoreOptions,
}

impl ProfileStore {
    /// Create a store with default options
    pub fn new(accounts: AccountService, database: Database) -> Self {
        Self::with_options(accounts, database, ProfileStoreOptions::default())
    }

    /// Create a store with explicit options
    pub fn with_options(
        accounts: AccountService,
        database: Database,
        options: ProfileStoreOptions,
    ) -> Self {
        Self {
            accounts,
            database,
            options,
        }
    }

    /// Account service used to resolve emails
    pub fn accounts(&self) -> &AccountService {
        &self.accounts
    }

    /// Database reference of the profile for `uid`
    pub fn profile_ref(&self, uid: &str) -> Result<DatabaseReference, ServiceError> {
        self.database.reference(USERS_ROOT)?.child(uid)
    }

    /// Write the empty profile for the account registered under `email`
    pub async fn create_initial_profile(&self, email: &str) -> Result<PendingWrite, ServiceError> {
        let uid = self.accounts.resolve_uid(email).await?;
        let pending = self
            .profile_ref(&uid)?
            .set_value(&UserProfile::initial(email))?;
        tracing::debug!(%uid, "initial profile write enqueued");
        Ok(pending)
    }

    /// Replace the profile of the account registered under `email`
    ///
    /// Tags are checked before anything else; on failure no lookup and no
    /// write happen.
    pub async fn update_profile(
        &self,
        email: &str,
        update: ProfileUpdate,
    ) -> Result<PendingWrite, ServiceError> {
        update.validate()?;

        let uid = self.accounts.resolve_uid(email).await?;
        let pending = self
            .profile_ref(&uid)?
            .set_value(&update.into_profile(email))?;
        tracing::debug!(%uid, "profile write enqueued");
        Ok(pending)
    }

    /// Read the profile, keeping a cancelled read distinct from absence
    pub async fn read_profile(&self, email: &str) -> Result<ProfileRead, ServiceError> {
        match self.read_once(email).await? {
            ValueEvent::Data(snapshot) if snapshot.exists() => {
                Ok(ProfileRead::Found(snapshot.deserialize()?))
            }
            ValueEvent::Data(_) => Ok(ProfileRead::Absent),
            ValueEvent::Cancelled(error) => Ok(ProfileRead::Cancelled(error)),
        }
    }

    /// Read the profile
    ///
    /// A read the database cancels returns `None`, the same as a missing
    /// document. Use [`ProfileStore::read_profile`] to tell them apart.
    pub async fn get_profile(&self, email: &str) -> Result<Option<UserProfile>, ServiceError> {
        let read = self.read_profile(email).await?;
        if let ProfileRead::Cancelled(error) = &read {
            tracing::warn!(%error, "profile read cancelled; reporting no profile");
        }
        Ok(read.into_option())
    }

    /// Whether a profile document is stored
    ///
    /// A cancelled read returns `false`.
    pub async fn profile_exists(&self, email: &str) -> Result<bool, ServiceError> {
        match self.read_once(email).await? {
            ValueEvent::Data(snapshot) => Ok(snapshot.exists()),
            ValueEvent::Cancelled(error) => {
                tracing::warn!(%error, "profile read cancelled; reporting no profile");
                Ok(false)
            }
        }
    }

    async fn read_once(&self, email: &str) -> Result<ValueEvent, ServiceError> {
        let uid = self.accounts.resolve_uid(email).await?;
        self.profile_ref(&uid)?
            .once(self.options.read_timeout)
            .await
    }
}
