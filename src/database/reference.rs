//! Database handle and references

use super::backend::{DatabaseBackend, PendingWrite, ValueCallback};
use super::path::DatabasePath;
use super::single_value::single_value_gate;
use super::snapshot::ValueEvent;
use crate::error::ServiceError;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Handle to a database, cheap to clone
#[derive(Clone)]
pub struct Database {
    backend: Arc<dyn DatabaseBackend>,
}

impl Database {
    /// Create a handle over a backend
    pub fn new(backend: Arc<dyn DatabaseBackend>) -> Self {
        Self { backend }
    }

    /// Reference to the location at `path`
    pub fn reference(&self, path: &str) -> Result<DatabaseReference, ServiceError> {
        Ok(DatabaseReference {
            database: self.clone(),
            path: DatabasePath::parse(path)?,
        })
    }

    /// Reference to the root location
    pub fn root(&self) -> DatabaseReference {
        DatabaseReference {
            database: self.clone(),
            path: DatabasePath::root(),
        }
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").field("backend", &"dynamic").finish()
    }
}

/// Reference to a location in the database
#[derive(Clone, Debug)]
pub struct DatabaseReference {
    database: Database,
    path: DatabasePath,
}

impl DatabaseReference {
    /// Reference to a location below this one
    pub fn child(&self, relative: &str) -> Result<DatabaseReference, ServiceError> {
        Ok(DatabaseReference {
            database: self.database.clone(),
            path: self.path.child(relative)?,
        })
    }

    /// Location of this reference
    pub fn path(&self) -> &DatabasePath {
        &self.path
    }

    /// Last path segment, `None` at the root
    pub fn key(&self) -> Option<&str> {
        self.path.key()
    }

    /// Replace the value at this location
    ///
    /// Returns once the write is enqueued. The returned handle may be dropped.
    pub fn set(&self, value: serde_json::Value) -> PendingWrite {
        self.database.backend.set(&self.path, value)
    }

    /// Serialize `value` and replace the value at this location
    pub fn set_value<T: Serialize>(&self, value: &T) -> Result<PendingWrite, ServiceError> {
        Ok(self.set(serde_json::to_value(value)?))
    }

    /// Read this location once, delivering the outcome to `callback`
    pub fn read_once(&self, callback: ValueCallback) {
        self.database.backend.read_once(&self.path, callback)
    }

    /// Read this location once and wait for the outcome
    ///
    /// With `timeout: None` the wait has no bound.
    pub async fn once(&self, timeout: Option<Duration>) -> Result<ValueEvent, ServiceError> {
        let (callback, gate) = single_value_gate();
        self.read_once(callback);
        gate.wait(timeout).await
    }
}
