//! Read results

use super::path::DatabasePath;
use crate::error::DatabaseError;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Value stored at a location when a read completed
#[derive(Debug, Clone, PartialEq)]
pub struct DataSnapshot {
    path: DatabasePath,
    value: Value,
}

impl DataSnapshot {
    /// Create a snapshot; `Value::Null` means nothing is stored at `path`
    pub fn new(path: DatabasePath, value: Value) -> Self {
        Self { path, value }
    }

    /// Whether anything is stored at this location
    pub fn exists(&self) -> bool {
        !self.value.is_null()
    }

    /// Location this snapshot was read from
    pub fn path(&self) -> &DatabasePath {
        &self.path
    }

    /// Last path segment
    pub fn key(&self) -> Option<&str> {
        self.path.key()
    }

    /// Raw JSON value
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Consume the snapshot, returning the raw value
    pub fn into_value(self) -> Value {
        self.value
    }

    /// Decode the value into `T`
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.value)
    }
}

/// Outcome of a single-shot read; exactly one is delivered per read
#[derive(Debug, Clone, PartialEq)]
pub enum ValueEvent {
    /// The read completed; the snapshot may be empty
    Data(DataSnapshot),
    /// The database cancelled the read
    Cancelled(DatabaseError),
}
