//! In-memory JSON tree backend
//!
//! Stores values the way the Realtime Database does: nulls, empty objects and
//! empty arrays are never stored, so writing them removes the location.
//! Reads and writes run on spawned tasks like a remote backend would, and the
//! read path can be told to misbehave for tests.

use super::backend::{DatabaseBackend, PendingWrite, ValueCallback};
use super::path::DatabasePath;
use super::snapshot::{DataSnapshot, ValueEvent};
use crate::error::DatabaseError;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::RwLock;

/// How single-shot reads are answered
#[derive(Debug, Clone, PartialEq)]
pub enum ReadBehavior {
    /// Deliver the stored value
    Normal,
    /// Deliver a cancellation with this error
    Cancel(DatabaseError),
    /// Keep the callback alive but never call it
    Hang,
    /// Drop the callback without calling it
    Drop,
}

/// In-memory [`DatabaseBackend`]
#[derive(Clone, Default)]
pub struct InMemoryDatabase {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    root: RwLock<Value>,
    write_latency: Mutex<Duration>,
    read_behavior: Mutex<Option<ReadBehavior>>,
    writes: AtomicUsize,
    hung_callbacks: Mutex<Vec<ValueCallback>>,
}

impl InMemoryDatabase {
    /// Create an empty database
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay applied before each write lands
    pub fn with_write_latency(self, latency: Duration) -> Self {
        *lock(&self.inner.write_latency) = latency;
        self
    }

    /// Change how subsequent reads are answered
    pub fn set_read_behavior(&self, behavior: ReadBehavior) {
        *lock(&self.inner.read_behavior) = Some(behavior);
    }

    /// Number of writes enqueued so far
    pub fn write_count(&self) -> usize {
        self.inner.writes.load(Ordering::SeqCst)
    }

    /// Value currently stored at `path` (`Value::Null` when absent)
    pub async fn value_at(&self, path: &DatabasePath) -> Value {
        let root = self.inner.root.read().await;
        lookup(&root, path.segments()).cloned().unwrap_or(Value::Null)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl DatabaseBackend for InMemoryDatabase {
    fn set(&self, path: &DatabasePath, value: Value) -> PendingWrite {
        self.inner.writes.fetch_add(1, Ordering::SeqCst);
        let latency = *lock(&self.inner.write_latency);
        let (ack, pending) = PendingWrite::channel();
        let inner = Arc::clone(&self.inner);
        let path = path.clone();

        tokio::spawn(async move {
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            let mut root = inner.root.write().await;
            store(&mut root, path.segments(), normalize(value));
            tracing::trace!(%path, "in-memory write applied");
            ack.complete(Ok(()));
        });

        pending
    }

    fn read_once(&self, path: &DatabasePath, callback: ValueCallback) {
        let behavior = lock(&self.inner.read_behavior)
            .clone()
            .unwrap_or(ReadBehavior::Normal);

        match behavior {
            ReadBehavior::Normal => {
                let inner = Arc::clone(&self.inner);
                let path = path.clone();
                tokio::spawn(async move {
                    let value = {
                        let root = inner.root.read().await;
                        lookup(&root, path.segments()).cloned().unwrap_or(Value::Null)
                    };
                    callback(ValueEvent::Data(DataSnapshot::new(path, value)));
                });
            }
            ReadBehavior::Cancel(error) => {
                tokio::spawn(async move { callback(ValueEvent::Cancelled(error)) });
            }
            ReadBehavior::Hang => lock(&self.inner.hung_callbacks).push(callback),
            ReadBehavior::Drop => drop(callback),
        }
    }
}

fn lookup<'a>(root: &'a Value, segments: &[String]) -> Option<&'a Value> {
    segments
        .iter()
        .try_fold(root, |node, key| node.as_object()?.get(key))
}

/// Replace the value at `segments`, pruning parents left empty
fn store(node: &mut Value, segments: &[String], value: Value) {
    let Some((first, rest)) = segments.split_first() else {
        *node = value;
        return;
    };

    if !node.is_object() {
        if value.is_null() {
            return;
        }
        *node = Value::Object(Map::new());
    }
    let Value::Object(map) = node else {
        return;
    };

    let child = map.entry(first.clone()).or_insert(Value::Null);
    store(child, rest, value);
    if child.is_null() {
        map.remove(first);
    }
    if map.is_empty() {
        *node = Value::Null;
    }
}

/// Drop nulls, empty objects and empty arrays, recursively
fn normalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let map: Map<String, Value> = map
                .into_iter()
                .map(|(k, v)| (k, normalize(v)))
                .filter(|(_, v)| !v.is_null())
                .collect();
            if map.is_empty() {
                Value::Null
            } else {
                Value::Object(map)
            }
        }
        Value::Array(items) => {
            let items: Vec<Value> = items.into_iter().map(normalize).collect();
            if items.iter().all(Value::is_null) {
                Value::Null
            } else {
                Value::Array(items)
            }
        }
        other => other,
    }
}

impl std::fmt::Debug for InMemoryDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryDatabase")
            .field("writes", &self.write_count())
            .finish()
    }
}
