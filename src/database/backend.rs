//! Backend seam and write acknowledgement
//!
//! Backends run their remote work on tokio tasks, so both methods must be
//! called from within a tokio runtime.

use super::path::DatabasePath;
use super::snapshot::ValueEvent;
use crate::error::DatabaseError;
use futures::FutureExt;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;

/// Callback fired exactly once with the outcome of a single-shot read
pub type ValueCallback = Box<dyn FnOnce(ValueEvent) + Send + 'static>;

/// Storage behind a [`crate::database::Database`]
pub trait DatabaseBackend: Send + Sync {
    /// Replace whatever is stored at `path` with `value`.
    ///
    /// Returns as soon as the write is enqueued. `Value::Null` removes the
    /// location.
    fn set(&self, path: &DatabasePath, value: Value) -> PendingWrite;

    /// Read `path` once and hand the outcome to `callback`.
    ///
    /// The callback may run on another thread, and may run before this
    /// method returns.
    fn read_once(&self, path: &DatabasePath, callback: ValueCallback);
}

/// Handle for an enqueued write
///
/// Dropping it leaves the write running; nobody observes the outcome.
/// Awaiting it resolves once the backend acknowledges or rejects the write.
#[derive(Debug)]
pub struct PendingWrite {
    rx: oneshot::Receiver<Result<(), DatabaseError>>,
}

/// Backend half of a [`PendingWrite`]
#[derive(Debug)]
pub struct WriteAck {
    tx: oneshot::Sender<Result<(), DatabaseError>>,
}

impl PendingWrite {
    /// Create a connected acknowledgement pair
    pub fn channel() -> (WriteAck, PendingWrite) {
        let (tx, rx) = oneshot::channel();
        (WriteAck { tx }, PendingWrite { rx })
    }

    /// A write that already finished with `result`
    pub fn ready(result: Result<(), DatabaseError>) -> Self {
        let (ack, pending) = Self::channel();
        ack.complete(result);
        pending
    }
}

impl WriteAck {
    /// Report the outcome; ignored when nobody holds the [`PendingWrite`]
    pub fn complete(self, result: Result<(), DatabaseError>) {
        let _ = self.tx.send(result);
    }
}

impl Future for PendingWrite {
    type Output = Result<(), DatabaseError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.rx.poll_unpin(cx).map(|received| {
            received.unwrap_or_else(|_| {
                Err(DatabaseError::Disconnected(
                    "write dropped before acknowledgement".to_string(),
                ))
            })
        })
    }
}
