//! One-shot gate between a read callback and the task waiting on it
//!
//! `WAITING -> {DATA_RECEIVED, CANCELLED} -> RELEASED`. The callback half is
//! `FnOnce`, so at most one event is ever delivered. Without a timeout the
//! waiter stays parked until that event arrives.

use super::backend::ValueCallback;
use super::snapshot::ValueEvent;
use crate::error::ServiceError;
use std::time::Duration;
use tokio::sync::oneshot;

/// Waiting half of the gate
pub(crate) struct SingleValueGate {
    rx: oneshot::Receiver<ValueEvent>,
}

/// Create a gate and the callback that releases it
pub(crate) fn single_value_gate() -> (ValueCallback, SingleValueGate) {
    let (tx, rx) = oneshot::channel();
    let callback: ValueCallback = Box::new(move |event| {
        if tx.send(event).is_err() {
            tracing::debug!("read completed after its waiter went away; event discarded");
        }
    });
    (callback, SingleValueGate { rx })
}

impl SingleValueGate {
    /// Wait for the single event
    ///
    /// # Errors
    /// - `InterruptedWait` if the callback was dropped without firing
    /// - `ReadTimedOut` if `timeout` is set and elapses first
    pub(crate) async fn wait(self, timeout: Option<Duration>) -> Result<ValueEvent, ServiceError> {
        let received = match timeout {
            None => self.rx.await,
            Some(limit) => match tokio::time::timeout(limit, self.rx).await {
                Ok(received) => received,
                Err(_) => {
                    tracing::warn!(timeout = ?limit, "single-shot read timed out");
                    return Err(ServiceError::ReadTimedOut(limit));
                }
            },
        };
        received.map_err(|_| ServiceError::InterruptedWait)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{DataSnapshot, DatabasePath};
    use crate::error::DatabaseError;

    fn empty_snapshot() -> ValueEvent {
        ValueEvent::Data(DataSnapshot::new(DatabasePath::root(), serde_json::Value::Null))
    }

    #[tokio::test]
    async fn test_data_releases_waiter() {
        let (callback, gate) = single_value_gate();
        std::thread::spawn(move || callback(empty_snapshot()));

        let event = gate.wait(None).await.unwrap();
        assert_eq!(event, empty_snapshot());
    }

    #[tokio::test]
    async fn test_cancel_releases_waiter() {
        let (callback, gate) = single_value_gate();
        tokio::spawn(async move { callback(ValueEvent::Cancelled(DatabaseError::PermissionDenied)) });

        let event = gate.wait(None).await.unwrap();
        assert_eq!(event, ValueEvent::Cancelled(DatabaseError::PermissionDenied));
    }

    #[tokio::test]
    async fn test_callback_fired_before_wait() {
        let (callback, gate) = single_value_gate();
        callback(empty_snapshot());
        assert!(gate.wait(None).await.is_ok());
    }

    #[tokio::test]
    async fn test_dropped_callback_interrupts_wait() {
        let (callback, gate) = single_value_gate();
        drop(callback);
        assert!(matches!(gate.wait(None).await, Err(ServiceError::InterruptedWait)));
    }

    #[tokio::test]
    async fn test_timeout_elapses() {
        let (_callback, gate) = single_value_gate();
        let result = gate.wait(Some(Duration::from_millis(20))).await;
        assert!(matches!(result, Err(ServiceError::ReadTimedOut(_))));
    }

    #[tokio::test]
    async fn test_late_event_after_waiter_left_is_discarded() {
        let (callback, gate) = single_value_gate();
        drop(gate);
        callback(empty_snapshot());
    }
}
