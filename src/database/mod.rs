//! Realtime Database module
//!
//! - `path.rs` → validated locations ([`DatabasePath`])
//! - `snapshot.rs` → read outcomes ([`DataSnapshot`], [`ValueEvent`])
//! - `backend.rs` → backend seam and write handles ([`DatabaseBackend`], [`PendingWrite`])
//! - `reference.rs` → [`Database`] and [`DatabaseReference`]
//! - `single_value.rs` → one-shot gate joining a read callback and its waiter
//! - `rest.rs` → REST backend
//! - `memory.rs` → in-memory backend

pub mod backend;
pub mod memory;
pub mod path;
pub mod reference;
pub mod rest;
mod single_value;
pub mod snapshot;

pub use backend::{DatabaseBackend, PendingWrite, ValueCallback, WriteAck};
pub use memory::{InMemoryDatabase, ReadBehavior};
pub use path::DatabasePath;
pub use reference::{Database, DatabaseReference};
pub use rest::RestBackend;
pub use snapshot::{DataSnapshot, ValueEvent};
