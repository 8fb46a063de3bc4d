//! User profiles
//!
//! - `model.rs` → document shape and validation
//! - `store.rs` → [`ProfileStore`]

pub mod model;
pub mod store;

pub use model::{validate_tags, Personality, ProfileRead, ProfileUpdate, UserProfile, MAX_TAGS};
pub use store::{ProfileStore, ProfileStoreOptions, USERS_ROOT};
