//! Biometric session records
//!
//! - [`types`] - record shapes and the legacy/versioned schema union
//! - [`record_store`] - durable layout of the three session keys
//! - [`lifecycle`] - enrollment, lookup with lazy expiry, migration and removal

pub mod lifecycle;
pub mod record_store;
pub mod types;

pub use lifecycle::SessionLifecycle;
pub use record_store::SessionRecordStore;
pub use types::{
    AccountSummary, Profile, ProfileSnapshot, SessionMap, SessionRecord, SessionRecordV1,
    SessionSchema, account_list,
};
