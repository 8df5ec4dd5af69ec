//!
//! Biosession: multi-account biometric session persistence.
//!
//! This library lets a returning user unlock a previously authenticated
//! account with on-device biometrics instead of signing in again, while
//! keeping several cached accounts on one device.
//!
//! ## Core Concepts
//!
//! * **Storage (`storage::StorageAdapter`)**: A pluggable key-value secret store, chosen once per process by `storage::selector`.
//! * **Session records (`session::SessionRecord`)**: Local proof that this device completed biometric enrollment for a user, keyed by user id, with lazy expiry and migration from the legacy single-slot layout.
//! * **Credentials (`credentials::Credential`)**: Backend refresh tokens, stored per user plus one legacy global slot.
//! * **Restoration (`restore::CredentialRestorer`)**: The ordered fallback chain that turns a local biometric pass into a live backend session.
//! * **Manager (`BiometricSessionManager`)**: The public API: enroll, unlock, switch account, list, remove and clear.
//! * **Services (`services`)**: The narrow interfaces to the biometric prompt, the backend auth service and the application's own session store.

pub mod clock;
pub mod config;
pub mod constants;
pub mod credentials;
pub mod manager;
pub mod restore;
pub mod services;
pub mod session;
pub mod storage;

pub use clock::{Clock, SystemClock};
#[cfg(any(test, feature = "testing"))]
pub use clock::FixedClock;
pub use config::SessionConfig;
pub use credentials::Credential;
pub use manager::{
    AccountData, BiometricError, BiometricSessionManager, BiometricStatus, EnrollUser, Services,
    UnlockedAccount,
};
pub use restore::{Restoration, RestoreSource};
pub use session::{AccountSummary, Profile};
pub use storage::{StorageAdapter, StorageConfig, StorageError};

/// Common error type for the Biosession library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Structured storage errors from the storage module
    #[error(transparent)]
    Storage(storage::StorageError),

    /// Errors reported by external services
    #[error(transparent)]
    Service(services::ServiceError),

    /// User-facing biometric errors from the manager module
    #[error(transparent)]
    Biometric(manager::BiometricError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Storage(_) => "storage",
            Error::Service(_) => "services",
            Error::Biometric(_) => "manager",
        }
    }

    /// Check if this error indicates a session was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Biometric(biometric_err) => biometric_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        match self {
            Error::Storage(storage_err) => storage_err.is_io_error(),
            _ => false,
        }
    }

    /// Check if this error should be shown to the user.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Error::Biometric(_))
    }
}
