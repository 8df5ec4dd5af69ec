//! Key-value secret storage
//!
//! This module provides the [`StorageAdapter`] trait and the backends the
//! session manager can persist into:
//!
//! - [`MemoryStorage`] - process-local map, used in tests and as the last
//!   resort when no native storage exists
//! - [`FileStorage`] - the general key-value store, a JSON document on disk
//!   with no per-item size ceiling
//! - `KeyringStorage` - the secure store, backed by the OS keyring
//!   (requires the `keyring` feature)
//!
//! Which one is used is decided once per process by [`selector`].
//!
//! ## Failure policy
//!
//! Adapters report failures as [`StorageError`]. Session convenience data is
//! always reconstructible by a full sign-in, so callers never propagate these
//! errors: they go through [`Benign::benign`], which logs the failure and turns
//! it into `None`. A failed read therefore behaves as "not found" and a failed
//! write as a no-op. This is the only place that conversion happens.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

pub mod errors;
mod file;
#[cfg(feature = "keyring")]
mod keyring;
mod memory;
pub mod selector;

pub use errors::StorageError;
pub use file::FileStorage;
#[cfg(feature = "keyring")]
pub use keyring::KeyringStorage;
pub use memory::MemoryStorage;
pub use selector::{BackendKind, Platform, StorageConfig};

/// Result type for storage adapter operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// A string key-value store.
///
/// All operations are asynchronous and individually fallible. Deleting a key
/// that does not exist is not an error.
#[async_trait]
pub trait StorageAdapter: Send + Sync {
    /// Read the value stored under `key`, or `None` if absent.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Short backend name for logging.
    fn name(&self) -> &'static str;
}

#[async_trait]
impl<T: StorageAdapter + ?Sized> StorageAdapter for Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key).await
    }
    async fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value).await
    }
    async fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key).await
    }
    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Read and decode a JSON value.
pub async fn read_json<T: DeserializeOwned>(
    storage: &dyn StorageAdapter,
    key: &str,
) -> Result<Option<T>> {
    match storage.get(key).await? {
        Some(raw) => serde_json::from_str(&raw).map(Some).map_err(|source| {
            StorageError::DeserializationFailed {
                key: key.to_string(),
                source,
            }
        }),
        None => Ok(None),
    }
}

/// Encode and store a JSON value.
pub async fn write_json<T: Serialize + ?Sized>(
    storage: &dyn StorageAdapter,
    key: &str,
    value: &T,
) -> Result<()> {
    let raw = serde_json::to_string(value).map_err(|source| StorageError::SerializationFailed {
        key: key.to_string(),
        source,
    })?;
    storage.set(key, &raw).await
}

/// The non-fatal storage rule.
///
/// Every storage failure is logged at `warn` and becomes `None`.
pub trait Benign<T> {
    /// Collapse a storage failure into `None`, naming the operation for the log.
    fn benign(self, op: &'static str) -> Option<T>;
}

impl<T> Benign<T> for Result<T> {
    fn benign(self, op: &'static str) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(
                    op,
                    key = e.key(),
                    error = %e,
                    "Storage failure treated as not found"
                );
                None
            }
        }
    }
}
