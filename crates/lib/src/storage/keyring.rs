//! Secure store backed by the OS keyring.
//!
//! Some secure stores cap each item at a few kilobytes. The adapter enforces
//! the configured ceiling itself and rejects oversize values with
//! [`StorageError::ItemTooLarge`] instead of letting the platform drop them
//! silently.

use async_trait::async_trait;

use super::{Result, StorageAdapter, StorageError};

/// Keyring-backed secret store.
#[derive(Debug, Clone)]
pub struct KeyringStorage {
    service_name: String,
    item_limit: Option<usize>,
}

impl KeyringStorage {
    /// Create a store that files every key under `service_name`.
    pub fn new(service_name: impl Into<String>, item_limit: Option<usize>) -> Self {
        Self {
            service_name: service_name.into(),
            item_limit,
        }
    }

    /// Check that the platform keyring can be reached at all.
    pub async fn probe(&self) -> bool {
        match self.get("__biosession_probe").await {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(error = %e, "Keyring probe failed");
                false
            }
        }
    }

    async fn run<T, F>(&self, key: &str, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(keyring::Entry) -> keyring::Result<T> + Send + 'static,
    {
        let service = self.service_name.clone();
        let user = key.to_string();
        let joined = tokio::task::spawn_blocking(move || {
            let entry = keyring::Entry::new(&service, &user)?;
            op(entry)
        })
        .await
        .map_err(|e| StorageError::Unavailable {
            backend: "keyring",
            reason: e.to_string(),
        })?;

        joined.map_err(|e| StorageError::Keyring {
            key: key.to_string(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl StorageAdapter for KeyringStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.run(key, |entry| match entry.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e),
        })
        .await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        if let Some(limit) = self.item_limit.filter(|limit| value.len() > *limit) {
            return Err(StorageError::ItemTooLarge {
                key: key.to_string(),
                size: value.len(),
                limit,
            });
        }
        let value = value.to_string();
        self.run(key, move |entry| entry.set_password(&value)).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.run(key, |entry| match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e),
        })
        .await
    }

    fn name(&self) -> &'static str {
        "keyring"
    }
}
