//! Per-user backend refresh credentials
//!
//! Each enrolled user has one refresh credential stored under a key derived
//! from their user id. One un-namespaced legacy slot is kept for installs that
//! predate multi-account support; it is only ever consulted as a last resort.

use std::{fmt, sync::Arc};

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
    constants::{LEGACY_CREDENTIAL_KEY, USER_CREDENTIAL_PREFIX},
    storage::{self, StorageAdapter},
};

/// Opaque backend refresh credential.
///
/// The secret is wiped from memory on drop and never printed by `Debug`.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Credential(String);

impl Credential {
    /// Wrap a raw credential string.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Borrow the raw secret.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Whether the credential is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

impl From<&str> for Credential {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Storage key for a user's credential.
///
/// Secure stores accept only `[A-Za-z0-9._-]` in keys. Every other byte, and
/// `_` itself, is written as `_xx` hex so distinct user ids never collide.
pub fn user_credential_key(user_id: &str) -> String {
    let mut key = String::with_capacity(USER_CREDENTIAL_PREFIX.len() + user_id.len());
    key.push_str(USER_CREDENTIAL_PREFIX);
    for byte in user_id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'.' {
            key.push(byte as char);
        } else {
            key.push('_');
            key.push_str(&hex::encode([byte]));
        }
    }
    key
}

/// Durable storage for refresh credentials.
#[derive(Clone)]
pub struct CredentialStore {
    storage: Arc<dyn StorageAdapter>,
}

impl CredentialStore {
    /// Create a store over the given adapter.
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self { storage }
    }

    /// Read the credential for `user_id`.
    pub async fn get(&self, user_id: &str) -> storage::Result<Option<Credential>> {
        Ok(self
            .storage
            .get(&user_credential_key(user_id))
            .await?
            .filter(|raw| !raw.is_empty())
            .map(Credential::new))
    }

    /// Store the credential for `user_id`, replacing any previous one.
    pub async fn put(&self, user_id: &str, credential: &Credential) -> storage::Result<()> {
        self.storage
            .set(&user_credential_key(user_id), credential.expose())
            .await
    }

    /// Remove the credential for `user_id`.
    pub async fn delete(&self, user_id: &str) -> storage::Result<()> {
        self.storage.delete(&user_credential_key(user_id)).await
    }

    /// Read the legacy global credential.
    pub async fn legacy(&self) -> storage::Result<Option<Credential>> {
        Ok(self
            .storage
            .get(LEGACY_CREDENTIAL_KEY)
            .await?
            .filter(|raw| !raw.is_empty())
            .map(Credential::new))
    }

    /// Overwrite the legacy global credential.
    pub async fn put_legacy(&self, credential: &Credential) -> storage::Result<()> {
        self.storage
            .set(LEGACY_CREDENTIAL_KEY, credential.expose())
            .await
    }

    /// Remove the legacy global credential.
    pub async fn delete_legacy(&self) -> storage::Result<()> {
        self.storage.delete(LEGACY_CREDENTIAL_KEY).await
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("storage", &self.storage.name())
            .finish()
    }
}
