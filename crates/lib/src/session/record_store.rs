//! Durable layout of session records.
//!
//! Three logical keys: the legacy single slot, the versioned map and the
//! active-user pointer. Methods here report storage failures as-is; deciding
//! that they are benign is the lifecycle layer's job.

use std::{fmt, sync::Arc};

use super::types::{SessionMap, SessionRecordV1};
use crate::{
    constants::{ACTIVE_USER_KEY, LEGACY_SESSION_KEY, SESSIONS_KEY},
    storage::{self, StorageAdapter, read_json, write_json},
};

/// Reads and writes session records through a storage adapter.
#[derive(Clone)]
pub struct SessionRecordStore {
    storage: Arc<dyn StorageAdapter>,
}

impl SessionRecordStore {
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self { storage }
    }

    /// The underlying adapter.
    pub fn storage(&self) -> &Arc<dyn StorageAdapter> {
        &self.storage
    }

    // === Versioned map ===

    /// Load the versioned map; a missing key is an empty map.
    pub async fn load_map(&self) -> storage::Result<SessionMap> {
        Ok(read_json(self.storage.as_ref(), SESSIONS_KEY)
            .await?
            .unwrap_or_default())
    }

    /// Persist the versioned map. An empty map removes the key.
    pub async fn save_map(&self, map: &SessionMap) -> storage::Result<()> {
        if map.is_empty() {
            self.storage.delete(SESSIONS_KEY).await
        } else {
            write_json(self.storage.as_ref(), SESSIONS_KEY, map).await
        }
    }

    /// Remove the versioned map entirely.
    pub async fn clear_map(&self) -> storage::Result<()> {
        self.storage.delete(SESSIONS_KEY).await
    }

    // === Legacy slot ===

    pub async fn load_legacy(&self) -> storage::Result<Option<SessionRecordV1>> {
        read_json(self.storage.as_ref(), LEGACY_SESSION_KEY).await
    }

    pub async fn save_legacy(&self, record: &SessionRecordV1) -> storage::Result<()> {
        write_json(self.storage.as_ref(), LEGACY_SESSION_KEY, record).await
    }

    pub async fn clear_legacy(&self) -> storage::Result<()> {
        self.storage.delete(LEGACY_SESSION_KEY).await
    }

    // === Active-user pointer ===

    pub async fn active_user(&self) -> storage::Result<Option<String>> {
        Ok(self
            .storage
            .get(ACTIVE_USER_KEY)
            .await?
            .filter(|id| !id.is_empty()))
    }

    pub async fn set_active_user(&self, user_id: &str) -> storage::Result<()> {
        self.storage.set(ACTIVE_USER_KEY, user_id).await
    }

    pub async fn clear_active_user(&self) -> storage::Result<()> {
        self.storage.delete(ACTIVE_USER_KEY).await
    }
}

impl fmt::Debug for SessionRecordStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionRecordStore")
            .field("storage", &self.storage.name())
            .finish()
    }
}
