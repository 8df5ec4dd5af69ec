//! Creation, lookup, expiry and deletion of session records.
//!
//! Every storage failure here goes through [`Benign`]: a failed read is "not
//! found", a failed write is a logged no-op. The only operation that reports
//! failure is [`SessionLifecycle::enroll`], and only when the record itself
//! could not be saved.
//!
//! The versioned map is only ever written back after a successful read, so an
//! unreadable map is never replaced by a partial one.
//!
//! Expiry is enforced lazily: reading an expired record deletes it and its
//! credential, then answers as if it never existed.

use std::{fmt, sync::Arc};

use rand::{RngCore, rngs::OsRng};

use super::{
    record_store::SessionRecordStore,
    types::{
        AccountSummary, Profile, ProfileSnapshot, SessionMap, SessionRecord, SessionRecordV1,
        SessionSchema, account_list,
    },
};
use crate::{
    clock::Clock,
    config::SessionConfig,
    credentials::{Credential, CredentialStore},
    storage::{Benign, StorageAdapter},
};

/// Session record lifecycle over one storage adapter.
#[derive(Clone)]
pub struct SessionLifecycle {
    records: SessionRecordStore,
    credentials: CredentialStore,
    clock: Arc<dyn Clock>,
    ttl_millis: u64,
}

impl SessionLifecycle {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        clock: Arc<dyn Clock>,
        config: &SessionConfig,
    ) -> Self {
        Self {
            records: SessionRecordStore::new(storage.clone()),
            credentials: CredentialStore::new(storage),
            clock,
            ttl_millis: config.session_ttl_millis(),
        }
    }

    pub fn records(&self) -> &SessionRecordStore {
        &self.records
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Create or replace the session record for `user_id`.
    ///
    /// Writes the record, then the credential (if one is given), then the
    /// active-user pointer. A credential that cannot be stored is logged and
    /// ignored. Returns `false` if the existing records could not be read or the
    /// record could not be saved, in which case nothing is written.
    pub async fn enroll(
        &self,
        user_id: &str,
        email: &str,
        profile: Option<Profile>,
        credential: Option<&Credential>,
    ) -> bool {
        let now = self.clock.now_millis();
        let record = SessionRecord {
            user_id: user_id.to_string(),
            email: email.to_string(),
            session_token: generate_session_token(),
            expires_at: now.saturating_add(self.ttl_millis),
            last_used: now,
            profile: profile.map(|p| ProfileSnapshot::new(p, now)),
        };

        let Some(mut map) = self.load_map().await else {
            tracing::warn!(user_id = %user_id, "Cannot enroll without reading existing sessions");
            return false;
        };
        map.insert(record);
        if self
            .records
            .save_map(&map)
            .await
            .benign("save enrolled session")
            .is_none()
        {
            return false;
        }

        match credential.filter(|c| !c.is_empty()) {
            Some(credential) => {
                if self
                    .credentials
                    .put(user_id, credential)
                    .await
                    .benign("store enrollment credential")
                    .is_none()
                {
                    tracing::warn!(user_id = %user_id, "Enrolled without a stored credential");
                }
            }
            None => tracing::debug!(user_id = %user_id, "No credential available at enrollment"),
        }

        self.records
            .set_active_user(user_id)
            .await
            .benign("set active user");
        tracing::info!(user_id = %user_id, "Biometric session enrolled");
        true
    }

    /// The record for the active user, if live.
    ///
    /// Falls back to the legacy single slot when the pointer is unset or
    /// dangling. A live legacy record whose user has no versioned record is
    /// merged into the map and made active.
    pub async fn get_active(&self) -> Option<SessionRecord> {
        let now = self.clock.now_millis();
        let loaded = self.load_map().await;
        let readable = loaded.is_some();
        let mut map = loaded.unwrap_or_default();

        if let Some(user_id) = self.active_user().await.as_deref() {
            if map.contains(user_id) {
                return self.live_or_expire(&mut map, user_id, now).await;
            }
            tracing::debug!(user_id = %user_id, "Active-user pointer is dangling");
        }

        let legacy = self.load_legacy().await?;
        if !legacy.is_live(now) {
            tracing::info!(user_id = %legacy.user_id, "Legacy session expired");
            self.records
                .clear_legacy()
                .await
                .benign("clear expired legacy session");
            return None;
        }

        let user_id = legacy.user_id.clone();
        if map.contains(&user_id) {
            return self.live_or_expire(&mut map, &user_id, now).await;
        }

        let record = SessionRecord::from(legacy.clone());
        if !readable {
            return Some(record);
        }
        map.merge(SessionSchema::Legacy(legacy).migrate());
        let saved = self
            .records
            .save_map(&map)
            .await
            .benign("save migrated session");
        if saved.is_some() {
            self.records
                .set_active_user(&user_id)
                .await
                .benign("set migrated active user");
            tracing::info!(user_id = %user_id, "Migrated legacy session record");
        }
        Some(record)
    }

    /// The versioned record for `user_id`, if live. Never consults the legacy slot.
    pub async fn get_for_user(&self, user_id: &str) -> Option<SessionRecord> {
        let now = self.clock.now_millis();
        let mut map = self.load_map().await.unwrap_or_default();
        if !map.contains(user_id) {
            return None;
        }
        self.live_or_expire(&mut map, user_id, now).await
    }

    /// Mark `record` as just used and persist it.
    ///
    /// Only `last_used` moves; the expiry stays where enrollment put it.
    pub async fn touch(&self, record: &mut SessionRecord) {
        record.touch(self.clock.now_millis());
        let Some(mut map) = self.load_map().await else {
            return;
        };
        map.insert(record.clone());
        self.records
            .save_map(&map)
            .await
            .benign("save touched session");
    }

    /// Replace the cached profile on the active record.
    ///
    /// Returns whether a live active record was updated.
    pub async fn update_profile(&self, profile: Profile) -> bool {
        let Some(active) = self.get_active().await else {
            return false;
        };
        let now = self.clock.now_millis();
        let Some(mut map) = self.load_map().await else {
            return false;
        };
        let Some(record) = map.get_mut(&active.user_id) else {
            return false;
        };
        record.profile = Some(ProfileSnapshot::new(profile, now));
        self.records
            .save_map(&map)
            .await
            .benign("save cached profile")
            .is_some()
    }

    /// Forget `user_id` entirely. Idempotent.
    ///
    /// Clears the active-user pointer only if it names `user_id`.
    pub async fn remove(&self, user_id: &str) {
        let mut map = self.load_map().await.unwrap_or_default();
        if map.remove(user_id).is_some() {
            self.records
                .save_map(&map)
                .await
                .benign("save after removal");
        }
        self.credentials
            .delete(user_id)
            .await
            .benign("delete user credential");
        self.clear_legacy_for(user_id).await;

        if self.active_user().await.as_deref() == Some(user_id) {
            self.records
                .clear_active_user()
                .await
                .benign("clear active user");
        }
        tracing::info!(user_id = %user_id, "Biometric session removed");
    }

    /// Delete every record, every credential and the active-user pointer.
    pub async fn clear_all(&self) {
        let map = self.load_map().await.unwrap_or_default();
        let legacy = self.load_legacy().await;

        for user_id in map.user_ids() {
            self.credentials
                .delete(user_id)
                .await
                .benign("delete user credential");
        }
        if let Some(v1) = legacy.filter(|v1| !map.contains(&v1.user_id)) {
            self.credentials
                .delete(&v1.user_id)
                .await
                .benign("delete user credential");
        }
        self.credentials
            .delete_legacy()
            .await
            .benign("delete legacy credential");

        self.records
            .clear_legacy()
            .await
            .benign("clear legacy session");
        self.records.clear_map().await.benign("clear sessions");
        self.records
            .clear_active_user()
            .await
            .benign("clear active user");
        tracing::info!(accounts = map.len(), "All biometric sessions cleared");
    }

    /// Every cached account, most recently used first.
    ///
    /// Expired records are listed too; listing never deletes anything.
    pub async fn list_accounts(&self) -> Vec<AccountSummary> {
        let map = self.load_map().await.unwrap_or_default();
        let legacy = self.load_legacy().await;
        account_list(&map, legacy.as_ref())
    }

    /// The versioned map, or `None` if it could not be read.
    async fn load_map(&self) -> Option<SessionMap> {
        self.records.load_map().await.benign("load sessions")
    }

    async fn load_legacy(&self) -> Option<SessionRecordV1> {
        self.records
            .load_legacy()
            .await
            .benign("load legacy session")
            .flatten()
    }

    async fn active_user(&self) -> Option<String> {
        self.records
            .active_user()
            .await
            .benign("read active user")
            .flatten()
    }

    /// Clear the legacy slot if it holds `user_id`.
    async fn clear_legacy_for(&self, user_id: &str) {
        let legacy = self.load_legacy().await;
        if legacy.is_some_and(|v1| v1.user_id == user_id) {
            self.records
                .clear_legacy()
                .await
                .benign("clear legacy session");
        }
    }

    /// Return the record if live, otherwise delete it, its credential and any
    /// legacy record for the same user.
    async fn live_or_expire(
        &self,
        map: &mut SessionMap,
        user_id: &str,
        now: u64,
    ) -> Option<SessionRecord> {
        let record = map.get(user_id)?;
        if record.is_live(now) {
            return Some(record.clone());
        }

        tracing::info!(
            user_id = %user_id,
            expired_at = %record.expires_at_utc(),
            "Session expired"
        );
        map.remove(user_id);
        self.records
            .save_map(map)
            .await
            .benign("save after expiry");
        self.credentials
            .delete(user_id)
            .await
            .benign("delete expired credential");
        self.clear_legacy_for(user_id).await;
        None
    }
}

impl fmt::Debug for SessionLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionLifecycle")
            .field("records", &self.records)
            .field("clock", &self.clock)
            .field("ttl_millis", &self.ttl_millis)
            .finish()
    }
}

/// 32 random bytes, hex encoded.
fn generate_session_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
