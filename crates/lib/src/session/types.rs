//! Core data types for biometric session records

use std::collections::{BTreeMap, btree_map};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::millis_to_utc;

/// Denormalized profile fields cached for immediate UI use.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Role within the organization
    #[serde(default)]
    pub role: Option<String>,

    /// Organization the user belongs to
    #[serde(default)]
    pub organization_id: Option<String>,

    /// Seat / licence status
    #[serde(default)]
    pub seat_status: Option<String>,
}

/// A [`Profile`] plus the time it was cached.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSnapshot {
    #[serde(flatten)]
    pub profile: Profile,

    /// When the snapshot was taken (ms since epoch)
    pub cached_at: u64,
}

impl ProfileSnapshot {
    /// Snapshot `profile` at `now`.
    pub fn new(profile: Profile, now: u64) -> Self {
        Self {
            profile,
            cached_at: now,
        }
    }
}

/// Local proof that this device completed biometric enrollment for a user.
///
/// Not a backend credential. Timestamps are milliseconds since the Unix epoch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// Stable user identifier
    pub user_id: String,

    /// Display email; never used for auth decisions
    pub email: String,

    /// Locally generated opaque token
    pub session_token: String,

    /// Record is live while `now < expires_at`
    pub expires_at: u64,

    /// Last successful unlock
    pub last_used: u64,

    /// Cached profile for display before the backend round-trip
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<ProfileSnapshot>,
}

impl SessionRecord {
    /// Whether the record is still usable at `now`.
    pub fn is_live(&self, now: u64) -> bool {
        now < self.expires_at
    }

    /// Record a successful unlock. `last_used` never moves backwards.
    pub fn touch(&mut self, now: u64) {
        self.last_used = self.last_used.max(now);
    }

    /// Expiry as a UTC datetime.
    pub fn expires_at_utc(&self) -> DateTime<Utc> {
        millis_to_utc(self.expires_at)
    }

    /// Listing entry for this record.
    pub fn summary(&self) -> AccountSummary {
        AccountSummary {
            user_id: self.user_id.clone(),
            email: self.email.clone(),
            last_used: self.last_used,
            expires_at: self.expires_at,
        }
    }
}

/// Pre-multi-account session record, stored alone in a single slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecordV1 {
    pub user_id: String,
    pub email: String,
    pub session_token: String,
    pub expires_at: u64,
    pub last_used: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<ProfileSnapshot>,
}

impl SessionRecordV1 {
    pub fn is_live(&self, now: u64) -> bool {
        now < self.expires_at
    }
}

impl From<SessionRecordV1> for SessionRecord {
    fn from(v1: SessionRecordV1) -> Self {
        Self {
            user_id: v1.user_id,
            email: v1.email,
            session_token: v1.session_token,
            expires_at: v1.expires_at,
            last_used: v1.last_used,
            profile: v1.profile,
        }
    }
}

/// Session records keyed by user id. At most one record per user.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionMap(BTreeMap<String, SessionRecord>);

impl SessionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, user_id: &str) -> Option<&SessionRecord> {
        self.0.get(user_id)
    }

    pub fn get_mut(&mut self, user_id: &str) -> Option<&mut SessionRecord> {
        self.0.get_mut(user_id)
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.0.contains_key(user_id)
    }

    /// Insert or overwrite the record for its user, returning the previous one.
    pub fn insert(&mut self, record: SessionRecord) -> Option<SessionRecord> {
        self.0.insert(record.user_id.clone(), record)
    }

    pub fn remove(&mut self, user_id: &str) -> Option<SessionRecord> {
        self.0.remove(user_id)
    }

    pub fn user_ids(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn records(&self) -> btree_map::Values<'_, String, SessionRecord> {
        self.0.values()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Add every record from `other` whose user is not already present.
    ///
    /// Existing records always win. Returns whether anything was added.
    pub fn merge(&mut self, other: SessionMap) -> bool {
        let mut changed = false;
        for (user_id, record) in other.0 {
            if let btree_map::Entry::Vacant(slot) = self.0.entry(user_id) {
                slot.insert(record);
                changed = true;
            }
        }
        changed
    }
}

impl FromIterator<SessionRecord> for SessionMap {
    fn from_iter<I: IntoIterator<Item = SessionRecord>>(iter: I) -> Self {
        let mut map = SessionMap::new();
        for record in iter {
            map.insert(record);
        }
        map
    }
}

/// The two persisted session representations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionSchema {
    /// Single pre-v2 record
    Legacy(SessionRecordV1),
    /// Records keyed by user id
    Versioned(SessionMap),
}

impl SessionSchema {
    /// Convert to the versioned representation.
    ///
    /// Pure and idempotent: migrating a `Versioned` value returns it unchanged.
    pub fn migrate(self) -> SessionMap {
        match self {
            SessionSchema::Legacy(v1) => std::iter::once(SessionRecord::from(v1)).collect(),
            SessionSchema::Versioned(map) => map,
        }
    }
}

/// Listing entry for an account cached on this device.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub user_id: String,
    pub email: String,
    pub last_used: u64,
    pub expires_at: u64,
}

impl AccountSummary {
    pub fn last_used_utc(&self) -> DateTime<Utc> {
        millis_to_utc(self.last_used)
    }

    pub fn expires_at_utc(&self) -> DateTime<Utc> {
        millis_to_utc(self.expires_at)
    }
}

/// Build the account list: versioned records first, a stray legacy record only
/// if its user has no versioned record, sorted by `last_used` descending.
pub fn account_list(map: &SessionMap, legacy: Option<&SessionRecordV1>) -> Vec<AccountSummary> {
    let mut accounts: Vec<AccountSummary> = map.records().map(SessionRecord::summary).collect();
    if let Some(v1) = legacy.filter(|v1| !map.contains(&v1.user_id)) {
        accounts.push(SessionRecord::from(v1.clone()).summary());
    }
    accounts.sort_by(|a, b| {
        b.last_used
            .cmp(&a.last_used)
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
    accounts
}
