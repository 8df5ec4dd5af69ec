//! The public biometric session API.
//!
//! [`BiometricSessionManager`] ties the pieces together: it gates every
//! user-initiated action behind the biometric collaborator, reads and writes
//! records through [`SessionLifecycle`], and hands successful unlocks to
//! [`CredentialRestorer`] so a live backend session exists before control
//! returns to the caller.
//!
//! Storage problems never surface here. Only capability, prompt and
//! missing-session failures reach the caller, as [`BiometricError`].

use std::sync::Arc;

use handle_trait::Handle;
use serde::Serialize;

use crate::{
    clock::{Clock, SystemClock},
    config::SessionConfig,
    credentials::Credential,
    restore::{CredentialRestorer, RestoreSource},
    services::{
        AppSessionStore, AuthBackend, BiometricAuthenticator, LogNotifier, NoAppSession, Notice,
        Notifier,
    },
    session::{AccountSummary, Profile, ProfileSnapshot, SessionLifecycle, SessionRecord},
    storage::{Benign, StorageAdapter, StorageConfig, selector},
};

pub mod errors;

pub use errors::BiometricError;

/// External collaborators the manager depends on.
#[derive(Clone)]
pub struct Services {
    pub biometrics: Arc<dyn BiometricAuthenticator>,
    pub backend: Arc<dyn AuthBackend>,
    pub app_sessions: Arc<dyn AppSessionStore>,
    pub notifier: Arc<dyn Notifier>,
}

impl Services {
    /// Services with no application session store and a logging notifier.
    pub fn new(biometrics: Arc<dyn BiometricAuthenticator>, backend: Arc<dyn AuthBackend>) -> Self {
        Self {
            biometrics,
            backend,
            app_sessions: Arc::new(NoAppSession),
            notifier: Arc::new(LogNotifier),
        }
    }

    pub fn with_app_sessions(mut self, app_sessions: Arc<dyn AppSessionStore>) -> Self {
        self.app_sessions = app_sessions;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }
}

/// The user being enrolled, after a normal sign-in.
#[derive(Clone, Debug)]
pub struct EnrollUser {
    pub user_id: String,
    pub email: String,
    /// Refresh credential to store; when absent the live backend session's is used
    pub credential: Option<Credential>,
}

impl EnrollUser {
    pub fn new(user_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
            credential: None,
        }
    }

    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }
}

/// Account details returned by a successful unlock or switch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountData {
    pub user_id: String,
    pub email: String,
    pub profile: Option<ProfileSnapshot>,
}

impl From<&SessionRecord> for AccountData {
    fn from(record: &SessionRecord) -> Self {
        Self {
            user_id: record.user_id.clone(),
            email: record.email.clone(),
            profile: record.profile.clone(),
        }
    }
}

/// A successful unlock or switch.
///
/// `session_restored == false` is a degraded success: the biometric check
/// passed but no backend session could be re-established.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnlockedAccount {
    pub account: AccountData,
    pub session_restored: bool,
    /// Which restoration step produced the backend session
    pub restore_source: Option<RestoreSource>,
}

/// Snapshot for UI gating.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BiometricStatus {
    pub available: bool,
    pub enrolled: bool,
    pub has_session: bool,
}

pub(crate) struct ManagerInternal {
    lifecycle: SessionLifecycle,
    restorer: CredentialRestorer,
    services: Services,
    config: SessionConfig,
}

impl std::fmt::Debug for ManagerInternal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagerInternal")
            .field("lifecycle", &self.lifecycle)
            .field("services", &"<Services>")
            .field("config", &self.config)
            .finish()
    }
}

/// Multi-account biometric session manager.
///
/// A cheap-to-clone handle; clones share the same storage and collaborators.
/// At most one high-level operation should be in flight at a time.
///
/// ```ignore
/// let manager = BiometricSessionManager::new(storage, Services::new(biometrics, backend));
/// manager.enroll_for_user(EnrollUser::new("u1", "a@x.com"), None).await;
///
/// let unlocked = manager.unlock().await?;
/// if !unlocked.session_restored {
///     // Ask for a full sign-in
/// }
/// ```
#[derive(Clone, Debug, Handle)]
pub struct BiometricSessionManager {
    inner: Arc<ManagerInternal>,
}

impl BiometricSessionManager {
    /// Manager over `storage` with the default configuration and system time.
    pub fn new(storage: Arc<dyn StorageAdapter>, services: Services) -> Self {
        Self::with_config(storage, services, SessionConfig::default(), Arc::new(SystemClock))
    }

    pub fn with_config(
        storage: Arc<dyn StorageAdapter>,
        services: Services,
        config: SessionConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let lifecycle = SessionLifecycle::new(storage, clock, &config);
        let restorer = CredentialRestorer::new(
            lifecycle.credentials().clone(),
            services.backend.clone(),
            services.app_sessions.clone(),
        );
        Self {
            inner: Arc::new(ManagerInternal {
                lifecycle,
                restorer,
                services,
                config,
            }),
        }
    }

    /// Manager over the process-wide storage adapter for this platform.
    pub async fn open(storage: &StorageConfig, services: Services) -> Self {
        Self::new(selector::shared(storage).await, services)
    }

    /// The underlying lifecycle manager.
    pub fn lifecycle(&self) -> &SessionLifecycle {
        &self.inner.lifecycle
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// Enable biometric sign-in for a user who just signed in normally.
    ///
    /// Checks capabilities and confirms with a prompt before touching storage.
    /// The outcome is reported through the notifier either way.
    pub async fn enroll_for_user(&self, user: EnrollUser, profile: Option<Profile>) -> bool {
        let notifier = &self.inner.services.notifier;
        if let Err(e) = self.verify(&self.inner.config.enroll_prompt).await {
            tracing::info!(user_id = %user.user_id, error = %e, "Enrollment not confirmed");
            notifier.notify(Notice::EnrollmentFailed {
                reason: e.to_string(),
            });
            return false;
        }

        let credential = match user.credential {
            Some(credential) => Some(credential),
            None => self.live_credential().await,
        };

        let enrolled = self
            .inner
            .lifecycle
            .enroll(&user.user_id, &user.email, profile, credential.as_ref())
            .await;
        if enrolled {
            notifier.notify(Notice::Enrolled { email: user.email });
        } else {
            notifier.notify(Notice::EnrollmentFailed {
                reason: BiometricError::EnrollmentFailed.to_string(),
            });
        }
        enrolled
    }

    /// Unlock the active account.
    pub async fn unlock(&self) -> Result<UnlockedAccount, BiometricError> {
        self.verify(&self.inner.config.unlock_prompt).await?;
        let mut record = self
            .inner
            .lifecycle
            .get_active()
            .await
            .ok_or(BiometricError::NoSession)?;
        let unlocked = self.restore_and_touch(&mut record).await;
        tracing::info!(
            user_id = %record.user_id,
            restored = unlocked.session_restored,
            "Biometric unlock succeeded"
        );
        Ok(unlocked)
    }

    /// Switch to another cached account and make it active.
    ///
    /// Only versioned records are eligible; the legacy slot is never used here.
    pub async fn switch_account(&self, user_id: &str) -> Result<UnlockedAccount, BiometricError> {
        self.verify(&self.inner.config.switch_prompt).await?;
        let mut record = self.inner.lifecycle.get_for_user(user_id).await.ok_or_else(|| {
            BiometricError::NoSessionForAccount {
                user_id: user_id.to_string(),
            }
        })?;
        let unlocked = self.restore_and_touch(&mut record).await;
        self.inner
            .lifecycle
            .records()
            .set_active_user(user_id)
            .await
            .benign("set active user");
        tracing::info!(
            user_id = %user_id,
            restored = unlocked.session_restored,
            "Switched account"
        );
        Ok(unlocked)
    }

    /// Every cached account, most recently used first.
    pub async fn list_accounts(&self) -> Vec<AccountSummary> {
        self.inner.lifecycle.list_accounts().await
    }

    pub async fn remove_account(&self, user_id: &str) {
        self.inner.lifecycle.remove(user_id).await
    }

    /// Forget every account. Used on sign-out or when biometrics are disabled.
    pub async fn clear_all(&self) {
        self.inner.lifecycle.clear_all().await
    }

    /// Replace the cached profile on the active record.
    pub async fn refresh_cached_profile(&self, profile: Profile) {
        if !self.inner.lifecycle.update_profile(profile).await {
            tracing::debug!("No active session to cache a profile on");
        }
    }

    pub async fn status(&self) -> BiometricStatus {
        let capabilities = self.inner.services.biometrics.check_capabilities().await;
        BiometricStatus {
            available: capabilities.is_available,
            enrolled: capabilities.is_enrolled,
            has_session: self.inner.lifecycle.get_active().await.is_some(),
        }
    }

    /// Capability check followed by a prompt.
    async fn verify(&self, prompt: &str) -> Result<(), BiometricError> {
        let biometrics = &self.inner.services.biometrics;
        let capabilities = biometrics.check_capabilities().await;
        if !capabilities.is_available {
            return Err(BiometricError::Unavailable);
        }
        if !capabilities.is_enrolled {
            return Err(BiometricError::NotEnrolled);
        }

        let outcome = biometrics.authenticate(prompt).await;
        if outcome.success {
            Ok(())
        } else {
            Err(BiometricError::PromptFailed(outcome.error.unwrap_or_else(|| {
                BiometricError::GENERIC_PROMPT_FAILURE.to_string()
            })))
        }
    }

    async fn restore_and_touch(&self, record: &mut SessionRecord) -> UnlockedAccount {
        let restoration = self.inner.restorer.restore(&record.user_id).await;
        self.inner.lifecycle.touch(record).await;
        UnlockedAccount {
            account: AccountData::from(&*record),
            session_restored: restoration.restored(),
            restore_source: restoration.source,
        }
    }

    async fn live_credential(&self) -> Option<Credential> {
        match self.inner.services.backend.current_session().await {
            Ok(session) => session
                .map(|s| s.refresh_credential)
                .filter(|c| !c.is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read live session for enrollment");
                None
            }
        }
    }
}
