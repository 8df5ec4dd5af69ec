//! Backend session restoration after a successful biometric check.
//!
//! Restoration tries, strictly in order and stopping at the first success:
//!
//! 1. a backend session already live in this process (no network call)
//! 2. refresh with the target user's own credential
//! 3. refresh with whatever credential the application session store holds
//! 4. refresh with the legacy global credential
//!
//! Most specific first, so a multi-account device restores the intended
//! account whenever that account's own credential still works. Any step that
//! errors counts as failed and the chain moves on. Exhausting the chain is not
//! an error; the caller just gets `restored: false`.
//!
//! Step 3 may hand back a session for a different user than the one targeted.
//! That outcome is reported as restored and logged at `warn`.

use std::sync::Arc;

use crate::{
    credentials::{Credential, CredentialStore},
    services::{AppSessionStore, AuthBackend, BackendSession},
    storage::Benign,
};

/// Which step of the chain produced the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RestoreSource {
    /// Backend session was already live
    LiveSession,
    /// Target user's own credential
    UserCredential,
    /// Application session store's credential
    AppSession,
    /// Legacy global credential slot
    LegacyCredential,
}

/// Outcome of a restoration attempt.
#[derive(Clone, Debug, Default)]
pub struct Restoration {
    /// Step that succeeded, if any
    pub source: Option<RestoreSource>,
    /// Session produced by the successful step
    pub session: Option<BackendSession>,
}

impl Restoration {
    /// Whether a live backend session now exists.
    pub fn restored(&self) -> bool {
        self.source.is_some()
    }

    fn from_step(source: RestoreSource, session: BackendSession) -> Self {
        Self {
            source: Some(source),
            session: Some(session),
        }
    }
}

/// Runs the restoration chain.
#[derive(Clone)]
pub struct CredentialRestorer {
    credentials: CredentialStore,
    backend: Arc<dyn AuthBackend>,
    app_sessions: Arc<dyn AppSessionStore>,
}

impl CredentialRestorer {
    pub fn new(
        credentials: CredentialStore,
        backend: Arc<dyn AuthBackend>,
        app_sessions: Arc<dyn AppSessionStore>,
    ) -> Self {
        Self {
            credentials,
            backend,
            app_sessions,
        }
    }

    /// Make sure a live backend session exists for `user_id`.
    pub async fn restore(&self, user_id: &str) -> Restoration {
        let restoration = self.run_chain(user_id).await;
        match (&restoration.source, &restoration.session) {
            (Some(source), Some(session)) => {
                if session.user_id != user_id {
                    tracing::warn!(
                        target_user = %user_id,
                        restored_user = %session.user_id,
                        ?source,
                        "Restored backend session belongs to a different user"
                    );
                } else {
                    tracing::debug!(user_id = %user_id, ?source, "Backend session restored");
                }
            }
            _ => tracing::info!(
                user_id = %user_id,
                "No credential could restore a backend session"
            ),
        }
        restoration
    }

    async fn run_chain(&self, user_id: &str) -> Restoration {
        // 1. Already live
        match self.backend.current_session().await {
            Ok(Some(session)) => return Restoration::from_step(RestoreSource::LiveSession, session),
            Ok(None) => {}
            Err(e) => tracing::debug!(error = %e, "Live session lookup failed"),
        }

        // 2. This user's own credential
        let own = self
            .credentials
            .get(user_id)
            .await
            .benign("read user credential")
            .flatten();
        if let Some(credential) = own {
            if let Some(session) = self.refresh(&credential, RestoreSource::UserCredential).await {
                if let Some(fresh) = rotated(&credential, &session) {
                    self.credentials
                        .put(user_id, fresh)
                        .await
                        .benign("store rotated user credential");
                }
                return Restoration::from_step(RestoreSource::UserCredential, session);
            }
        }

        // 3. Application session store
        match self.app_sessions.current_session().await {
            Ok(Some(app)) if !app.refresh_credential.is_empty() => {
                if let Some(session) = self
                    .refresh(&app.refresh_credential, RestoreSource::AppSession)
                    .await
                {
                    return Restoration::from_step(RestoreSource::AppSession, session);
                }
            }
            Ok(_) => {}
            Err(e) => tracing::debug!(error = %e, "App session lookup failed"),
        }

        // 4. Legacy global slot
        let legacy = self
            .credentials
            .legacy()
            .await
            .benign("read legacy credential")
            .flatten();
        if let Some(credential) = legacy {
            if let Some(session) = self
                .refresh(&credential, RestoreSource::LegacyCredential)
                .await
            {
                if let Some(fresh) = rotated(&credential, &session) {
                    self.credentials
                        .put_legacy(fresh)
                        .await
                        .benign("store rotated legacy credential");
                }
                return Restoration::from_step(RestoreSource::LegacyCredential, session);
            }
        }

        Restoration::default()
    }

    async fn refresh(
        &self,
        credential: &Credential,
        step: RestoreSource,
    ) -> Option<BackendSession> {
        match self.backend.refresh_session(credential).await {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::debug!(?step, error = %e, "Refresh failed, falling through");
                None
            }
        }
    }
}

/// The credential the backend rotated to, if it differs from the one used.
fn rotated<'s>(used: &Credential, session: &'s BackendSession) -> Option<&'s Credential> {
    let fresh = &session.refresh_credential;
    (!fresh.is_empty() && fresh != used).then_some(fresh)
}

impl std::fmt::Debug for CredentialRestorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialRestorer")
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}
