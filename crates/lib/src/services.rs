//! External collaborators consumed by the session manager.
//!
//! The manager never inspects how biometrics are checked or how the backend
//! issues sessions; it only sees these narrow interfaces:
//!
//! - [`BiometricAuthenticator`] - capability probe and prompt
//! - [`AuthBackend`] - live-session lookup and credential refresh
//! - [`AppSessionStore`] - read-only view of the application's own session
//! - [`Notifier`] - user-facing alerts, used only by enrollment

use async_trait::async_trait;
use thiserror::Error;

use crate::credentials::Credential;

/// What the device can do biometrically.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// Biometric hardware is present and usable
    pub is_available: bool,
    /// At least one biometric is enrolled with the OS
    pub is_enrolled: bool,
}

/// Result of a biometric prompt.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PromptOutcome {
    pub success: bool,
    /// Platform message when the prompt failed or was cancelled
    pub error: Option<String>,
}

impl PromptOutcome {
    pub fn passed() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// A live backend session.
#[derive(Clone, Debug)]
pub struct BackendSession {
    /// User the backend issued the session for
    pub user_id: String,
    /// Credential that can refresh this session later
    pub refresh_credential: Credential,
}

/// The application's current session as seen by its own session store.
#[derive(Clone, Debug)]
pub struct AppSession {
    pub user_id: Option<String>,
    pub refresh_credential: Credential,
}

/// Errors reported by external services.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The service could not be reached.
    #[error("Service unavailable: {reason}")]
    Unavailable { reason: String },

    /// The service rejected the request, e.g. a revoked refresh credential.
    #[error("Request rejected: {reason}")]
    Rejected { reason: String },
}

impl ServiceError {
    pub fn is_rejected(&self) -> bool {
        matches!(self, ServiceError::Rejected { .. })
    }
}

impl From<ServiceError> for crate::Error {
    fn from(err: ServiceError) -> Self {
        crate::Error::Service(err)
    }
}

/// Device biometric capability probe and prompt.
#[async_trait]
pub trait BiometricAuthenticator: Send + Sync {
    async fn check_capabilities(&self) -> Capabilities;

    /// Show a prompt with the given purpose string.
    async fn authenticate(&self, prompt_message: &str) -> PromptOutcome;
}

/// Backend auth service.
///
/// `refresh_session` must be safe to call repeatedly with the same credential.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// The session currently live in this process, if any.
    async fn current_session(&self) -> Result<Option<BackendSession>, ServiceError>;

    /// Exchange a refresh credential for a live session.
    async fn refresh_session(&self, credential: &Credential)
    -> Result<BackendSession, ServiceError>;
}

/// Read-only accessor for the application's generic session store.
#[async_trait]
pub trait AppSessionStore: Send + Sync {
    async fn current_session(&self) -> Result<Option<AppSession>, ServiceError>;
}

/// User-facing notices raised by the enrollment flow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    /// Biometric sign-in was enabled for this email
    Enrolled { email: String },
    /// Enrollment could not be completed
    EnrollmentFailed { reason: String },
}

/// Alert surface.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Notifier that only logs.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        tracing::info!(?notice, "Enrollment notice");
    }
}

/// App session store for hosts that keep no separate session.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoAppSession;

#[async_trait]
impl AppSessionStore for NoAppSession {
    async fn current_session(&self) -> Result<Option<AppSession>, ServiceError> {
        Ok(None)
    }
}
