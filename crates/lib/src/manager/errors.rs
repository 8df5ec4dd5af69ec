//! Error types for biometric unlock and account switching.
//!
//! These are the only failures that cross the public API. Their `Display`
//! output is the user-facing message.

use thiserror::Error;

/// Errors that end an unlock, switch or enrollment attempt.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BiometricError {
    /// No biometric hardware is available on this device.
    #[error("Biometric authentication is not available on this device")]
    Unavailable,

    /// Hardware is present but no biometric is enrolled with the OS.
    #[error("No biometrics are enrolled on this device")]
    NotEnrolled,

    /// The prompt failed or was cancelled.
    #[error("{0}")]
    PromptFailed(String),

    /// No live session record for the active user.
    #[error("No biometric session found. Please sign in with your email and password.")]
    NoSession,

    /// No live session record for the requested account.
    #[error("No biometric session found for account {user_id}")]
    NoSessionForAccount {
        /// The account that was requested
        user_id: String,
    },

    /// The enrollment record could not be saved.
    #[error("Biometric sign-in could not be enabled")]
    EnrollmentFailed,
}

impl BiometricError {
    /// Message used when the platform gives no reason for a failed prompt.
    pub const GENERIC_PROMPT_FAILURE: &'static str = "Biometric authentication failed";

    /// Check if this error means the device cannot do biometrics at all.
    pub fn is_capability_error(&self) -> bool {
        matches!(self, BiometricError::Unavailable | BiometricError::NotEnrolled)
    }

    /// Check if this error came from the prompt itself.
    pub fn is_prompt_error(&self) -> bool {
        matches!(self, BiometricError::PromptFailed(_))
    }

    /// Check if this error means there is no usable session record.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            BiometricError::NoSession | BiometricError::NoSessionForAccount { .. }
        )
    }
}

impl From<BiometricError> for crate::Error {
    fn from(err: BiometricError) -> Self {
        crate::Error::Biometric(err)
    }
}
