//! Constants used throughout the biosession library.
//!
//! Central definitions for the persisted storage keys and the default
//! user-facing strings.

/// Legacy single-slot session record (pre multi-account).
pub const LEGACY_SESSION_KEY: &str = "biometric_session";

/// Map of session records keyed by user id.
pub const SESSIONS_KEY: &str = "biometric_sessions_v2";

/// User id of the most recently unlocked or enrolled account.
pub const ACTIVE_USER_KEY: &str = "biometric_active_user";

/// Prefix of the per-user refresh credential keys.
pub const USER_CREDENTIAL_PREFIX: &str = "biometric_refresh_token_";

/// Legacy global refresh credential slot.
pub const LEGACY_CREDENTIAL_KEY: &str = "biometric_refresh_token";

/// Default lifetime of a session record.
pub const DEFAULT_SESSION_TTL_DAYS: u32 = 30;

/// Milliseconds in a day.
pub const DAY_MILLIS: u64 = 24 * 60 * 60 * 1000;

/// Default prompt shown when unlocking the active account.
pub const DEFAULT_UNLOCK_PROMPT: &str = "Sign in with biometrics";

/// Default prompt shown when switching to another cached account.
pub const DEFAULT_SWITCH_PROMPT: &str = "Confirm your identity to switch accounts";

/// Default prompt shown when enabling biometric sign-in.
pub const DEFAULT_ENROLL_PROMPT: &str = "Enable biometric sign-in";
