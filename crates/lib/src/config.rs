//! Session manager configuration.
//!
//! Every field has a default, so an empty document deserializes to the
//! production configuration:
//!
//! ```
//! let config: biosession::SessionConfig = serde_json::from_str("{}").unwrap();
//! assert_eq!(config.session_ttl_days, 30);
//! ```

use serde::{Deserialize, Serialize};

use crate::constants::{
    DAY_MILLIS, DEFAULT_ENROLL_PROMPT, DEFAULT_SESSION_TTL_DAYS, DEFAULT_SWITCH_PROMPT,
    DEFAULT_UNLOCK_PROMPT,
};

/// Tunables for [`BiometricSessionManager`](crate::BiometricSessionManager).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Lifetime of a session record from enrollment, in days.
    #[serde(default = "default_ttl_days")]
    pub session_ttl_days: u32,

    /// Purpose string for the primary unlock prompt.
    #[serde(default = "default_unlock_prompt")]
    pub unlock_prompt: String,

    /// Purpose string for the account-switch prompt.
    #[serde(default = "default_switch_prompt")]
    pub switch_prompt: String,

    /// Purpose string for the prompt confirming enrollment.
    #[serde(default = "default_enroll_prompt")]
    pub enroll_prompt: String,
}

fn default_ttl_days() -> u32 {
    DEFAULT_SESSION_TTL_DAYS
}

fn default_unlock_prompt() -> String {
    DEFAULT_UNLOCK_PROMPT.to_string()
}

fn default_switch_prompt() -> String {
    DEFAULT_SWITCH_PROMPT.to_string()
}

fn default_enroll_prompt() -> String {
    DEFAULT_ENROLL_PROMPT.to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_ttl_days: default_ttl_days(),
            unlock_prompt: default_unlock_prompt(),
            switch_prompt: default_switch_prompt(),
            enroll_prompt: default_enroll_prompt(),
        }
    }
}

impl SessionConfig {
    /// Builder method to set the session lifetime.
    pub fn with_ttl_days(mut self, days: u32) -> Self {
        self.session_ttl_days = days;
        self
    }

    /// Session lifetime in milliseconds.
    pub fn session_ttl_millis(&self) -> u64 {
        u64::from(self.session_ttl_days) * DAY_MILLIS
    }
}
