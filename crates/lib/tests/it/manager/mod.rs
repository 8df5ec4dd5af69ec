//! BiometricSessionManager integration tests
//!
//! End-to-end flows through the public API: enrollment, unlock, account
//! switching and the failure modes a caller can observe.

mod switching;
mod unlock;
