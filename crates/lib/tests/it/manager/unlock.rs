use biosession::{
    BiometricError, Profile, SessionConfig, StorageAdapter, constants::SESSIONS_KEY,
    services::PromptOutcome,
};

use crate::helpers::*;

#[tokio::test]
async fn test_unavailable_hardware_fails_before_prompt() {
    let h = harness();
    h.enroll_bare("u1", "a@x.com").await;
    let prompts_before = h.biometrics.prompts().len();

    h.biometrics.set_capabilities(false, false);
    assert_eq!(h.manager.unlock().await.unwrap_err(), BiometricError::Unavailable);

    h.biometrics.set_capabilities(true, false);
    let err = h.manager.unlock().await.unwrap_err();
    assert_eq!(err, BiometricError::NotEnrolled);
    assert!(err.is_capability_error());
    assert_eq!(h.biometrics.prompts().len(), prompts_before);
}

#[tokio::test]
async fn test_prompt_failure_is_surfaced_without_storage_changes() {
    let h = harness();
    h.enroll_bare("u1", "a@x.com").await;
    let before = h.storage.get(SESSIONS_KEY).await.unwrap();

    h.biometrics.set_outcome(PromptOutcome::failed("User cancelled"));
    assert_eq!(
        h.manager.unlock().await.unwrap_err(),
        BiometricError::PromptFailed("User cancelled".to_string())
    );

    h.biometrics.set_outcome(PromptOutcome::default());
    assert_eq!(
        h.manager.unlock().await.unwrap_err().to_string(),
        BiometricError::GENERIC_PROMPT_FAILURE
    );

    assert_eq!(h.storage.get(SESSIONS_KEY).await.unwrap(), before);
}

#[tokio::test]
async fn test_unlock_uses_unlock_prompt_and_touches_record() {
    let h = harness();
    h.enroll_bare("u1", "a@x.com").await;
    let enrolled = h.manager.lifecycle().get_for_user("u1").await.unwrap();

    h.clock.advance(5_000);
    h.manager.unlock().await.unwrap();

    let prompts = h.biometrics.prompts();
    assert_eq!(prompts.last().unwrap(), &SessionConfig::default().unlock_prompt);

    let touched = h.manager.lifecycle().get_for_user("u1").await.unwrap();
    assert!(touched.last_used >= enrolled.last_used + 5_000);
    assert_eq!(touched.expires_at, enrolled.expires_at);
}

#[tokio::test]
async fn test_cached_profile_is_returned_on_unlock() {
    let h = harness();
    h.enroll_bare("u1", "a@x.com").await;

    let profile = Profile {
        role: Some("admin".to_string()),
        organization_id: Some("org-7".to_string()),
        seat_status: Some("active".to_string()),
    };
    h.manager.refresh_cached_profile(profile.clone()).await;

    let unlocked = h.manager.unlock().await.unwrap();
    let snapshot = unlocked.account.profile.unwrap();
    assert_eq!(snapshot.profile, profile);
    assert!(snapshot.cached_at >= START_MILLIS);
}

#[tokio::test]
async fn test_refresh_profile_without_session_is_noop() {
    let h = harness();
    h.manager.refresh_cached_profile(Profile::default()).await;
    assert!(h.storage.is_empty().await);
}

#[tokio::test]
async fn test_status_reports_capabilities_and_session() {
    let h = harness();
    let status = h.manager.status().await;
    assert!(status.available && status.enrolled);
    assert!(!status.has_session);

    h.enroll_bare("u1", "a@x.com").await;
    assert!(h.manager.status().await.has_session);

    h.biometrics.set_capabilities(false, false);
    let status = h.manager.status().await;
    assert!(!status.available);
    assert!(status.has_session);
}
