use biosession::{
    BiometricError, RestoreSource, SessionConfig, StorageAdapter, constants::ACTIVE_USER_KEY,
};

use crate::helpers::*;

#[tokio::test]
async fn test_switch_uses_distinct_prompt() {
    let h = harness();
    h.enroll_bare("u1", "a@x.com").await;
    h.enroll_bare("u2", "b@x.com").await;

    h.manager.switch_account("u1").await.unwrap();
    let config = SessionConfig::default();
    assert_eq!(h.biometrics.prompts().last().unwrap(), &config.switch_prompt);
    assert_ne!(config.switch_prompt, config.unlock_prompt);
}

#[tokio::test]
async fn test_switch_restores_the_target_account() {
    let h = harness();
    h.enroll_with_credential("u1", "a@x.com", "t1").await;
    h.enroll_with_credential("u2", "b@x.com", "t2").await;

    let switched = h.manager.switch_account("u1").await.unwrap();
    assert_eq!(switched.account.user_id, "u1");
    assert_eq!(switched.restore_source, Some(RestoreSource::UserCredential));
    assert_eq!(h.backend.refresh_calls(), vec!["t1"]);

    // The next plain unlock targets the switched-to account
    let unlocked = h.manager.unlock().await.unwrap();
    assert_eq!(unlocked.account.user_id, "u1");
}

#[tokio::test]
async fn test_switch_to_unknown_account_leaves_pointer() {
    let h = harness();
    h.enroll_bare("u1", "a@x.com").await;

    let err = h.manager.switch_account("ghost").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(
        h.storage.get(ACTIVE_USER_KEY).await.unwrap().as_deref(),
        Some("u1")
    );
}

#[tokio::test]
async fn test_switch_to_expired_account_cleans_it_up() {
    let h = harness();
    h.enroll_bare("u1", "a@x.com").await;
    h.clock.advance(20 * DAY_MILLIS);
    h.enroll_bare("u2", "b@x.com").await;
    h.clock.advance(15 * DAY_MILLIS);

    assert_eq!(
        h.manager.switch_account("u1").await.unwrap_err(),
        BiometricError::NoSessionForAccount {
            user_id: "u1".to_string()
        }
    );
    let accounts = h.manager.list_accounts().await;
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].user_id, "u2");
}

#[tokio::test]
async fn test_failed_switch_prompt_changes_nothing() {
    let h = harness();
    h.enroll_bare("u1", "a@x.com").await;
    h.enroll_bare("u2", "b@x.com").await;

    h.biometrics
        .set_outcome(biosession::services::PromptOutcome::failed("Too many attempts"));
    assert!(h.manager.switch_account("u1").await.unwrap_err().is_prompt_error());
    assert_eq!(
        h.storage.get(ACTIVE_USER_KEY).await.unwrap().as_deref(),
        Some("u2")
    );
}
