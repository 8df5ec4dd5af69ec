use biosession::{
    BiometricError, StorageAdapter,
    constants::{ACTIVE_USER_KEY, LEGACY_SESSION_KEY, SESSIONS_KEY},
};

use crate::helpers::*;

/// A legacy record as written by pre-multi-account installs.
fn legacy_json(user_id: &str, expires_at: u64) -> String {
    format!(
        r#"{{"userId":"{user_id}","email":"{user_id}@x.com","sessionToken":"legacy","expiresAt":{expires_at},"lastUsed":{START_MILLIS}}}"#
    )
}

#[tokio::test]
async fn test_legacy_record_unlocks_and_migrates() {
    let h = harness();
    h.storage
        .set(LEGACY_SESSION_KEY, &legacy_json("u0", START_MILLIS + DAY_MILLIS))
        .await
        .unwrap();

    let unlocked = h.manager.unlock().await.unwrap();
    assert_eq!(unlocked.account.user_id, "u0");

    assert_eq!(
        h.storage.get(ACTIVE_USER_KEY).await.unwrap().as_deref(),
        Some("u0")
    );
    assert!(h.manager.lifecycle().get_for_user("u0").await.is_some());
    // Both representations coexist
    assert!(h.storage.get(LEGACY_SESSION_KEY).await.unwrap().is_some());
}

#[tokio::test]
async fn test_migration_twice_equals_once() {
    let h = harness();
    h.enroll_bare("u1", "u1@x.com").await;
    h.storage.delete(ACTIVE_USER_KEY).await.unwrap();
    h.storage
        .set(LEGACY_SESSION_KEY, &legacy_json("u0", START_MILLIS + DAY_MILLIS))
        .await
        .unwrap();

    let lifecycle = h.manager.lifecycle();
    lifecycle.get_active().await.unwrap();
    let once = h.storage.get(SESSIONS_KEY).await.unwrap();

    h.storage.delete(ACTIVE_USER_KEY).await.unwrap();
    lifecycle.get_active().await.unwrap();
    let twice = h.storage.get(SESSIONS_KEY).await.unwrap();

    assert_eq!(once, twice);
    let ids: Vec<_> = lifecycle
        .records()
        .load_map()
        .await
        .unwrap()
        .user_ids()
        .map(str::to_string)
        .collect();
    assert_eq!(ids, vec!["u0", "u1"]);
}

#[tokio::test]
async fn test_versioned_record_wins_over_legacy() {
    let h = harness();
    h.enroll_bare("u0", "new@x.com").await;
    h.storage.delete(ACTIVE_USER_KEY).await.unwrap();
    h.storage
        .set(LEGACY_SESSION_KEY, &legacy_json("u0", START_MILLIS + DAY_MILLIS))
        .await
        .unwrap();

    let record = h.manager.lifecycle().get_active().await.unwrap();
    assert_eq!(record.email, "new@x.com");

    let accounts = h.manager.list_accounts().await;
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].email, "new@x.com");
}

#[tokio::test]
async fn test_expired_legacy_record_is_cleared() {
    let h = harness();
    h.storage
        .set(LEGACY_SESSION_KEY, &legacy_json("u0", START_MILLIS - 1))
        .await
        .unwrap();

    assert_eq!(h.manager.unlock().await.unwrap_err(), BiometricError::NoSession);
    assert!(h.storage.get(LEGACY_SESSION_KEY).await.unwrap().is_none());
    assert!(h.storage.get(SESSIONS_KEY).await.unwrap().is_none());
}

#[tokio::test]
async fn test_switch_never_uses_legacy_slot() {
    let h = harness();
    h.storage
        .set(LEGACY_SESSION_KEY, &legacy_json("u0", START_MILLIS + DAY_MILLIS))
        .await
        .unwrap();

    let err = h.manager.switch_account("u0").await.unwrap_err();
    assert_eq!(
        err,
        BiometricError::NoSessionForAccount {
            user_id: "u0".to_string()
        }
    );
    // Listing still shows the stray legacy account
    assert_eq!(h.manager.list_accounts().await.len(), 1);
}
