use biosession::{StorageAdapter, constants::ACTIVE_USER_KEY};

use crate::helpers::*;

#[tokio::test]
async fn test_removing_inactive_account_keeps_pointer_and_neighbours() {
    let h = harness();
    h.enroll_with_credential("u1", "a@x.com", "t1").await;
    h.enroll_with_credential("u2", "b@x.com", "t2").await;

    h.manager.remove_account("u1").await;

    let lifecycle = h.manager.lifecycle();
    assert_eq!(
        h.storage.get(ACTIVE_USER_KEY).await.unwrap().as_deref(),
        Some("u2")
    );
    assert!(lifecycle.get_for_user("u1").await.is_none());
    assert!(lifecycle.credentials().get("u1").await.unwrap().is_none());
    assert!(lifecycle.get_for_user("u2").await.is_some());
    assert!(lifecycle.credentials().get("u2").await.unwrap().is_some());
}

#[tokio::test]
async fn test_removing_active_account_clears_pointer() {
    let h = harness();
    h.enroll_with_credential("u1", "a@x.com", "t1").await;
    h.enroll_with_credential("u2", "b@x.com", "t2").await;

    h.manager.remove_account("u2").await;
    assert!(h.storage.get(ACTIVE_USER_KEY).await.unwrap().is_none());
    assert!(h.manager.lifecycle().get_for_user("u1").await.is_some());
}

#[tokio::test]
async fn test_remove_is_idempotent() {
    let h = harness();
    h.manager.remove_account("nobody").await;

    h.enroll_bare("u1", "a@x.com").await;
    h.manager.remove_account("u1").await;
    h.manager.remove_account("u1").await;
    assert!(h.storage.is_empty().await);
}

#[tokio::test]
async fn test_clear_all_removes_every_key() {
    let h = harness();
    h.enroll_with_credential("u1", "a@x.com", "t1").await;
    h.enroll_with_credential("u2", "b@x.com", "t2").await;
    h.manager
        .lifecycle()
        .credentials()
        .put_legacy(&"legacy".into())
        .await
        .unwrap();

    h.manager.clear_all().await;
    assert_eq!(h.storage.keys().await, Vec::<String>::new());
}
