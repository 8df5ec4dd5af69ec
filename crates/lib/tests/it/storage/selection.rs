use biosession::storage::{
    BackendKind, Platform, StorageConfig,
    selector::{Availability, choose_backend, select},
};

#[tokio::test]
async fn test_constrained_platform_selects_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let config = StorageConfig::default()
        .with_platform(Platform::Android)
        .with_data_dir(dir.path());

    let storage = select(&config).await;
    assert_eq!(storage.name(), "file");
}

#[tokio::test]
async fn test_web_without_data_dir_falls_back_to_memory() {
    let config = StorageConfig::default().with_platform(Platform::Web);
    let storage = select(&config).await;
    assert_eq!(storage.name(), "memory");

    storage.set("k", "v").await.unwrap();
    assert_eq!(storage.get("k").await.unwrap().as_deref(), Some("v"));
}

#[test]
fn test_secure_store_preferred_where_unconstrained() {
    let both = Availability {
        secure: true,
        general: true,
    };
    assert_eq!(choose_backend(Platform::Apple, both), BackendKind::Secure);
    assert_eq!(choose_backend(Platform::Desktop, both), BackendKind::Secure);
    assert_eq!(choose_backend(Platform::Android, both), BackendKind::General);
    assert_eq!(choose_backend(Platform::Web, both), BackendKind::General);

    let none = Availability {
        secure: false,
        general: false,
    };
    for platform in [Platform::Web, Platform::Android, Platform::Apple, Platform::Desktop] {
        assert_eq!(choose_backend(platform, none), BackendKind::Memory);
    }
}
