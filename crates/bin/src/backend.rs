//! Storage construction from CLI arguments.

use std::sync::Arc;

use biosession::{
    SessionConfig, StorageAdapter, StorageConfig, SystemClock,
    session::SessionLifecycle,
    storage::selector,
};

use crate::cli::StorageArgs;

/// Selection inputs for the given arguments.
pub fn storage_config(args: &StorageArgs) -> StorageConfig {
    let mut config = StorageConfig {
        service_name: args.service.clone(),
        ..StorageConfig::default()
    };
    if let Some(dir) = &args.data_dir {
        config = config.with_data_dir(dir);
    }
    if let Some(platform) = args.platform {
        config = config.with_platform(platform);
    }
    config
}

/// Select the storage backend the library would use with these arguments.
pub async fn open_storage(args: &StorageArgs) -> Arc<dyn StorageAdapter> {
    let config = storage_config(args);
    let storage = selector::select(&config).await;
    if storage.name() == "memory" {
        tracing::warn!("No persistent storage available; sessions will not be found");
    }
    storage
}

/// Session lifecycle over the selected backend.
pub async fn open_lifecycle(args: &StorageArgs) -> SessionLifecycle {
    let storage = open_storage(args).await;
    SessionLifecycle::new(storage, Arc::new(SystemClock), &SessionConfig::default())
}
