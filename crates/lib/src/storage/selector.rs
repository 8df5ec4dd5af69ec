//! Storage backend selection.
//!
//! The backend is chosen once per process from a fixed preference order for
//! the current platform:
//!
//! | Platform | Order |
//! |----------|-------|
//! | Web | general, memory |
//! | Android | general, secure, memory |
//! | Apple, Desktop | secure, general, memory |
//!
//! Android's secure store caps items at a few kilobytes, so the unbounded
//! general store is preferred there. Everywhere else the secure store wins for
//! its at-rest protection. The in-memory store always closes the list.

use std::{fmt, path::PathBuf, str::FromStr, sync::Arc};

use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

use super::{FileStorage, MemoryStorage, StorageAdapter};

/// Default keyring service name.
pub const DEFAULT_SERVICE_NAME: &str = "biosession";

/// Default per-item ceiling applied to the secure store, in bytes.
pub const DEFAULT_SECURE_ITEM_LIMIT: usize = 2048;

/// Runtime platform family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Browser-like runtime without a filesystem or keyring
    Web,
    /// Native platform whose secure store has a small per-item ceiling
    Android,
    /// iOS and macOS
    Apple,
    /// Any other native platform
    Desktop,
}

impl Platform {
    /// Platform family of the compile target.
    pub fn current() -> Self {
        if cfg!(target_arch = "wasm32") {
            Platform::Web
        } else if cfg!(target_os = "android") {
            Platform::Android
        } else if cfg!(any(target_os = "ios", target_os = "macos")) {
            Platform::Apple
        } else {
            Platform::Desktop
        }
    }

    /// Whether the secure store on this platform rejects or truncates larger items.
    pub fn has_constrained_secure_store(self) -> bool {
        matches!(self, Platform::Android)
    }

    /// Backends to try, most preferred first.
    pub fn preference_order(self) -> &'static [BackendKind] {
        match self {
            Platform::Web => &[BackendKind::General, BackendKind::Memory],
            p if p.has_constrained_secure_store() => &[
                BackendKind::General,
                BackendKind::Secure,
                BackendKind::Memory,
            ],
            _ => &[
                BackendKind::Secure,
                BackendKind::General,
                BackendKind::Memory,
            ],
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Platform::Web => "web",
            Platform::Android => "android",
            Platform::Apple => "apple",
            Platform::Desktop => "desktop",
        };
        f.write_str(name)
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "web" => Ok(Platform::Web),
            "android" => Ok(Platform::Android),
            "apple" | "ios" | "macos" => Ok(Platform::Apple),
            "desktop" | "linux" | "windows" => Ok(Platform::Desktop),
            other => Err(format!("unknown platform '{other}'")),
        }
    }
}

/// Kind of storage backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// OS keyring / secure enclave
    Secure,
    /// Unbounded general key-value store
    General,
    /// Process-local map
    Memory,
}

/// Which backends are usable on this device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Availability {
    /// Secure store is usable
    pub secure: bool,
    /// General key-value store is usable
    pub general: bool,
}

/// Pick the first available backend in the platform's preference order.
pub fn choose_backend(platform: Platform, availability: Availability) -> BackendKind {
    platform
        .preference_order()
        .iter()
        .copied()
        .find(|kind| match kind {
            BackendKind::Secure => availability.secure,
            BackendKind::General => availability.general,
            BackendKind::Memory => true,
        })
        .unwrap_or(BackendKind::Memory)
}

/// Inputs to backend selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Override the detected platform
    #[serde(default)]
    pub platform: Option<Platform>,
    /// Directory for the general store; without one the general store is unavailable
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Keyring service name
    #[serde(default = "default_service_name")]
    pub service_name: String,
    /// Per-item ceiling for the secure store in bytes, on platforms whose
    /// secure store is constrained
    #[serde(default = "default_secure_item_limit")]
    pub secure_item_limit: Option<usize>,
}

fn default_service_name() -> String {
    DEFAULT_SERVICE_NAME.to_string()
}

fn default_secure_item_limit() -> Option<usize> {
    Some(DEFAULT_SECURE_ITEM_LIMIT)
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            platform: None,
            data_dir: None,
            service_name: default_service_name(),
            secure_item_limit: default_secure_item_limit(),
        }
    }
}

impl StorageConfig {
    /// Config with a general-store directory.
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    /// Config with an explicit platform.
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Effective platform.
    pub fn platform(&self) -> Platform {
        self.platform.unwrap_or_else(Platform::current)
    }

    /// Item ceiling for the secure store on the effective platform.
    pub fn effective_secure_item_limit(&self) -> Option<usize> {
        if self.platform().has_constrained_secure_store() {
            self.secure_item_limit
        } else {
            None
        }
    }
}

/// Construct the preferred backend that can actually be opened.
///
/// Never fails: when nothing else works the in-memory store is returned.
pub async fn select(config: &StorageConfig) -> Arc<dyn StorageAdapter> {
    let platform = config.platform();
    for kind in platform.preference_order() {
        if let Some(adapter) = open_backend(*kind, config).await {
            tracing::info!(%platform, backend = adapter.name(), "Selected storage backend");
            return adapter;
        }
        tracing::debug!(%platform, ?kind, "Storage backend unavailable, trying next");
    }
    Arc::new(MemoryStorage::new())
}

async fn open_backend(
    kind: BackendKind,
    config: &StorageConfig,
) -> Option<Arc<dyn StorageAdapter>> {
    match kind {
        BackendKind::Secure => open_secure(config).await,
        BackendKind::General => {
            let dir = config.data_dir.as_ref()?;
            match FileStorage::open_in_dir(dir).await {
                Ok(storage) => Some(Arc::new(storage) as Arc<dyn StorageAdapter>),
                Err(e) => {
                    tracing::warn!(dir = %dir.display(), error = %e, "Cannot open file storage");
                    None
                }
            }
        }
        BackendKind::Memory => Some(Arc::new(MemoryStorage::new()) as Arc<dyn StorageAdapter>),
    }
}

#[cfg(feature = "keyring")]
async fn open_secure(config: &StorageConfig) -> Option<Arc<dyn StorageAdapter>> {
    let storage = super::KeyringStorage::new(
        &config.service_name,
        config.effective_secure_item_limit(),
    );
    if storage.probe().await {
        Some(Arc::new(storage) as Arc<dyn StorageAdapter>)
    } else {
        None
    }
}

#[cfg(not(feature = "keyring"))]
async fn open_secure(_config: &StorageConfig) -> Option<Arc<dyn StorageAdapter>> {
    None
}

static SHARED: OnceCell<Arc<dyn StorageAdapter>> = OnceCell::const_new();

/// Process-wide backend, selected on first call.
///
/// Later calls return the same adapter regardless of `config`.
pub async fn shared(config: &StorageConfig) -> Arc<dyn StorageAdapter> {
    SHARED.get_or_init(|| select(config)).await.clone()
}
