//! General key-value store persisted as a JSON document.
//!
//! The whole store is loaded once on open and written through on every
//! mutation. Writes go to a sibling temp file which is then renamed over the
//! original, so a crash mid-write leaves the previous document intact.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::{Result, StorageAdapter, StorageError};

/// The current file format version.
/// v0 indicates this is an unstable format subject to breaking changes.
const FORMAT_VERSION: u8 = 0;

fn is_v0(v: &u8) -> bool {
    *v == 0
}

#[derive(Serialize, Deserialize, Default)]
struct StoreDocument {
    #[serde(rename = "_v", default, skip_serializing_if = "is_v0")]
    version: u8,
    #[serde(default)]
    values: BTreeMap<String, String>,
}

/// Unbounded key-value store backed by a single JSON file.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    values: RwLock<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Default file name inside a data directory.
    pub const FILE_NAME: &'static str = "biosession.json";

    /// Open the store at `path`, creating an empty one if the file does not exist.
    ///
    /// Parent directories are created as needed.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| StorageError::FileIo { source })?;
        }

        let values = match tokio::fs::read_to_string(&path).await {
            Ok(json) => {
                let doc: StoreDocument = serde_json::from_str(&json).map_err(|source| {
                    StorageError::DeserializationFailed {
                        key: path.display().to_string(),
                        source,
                    }
                })?;
                if doc.version != FORMAT_VERSION {
                    return Err(StorageError::UnsupportedVersion {
                        found: doc.version,
                        expected: FORMAT_VERSION,
                    });
                }
                doc.values
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StorageError::FileIo { source }),
        };

        tracing::debug!(path = %path.display(), keys = values.len(), "Opened file storage");
        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    /// Open `FILE_NAME` inside `dir`.
    pub async fn open_in_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        Self::open(dir.as_ref().join(Self::FILE_NAME)).await
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, values: &BTreeMap<String, String>) -> Result<()> {
        let doc = StoreDocument {
            version: FORMAT_VERSION,
            values: values.clone(),
        };
        let json =
            serde_json::to_string_pretty(&doc).map_err(|source| StorageError::SerializationFailed {
                key: self.path.display().to_string(),
                source,
            })?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|source| StorageError::FileIo { source })?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|source| StorageError::FileIo { source })
    }
}

#[async_trait]
impl StorageAdapter for FileStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        // Held across the write so concurrent mutations persist in order.
        let mut values = self.values.write().await;
        let previous = values.insert(key.to_string(), value.to_string());
        if let Err(e) = self.persist(&values).await {
            match previous {
                Some(old) => values.insert(key.to_string(), old),
                None => values.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut values = self.values.write().await;
        let Some(previous) = values.remove(key) else {
            return Ok(());
        };
        if let Err(e) = self.persist(&values).await {
            values.insert(key.to_string(), previous);
            return Err(e);
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
