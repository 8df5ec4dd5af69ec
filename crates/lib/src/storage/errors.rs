//! Error types for key-value storage adapters.

use thiserror::Error;

/// Errors that a [`StorageAdapter`](super::StorageAdapter) can report.
///
/// These never cross the public API of the session manager: the lifecycle
/// layer collapses every one of them to "not found" through
/// [`Benign`](super::Benign).
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend exists on this platform but is not usable right now.
    #[error("Storage backend '{backend}' unavailable: {reason}")]
    Unavailable {
        /// Name of the backend
        backend: &'static str,
        /// Why it is unavailable
        reason: String,
    },

    /// A value exceeds the per-item ceiling of the backend.
    #[error("Value for '{key}' is {size} bytes, exceeding the {limit} byte limit")]
    ItemTooLarge {
        /// Key being written
        key: String,
        /// Encoded value size in bytes
        size: usize,
        /// Backend ceiling in bytes
        limit: usize,
    },

    /// The OS keyring reported a failure.
    #[error("Keyring error for '{key}': {reason}")]
    Keyring {
        /// Key being accessed
        key: String,
        /// Description from the keyring backend
        reason: String,
    },

    /// Serialization failed.
    #[error("Serialization failed for '{key}'")]
    SerializationFailed {
        /// Key being written
        key: String,
        /// The underlying serialization error
        #[source]
        source: serde_json::Error,
    },

    /// Deserialization failed.
    #[error("Deserialization failed for '{key}'")]
    DeserializationFailed {
        /// Key being read
        key: String,
        /// The underlying deserialization error
        #[source]
        source: serde_json::Error,
    },

    /// File I/O error.
    #[error("File I/O error")]
    FileIo {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The on-disk store was written by an unsupported format version.
    #[error("Unsupported storage format version {found}; expected {expected}")]
    UnsupportedVersion {
        /// Version found on disk
        found: u8,
        /// Version this build understands
        expected: u8,
    },
}

impl StorageError {
    /// Check if this error is related to I/O or encoding.
    pub fn is_io_error(&self) -> bool {
        matches!(
            self,
            StorageError::FileIo { .. }
                | StorageError::SerializationFailed { .. }
                | StorageError::DeserializationFailed { .. }
        )
    }

    /// Check if this error means the backend itself cannot be used.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            StorageError::Unavailable { .. } | StorageError::UnsupportedVersion { .. }
        )
    }

    /// Check if this error is a capacity violation.
    pub fn is_capacity_error(&self) -> bool {
        matches!(self, StorageError::ItemTooLarge { .. })
    }

    /// Get the storage key if this error is about a specific key.
    pub fn key(&self) -> Option<&str> {
        match self {
            StorageError::ItemTooLarge { key, .. }
            | StorageError::Keyring { key, .. }
            | StorageError::SerializationFailed { key, .. }
            | StorageError::DeserializationFailed { key, .. } => Some(key),
            _ => None,
        }
    }
}

impl From<StorageError> for crate::Error {
    fn from(err: StorageError) -> Self {
        crate::Error::Storage(err)
    }
}
