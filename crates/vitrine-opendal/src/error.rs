//! Storage error types.

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Failed to initialize the storage backend.
    #[error("storage initialization failed: {0}")]
    Init(String),

    /// Object not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Permission denied.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The storage document is not a JSON object of strings.
    #[error("corrupted storage document: {0}")]
    Corrupted(#[source] serde_json::Error),

    /// The asset id cannot be used as an object name.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Backend-specific error.
    #[error("backend error: {0}")]
    Backend(#[source] opendal::Error),
}

impl StorageError {
    /// Creates a new initialization error.
    pub fn init(msg: impl Into<String>) -> Self {
        Self::Init(msg.into())
    }

    /// Creates a new invalid key error.
    pub fn invalid_key(key: impl Into<String>) -> Self {
        Self::InvalidKey(key.into())
    }
}

impl From<opendal::Error> for StorageError {
    fn from(err: opendal::Error) -> Self {
        use opendal::ErrorKind;

        match err.kind() {
            ErrorKind::NotFound => Self::NotFound(err.to_string()),
            ErrorKind::PermissionDenied => Self::PermissionDenied(err.to_string()),
            _ => Self::Backend(err),
        }
    }
}

impl From<StorageError> for vitrine_core::Error {
    fn from(err: StorageError) -> Self {
        let message = err.to_string();
        let error = match &err {
            StorageError::Init(_) => vitrine_core::Error::configuration(),
            StorageError::NotFound(_) => vitrine_core::Error::not_found(),
            StorageError::PermissionDenied(_) => vitrine_core::Error::service_unavailable(),
            StorageError::Corrupted(_) => vitrine_core::Error::serialization(),
            StorageError::InvalidKey(_) => vitrine_core::Error::invalid_input(),
            StorageError::Backend(e) if e.is_temporary() => {
                vitrine_core::Error::service_unavailable()
            }
            StorageError::Backend(_) => vitrine_core::Error::internal_error(),
        };

        error.with_message(message).with_source(err)
    }
}
