//! Convenient re-exports for common use.

pub use crate::error::{BoxedError, Error, ErrorKind, Result};
pub use crate::health::{ServiceHealth, ServiceStatus};
pub use crate::storage::{MemoryStorage, StorageProvider, StorageService};
pub use crate::upload::{UploadProvider, UploadResponse, UploadService};
pub use crate::{AssetId, AssetStore, AssetStoreConfig, AssetUpload, BackendKind, Locator};
