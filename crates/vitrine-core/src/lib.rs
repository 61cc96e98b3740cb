#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod asset;
mod error;
mod health;
mod locator;
mod store;

pub mod storage;
pub mod upload;

#[doc(hidden)]
pub mod prelude;

pub use asset::{
    ACCEPTED_MEDIA_PREFIX, AssetId, AssetUpload, DataUrl, MAX_ASSET_SIZE, ValidationError,
};
pub use error::{BoxedError, Error, ErrorKind, Result};
pub use health::{ServiceHealth, ServiceStatus};
pub use locator::{DEV_STORAGE_SEGMENT, InternalLocator, Locator, encode_uri_component};
pub use storage::{MemoryStorage, StorageProvider, StorageService};
pub use store::{AssetStore, AssetStoreConfig, BackendKind, DEFAULT_ORIGIN};
pub use upload::{UploadProvider, UploadResponse, UploadService};

/// Tracing target for asset store operations.
pub const TRACING_TARGET: &str = "vitrine_core::store";
