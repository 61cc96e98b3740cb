//! Remote upload types and traits.
//!
//! - [`UploadProvider`]: trait implemented by remote upload backends
//! - [`UploadService`]: cloneable wrapper with observability
//!
//! For an HTTP implementation, see the `vitrine-reqwest` crate.
//!
//! # Example
//!
//! ```rust,ignore
//! use vitrine_core::upload::UploadService;
//! use vitrine_core::AssetUpload;
//!
//! let service = UploadService::new(my_provider);
//! let upload = AssetUpload::new("cat.png", "image/png", bytes);
//! let response = service.upload(&upload).await?;
//! println!("{}", response.file_url);
//! ```

mod service;

use serde::{Deserialize, Serialize};
pub use service::UploadService;

pub use crate::{AssetUpload, Result, ServiceHealth};

/// Tracing target for remote upload operations.
pub const TRACING_TARGET: &str = "vitrine_core::upload";

/// Body returned by a remote upload endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Locator assigned by the remote store, returned to callers verbatim.
    pub file_url: String,
}

impl UploadResponse {
    /// Creates a new response.
    pub fn new(file_url: impl Into<String>) -> Self {
        Self {
            file_url: file_url.into(),
        }
    }
}

/// Core trait for remote upload backends.
#[async_trait::async_trait]
pub trait UploadProvider: Send + Sync {
    /// Sends the payload to the remote store.
    async fn upload(&self, upload: &AssetUpload) -> Result<UploadResponse>;

    /// Reports whether the remote store is reachable and accepts uploads.
    async fn health_check(&self) -> Result<ServiceHealth>;
}
