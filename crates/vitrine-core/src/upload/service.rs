//! Upload service wrapper with observability.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use super::{
    AssetUpload, Result, ServiceHealth, TRACING_TARGET, UploadProvider, UploadResponse,
};

/// Upload service wrapper with observability.
///
/// Adds structured logging to any [`UploadProvider`]. The provider is held in
/// an `Arc` so the service is cheap to clone.
#[derive(Clone)]
pub struct UploadService {
    inner: Arc<dyn UploadProvider>,
}

impl fmt::Debug for UploadService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadService").finish_non_exhaustive()
    }
}

impl UploadService {
    /// Create a new upload service wrapper.
    pub fn new<P>(provider: P) -> Self
    where
        P: UploadProvider + 'static,
    {
        Self {
            inner: Arc::new(provider),
        }
    }

    /// Sends the payload to the remote store.
    pub async fn upload(&self, upload: &AssetUpload) -> Result<UploadResponse> {
        let started_at = Instant::now();

        tracing::debug!(
            target: TRACING_TARGET,
            file_name = %upload.file_name,
            media_type = %upload.media_type,
            size = upload.size(),
            "Uploading asset"
        );

        let result = self.inner.upload(upload).await;
        let elapsed = started_at.elapsed();

        match &result {
            Ok(response) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    file_url = %response.file_url,
                    elapsed_ms = elapsed.as_millis(),
                    "Asset uploaded"
                );
            }
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error = %error,
                    elapsed_ms = elapsed.as_millis(),
                    "Asset upload failed"
                );
            }
        }

        result
    }

    /// Reports whether the remote store is reachable.
    pub async fn health_check(&self) -> Result<ServiceHealth> {
        let result = self.inner.health_check().await;

        match &result {
            Ok(health) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    status = ?health.status,
                    message = ?health.message,
                    "Upload provider health checked"
                );
            }
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error = %error,
                    "Upload provider health check failed"
                );
            }
        }

        result
    }
}
