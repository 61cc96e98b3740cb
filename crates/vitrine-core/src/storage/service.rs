//! Storage service wrapper with observability.

use std::fmt;
use std::sync::Arc;

use super::{AssetId, Result, ServiceHealth, StorageProvider, TRACING_TARGET};

/// Storage service wrapper with observability.
#[derive(Clone)]
pub struct StorageService {
    inner: Arc<dyn StorageProvider>,
}

impl fmt::Debug for StorageService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageService").finish_non_exhaustive()
    }
}

impl StorageService {
    /// Create a new storage service wrapper.
    pub fn new<P>(provider: P) -> Self
    where
        P: StorageProvider + 'static,
    {
        Self {
            inner: Arc::new(provider),
        }
    }

    /// Returns the stored content for `id`.
    pub async fn get(&self, id: &AssetId) -> Result<Option<String>> {
        let result = self.inner.get(id).await;

        match &result {
            Ok(content) => tracing::trace!(
                target: TRACING_TARGET,
                id = %id,
                found = content.is_some(),
                "Storage lookup"
            ),
            Err(error) => tracing::warn!(
                target: TRACING_TARGET,
                id = %id,
                error = %error,
                "Storage lookup failed"
            ),
        }

        result
    }

    /// Inserts or overwrites the entry for `id`.
    pub async fn put(&self, id: &AssetId, content: &str) -> Result<()> {
        tracing::debug!(
            target: TRACING_TARGET,
            id = %id,
            size = content.len(),
            "Writing entry"
        );

        let result = self.inner.put(id, content).await;
        if let Err(error) = &result {
            tracing::warn!(
                target: TRACING_TARGET,
                id = %id,
                error = %error,
                "Storage write failed"
            );
        }

        result
    }

    /// Deletes the entry for `id`.
    pub async fn remove(&self, id: &AssetId) -> Result<bool> {
        let result = self.inner.remove(id).await;

        if let Ok(existed) = &result {
            tracing::debug!(
                target: TRACING_TARGET,
                id = %id,
                existed,
                "Entry removed"
            );
        }

        result
    }

    /// Lists all stored ids.
    pub async fn list(&self) -> Result<Vec<AssetId>> {
        self.inner.list().await
    }

    /// Reports whether the backend is usable.
    pub async fn health_check(&self) -> Result<ServiceHealth> {
        self.inner.health_check().await
    }
}
