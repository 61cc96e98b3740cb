//! The asset store: remote upload with a local fallback.

use std::sync::Arc;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};
use tokio::sync::OnceCell;

use crate::asset::{AssetId, AssetUpload, ValidationError};
use crate::locator::{InternalLocator, Locator};
use crate::storage::StorageService;
use crate::upload::UploadService;
use crate::{Result, TRACING_TARGET};

/// Origin used in internal locators when none is configured.
pub const DEFAULT_ORIGIN: &str = "http://localhost:3000";

/// Asset store configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct AssetStoreConfig {
    /// Origin prefixed to internal locators
    #[cfg_attr(
        feature = "config",
        arg(long = "origin", env = "VITRINE_ORIGIN", default_value = DEFAULT_ORIGIN)
    )]
    #[serde(default = "default_origin")]
    pub origin: String,
}

fn default_origin() -> String {
    DEFAULT_ORIGIN.to_owned()
}

impl Default for AssetStoreConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
        }
    }
}

impl AssetStoreConfig {
    /// Creates a configuration with the given origin.
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
        }
    }
}

/// Backend selected by the capability probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BackendKind {
    /// Uploads go to the remote provider.
    Remote,
    /// Uploads are persisted in local storage.
    LocalFallback,
}

/// Stores image assets remotely when possible and locally otherwise.
///
/// The backend is chosen once by probing the remote provider and cached for
/// the lifetime of the store (clones share the cached choice). When the remote
/// backend was chosen but a particular upload fails, that upload still falls
/// back to local storage.
///
/// # Examples
///
/// ```rust,ignore
/// use vitrine_core::{AssetStore, AssetStoreConfig, AssetUpload, MemoryStorage, StorageService};
///
/// let store = AssetStore::new(AssetStoreConfig::default(), StorageService::new(MemoryStorage::new()));
/// let locator = store.store(&AssetUpload::new("cat.png", "image/png", bytes)).await?;
/// let content = store.resolve(Some(&locator.to_string())).await;
/// ```
#[derive(Debug, Clone)]
pub struct AssetStore {
    config: AssetStoreConfig,
    storage: StorageService,
    upload: Option<UploadService>,
    backend: Arc<OnceCell<BackendKind>>,
}

impl AssetStore {
    /// Creates a store that only uses local storage.
    pub fn new(config: AssetStoreConfig, storage: StorageService) -> Self {
        Self {
            config,
            storage,
            upload: None,
            backend: Arc::new(OnceCell::new()),
        }
    }

    /// Adds a remote upload provider, resetting any cached probe result.
    #[must_use]
    pub fn with_upload(mut self, upload: UploadService) -> Self {
        self.upload = Some(upload);
        self.backend = Arc::new(OnceCell::new());
        self
    }

    /// Returns the store configuration.
    pub fn config(&self) -> &AssetStoreConfig {
        &self.config
    }

    /// Returns the local storage service.
    pub fn storage(&self) -> &StorageService {
        &self.storage
    }

    /// Returns the backend chosen by the capability probe, probing on first use.
    pub async fn backend(&self) -> BackendKind {
        *self.backend.get_or_init(|| self.probe()).await
    }

    async fn probe(&self) -> BackendKind {
        let Some(upload) = &self.upload else {
            tracing::info!(
                target: TRACING_TARGET,
                backend = %BackendKind::LocalFallback,
                "No upload provider configured"
            );
            return BackendKind::LocalFallback;
        };

        let backend = match upload.health_check().await {
            Ok(health) if health.is_healthy() => BackendKind::Remote,
            Ok(health) => {
                tracing::info!(
                    target: TRACING_TARGET,
                    status = ?health.status,
                    message = ?health.message,
                    "Upload provider unavailable"
                );
                BackendKind::LocalFallback
            }
            Err(error) => {
                tracing::info!(
                    target: TRACING_TARGET,
                    error = %error,
                    "Upload provider probe failed"
                );
                BackendKind::LocalFallback
            }
        };

        tracing::info!(
            target: TRACING_TARGET,
            backend = %backend,
            "Storage backend selected"
        );

        backend
    }

    /// Validates and stores an upload, returning its locator.
    ///
    /// Validation failures are the only errors. Remote failures fall back to
    /// local storage, and local write failures are logged while the locator is
    /// still returned.
    pub async fn store(&self, upload: &AssetUpload) -> std::result::Result<Locator, ValidationError> {
        upload.validate()?;

        if let Some(locator) = self.store_remote(upload).await {
            return Ok(locator);
        }

        let id = AssetId::generate();
        let content = upload.to_data_url();

        if let Err(error) = self.storage.put(&id, &content).await {
            tracing::error!(
                target: TRACING_TARGET,
                id = %id,
                error = %error,
                "Failed to persist asset locally"
            );
        } else {
            tracing::debug!(
                target: TRACING_TARGET,
                id = %id,
                size = upload.size(),
                "Asset stored locally"
            );
        }

        let locator = InternalLocator::new(&self.config.origin, id, &upload.file_name);
        Ok(Locator::Internal(locator))
    }

    async fn store_remote(&self, upload: &AssetUpload) -> Option<Locator> {
        if self.backend().await != BackendKind::Remote {
            return None;
        }

        let service = self.upload.as_ref()?;
        match service.upload(upload).await {
            Ok(response) => Some(Locator::parse(&response.file_url)),
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error = %error,
                    "Remote upload failed, using local storage"
                );
                None
            }
        }
    }

    /// Resolves a locator to renderable content.
    ///
    /// Never fails: anything that cannot be resolved is returned unchanged.
    pub async fn resolve(&self, locator: Option<&str>) -> Option<String> {
        let value = locator?;

        let Locator::Internal(internal) = Locator::parse(value) else {
            return Some(value.to_owned());
        };

        match self.storage.get(&internal.id).await {
            Ok(Some(content)) => Some(content),
            Ok(None) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    id = %internal.id,
                    "Asset not found locally"
                );
                Some(value.to_owned())
            }
            Err(error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    id = %internal.id,
                    error = %error,
                    "Failed to resolve asset"
                );
                Some(value.to_owned())
            }
        }
    }

    /// Removes a locally stored asset.
    ///
    /// Returns whether an entry was deleted. Locators that do not reference
    /// local storage are ignored.
    pub async fn remove(&self, locator: &str) -> Result<bool> {
        let Locator::Internal(internal) = Locator::parse(locator) else {
            return Ok(false);
        };

        self.storage.remove(&internal.id).await
    }

    /// Lists ids held in local storage.
    pub async fn list(&self) -> Result<Vec<AssetId>> {
        self.storage.list().await
    }
}
