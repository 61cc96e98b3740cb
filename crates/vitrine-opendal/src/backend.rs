//! OpenDAL implementation of the storage port.

use std::collections::BTreeMap;
use std::sync::Arc;

use opendal::{Operator, services};
use tokio::sync::Mutex;
use vitrine_core::{AssetId, ServiceHealth, StorageProvider, StorageService};

use crate::TRACING_TARGET;
use crate::config::{BackendType, StorageConfig, StorageLayout};
use crate::error::{StorageError, StorageResult};

/// Name of the storage document.
pub const DOCUMENT_KEY: &str = "dev_file_storage";

/// Directory holding one object per entry.
///
/// Distinct from [`DOCUMENT_KEY`] so both layouts can share a root.
pub const ENTRY_PREFIX: &str = "dev_file_storage.d/";

type Document = BTreeMap<String, String>;

/// Durable `id -> content` storage on top of an OpenDAL operator.
///
/// With [`StorageLayout::Document`] all entries live in one JSON object named
/// [`DOCUMENT_KEY`], read and rewritten as a whole on every change. With
/// [`StorageLayout::PerKey`] each entry is its own object under
/// [`ENTRY_PREFIX`].
#[derive(Clone)]
pub struct OpendalStorage {
    operator: Operator,
    config: StorageConfig,
    document_lock: Arc<Mutex<()>>,
}

impl std::fmt::Debug for OpendalStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpendalStorage")
            .field("backend", &self.config.backend)
            .field("root", &self.config.root)
            .field("layout", &self.config.layout)
            .finish()
    }
}

impl OpendalStorage {
    /// Creates a new storage backend from configuration.
    pub fn new(config: StorageConfig) -> StorageResult<Self> {
        let operator = Self::create_operator(&config)?;

        tracing::info!(
            target: TRACING_TARGET,
            backend = %config.backend,
            root = %config.root,
            layout = %config.layout,
            "Storage backend initialized"
        );

        Ok(Self {
            operator,
            config,
            document_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Returns the configuration for this backend.
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Converts this backend into a [`StorageService`].
    pub fn into_service(self) -> StorageService {
        StorageService::new(self)
    }

    fn create_operator(config: &StorageConfig) -> StorageResult<Operator> {
        let operator = match config.backend {
            BackendType::Fs => Operator::new(services::Fs::default().root(&config.root))
                .map(|op| op.finish()),
            BackendType::Memory => Operator::new(services::Memory::default()).map(|op| op.finish()),
        };

        operator.map_err(|e| StorageError::init(e.to_string()))
    }

    fn entry_path(id: &AssetId) -> StorageResult<String> {
        if !id.is_path_safe() {
            return Err(StorageError::invalid_key(id.as_str()));
        }

        Ok(format!("{ENTRY_PREFIX}{id}"))
    }

    async fn read_optional(&self, path: &str) -> StorageResult<Option<Vec<u8>>> {
        match self.operator.read(path).await {
            Ok(buffer) => Ok(Some(buffer.to_vec())),
            Err(e) if e.kind() == opendal::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn read_document(&self) -> StorageResult<Document> {
        let Some(bytes) = self.read_optional(DOCUMENT_KEY).await? else {
            return Ok(Document::new());
        };

        serde_json::from_slice(&bytes).map_err(StorageError::Corrupted)
    }

    async fn write_document(&self, document: &Document) -> StorageResult<()> {
        let bytes = serde_json::to_vec(document).map_err(StorageError::Corrupted)?;

        tracing::debug!(
            target: TRACING_TARGET,
            entries = document.len(),
            size = bytes.len(),
            "Writing storage document"
        );

        self.operator.write(DOCUMENT_KEY, bytes).await?;
        Ok(())
    }

    async fn get_entry(&self, id: &AssetId) -> StorageResult<Option<String>> {
        match self.config.layout {
            StorageLayout::Document => {
                let _guard = self.document_lock.lock().await;
                Ok(self.read_document().await?.remove(id.as_str()))
            }
            StorageLayout::PerKey => {
                let path = Self::entry_path(id)?;
                let Some(bytes) = self.read_optional(&path).await? else {
                    return Ok(None);
                };
                Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
            }
        }
    }

    async fn put_entry(&self, id: &AssetId, content: &str) -> StorageResult<()> {
        match self.config.layout {
            StorageLayout::Document => {
                let _guard = self.document_lock.lock().await;
                let mut document = self.read_document().await?;
                document.insert(id.to_string(), content.to_owned());
                self.write_document(&document).await
            }
            StorageLayout::PerKey => {
                let path = Self::entry_path(id)?;
                self.operator.write(&path, content.as_bytes().to_vec()).await?;
                Ok(())
            }
        }
    }

    async fn remove_entry(&self, id: &AssetId) -> StorageResult<bool> {
        match self.config.layout {
            StorageLayout::Document => {
                let _guard = self.document_lock.lock().await;
                let mut document = self.read_document().await?;
                if document.remove(id.as_str()).is_none() {
                    return Ok(false);
                }
                self.write_document(&document).await?;
                Ok(true)
            }
            StorageLayout::PerKey => {
                let path = Self::entry_path(id)?;
                match self.operator.stat(&path).await {
                    Ok(_) => {}
                    Err(e) if e.kind() == opendal::ErrorKind::NotFound => return Ok(false),
                    Err(e) => return Err(e.into()),
                }
                self.operator.delete(&path).await?;
                Ok(true)
            }
        }
    }

    async fn list_entries(&self) -> StorageResult<Vec<AssetId>> {
        match self.config.layout {
            StorageLayout::Document => {
                let _guard = self.document_lock.lock().await;
                let document = self.read_document().await?;
                Ok(document.into_keys().map(AssetId::new).collect())
            }
            StorageLayout::PerKey => {
                let entries = match self.operator.list(ENTRY_PREFIX).await {
                    Ok(entries) => entries,
                    Err(e) if e.kind() == opendal::ErrorKind::NotFound => Vec::new(),
                    Err(e) => return Err(e.into()),
                };

                let mut ids: Vec<AssetId> = entries
                    .into_iter()
                    .filter(|entry| entry.metadata().is_file())
                    .map(|entry| AssetId::new(entry.name()))
                    .collect();
                ids.sort();
                Ok(ids)
            }
        }
    }
}

#[async_trait::async_trait]
impl StorageProvider for OpendalStorage {
    async fn get(&self, id: &AssetId) -> vitrine_core::Result<Option<String>> {
        Ok(self.get_entry(id).await?)
    }

    async fn put(&self, id: &AssetId, content: &str) -> vitrine_core::Result<()> {
        Ok(self.put_entry(id, content).await?)
    }

    async fn remove(&self, id: &AssetId) -> vitrine_core::Result<bool> {
        Ok(self.remove_entry(id).await?)
    }

    async fn list(&self) -> vitrine_core::Result<Vec<AssetId>> {
        Ok(self.list_entries().await?)
    }

    async fn health_check(&self) -> vitrine_core::Result<ServiceHealth> {
        let health = match self.operator.check().await {
            Ok(()) => ServiceHealth::healthy().with_message(format!(
                "{} storage, {} layout",
                self.config.backend, self.config.layout
            )),
            Err(e) => ServiceHealth::unhealthy(e.to_string()),
        };

        Ok(health)
    }
}

#[cfg(test)]
mod tests {
    use futures::future::join_all;
    use tempfile::TempDir;
    use vitrine_core::{AssetStore, AssetStoreConfig, AssetUpload, ErrorKind};

    use super::*;

    fn fs_storage(dir: &TempDir, layout: StorageLayout) -> OpendalStorage {
        let root = dir.path().to_string_lossy().into_owned();
        OpendalStorage::new(StorageConfig::fs(root).with_layout(layout)).unwrap()
    }

    #[tokio::test]
    async fn test_document_layout_writes_single_json_object() {
        let dir = TempDir::new().unwrap();
        let storage = fs_storage(&dir, StorageLayout::Document);

        storage.put(&AssetId::new("a1"), "data:image/png;base64,AA==").await.unwrap();
        storage.put(&AssetId::new("b2"), "data:image/gif;base64,AQ==").await.unwrap();

        let raw = std::fs::read(dir.path().join(DOCUMENT_KEY)).unwrap();
        let document: Document = serde_json::from_slice(&raw).unwrap();
        assert_eq!(document.len(), 2);
        assert_eq!(document["a1"], "data:image/png;base64,AA==");
    }

    #[tokio::test]
    async fn test_entries_survive_reopen() {
        for layout in [StorageLayout::Document, StorageLayout::PerKey] {
            let dir = TempDir::new().unwrap();
            let id = AssetId::new(format!("persist-{layout}"));
            fs_storage(&dir, layout).put(&id, "content").await.unwrap();

            let reopened = fs_storage(&dir, layout);
            assert_eq!(reopened.get(&id).await.unwrap().as_deref(), Some("content"));
        }
    }

    #[tokio::test]
    async fn test_missing_entries_and_removal() {
        for layout in [StorageLayout::Document, StorageLayout::PerKey] {
            let storage = OpendalStorage::new(StorageConfig::memory().with_layout(layout)).unwrap();
            let id = AssetId::new("x");

            assert_eq!(storage.get(&id).await.unwrap(), None);
            assert!(storage.list().await.unwrap().is_empty());
            assert!(!storage.remove(&id).await.unwrap());

            storage.put(&id, "v1").await.unwrap();
            storage.put(&id, "v2").await.unwrap();
            assert_eq!(storage.get(&id).await.unwrap().as_deref(), Some("v2"));
            assert_eq!(storage.list().await.unwrap(), vec![id.clone()]);

            assert!(storage.remove(&id).await.unwrap());
            assert_eq!(storage.get(&id).await.unwrap(), None);
        }
    }

    #[tokio::test]
    async fn test_corrupt_document_surfaces_serialization_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(DOCUMENT_KEY), b"not json").unwrap();
        let storage = fs_storage(&dir, StorageLayout::Document);

        let err = storage.get(&AssetId::new("a")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Serialization);
    }

    #[tokio::test]
    async fn test_per_key_rejects_unsafe_ids() {
        let storage =
            OpendalStorage::new(StorageConfig::memory().with_layout(StorageLayout::PerKey)).unwrap();
        let err = storage.put(&AssetId::new(".."), "x").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_concurrent_document_writes_are_not_lost() {
        let dir = TempDir::new().unwrap();
        let storage = fs_storage(&dir, StorageLayout::Document);

        let writes = (0..16).map(|i| {
            let storage = storage.clone();
            async move {
                let id = AssetId::new(format!("id{i:02}"));
                storage.put(&id, &format!("content-{i}")).await
            }
        });
        for result in join_all(writes).await {
            result.unwrap();
        }

        assert_eq!(storage.list().await.unwrap().len(), 16);
    }

    #[tokio::test]
    async fn test_asset_store_round_trip_on_disk() {
        let dir = TempDir::new().unwrap();
        let storage = fs_storage(&dir, StorageLayout::Document);
        let store = AssetStore::new(AssetStoreConfig::default(), storage.into_service());

        let upload = AssetUpload::new("shoe.jpg", "image/jpeg", vec![0xFF, 0xD8, 0xFF]);
        let locator = store.store(&upload).await.unwrap().to_string();
        assert!(locator.starts_with("http://localhost:3000/dev-storage/"));

        let reopened = AssetStore::new(
            AssetStoreConfig::default(),
            fs_storage(&dir, StorageLayout::Document).into_service(),
        );
        assert_eq!(
            reopened.resolve(Some(&locator)).await,
            Some("data:image/jpeg;base64,/9j/".to_owned())
        );
    }

    #[tokio::test]
    async fn test_health_check_reports_layout() {
        let storage = OpendalStorage::new(StorageConfig::memory()).unwrap();
        let health = storage.health_check().await.unwrap();
        assert!(health.is_healthy());
        assert_eq!(health.message.as_deref(), Some("memory storage, document layout"));
    }

    #[tokio::test]
    async fn test_layouts_share_one_root() {
        let dir = TempDir::new().unwrap();
        let old = AssetId::new("old");
        fs_storage(&dir, StorageLayout::Document)
            .put(&old, "data:image/png;base64,AA==")
            .await
            .unwrap();

        let store = AssetStore::new(
            AssetStoreConfig::default(),
            fs_storage(&dir, StorageLayout::PerKey).into_service(),
        );
        let upload = AssetUpload::new("a.png", "image/png", vec![1u8, 2, 3]);
        let locator = store.store(&upload).await.unwrap().to_string();
        assert_eq!(
            store.resolve(Some(&locator)).await.as_deref(),
            Some("data:image/png;base64,AQID")
        );
        assert!(dir.path().join("dev_file_storage.d").is_dir());

        let document = fs_storage(&dir, StorageLayout::Document);
        assert_eq!(
            document.get(&old).await.unwrap().as_deref(),
            Some("data:image/png;base64,AA==")
        );
        assert_eq!(document.list().await.unwrap(), vec![old]);
    }
}
