//! In-memory storage provider.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::{AssetId, Result, ServiceHealth, StorageProvider};

/// Non-durable provider that keeps entries in a shared map.
///
/// Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<RwLock<BTreeMap<AssetId, String>>>,
}

impl MemoryStorage {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns true if nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl StorageProvider for MemoryStorage {
    async fn get(&self, id: &AssetId) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(id).cloned())
    }

    async fn put(&self, id: &AssetId, content: &str) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(id.clone(), content.to_owned());
        Ok(())
    }

    async fn remove(&self, id: &AssetId) -> Result<bool> {
        Ok(self.entries.write().await.remove(id).is_some())
    }

    async fn list(&self) -> Result<Vec<AssetId>> {
        Ok(self.entries.read().await.keys().cloned().collect())
    }

    async fn health_check(&self) -> Result<ServiceHealth> {
        Ok(ServiceHealth::healthy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_remove() {
        let storage = MemoryStorage::new();
        let id = AssetId::new("abc");

        assert_eq!(storage.get(&id).await.unwrap(), None);
        storage.put(&id, "data:image/png;base64,AA==").await.unwrap();
        assert_eq!(
            storage.get(&id).await.unwrap().as_deref(),
            Some("data:image/png;base64,AA==")
        );

        assert!(storage.remove(&id).await.unwrap());
        assert!(!storage.remove(&id).await.unwrap());
        assert!(storage.is_empty().await);
    }

    #[tokio::test]
    async fn test_list_is_sorted() {
        let storage = MemoryStorage::new();
        storage.put(&AssetId::new("b"), "2").await.unwrap();
        storage.put(&AssetId::new("a"), "1").await.unwrap();

        let ids = storage.list().await.unwrap();
        assert_eq!(ids, vec![AssetId::new("a"), AssetId::new("b")]);
    }
}
