//! Durable key-value storage for locally held assets.
//!
//! - [`StorageProvider`]: port implemented by storage backends
//! - [`StorageService`]: cloneable wrapper with observability
//! - [`MemoryStorage`]: process-local, non-durable provider
//!
//! Every entry maps an [`AssetId`] to the encoded content (a data URL).
//! Once written, an entry is returned verbatim until overwritten or removed.
//! For a durable implementation backed by OpenDAL, see `vitrine-opendal`.

mod memory;
mod service;

pub use memory::MemoryStorage;
pub use service::StorageService;

pub use crate::{AssetId, Result, ServiceHealth};

/// Tracing target for local storage operations.
pub const TRACING_TARGET: &str = "vitrine_core::storage";

/// Port for the durable `id -> content` mapping.
///
/// `put` must replace a single entry without rewriting unrelated ones where
/// the backend allows it.
#[async_trait::async_trait]
pub trait StorageProvider: Send + Sync {
    /// Returns the stored content, or `None` if the id is unknown.
    async fn get(&self, id: &AssetId) -> Result<Option<String>>;

    /// Inserts or overwrites one entry.
    async fn put(&self, id: &AssetId, content: &str) -> Result<()>;

    /// Deletes one entry, returning whether it existed.
    async fn remove(&self, id: &AssetId) -> Result<bool>;

    /// Lists all stored ids.
    async fn list(&self) -> Result<Vec<AssetId>>;

    /// Reports whether the backend is usable.
    async fn health_check(&self) -> Result<ServiceHealth>;
}
