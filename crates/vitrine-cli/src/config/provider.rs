//! Service construction from CLI configuration.

use anyhow::Context;
use vitrine_core::{AssetStore, StorageService, UploadService};
use vitrine_opendal::{OpendalStorage, StorageConfig};
use vitrine_reqwest::{ReqwestClient, ReqwestConfig};

use super::Cli;

/// Creates the local storage service.
///
/// # Errors
///
/// Returns an error if the OpenDAL operator cannot be built.
pub fn create_storage_service(config: &StorageConfig) -> anyhow::Result<StorageService> {
    let storage = OpendalStorage::new(config.clone()).context("failed to create storage backend")?;
    Ok(storage.into_service())
}

/// Creates the remote upload service.
///
/// # Errors
///
/// Returns an error if the API URL is invalid or the HTTP client cannot be built.
pub fn create_upload_service(config: &ReqwestConfig) -> anyhow::Result<UploadService> {
    let client = ReqwestClient::new(config.clone()).context("failed to create upload client")?;
    Ok(client.into_service())
}

/// Creates the asset store, attaching the remote provider unless offline.
pub fn create_asset_store(cli: &Cli) -> anyhow::Result<AssetStore> {
    let storage = create_storage_service(&cli.storage)?;
    let store = AssetStore::new(cli.store.clone(), storage);

    if cli.remote.offline {
        return Ok(store);
    }

    let uploads = create_upload_service(&cli.remote.client)?;
    Ok(store.with_upload(uploads))
}
