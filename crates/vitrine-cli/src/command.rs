//! Subcommands and their execution.

use std::path::{Path, PathBuf};

use anyhow::Context;
use bytes::Bytes;
use clap::Subcommand;
use vitrine_core::{AssetStore, AssetUpload, DataUrl, ValidationError};

use crate::TRACING_TARGET_COMMAND;

/// Media type used when none is given and the extension is unknown.
const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// Operations exposed by the CLI.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Store an image and print its locator
    Store {
        /// Path of the file to store
        path: PathBuf,
        /// Media type; guessed from the extension when omitted
        #[arg(long)]
        media_type: Option<String>,
        /// File name embedded in the locator; defaults to the file's name
        #[arg(long)]
        file_name: Option<String>,
    },
    /// Resolve a locator and print the content
    Resolve {
        /// Locator to resolve
        locator: String,
        /// Write decoded inline content to this file instead of printing it
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Remove a locally stored asset
    Remove {
        /// Locator of the asset
        locator: String,
    },
    /// List locally stored asset ids
    List,
    /// Print the backend selected by the capability probe
    Probe,
}

impl Command {
    /// Runs the command and returns what should be printed on stdout.
    pub async fn execute(&self, store: &AssetStore) -> anyhow::Result<String> {
        tracing::debug!(
            target: TRACING_TARGET_COMMAND,
            command = ?self,
            "Executing command"
        );

        match self {
            Self::Store {
                path,
                media_type,
                file_name,
            } => {
                let file_name = file_name.clone().unwrap_or_else(|| file_name_of(path));
                let media_type = media_type
                    .clone()
                    .unwrap_or_else(|| media_type_for_path(path).to_owned());

                let metadata = tokio::fs::metadata(path)
                    .await
                    .with_context(|| format!("failed to read {}", path.display()))?;
                let size = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
                ValidationError::check(&media_type, size)?;

                let data = tokio::fs::read(path)
                    .await
                    .with_context(|| format!("failed to read {}", path.display()))?;

                let upload = AssetUpload::new(file_name, media_type, Bytes::from(data));
                let locator = store.store(&upload).await?;
                Ok(locator.to_string())
            }
            Self::Resolve { locator, output } => {
                let content = store.resolve(Some(locator.as_str())).await.unwrap_or_default();

                let Some(output) = output else {
                    return Ok(content);
                };

                let decoded = DataUrl::parse(&content)
                    .with_context(|| format!("{locator} did not resolve to inline content"))?;
                tokio::fs::write(output, &decoded.data)
                    .await
                    .with_context(|| format!("failed to write {}", output.display()))?;

                Ok(format!(
                    "{} ({}, {} bytes)",
                    output.display(),
                    decoded.media_type,
                    decoded.data.len()
                ))
            }
            Self::Remove { locator } => {
                let removed = store.remove(locator).await.context("failed to remove asset")?;
                Ok(removed.to_string())
            }
            Self::List => {
                let ids = store.list().await.context("failed to list assets")?;
                Ok(ids
                    .iter()
                    .map(|id| id.as_str())
                    .collect::<Vec<_>>()
                    .join("\n"))
            }
            Self::Probe => Ok(store.backend().await.to_string()),
        }
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Guesses an image media type from the file extension.
fn media_type_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "avif" => "image/avif",
        "ico" => "image/x-icon",
        _ => FALLBACK_MEDIA_TYPE,
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;
    use vitrine_core::{AssetStoreConfig, MAX_ASSET_SIZE, MemoryStorage, StorageService};

    use super::*;

    fn memory_store() -> AssetStore {
        AssetStore::new(
            AssetStoreConfig::new("http://localhost:3000"),
            StorageService::new(MemoryStorage::new()),
        )
    }

    #[test]
    fn test_guesses_media_types() {
        assert_eq!(media_type_for_path(Path::new("a/B.PNG")), "image/png");
        assert_eq!(media_type_for_path(Path::new("photo.jpeg")), "image/jpeg");
        assert_eq!(media_type_for_path(Path::new("notes.txt")), FALLBACK_MEDIA_TYPE);
        assert_eq!(media_type_for_path(Path::new("README")), FALLBACK_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn test_store_resolve_remove_cycle() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("red dot.png");
        std::fs::write(&source, [1u8, 2, 3]).unwrap();
        let store = memory_store();

        let locator = Command::Store {
            path: source,
            media_type: None,
            file_name: None,
        }
        .execute(&store)
        .await
        .unwrap();
        assert!(locator.ends_with("/red%20dot.png"));

        let content = Command::Resolve {
            locator: locator.clone(),
            output: None,
        }
        .execute(&store)
        .await
        .unwrap();
        assert_eq!(content, "data:image/png;base64,AQID");

        let target = dir.path().join("copy.png");
        Command::Resolve {
            locator: locator.clone(),
            output: Some(target.clone()),
        }
        .execute(&store)
        .await
        .unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), vec![1, 2, 3]);

        let listed = Command::List.execute(&store).await.unwrap();
        assert_eq!(listed.lines().count(), 1);

        let removed = Command::Remove { locator }.execute(&store).await.unwrap();
        assert_eq!(removed, "true");
    }

    #[tokio::test]
    async fn test_store_rejects_non_images() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("notes.txt");
        std::fs::write(&source, b"hello").unwrap();

        let err = Command::Store {
            path: source,
            media_type: None,
            file_name: None,
        }
        .execute(&memory_store())
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Please select an image file");
    }

    #[tokio::test]
    async fn test_store_rejects_oversized_file_before_reading() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("huge.png");
        let file = std::fs::File::create(&source).unwrap();
        file.set_len(MAX_ASSET_SIZE as u64 + 1).unwrap();
        let store = memory_store();

        let err = Command::Store {
            path: source,
            media_type: None,
            file_name: None,
        }
        .execute(&store)
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Image size should be less than 5MB");
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_probe_without_remote_is_local() {
        let output = Command::Probe.execute(&memory_store()).await.unwrap();
        assert_eq!(output, "local_fallback");
    }
}
