//! Storage configuration types.

#[cfg(feature = "config")]
use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

/// Default root directory for the filesystem backend.
pub const DEFAULT_ROOT: &str = ".vitrine";

/// OpenDAL service used for persistence.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[derive(Serialize, Deserialize, Display, AsRefStr)]
#[cfg_attr(feature = "config", derive(ValueEnum))]
#[cfg_attr(feature = "config", value(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BackendType {
    /// Local filesystem under `root`; survives restarts.
    #[default]
    Fs,
    /// Process memory; lost on exit.
    Memory,
}

/// How entries are laid out in the backend.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[derive(Serialize, Deserialize, Display, AsRefStr)]
#[cfg_attr(feature = "config", derive(ValueEnum))]
#[cfg_attr(feature = "config", value(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StorageLayout {
    /// One `dev_file_storage` JSON object holding every entry.
    ///
    /// Every write rewrites the whole document. Writers in one process are
    /// serialized; writers in separate processes can lose each other's updates.
    #[default]
    Document,
    /// One object per entry under `dev_file_storage.d/`; writes are atomic per key.
    PerKey,
}

/// Storage backend configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct StorageConfig {
    /// Storage backend
    #[cfg_attr(
        feature = "config",
        arg(long = "storage-backend", env = "VITRINE_STORAGE_BACKEND", value_enum, default_value_t = BackendType::Fs)
    )]
    #[serde(default)]
    pub backend: BackendType,

    /// Root directory for the filesystem backend
    #[cfg_attr(
        feature = "config",
        arg(long = "storage-root", env = "VITRINE_STORAGE_ROOT", default_value = DEFAULT_ROOT)
    )]
    #[serde(default = "default_root")]
    pub root: String,

    /// Entry layout
    #[cfg_attr(
        feature = "config",
        arg(long = "storage-layout", env = "VITRINE_STORAGE_LAYOUT", value_enum, default_value_t = StorageLayout::Document)
    )]
    #[serde(default)]
    pub layout: StorageLayout,
}

fn default_root() -> String {
    DEFAULT_ROOT.to_owned()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: BackendType::default(),
            root: default_root(),
            layout: StorageLayout::default(),
        }
    }
}

impl StorageConfig {
    /// Filesystem storage rooted at `root`.
    pub fn fs(root: impl Into<String>) -> Self {
        Self {
            backend: BackendType::Fs,
            root: root.into(),
            layout: StorageLayout::default(),
        }
    }

    /// In-memory storage.
    pub fn memory() -> Self {
        Self {
            backend: BackendType::Memory,
            ..Self::default()
        }
    }

    /// Set the entry layout.
    #[must_use]
    pub fn with_layout(mut self, layout: StorageLayout) -> Self {
        self.layout = layout;
        self
    }
}
