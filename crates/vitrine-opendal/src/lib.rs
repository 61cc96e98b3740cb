#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod backend;
mod config;
mod error;

pub use backend::{DOCUMENT_KEY, OpendalStorage};
pub use config::{BackendType, DEFAULT_ROOT, StorageConfig, StorageLayout};
pub use error::{StorageError, StorageResult};

/// Tracing target for storage operations.
pub const TRACING_TARGET: &str = "vitrine_opendal";
