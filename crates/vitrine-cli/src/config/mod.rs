//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── command: Command          # store, resolve, remove, list, probe
//! ├── store: AssetStoreConfig   # locator origin
//! ├── storage: StorageConfig    # local backend, root, layout
//! └── remote: RemoteConfig      # upload API, token, timeouts
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//!
//! # Example
//!
//! ```bash
//! vitrine --storage-root ./data store ./cat.png
//!
//! VITRINE_API_URL="https://api.example.com" VITRINE_AUTH_TOKEN="..." vitrine probe
//! ```

mod provider;

use clap::{Args, Parser};
pub use provider::create_asset_store;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use vitrine_core::AssetStoreConfig;
use vitrine_opendal::StorageConfig;
use vitrine_reqwest::ReqwestConfig;

use crate::TRACING_TARGET_CONFIG;
use crate::command::Command;

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "vitrine")]
#[command(about = "Store and resolve product images")]
#[command(version)]
pub struct Cli {
    /// Operation to run.
    #[command(subcommand)]
    pub command: Command,

    /// Locator configuration.
    #[clap(flatten)]
    pub store: AssetStoreConfig,

    /// Local storage configuration.
    #[clap(flatten)]
    pub storage: StorageConfig,

    /// Remote upload configuration.
    #[clap(flatten)]
    pub remote: RemoteConfig,
}

/// Remote upload settings.
#[derive(Debug, Clone, Args)]
pub struct RemoteConfig {
    /// Skip the remote upload API and always store locally
    #[arg(long = "offline", env = "VITRINE_OFFLINE")]
    pub offline: bool,

    /// Upload client configuration.
    #[clap(flatten)]
    pub client: ReqwestConfig,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Initializes tracing with environment-based filtering.
    ///
    /// Logs go to stderr so command output on stdout stays clean.
    pub fn init_tracing() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    /// Logs configuration at debug level (no sensitive information).
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            version = env!("CARGO_PKG_VERSION"),
            features = ?Self::enabled_features(),
            "Build information"
        );

        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            origin = %self.store.origin,
            storage_backend = %self.storage.backend,
            storage_root = %self.storage.root,
            storage_layout = %self.storage.layout,
            offline = self.remote.offline,
            api_url = %self.remote.client.api_url,
            has_token = self.remote.client.auth_token.is_some(),
            "Configuration"
        );
    }

    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}
