use async_trait::async_trait;
use mj_core::{DocumentStore, Error, Result};
use std::sync::Arc;
use tracing::info;

pub mod backends;
pub mod ordering;

pub use backends::*;

#[derive(Debug, Clone, Default)]
pub struct BackendConfig {
    pub url: Option<String>,
    pub auth: Option<String>,
}

impl BackendConfig {
    pub fn new(url: Option<&str>, auth: Option<&str>) -> Self {
        Self {
            url: url.map(str::to_string),
            auth: auth.map(str::to_string),
        }
    }
}

#[async_trait]
pub trait StorageBackend: DocumentStore + Sized {
    fn get_error_message() -> &'static str;
    async fn from_config(config: BackendConfig) -> Result<Self>;
}

async fn connect<T: StorageBackend + 'static>(config: BackendConfig) -> Result<Arc<dyn DocumentStore>> {
    let store = T::from_config(config)
        .await
        .map_err(|e| Error::Storage(format!("{} ({})", T::get_error_message(), e)))?;
    info!("💾 Document store ready (using {})", store.name());
    Ok(Arc::new(store))
}

/// Build the store named by `kind` (`memory` or `realtime`).
pub async fn create_storage(kind: &str, url: Option<&str>, auth: Option<&str>) -> Result<Arc<dyn DocumentStore>> {
    let config = BackendConfig::new(url, auth);
    match kind {
        "memory" => connect::<InMemoryStore>(config).await,
        "realtime" => connect::<RealtimeStore>(config).await,
        other => Err(Error::Storage(format!("Unknown storage backend: {}", other))),
    }
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_storage, BackendConfig, StorageBackend};
}
