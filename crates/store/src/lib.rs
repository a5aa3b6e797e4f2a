//! Access to the hosted backend that owns every persistent gallery entity.
//!
//! The rest of the workspace only ever sees a [`StoreHandle`]; whether it is
//! backed by the REST service or the in-memory store is decided once, at
//! startup, by [`create_store`].

pub mod error;
pub mod memory;
pub mod models;
pub mod remote;
pub mod repositories;
pub mod rest;

use std::sync::Arc;

pub use error::StoreError;
pub use remote::{RemoteStore, StoreHandle};

use crate::memory::MemoryStore;
use crate::rest::RestStore;

/// `STORE_URL` value selecting the in-memory backend.
pub const MEMORY_STORE_URL: &str = "memory:";

/// Connection settings for the hosted backend.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Project base URL, or `memory:` for the in-process store.
    pub url: String,
    /// Public (anon) API key sent with every request.
    pub anon_key: String,
    /// Optional JSON snapshot loaded into the in-memory store.
    pub seed_file: Option<String>,
}

impl StoreConfig {
    /// Load store settings from environment variables.
    ///
    /// | Env Var            | Default   |
    /// |--------------------|-----------|
    /// | `STORE_URL`        | `memory:` |
    /// | `STORE_ANON_KEY`   | (empty)   |
    /// | `STORE_SEED_FILE`  | (unset)   |
    pub fn from_env() -> Self {
        let url = std::env::var("STORE_URL").unwrap_or_else(|_| MEMORY_STORE_URL.into());
        let anon_key = std::env::var("STORE_ANON_KEY").unwrap_or_default();
        let seed_file = std::env::var("STORE_SEED_FILE")
            .ok()
            .filter(|s| !s.trim().is_empty());

        Self {
            url,
            anon_key,
            seed_file,
        }
    }

    pub fn is_memory(&self) -> bool {
        self.url.trim() == MEMORY_STORE_URL
    }
}

/// Build the store selected by `config`.
pub async fn create_store(config: &StoreConfig) -> Result<StoreHandle, StoreError> {
    if config.is_memory() {
        let store = match &config.seed_file {
            Some(path) => {
                let raw = tokio::fs::read(path).await.map_err(|e| {
                    StoreError::Unavailable(format!("cannot read seed file '{path}': {e}"))
                })?;
                let snapshot: serde_json::Value = serde_json::from_slice(&raw)?;
                MemoryStore::from_snapshot(&snapshot)?
            }
            None => MemoryStore::new(),
        };
        tracing::info!(seeded = config.seed_file.is_some(), "Using in-memory store");
        return Ok(Arc::new(store));
    }

    if config.anon_key.is_empty() {
        return Err(StoreError::Unavailable(
            "STORE_ANON_KEY must be set for a remote store".into(),
        ));
    }

    tracing::info!(url = %config.url, "Using remote REST store");
    Ok(Arc::new(RestStore::new(&config.url, &config.anon_key)))
}

/// Verify the store answers.
pub async fn health_check(store: &dyn RemoteStore) -> Result<(), StoreError> {
    store.ping().await
}
