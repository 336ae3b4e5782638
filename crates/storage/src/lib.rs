use anyhow::{Context, Result};
use async_trait::async_trait;
use shared::domain::ReadinessSnapshot;
use tracing::{debug, warn};

mod memory;
mod sqlite;

pub use memory::MemoryBackend;
pub use sqlite::SqliteBackend;

/// Versioned key the snapshot lives under. Bump the suffix when the persisted
/// shape or the catalog ids change incompatibly.
pub const STORAGE_KEY: &str = "ce_evidence_pack_v1";

/// Durable string key-value storage.
#[async_trait]
pub trait KeyValueBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Reads and writes the single persisted [`ReadinessSnapshot`].
///
/// Storage and decode failures on `load`/`save` never reach the caller: a failed
/// read looks like "no prior state" and a failed write leaves the in-memory copy
/// as the only one.
#[derive(Debug, Clone)]
pub struct PersistenceAdapter<B> {
    backend: B,
    key: String,
}

impl<B: KeyValueBackend> PersistenceAdapter<B> {
    pub fn new(backend: B) -> Self {
        Self::with_key(backend, STORAGE_KEY)
    }

    pub fn with_key(backend: B, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub async fn load(&self) -> Option<ReadinessSnapshot> {
        let raw = match self.backend.get(&self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %self.key, "no persisted snapshot");
                return None;
            }
            Err(err) => {
                warn!(key = %self.key, error = %err, "snapshot storage unavailable for read");
                return None;
            }
        };

        match serde_json::from_str::<ReadinessSnapshot>(&raw) {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                warn!(key = %self.key, error = %err, "discarding undecodable snapshot");
                None
            }
        }
    }

    /// Returns whether the write reached durable storage.
    pub async fn save(&self, snapshot: &ReadinessSnapshot) -> bool {
        match self.try_save(snapshot).await {
            Ok(()) => {
                debug!(key = %self.key, "snapshot persisted");
                true
            }
            Err(err) => {
                let message = format!("{err:#}");
                warn!(key = %self.key, error = %message, "snapshot not persisted");
                false
            }
        }
    }

    async fn try_save(&self, snapshot: &ReadinessSnapshot) -> Result<()> {
        let encoded = serde_json::to_string(snapshot).context("failed to encode snapshot")?;
        self.backend
            .set(&self.key, &encoded)
            .await
            .with_context(|| format!("failed to write key '{}'", self.key))
    }

    /// Drops the persisted snapshot. Unlike `save`, failures are returned since
    /// this only runs on explicit operator request.
    pub async fn clear(&self) -> Result<()> {
        self.backend
            .remove(&self.key)
            .await
            .with_context(|| format!("failed to remove key '{}'", self.key))
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
