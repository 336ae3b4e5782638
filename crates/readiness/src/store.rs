use shared::{
    domain::{
        CompanyInfo, ControlState, ControlStatus, ReadinessMetrics, ReadinessSnapshot,
        StatusBreakdown,
    },
    error::ReadinessError,
};
use storage::{KeyValueBackend, PersistenceAdapter};
use tracing::{info, warn};

use crate::{catalog::ControlCatalog, validation::validate_snapshot};

/// Owns the live snapshot for one session.
///
/// Every mutation is written through the [`PersistenceAdapter`] before the call
/// returns. A failed write never fails the mutation; it only clears
/// [`ReadinessStore::last_persist_succeeded`].
pub struct ReadinessStore<B> {
    adapter: PersistenceAdapter<B>,
    snapshot: ReadinessSnapshot,
    last_persist_succeeded: bool,
}

impl<B: KeyValueBackend> ReadinessStore<B> {
    /// Store holding catalog defaults. Call [`Self::initialize`] to pick up
    /// persisted progress.
    pub fn new(adapter: PersistenceAdapter<B>) -> Self {
        Self {
            adapter,
            snapshot: ControlCatalog::defaults(),
            last_persist_succeeded: true,
        }
    }

    /// Builds a store and runs [`Self::initialize`] on it.
    pub async fn open(adapter: PersistenceAdapter<B>) -> Self {
        let mut store = Self::new(adapter);
        store.initialize().await;
        store
    }

    /// Adopts the persisted snapshot when it decodes and matches the catalog,
    /// otherwise resets to catalog defaults.
    pub async fn initialize(&mut self) {
        self.snapshot = match self.adapter.load().await {
            Some(persisted) => match validate_snapshot(persisted) {
                Ok(snapshot) => {
                    info!(
                        company = %snapshot.company.name,
                        "resumed persisted readiness snapshot"
                    );
                    snapshot
                }
                Err(err) => {
                    warn!(
                        error = %err,
                        "persisted snapshot does not match catalog, starting fresh"
                    );
                    ControlCatalog::defaults()
                }
            },
            None => ControlCatalog::defaults(),
        };
    }

    pub fn snapshot(&self) -> &ReadinessSnapshot {
        &self.snapshot
    }

    pub fn company(&self) -> &CompanyInfo {
        &self.snapshot.company
    }

    pub fn controls(&self) -> &[ControlState] {
        &self.snapshot.controls
    }

    pub fn control(&self, id: &str) -> Option<&ControlState> {
        self.snapshot.control(id)
    }

    /// Whether the most recent write reached durable storage.
    pub fn last_persist_succeeded(&self) -> bool {
        self.last_persist_succeeded
    }

    /// Replaces whichever company fields are supplied.
    pub async fn set_company(&mut self, name: Option<String>, email: Option<String>) {
        if let Some(name) = name {
            self.snapshot.company.name = name;
        }
        if let Some(email) = email {
            self.snapshot.company.email = email;
        }
        self.persist().await;
    }

    pub async fn set_control_status(
        &mut self,
        id: &str,
        status: ControlStatus,
    ) -> Result<(), ReadinessError> {
        self.lookup_mut(id)?.status = status;
        self.persist().await;
        Ok(())
    }

    pub async fn set_control_notes(
        &mut self,
        id: &str,
        notes: impl Into<String>,
    ) -> Result<(), ReadinessError> {
        self.lookup_mut(id)?.notes = notes.into();
        self.persist().await;
        Ok(())
    }

    pub fn metrics(&self) -> ReadinessMetrics {
        ReadinessMetrics::new(
            self.snapshot.count_with_status(ControlStatus::Done),
            ControlCatalog::len(),
        )
    }

    pub fn status_breakdown(&self) -> StatusBreakdown {
        StatusBreakdown {
            not_started: self.snapshot.count_with_status(ControlStatus::NotStarted),
            in_progress: self.snapshot.count_with_status(ControlStatus::InProgress),
            done: self.snapshot.count_with_status(ControlStatus::Done),
        }
    }

    /// Deletes the persisted record and returns to catalog defaults.
    pub async fn reset(&mut self) -> Result<(), ReadinessError> {
        self.adapter
            .clear()
            .await
            .map_err(|err| ReadinessError::storage(format!("{err:#}")))?;
        self.snapshot = ControlCatalog::defaults();
        self.last_persist_succeeded = true;
        info!("readiness snapshot cleared");
        Ok(())
    }

    fn lookup_mut(&mut self, id: &str) -> Result<&mut ControlState, ReadinessError> {
        self.snapshot
            .control_mut(id)
            .ok_or_else(|| ReadinessError::unknown_control(id))
    }

    async fn persist(&mut self) {
        self.last_persist_succeeded = self.adapter.save(&self.snapshot).await;
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
