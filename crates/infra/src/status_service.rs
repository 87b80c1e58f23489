//! Status change orchestration.
//!
//! ```text
//! request (id, expected_version, change)
//!   ↓
//! 1. Load the current record from the store
//!   ↓
//! 2. Check the caller's expected version
//!   ↓
//! 3. Run the status engine (pure, may reject)
//!   ↓
//! 4. Replace the record, guarded by the loaded version
//! ```
//!
//! A rejected change never reaches step 4, so the store only ever sees complete
//! records produced by the engine.

use chrono::{DateTime, Utc};
use thiserror::Error;

use pvtrack_core::{AggregateRoot, ExpectedVersion};
use pvtrack_installations::{
    Installation, InstallationId, InstallationStatus, StatusChange, StatusChangeError,
    apply_status_change,
};

use crate::store::{InstallationStore, StoreError};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("installation not found: {0}")]
    NotFound(InstallationId),

    /// Stale version, either from the caller or from a concurrent writer.
    #[error("conflict: {0}")]
    Concurrency(String),

    /// The engine rejected the change.
    #[error(transparent)]
    Rejected(#[from] StatusChangeError),

    #[error("store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(id) => ServiceError::NotFound(id),
            StoreError::Concurrency(msg) => ServiceError::Concurrency(msg),
            other => ServiceError::Store(other),
        }
    }
}

#[derive(Debug)]
pub struct StatusChangeService<S> {
    store: S,
}

impl<S> StatusChangeService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S> StatusChangeService<S>
where
    S: InstallationStore,
{
    /// All installations, optionally restricted to one status.
    pub fn list(&self, status: Option<InstallationStatus>) -> Result<Vec<Installation>, ServiceError> {
        let all = self.store.list()?;
        Ok(match status {
            Some(status) => all.into_iter().filter(|i| i.status == status).collect(),
            None => all,
        })
    }

    pub fn get(&self, id: InstallationId) -> Result<Installation, ServiceError> {
        self.store.get(&id)?.ok_or(ServiceError::NotFound(id))
    }

    /// Apply a status change and persist the result.
    ///
    /// Returns the stored record on success. Nothing is written when the engine
    /// rejects the change or a version check fails.
    pub fn change_status(
        &self,
        id: InstallationId,
        expected_version: ExpectedVersion,
        change: &StatusChange,
        now: DateTime<Utc>,
    ) -> Result<Installation, ServiceError> {
        let current = self.get(id)?;

        expected_version
            .check(current.version())
            .map_err(|e| ServiceError::Concurrency(e.to_string()))?;

        let next = match apply_status_change(&current, change, now) {
            Ok(next) => next,
            Err(err) => {
                tracing::info!(
                    installation_id = %id,
                    choice = change.choice(),
                    kind = err.kind(),
                    "status change rejected: {err}"
                );
                return Err(err.into());
            }
        };

        self.store
            .replace(next.clone(), ExpectedVersion::Exact(current.version()))
            .inspect_err(|err| {
                tracing::warn!(installation_id = %id, "status change not persisted: {err}");
            })?;

        tracing::info!(
            installation_id = %id,
            choice = change.choice(),
            from = %current.status,
            to = %next.status,
            version = next.version(),
            "installation status changed"
        );

        Ok(next)
    }
}
