use std::sync::Arc;

use thiserror::Error;

use pvtrack_core::ExpectedVersion;
use pvtrack_installations::{Installation, InstallationId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("installation not found: {0}")]
    NotFound(InstallationId),

    #[error("installation already exists: {0}")]
    AlreadyExists(InstallationId),

    /// The stored version did not match the caller's expectation.
    #[error("optimistic concurrency conflict: {0}")]
    Concurrency(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Repository of installations keyed by id.
///
/// Implementations must:
/// - make `replace` atomic per id (readers see the old or the new record, never a mix)
/// - reject `replace` when `expected_version` does not match the stored record
/// - return `list` ordered by `created_at`, then id
pub trait InstallationStore: Send + Sync {
    fn list(&self) -> Result<Vec<Installation>, StoreError>;

    fn get(&self, id: &InstallationId) -> Result<Option<Installation>, StoreError>;

    /// Register a new installation.
    fn insert(&self, installation: Installation) -> Result<(), StoreError>;

    /// Replace the record with the same id.
    fn replace(
        &self,
        installation: Installation,
        expected_version: ExpectedVersion,
    ) -> Result<(), StoreError>;
}

impl<S> InstallationStore for Arc<S>
where
    S: InstallationStore + ?Sized,
{
    fn list(&self) -> Result<Vec<Installation>, StoreError> {
        (**self).list()
    }

    fn get(&self, id: &InstallationId) -> Result<Option<Installation>, StoreError> {
        (**self).get(id)
    }

    fn insert(&self, installation: Installation) -> Result<(), StoreError> {
        (**self).insert(installation)
    }

    fn replace(
        &self,
        installation: Installation,
        expected_version: ExpectedVersion,
    ) -> Result<(), StoreError> {
        (**self).replace(installation, expected_version)
    }
}
