use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::RwLock;

use pvtrack_core::{AggregateRoot, ExpectedVersion};
use pvtrack_installations::{Installation, InstallationId};

use super::r#trait::{InstallationStore, StoreError};

/// In-memory installation store.
///
/// Intended for tests/dev and the single-node API. Not durable.
#[derive(Debug, Default)]
pub struct InMemoryInstallationStore {
    inner: RwLock<HashMap<InstallationId, Installation>>,
}

impl InMemoryInstallationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> StoreError {
        StoreError::Unavailable("lock poisoned".to_string())
    }
}

impl InstallationStore for InMemoryInstallationStore {
    fn list(&self) -> Result<Vec<Installation>, StoreError> {
        let map = self.inner.read().map_err(|_| Self::poisoned())?;

        let mut all: Vec<Installation> = map.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(all)
    }

    fn get(&self, id: &InstallationId) -> Result<Option<Installation>, StoreError> {
        let map = self.inner.read().map_err(|_| Self::poisoned())?;
        Ok(map.get(id).cloned())
    }

    fn insert(&self, installation: Installation) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(|_| Self::poisoned())?;

        match map.entry(installation.id) {
            Entry::Occupied(e) => Err(StoreError::AlreadyExists(*e.key())),
            Entry::Vacant(e) => {
                e.insert(installation);
                Ok(())
            }
        }
    }

    fn replace(
        &self,
        installation: Installation,
        expected_version: ExpectedVersion,
    ) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(|_| Self::poisoned())?;

        let id = installation.id;
        let current = map.get_mut(&id).ok_or(StoreError::NotFound(id))?;

        if !expected_version.matches(current.version()) {
            return Err(StoreError::Concurrency(format!(
                "expected {expected_version:?}, found {}",
                current.version()
            )));
        }

        *current = installation;
        Ok(())
    }
}
