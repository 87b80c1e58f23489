use std::path::Path;
use std::sync::Arc;

use pvtrack_infra::{InMemoryInstallationStore, SeedError, StatusChangeService, load_seed};

/// Services shared by every handler.
pub type AppServices = StatusChangeService<Arc<InMemoryInstallationStore>>;

/// Build the in-memory services, loading `seed_file` when given.
pub fn build_services(seed_file: Option<&Path>) -> Result<Arc<AppServices>, SeedError> {
    let store = Arc::new(InMemoryInstallationStore::new());

    if let Some(path) = seed_file {
        load_seed(store.as_ref(), path)?;
    }

    Ok(Arc::new(StatusChangeService::new(store)))
}
