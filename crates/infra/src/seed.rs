//! Seed data loading.
//!
//! A seed file is a JSON array of installations in the same shape the API
//! returns. It is how a fresh in-memory store gets its initial records.

use std::path::{Path, PathBuf};

use thiserror::Error;

use pvtrack_installations::{Installation, InstallationId};

use crate::store::{InstallationStore, StoreError};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid seed data: {0}")]
    Json(#[from] serde_json::Error),

    /// A record flags a full theft while also listing outstanding codes.
    #[error("seed record {0} has both theft_outstanding_all and theft_outstanding set")]
    ConflictingTheft(InstallationId),

    #[error("failed to store seed record: {0}")]
    Store(#[from] StoreError),
}

/// Parse a seed document, rejecting records whose theft bookkeeping contradicts itself.
pub fn parse_seed(raw: &str) -> Result<Vec<Installation>, SeedError> {
    let installations: Vec<Installation> = serde_json::from_str(raw)?;

    if let Some(bad) = installations
        .iter()
        .find(|i| i.theft_outstanding_all && !i.theft_outstanding.is_empty())
    {
        return Err(SeedError::ConflictingTheft(bad.id));
    }

    Ok(installations)
}

/// Read `path` and insert every installation into `store`.
///
/// Returns the number of records inserted. Stops at the first duplicate id.
pub fn load_seed<S>(store: &S, path: &Path) -> Result<usize, SeedError>
where
    S: InstallationStore + ?Sized,
{
    let raw = std::fs::read_to_string(path).map_err(|source| SeedError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let installations = parse_seed(&raw)?;
    let count = installations.len();
    for installation in installations {
        store.insert(installation)?;
    }

    tracing::info!(path = %path.display(), count, "seed installations loaded");
    Ok(count)
}
