//! Installation store boundary.
//!
//! The status engine never touches storage; callers load a record, run the
//! engine and hand the result back here. `replace` is atomic per id and guarded
//! by the record version.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryInstallationStore;
pub use r#trait::{InstallationStore, StoreError};
