//! Infrastructure layer: installation storage, status change orchestration,
//! seed loading and configuration.

pub mod config;
pub mod seed;
pub mod status_service;
pub mod store;

pub use config::{ApiConfig, ConfigError};
pub use seed::{SeedError, load_seed, parse_seed};
pub use status_service::{ServiceError, StatusChangeService};
pub use store::{InMemoryInstallationStore, InstallationStore, StoreError};
