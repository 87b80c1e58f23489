//! Installations domain module.
//!
//! This crate contains the business rules for photovoltaic installations: the
//! data model and the status engine that moves an installation between active,
//! stolen, dismantled and relocated states while keeping its component inventory
//! consistent. Everything here is deterministic domain logic (no IO, no HTTP, no
//! storage, no logging).

pub mod error;
pub mod form;
pub mod lines;
pub mod model;
pub mod status;

pub use error::{RecoveryGap, StatusChangeError};
pub use form::FormNumber;
pub use lines::{LineInput, parse_codes, validate_lines};
pub use model::{
    ComponentLine, ComponentOwner, ComponentStock, Contact, Coordinates, DecommissionDestination,
    DecommissionRecord, Installation, InstallationId, InstallationStatus, Location, Movement,
    Recovery, SystemType, TheftMode, TheftRecord,
};
pub use status::{
    DismantleRequest, RecoveryRequest, RelocationRequest, StatusChange, TheftReport,
    apply_status_change,
};
