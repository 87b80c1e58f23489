//! Installation status engine.
//!
//! `apply_status_change` is a pure function: it takes the authoritative current
//! record, the requested change and the business time, and returns either the
//! complete replacement record or the first validation error. The input record is
//! never mutated, so a rejected change needs no rollback.
//!
//! ```text
//! active (not stolen)        -> active             no inventory change
//! stolen_components + full   -> active             clear theft flags, recovered_at
//! stolen_components + codes  -> active             restore codes, recovered_at
//! any + stolen(all)          -> stolen_components  theft_outstanding_all
//! any + stolen(partial)      -> stolen_components  deduct, theft_outstanding
//! any + dismantled(for_sale) -> inactive           decommission only
//! any + dismantled(sold)     -> inactive           deduct, decommission
//! any + dismantled(reuse)    -> inactive           ownership, deduct, decommission
//! any + relocating           -> active             new location, relocated_at
//! ```

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{RecoveryGap, StatusChangeError};
use crate::form::FormNumber;
use crate::lines::{self, LineInput};
use crate::model::{
    ComponentOwner, Coordinates, DecommissionDestination, DecommissionRecord, Installation,
    InstallationStatus, TheftMode, TheftRecord,
};

/// A requested status change, as `{ "choice": ..., "payload": {...} }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "choice", content = "payload", rename_all = "snake_case")]
pub enum StatusChange {
    Active(RecoveryRequest),
    Stolen(TheftReport),
    Dismantled(DismantleRequest),
    Relocating(RelocationRequest),
}

/// Payload for returning to `active`. Only consulted when the installation is stolen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryRequest {
    #[serde(default)]
    pub confirm_full_recovery: bool,
    /// Chosen codes per component type.
    #[serde(default)]
    pub recovered_selection: BTreeMap<String, BTreeSet<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TheftReport {
    pub mode: TheftMode,
    #[serde(default)]
    pub note: Option<String>,
    /// Ignored for `TheftMode::All`.
    #[serde(default)]
    pub lines: Vec<LineInput>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "destination", rename_all = "snake_case")]
pub enum DismantleRequest {
    ForSale {
        #[serde(default)]
        selected_types: BTreeMap<String, bool>,
    },
    Sold {
        #[serde(default)]
        lines: Vec<LineInput>,
    },
    Reuse {
        #[serde(default)]
        confirm_provider_owner: bool,
        #[serde(default)]
        lines: Vec<LineInput>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelocationRequest {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub commune: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub lat: Option<FormNumber>,
    #[serde(default)]
    pub lng: Option<FormNumber>,
}

impl StatusChange {
    /// Wire name of the choice (`active`, `stolen`, `dismantled`, `relocating`).
    pub fn choice(&self) -> &'static str {
        match self {
            StatusChange::Active(_) => "active",
            StatusChange::Stolen(_) => "stolen",
            StatusChange::Dismantled(_) => "dismantled",
            StatusChange::Relocating(_) => "relocating",
        }
    }
}

/// Apply `change` to `installation` at business time `now`.
///
/// On success the returned record carries the new status, the inventory deltas,
/// the audit sub-records and a version one higher than the input.
pub fn apply_status_change(
    installation: &Installation,
    change: &StatusChange,
    now: DateTime<Utc>,
) -> Result<Installation, StatusChangeError> {
    let mut next = installation.clone();

    match change {
        StatusChange::Active(req) => activate(&mut next, req, now)?,
        StatusChange::Stolen(report) => report_theft(&mut next, report, now)?,
        StatusChange::Dismantled(req) => dismantle(&mut next, req, now)?,
        StatusChange::Relocating(req) => relocate(&mut next, req, now)?,
    }

    next.version += 1;
    Ok(next)
}

fn activate(
    next: &mut Installation,
    req: &RecoveryRequest,
    now: DateTime<Utc>,
) -> Result<(), StatusChangeError> {
    if !next.is_stolen() {
        next.status = InstallationStatus::Active;
        return Ok(());
    }

    if next.theft_outstanding_all {
        if !req.confirm_full_recovery {
            return Err(StatusChangeError::IncompleteRecovery(
                RecoveryGap::FullConfirmationMissing,
            ));
        }
        next.theft_outstanding_all = false;
        next.theft_outstanding.clear();
        next.recovered_at = Some(now);
    } else if !next.theft_outstanding.is_empty() {
        let mut recovered: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for (type_key, outstanding) in &next.theft_outstanding {
            let chosen = req.recovered_selection.get(type_key);
            let selected: Vec<String> = outstanding
                .iter()
                .filter(|code| chosen.is_some_and(|set| set.contains(*code)))
                .cloned()
                .collect();

            if selected.len() != outstanding.len() {
                return Err(StatusChangeError::IncompleteRecovery(RecoveryGap::Codes {
                    type_key: type_key.clone(),
                    selected: selected.len(),
                    outstanding: outstanding.len(),
                }));
            }
            recovered.insert(type_key.clone(), selected);
        }

        lines::restore(next, &recovered, now);
        next.theft_outstanding.clear();
        next.recovered_at = Some(now);
    }

    next.status = InstallationStatus::Active;
    Ok(())
}

fn report_theft(
    next: &mut Installation,
    report: &TheftReport,
    now: DateTime<Utc>,
) -> Result<(), StatusChangeError> {
    let note = report
        .note
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_owned);

    match report.mode {
        TheftMode::All => {
            next.theft = Some(TheftRecord {
                mode: TheftMode::All,
                note,
                date: now,
                items: Vec::new(),
            });
            next.theft_outstanding_all = true;
            next.theft_outstanding.clear();
        }
        TheftMode::Partial => {
            let items = lines::validate_lines(next, &report.lines)?;

            let mut outstanding: BTreeMap<String, Vec<String>> = BTreeMap::new();
            for item in &items {
                outstanding
                    .entry(item.type_key.clone())
                    .or_default()
                    .extend(item.codes.iter().cloned());
            }

            lines::deduct(next, &items, now);
            next.theft = Some(TheftRecord {
                mode: TheftMode::Partial,
                note,
                date: now,
                items,
            });
            next.theft_outstanding = outstanding;
            next.theft_outstanding_all = false;
        }
    }

    next.status = InstallationStatus::StolenComponents;
    Ok(())
}

fn dismantle(
    next: &mut Installation,
    req: &DismantleRequest,
    now: DateTime<Utc>,
) -> Result<(), StatusChangeError> {
    let record = match req {
        DismantleRequest::ForSale { selected_types } => {
            let listed_types: Vec<String> = selected_types
                .iter()
                .filter(|(type_key, selected)| **selected && next.components.contains_key(*type_key))
                .map(|(type_key, _)| type_key.clone())
                .collect();

            if listed_types.is_empty() {
                return Err(StatusChangeError::NoComponentTypesSelected);
            }

            DecommissionRecord {
                destination: DecommissionDestination::ForSale,
                listed_types,
                sold: Vec::new(),
                reuse: Vec::new(),
                date: now,
                component_owner: None,
            }
        }
        DismantleRequest::Sold { lines: inputs } => {
            let items = lines::validate_lines(next, inputs)?;
            lines::deduct(next, &items, now);

            DecommissionRecord {
                destination: DecommissionDestination::Sold,
                listed_types: Vec::new(),
                sold: items,
                reuse: Vec::new(),
                date: now,
                component_owner: None,
            }
        }
        DismantleRequest::Reuse {
            confirm_provider_owner,
            lines: inputs,
        } => {
            let provider_owned = next.component_owner == Some(ComponentOwner::Provider);
            if !provider_owned && !confirm_provider_owner {
                return Err(StatusChangeError::OwnershipRequired);
            }

            let items = lines::validate_lines(next, inputs)?;
            lines::deduct(next, &items, now);

            DecommissionRecord {
                destination: DecommissionDestination::Reuse,
                listed_types: Vec::new(),
                sold: Vec::new(),
                reuse: items,
                date: now,
                component_owner: Some(ComponentOwner::Provider),
            }
        }
    };

    next.decommission = Some(record);
    next.status = InstallationStatus::Inactive;
    Ok(())
}

/// Theft bookkeeping is left untouched; a relocated record that still has
/// outstanding codes keeps them on file.
fn relocate(
    next: &mut Installation,
    req: &RelocationRequest,
    now: DateTime<Utc>,
) -> Result<(), StatusChangeError> {
    let address = req.address.trim();
    let commune = req.commune.trim();
    let region = req.region.trim();

    let fields: Vec<&'static str> = [("address", address), ("commune", commune), ("region", region)]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect();
    if !fields.is_empty() {
        return Err(StatusChangeError::MissingLocationFields { fields });
    }

    let lat = req.lat.as_ref().and_then(FormNumber::as_finite);
    let lng = req.lng.as_ref().and_then(FormNumber::as_finite);
    let coordinates = match (lat, lng) {
        (Some(lat), Some(lng)) => Coordinates::checked(lat, lng),
        _ => None,
    }
    .ok_or(StatusChangeError::InvalidCoordinates)?;

    next.location.address = address.to_string();
    next.location.commune = commune.to_string();
    next.location.region = region.to_string();
    next.location.coordinates = Some(coordinates);
    next.status = InstallationStatus::Active;
    next.relocated_at = Some(now);
    Ok(())
}
