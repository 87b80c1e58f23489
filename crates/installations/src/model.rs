use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pvtrack_core::{AggregateId, AggregateRoot, ValueObject};

/// Installation identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstallationId(pub AggregateId);

impl InstallationId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for InstallationId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl core::str::FromStr for InstallationId {
    type Err = pvtrack_core::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<AggregateId>().map(Self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemType {
    Residential,
    Commercial,
    Industrial,
    Utility,
}

/// Persisted installation status.
///
/// There is no "relocating" or "dismantled" status: relocation lands on `Active`
/// and dismantling lands on `Inactive`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallationStatus {
    Active,
    Inactive,
    PendingEngraving,
    StolenComponents,
}

impl InstallationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            InstallationStatus::Active => "active",
            InstallationStatus::Inactive => "inactive",
            InstallationStatus::PendingEngraving => "pending_engraving",
            InstallationStatus::StolenComponents => "stolen_components",
        }
    }
}

impl core::fmt::Display for InstallationStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for InstallationStatus {
    type Err = pvtrack_core::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(InstallationStatus::Active),
            "inactive" => Ok(InstallationStatus::Inactive),
            "pending_engraving" => Ok(InstallationStatus::PendingEngraving),
            "stolen_components" => Ok(InstallationStatus::StolenComponents),
            other => Err(pvtrack_core::DomainError::validation(format!(
                "unknown installation status: {other}"
            ))),
        }
    }
}

/// Client or installer contact card. Never touched by the status engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl Contact {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            company: None,
            email: None,
            phone: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl ValueObject for Coordinates {}

impl Coordinates {
    /// Build a coordinate pair, rejecting non-finite or out-of-range values.
    pub fn checked(lat: f64, lng: f64) -> Option<Self> {
        let in_range = lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng);
        in_range.then_some(Self { lat, lng })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub address: String,
    pub commune: String,
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

impl ValueObject for Location {}

/// Units of one component type currently on site.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentStock {
    pub quantity: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TheftMode {
    All,
    Partial,
}

/// A validated line: `quantity` units of `type_key`, one code per unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentLine {
    pub type_key: String,
    pub quantity: u32,
    pub codes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TheftRecord {
    pub mode: TheftMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<ComponentLine>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecommissionDestination {
    ForSale,
    Sold,
    Reuse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentOwner {
    Provider,
    Client,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecommissionRecord {
    pub destination: DecommissionDestination,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub listed_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sold: Vec<ComponentLine>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reuse: Vec<ComponentLine>,
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_owner: Option<ComponentOwner>,
}

/// Latest deduction for a component type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub when: DateTime<Utc>,
    pub moved_codes: Vec<String>,
}

/// Latest recovery for a component type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recovery {
    pub when: DateTime<Utc>,
    pub recovered_codes: Vec<String>,
}

/// Aggregate root: Installation.
///
/// `theft_outstanding_all` and a non-empty `theft_outstanding` never hold at the
/// same time. `last_movement` and `last_recovery` keep only the latest event per
/// component type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installation {
    pub id: InstallationId,
    pub system_name: String,
    pub system_type: SystemType,
    pub client: Contact,
    pub installer: Contact,
    pub location: Location,
    #[serde(default)]
    pub components: BTreeMap<String, ComponentStock>,
    pub status: InstallationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theft: Option<TheftRecord>,
    #[serde(default)]
    pub theft_outstanding_all: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub theft_outstanding: BTreeMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decommission: Option<DecommissionRecord>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub last_movement: BTreeMap<String, Movement>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub last_recovery: BTreeMap<String, Recovery>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_owner: Option<ComponentOwner>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recovered_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relocated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub(crate) version: u64,
}

impl Installation {
    /// A freshly registered, active installation at version 0.
    #[allow(clippy::too_many_arguments)]
    pub fn register(
        id: InstallationId,
        system_name: impl Into<String>,
        system_type: SystemType,
        client: Contact,
        installer: Contact,
        location: Location,
        components: BTreeMap<String, ComponentStock>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            system_name: system_name.into(),
            system_type,
            client,
            installer,
            location,
            components,
            status: InstallationStatus::Active,
            theft: None,
            theft_outstanding_all: false,
            theft_outstanding: BTreeMap::new(),
            decommission: None,
            last_movement: BTreeMap::new(),
            last_recovery: BTreeMap::new(),
            component_owner: None,
            recovered_at: None,
            relocated_at: None,
            created_at,
            version: 0,
        }
    }

    /// Units of `type_key` currently on site (0 for an unknown type).
    pub fn available(&self, type_key: &str) -> u32 {
        self.components
            .get(type_key)
            .map(|stock| stock.quantity)
            .unwrap_or(0)
    }

    pub fn is_stolen(&self) -> bool {
        self.status == InstallationStatus::StolenComponents
    }

    /// Outstanding theft codes across all component types.
    pub fn outstanding_code_count(&self) -> usize {
        self.theft_outstanding.values().map(Vec::len).sum()
    }
}

impl AggregateRoot for Installation {
    type Id = InstallationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}
