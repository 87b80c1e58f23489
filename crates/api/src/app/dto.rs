use axum::http::StatusCode;
use serde::Deserialize;

use pvtrack_core::ExpectedVersion;
use pvtrack_installations::{InstallationId, InstallationStatus, StatusChange};

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

/// `POST /installations/:id/status` body: `{choice, payload, expected_version?}`.
#[derive(Debug, Deserialize)]
pub struct StatusChangeRequest {
    #[serde(flatten)]
    pub change: StatusChange,
    #[serde(default)]
    pub expected_version: Option<u64>,
}

impl StatusChangeRequest {
    pub fn expected_version(&self) -> ExpectedVersion {
        ExpectedVersion::from(self.expected_version)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListInstallationsQuery {
    pub status: Option<String>,
}

// -------------------------
// Parsing helpers
// -------------------------

pub fn parse_installation_id(raw: &str) -> Result<InstallationId, axum::response::Response> {
    raw.parse::<InstallationId>().map_err(|_| {
        errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid installation id")
    })
}

pub fn parse_status_filter(
    raw: Option<&str>,
) -> Result<Option<InstallationStatus>, axum::response::Response> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => s.parse::<InstallationStatus>().map(Some).map_err(|_| {
            errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_status",
                "status must be one of: active, inactive, pending_engraving, stolen_components",
            )
        }),
    }
}
