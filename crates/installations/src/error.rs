//! Status engine rejections.

use thiserror::Error;

use pvtrack_core::DomainError;

/// Why a status change was rejected.
///
/// Every variant is a deterministic validation failure; the installation is left
/// untouched whenever one is returned. `line` fields are 1-based.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StatusChangeError {
    #[error("at least one component line is required")]
    NoLines,

    #[error("line {line}: component type is required")]
    MissingType { line: usize },

    #[error("line {line}: quantity must be a positive integer")]
    InvalidQuantity { line: usize },

    #[error("line {line}: requested {requested} {type_key} but only {available} available")]
    QuantityExceedsAvailable {
        line: usize,
        type_key: String,
        requested: u32,
        available: u32,
    },

    #[error("line {line}: {found} code(s) supplied for a quantity of {expected}")]
    CodeCountMismatch {
        line: usize,
        expected: u32,
        found: usize,
    },

    #[error("line {line}: code {code} appears more than once for {type_key}")]
    DuplicateCode {
        line: usize,
        type_key: String,
        code: String,
    },

    #[error("recovery incomplete: {0}")]
    IncompleteRecovery(RecoveryGap),

    #[error("reusing components requires provider ownership")]
    OwnershipRequired,

    #[error("missing location fields: {}", .fields.join(", "))]
    MissingLocationFields { fields: Vec<&'static str> },

    #[error("coordinates must be finite numbers with lat in [-90, 90] and lng in [-180, 180]")]
    InvalidCoordinates,

    #[error("select at least one component type to list for sale")]
    NoComponentTypesSelected,
}

/// What is still missing for a recovery to be accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryGap {
    /// The whole installation was reported stolen; only an explicit confirmation clears it.
    FullConfirmationMissing,
    /// Not every outstanding code of `type_key` was selected.
    Codes {
        type_key: String,
        selected: usize,
        outstanding: usize,
    },
}

impl core::fmt::Display for RecoveryGap {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RecoveryGap::FullConfirmationMissing => {
                f.write_str("full recovery must be confirmed")
            }
            RecoveryGap::Codes {
                type_key,
                selected,
                outstanding,
            } => write!(
                f,
                "{selected} of {outstanding} outstanding {type_key} code(s) selected"
            ),
        }
    }
}

impl StatusChangeError {
    /// Stable machine-readable name (used in API error bodies).
    pub fn kind(&self) -> &'static str {
        match self {
            StatusChangeError::NoLines => "no_lines",
            StatusChangeError::MissingType { .. } => "missing_type",
            StatusChangeError::InvalidQuantity { .. } => "invalid_quantity",
            StatusChangeError::QuantityExceedsAvailable { .. } => "quantity_exceeds_available",
            StatusChangeError::CodeCountMismatch { .. } => "code_count_mismatch",
            StatusChangeError::DuplicateCode { .. } => "duplicate_code",
            StatusChangeError::IncompleteRecovery(_) => "incomplete_recovery",
            StatusChangeError::OwnershipRequired => "ownership_required",
            StatusChangeError::MissingLocationFields { .. } => "missing_location_fields",
            StatusChangeError::InvalidCoordinates => "invalid_coordinates",
            StatusChangeError::NoComponentTypesSelected => "no_component_types_selected",
        }
    }
}

impl From<StatusChangeError> for DomainError {
    fn from(value: StatusChangeError) -> Self {
        DomainError::validation(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_line_context() {
        let err = StatusChangeError::CodeCountMismatch {
            line: 2,
            expected: 3,
            found: 2,
        };
        assert_eq!(err.to_string(), "line 2: 2 code(s) supplied for a quantity of 3");
        assert_eq!(err.kind(), "code_count_mismatch");
    }

    #[test]
    fn missing_location_fields_are_listed() {
        let err = StatusChangeError::MissingLocationFields {
            fields: vec!["commune", "region"],
        };
        assert_eq!(err.to_string(), "missing location fields: commune, region");
    }

    #[test]
    fn converts_into_domain_validation_error() {
        let err: DomainError = StatusChangeError::IncompleteRecovery(RecoveryGap::Codes {
            type_key: "panels".to_string(),
            selected: 2,
            outstanding: 3,
        })
        .into();
        match err {
            DomainError::Validation(msg) => {
                assert!(msg.contains("2 of 3 outstanding panels code(s) selected"))
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
