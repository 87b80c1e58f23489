//! Component line batches: validation, deduction and restoration.
//!
//! A batch is the list of `{type_key, quantity, codes}` lines submitted with a
//! partial theft report, a sale or a reuse. Validation is all-or-nothing: the
//! first bad line rejects the whole batch.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StatusChangeError;
use crate::form::FormNumber;
use crate::model::{ComponentLine, Installation, Movement, Recovery};

/// A line as submitted, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineInput {
    #[serde(default)]
    pub type_key: String,
    pub quantity: FormNumber,
    /// Raw code list, separated by commas and/or newlines.
    #[serde(default)]
    pub codes: String,
}

impl LineInput {
    pub fn new(type_key: impl Into<String>, quantity: impl Into<FormNumber>, codes: impl Into<String>) -> Self {
        Self {
            type_key: type_key.into(),
            quantity: quantity.into(),
            codes: codes.into(),
        }
    }
}

/// Split a raw code list on commas and newlines, trimming and dropping empties.
pub fn parse_codes(raw: &str) -> Vec<String> {
    raw.split([',', '\n'])
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Validate a batch against the installation's live component quantities.
///
/// Lines of the same type draw from one running total, so a batch can never
/// claim more units than are on site. Code uniqueness is enforced across the
/// batch, scoped per component type.
pub fn validate_lines(
    installation: &Installation,
    lines: &[LineInput],
) -> Result<Vec<ComponentLine>, StatusChangeError> {
    if lines.is_empty() {
        return Err(StatusChangeError::NoLines);
    }

    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut claimed: HashMap<String, u32> = HashMap::new();
    let mut validated = Vec::with_capacity(lines.len());

    for (idx, input) in lines.iter().enumerate() {
        let line = idx + 1;

        let type_key = input.type_key.trim();
        if type_key.is_empty() {
            return Err(StatusChangeError::MissingType { line });
        }

        let quantity = input
            .quantity
            .as_positive_count()
            .ok_or(StatusChangeError::InvalidQuantity { line })?;

        let already = claimed.get(type_key).copied().unwrap_or(0);
        let available = installation.available(type_key).saturating_sub(already);
        if quantity > available {
            return Err(StatusChangeError::QuantityExceedsAvailable {
                line,
                type_key: type_key.to_string(),
                requested: quantity,
                available,
            });
        }

        let codes = parse_codes(&input.codes);
        if codes.len() != quantity as usize {
            return Err(StatusChangeError::CodeCountMismatch {
                line,
                expected: quantity,
                found: codes.len(),
            });
        }

        *claimed.entry(type_key.to_string()).or_default() += quantity;

        for code in &codes {
            if !seen.insert((type_key.to_string(), code.clone())) {
                return Err(StatusChangeError::DuplicateCode {
                    line,
                    type_key: type_key.to_string(),
                    code: code.clone(),
                });
            }
        }

        validated.push(ComponentLine {
            type_key: type_key.to_string(),
            quantity,
            codes,
        });
    }

    Ok(validated)
}

/// Remove validated lines from stock, flooring at zero, and stamp `last_movement`.
pub(crate) fn deduct(installation: &mut Installation, lines: &[ComponentLine], now: DateTime<Utc>) {
    for line in lines {
        if let Some(stock) = installation.components.get_mut(&line.type_key) {
            stock.quantity = stock.quantity.saturating_sub(line.quantity);
        }
        installation.last_movement.insert(
            line.type_key.clone(),
            Movement {
                when: now,
                moved_codes: line.codes.clone(),
            },
        );
    }
}

/// Put recovered codes back into stock and stamp `last_recovery`.
pub(crate) fn restore(
    installation: &mut Installation,
    recovered: &BTreeMap<String, Vec<String>>,
    now: DateTime<Utc>,
) {
    for (type_key, codes) in recovered {
        let stock = installation.components.entry(type_key.clone()).or_default();
        stock.quantity = stock.quantity.saturating_add(codes.len() as u32);
        installation.last_recovery.insert(
            type_key.clone(),
            Recovery {
                when: now,
                recovered_codes: codes.clone(),
            },
        );
    }
}
