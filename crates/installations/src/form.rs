//! Numeric form values.
//!
//! Quantities and coordinates reach the engine as whatever the form sent: a JSON
//! number or a string. The engine parses them itself instead of trusting the UI.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormNumber {
    Number(f64),
    Text(String),
}

impl FormNumber {
    /// The value as a finite float; blank or unparsable text yields `None`.
    pub fn as_finite(&self) -> Option<f64> {
        let value = match self {
            FormNumber::Number(n) => *n,
            FormNumber::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }

    /// The value as a strictly positive whole count.
    pub fn as_positive_count(&self) -> Option<u32> {
        let value = self.as_finite()?;
        if value >= 1.0 && value.fract() == 0.0 && value <= f64::from(u32::MAX) {
            Some(value as u32)
        } else {
            None
        }
    }
}

impl From<u32> for FormNumber {
    fn from(value: u32) -> Self {
        FormNumber::Number(f64::from(value))
    }
}

impl From<f64> for FormNumber {
    fn from(value: f64) -> Self {
        FormNumber::Number(value)
    }
}

impl From<&str> for FormNumber {
    fn from(value: &str) -> Self {
        FormNumber::Text(value.to_string())
    }
}
