use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};

/// A single exchange-rate entry. Finance-maintained configs sometimes quote
/// rates as text, so the raw scalar is kept as found and only parsed when a
/// report actually needs it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RateValue {
    Number(f64),
    Text(String),
}

impl RateValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            RateValue::Number(n) => Some(*n),
            RateValue::Text(t) => t.trim().parse().ok(),
        }
    }
}

impl fmt::Display for RateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateValue::Number(n) => write!(f, "{}", n),
            RateValue::Text(t) => write!(f, "{}", t),
        }
    }
}

/// Exchange rates keyed by conversion pair name ("AUD to GBP"), then year,
/// then full English month name.
pub type RateTable = BTreeMap<String, BTreeMap<i32, BTreeMap<String, RateValue>>>;

/// The top-level config file.
///
/// Every section is optional at parse time; the components built from a
/// section report a `Configuration` error when the section they need is
/// absent, so a truncated config fails at startup with the section named.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    /// MPS category code mapped to the raw finance labels that roll up into
    /// it. Label matching is case-insensitive.
    pub mps_category_mapping: Option<BTreeMap<String, Vec<String>>>,

    /// Monthly exchange rates per conversion pair.
    pub exchange_rates: Option<RateTable>,

    /// Company display name mapped to its conversion pair name. When absent
    /// the built-in company directory is used.
    pub companies: Option<BTreeMap<String, String>>,
}

impl ReportConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| ReportError::Configuration(format!("Invalid config file: {}", e)))
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}
