use std::collections::HashMap;
use std::fmt;

use crate::config::{RateTable, ReportConfig};
use crate::error::{ReportError, Result};

/// The currency every report converts into.
pub const REPORTING_CURRENCY: &str = "GBP";

/// A named currency conversion, e.g. "AUD to GBP".
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConversionPair {
    pub source: String,
    pub target: String,
}

impl ConversionPair {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    /// Parses the "XXX to YYY" naming the rate table and config use.
    pub fn parse(name: &str) -> Result<Self> {
        let parts: Vec<&str> = name.split(" to ").collect();
        match parts.as_slice() {
            [source, target] if !source.trim().is_empty() && !target.trim().is_empty() => {
                Ok(Self::new(source.trim(), target.trim()))
            }
            _ => Err(ReportError::Configuration(format!(
                "Invalid conversion pair name: \"{}\"",
                name
            ))),
        }
    }

    /// True when source and target are the same currency. Identity pairs
    /// always convert at 1.0.
    pub fn is_identity(&self) -> bool {
        self.source == self.target
    }
}

impl fmt::Display for ConversionPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.source, self.target)
    }
}

/// Company display name to conversion pair, matched case-insensitively.
///
/// The built-in table covers the four Network Mapping subsidiaries; a
/// "companies" config section replaces it wholesale. Every configured pair
/// must target the reporting currency.
#[derive(Debug, Clone)]
pub struct CompanyDirectory {
    by_company: HashMap<String, ConversionPair>,
}

impl CompanyDirectory {
    pub fn from_config(config: &ReportConfig) -> Result<Self> {
        let Some(companies) = &config.companies else {
            return Ok(Self::default());
        };

        let mut by_company = HashMap::new();
        for (company, pair_name) in companies {
            let pair = ConversionPair::parse(pair_name)?;
            if pair.target != REPORTING_CURRENCY {
                return Err(ReportError::Configuration(format!(
                    "Company \"{}\" converts to {}, expected {}",
                    company, pair.target, REPORTING_CURRENCY
                )));
            }
            by_company.insert(company.trim().to_lowercase(), pair);
        }

        Ok(Self { by_company })
    }

    /// The conversion pair a company reports in.
    pub fn conversion_pair(&self, company: &str) -> Result<&ConversionPair> {
        self.by_company
            .get(&company.trim().to_lowercase())
            .ok_or_else(|| ReportError::UnknownCompany(company.trim().to_string()))
    }

    /// Number of companies the directory knows.
    pub fn len(&self) -> usize {
        self.by_company.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_company.is_empty()
    }

    /// Every distinct non-identity pair in the directory, sorted by name.
    /// These become the audit rate columns on every ledger row.
    pub fn audit_pairs(&self) -> Vec<ConversionPair> {
        let mut pairs: Vec<ConversionPair> = self
            .by_company
            .values()
            .filter(|pair| !pair.is_identity())
            .cloned()
            .collect();
        pairs.sort();
        pairs.dedup();
        pairs
    }
}

impl Default for CompanyDirectory {
    fn default() -> Self {
        let defaults = [
            ("Network Mapping Pty Ltd", "AUD"),
            ("Network Mapping Corp", "CAD"),
            ("Network Mapping Inc", "USD"),
            ("Network Mapping Limited", "GBP"),
        ];

        let by_company = defaults
            .into_iter()
            .map(|(company, currency)| {
                (
                    company.to_lowercase(),
                    ConversionPair::new(currency, REPORTING_CURRENCY),
                )
            })
            .collect();

        Self { by_company }
    }
}

/// Monthly exchange rates keyed by pair name, then year, then full month
/// name. Values stay as configured until a lookup needs them, so a bad
/// entry only fails the reports that use it.
#[derive(Debug, Clone)]
pub struct ExchangeRateTable {
    rates: RateTable,
}

impl ExchangeRateTable {
    pub fn from_config(config: &ReportConfig) -> Result<Self> {
        let rates = config.exchange_rates.clone().ok_or_else(|| {
            ReportError::Configuration("No exchange_rates defined in config".to_string())
        })?;
        Ok(Self { rates })
    }

    /// The rate scaling `pair.source` into `pair.target` for the given
    /// month. Identity pairs are 1.0 without consulting the table.
    pub fn rate(&self, pair: &ConversionPair, year: i32, month: &str) -> Result<f64> {
        if pair.is_identity() {
            return Ok(1.0);
        }

        let value = self
            .rates
            .get(&pair.to_string())
            .and_then(|years| years.get(&year))
            .and_then(|months| months.get(month))
            .ok_or_else(|| ReportError::MissingExchangeRate {
                pair: pair.to_string(),
                year,
                month: month.to_string(),
            })?;

        value
            .as_number()
            .ok_or_else(|| ReportError::InvalidExchangeRate {
                pair: pair.to_string(),
                year,
                month: month.to_string(),
                value: value.to_string(),
            })
    }
}
