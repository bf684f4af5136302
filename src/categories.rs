use std::collections::HashMap;

use crate::config::ReportConfig;
use crate::error::{ReportError, Result};

/// Inverted category lookup: raw finance label to MPS category code.
///
/// The config lists each category with the labels that roll up into it;
/// construction flips that into a label-keyed map so classification is a
/// single lookup. Matching is case-insensitive and ignores surrounding
/// whitespace. Immutable once built.
#[derive(Debug, Clone)]
pub struct CategoryMapping {
    by_label: HashMap<String, String>,
}

impl CategoryMapping {
    pub fn from_config(config: &ReportConfig) -> Result<Self> {
        let mapping = config.mps_category_mapping.as_ref().ok_or_else(|| {
            ReportError::Configuration("No mps_category_mapping defined in config".to_string())
        })?;

        let mut by_label = HashMap::new();
        for (category, labels) in mapping {
            for label in labels {
                by_label.insert(label.trim().to_lowercase(), category.clone());
            }
        }

        Ok(Self { by_label })
    }

    /// The category code a raw finance label belongs to.
    pub fn resolve(&self, label: &str) -> Result<&str> {
        self.by_label
            .get(&label.trim().to_lowercase())
            .map(|category| category.as_str())
            .ok_or_else(|| ReportError::UnmappedCategory(label.to_string()))
    }
}
