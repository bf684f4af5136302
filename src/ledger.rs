use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io::Write;

use log::debug;

use crate::error::Result;
use crate::normalize::NormalizedReport;

/// Fixed leading columns of the ledger, followed by one column per audit
/// rate and one per category.
pub const LEDGER_METADATA_COLUMNS: [&str; 5] = [
    "Project Code",
    "Project Name",
    "Date",
    "Converted From",
    "Currency",
];

/// The final artifact: every accepted report merged into one deduplicated,
/// summed table.
#[derive(Debug, Clone)]
pub struct Ledger {
    /// Audit rate column names, sorted.
    pub rate_columns: Vec<String>,
    /// Category column names, sorted.
    pub categories: Vec<String>,
    /// Rows sorted by (project code, currency, date, rates).
    pub rows: Vec<LedgerRow>,
}

#[derive(Debug, Clone)]
pub struct LedgerRow {
    pub project_code: String,
    pub project_name: String,
    pub date: String,
    pub source_currency: String,
    pub currency: String,
    /// Parallel to `Ledger::rate_columns`.
    pub rates: Vec<f64>,
    /// Parallel to `Ledger::categories`.
    pub values: Vec<f64>,
}

/// Rows merge when every one of these matches. Rates are compared by bit
/// pattern so the key stays totally ordered.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct GroupKey {
    project_code: String,
    currency: String,
    date: String,
    rate_bits: Vec<u64>,
}

/// Merges normalized reports into one ledger.
///
/// Category columns are the sorted union across all reports; a report
/// lacking a category contributes 0 there. Rows sharing a group key are
/// summed, which is how a project cross-charged between companies ends up
/// as a single row per period. Project name and source currency come from
/// the first contributing row. Merging nothing yields an empty ledger.
pub fn merge_reports(reports: &[NormalizedReport]) -> Ledger {
    let rate_columns: Vec<String> = reports
        .iter()
        .flat_map(|report| report.audit_rates.iter().map(|(name, _)| name.clone()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let categories: Vec<String> = reports
        .iter()
        .flat_map(|report| report.categories.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let category_position: HashMap<&str, usize> = categories
        .iter()
        .enumerate()
        .map(|(index, category)| (category.as_str(), index))
        .collect();

    let mut groups: BTreeMap<GroupKey, LedgerRow> = BTreeMap::new();

    for report in reports {
        let date = report.period.formatted();
        let rates: Vec<f64> = rate_columns
            .iter()
            .map(|column| {
                report
                    .audit_rates
                    .iter()
                    .find(|(name, _)| name == column)
                    .map(|(_, rate)| *rate)
                    .unwrap_or(0.0)
            })
            .collect();
        let rate_bits: Vec<u64> = rates.iter().map(|rate| rate.to_bits()).collect();

        for row in &report.rows {
            let key = GroupKey {
                project_code: row.project_code.clone(),
                currency: report.reporting_currency.clone(),
                date: date.clone(),
                rate_bits: rate_bits.clone(),
            };

            let entry = groups.entry(key).or_insert_with(|| LedgerRow {
                project_code: row.project_code.clone(),
                project_name: row.project_name.clone(),
                date: date.clone(),
                source_currency: report.source_currency.clone(),
                currency: report.reporting_currency.clone(),
                rates: rates.clone(),
                values: vec![0.0; categories.len()],
            });

            for (index, category) in report.categories.iter().enumerate() {
                entry.values[category_position[category.as_str()]] += row.values[index];
            }
        }
    }

    debug!(
        "Merged {} reports into {} ledger rows across {} categories",
        reports.len(),
        groups.len(),
        categories.len()
    );

    Ledger {
        rate_columns,
        categories,
        rows: groups.into_values().collect(),
    }
}

impl Ledger {
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        let mut header: Vec<String> = LEDGER_METADATA_COLUMNS
            .iter()
            .map(|column| column.to_string())
            .collect();
        header.extend(self.rate_columns.iter().cloned());
        header.extend(self.categories.iter().cloned());
        csv_writer.write_record(&header)?;

        for row in &self.rows {
            let mut record: Vec<String> = vec![
                row.project_code.clone(),
                row.project_name.clone(),
                row.date.clone(),
                row.source_currency.clone(),
                row.currency.clone(),
            ];
            record.extend(row.rates.iter().map(|rate| rate.to_string()));
            record.extend(row.values.iter().map(|value| value.to_string()));
            csv_writer.write_record(&record)?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    pub fn to_csv_string(&self) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
