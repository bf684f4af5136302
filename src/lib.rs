//! # MPS Report Builder
//!
//! A library for consolidating the monthly "Profit and Loss" spreadsheet
//! exports of a group of companies into one currency-converted,
//! per-project cost ledger.
//!
//! ## Core Concepts
//!
//! - **Report**: one company's monthly P&L export, a workbook whose first
//!   three rows name the company, the report type, and the period
//! - **Project columns**: spreadsheet columns whose header starts with a
//!   project code matching the configured template
//! - **Categories**: configured grouping of raw spreadsheet cost labels
//!   (e.g. "equipment hire") into reporting categories (e.g. "Equipment")
//! - **Exchange rates**: configured month-by-month rates converting each
//!   company's local currency into the group reporting currency
//! - **Ledger**: the merged output table, one row per project and period,
//!   summed across companies
//!
//! ## Example
//!
//! ```rust,ignore
//! use mps_report_builder::*;
//!
//! let config = ReportConfig::from_path(Path::new("config.json"))?;
//! let reporter = MpsReporter::new(
//!     &config,
//!     DEFAULT_EXCEL_HEADER_ROW,
//!     DEFAULT_PROJECT_CODE_TEMPLATE,
//! )?;
//!
//! let mut sheets = Vec::new();
//! for path in ingestion::discover_reports(Path::new("reports"))? {
//!     sheets.push(ingestion::read_report(&path)?);
//! }
//!
//! let ledger = reporter.build_ledger(&sheets)?;
//! ledger.write_csv(std::fs::File::create("mps_report.csv")?)?;
//! ```

pub mod categories;
pub mod classify;
pub mod config;
pub mod error;
pub mod ingestion;
pub mod ledger;
pub mod normalize;
pub mod period;
pub mod rates;
pub mod sheet;

pub use categories::CategoryMapping;
pub use classify::{classify, ClassifiedProject, ClassifiedTable, ProjectColumn, ProjectTable};
pub use config::{RateTable, RateValue, ReportConfig};
pub use error::{ReportError, Result};
pub use ingestion::{discover_reports, read_report};
pub use ledger::{merge_reports, Ledger, LedgerRow, LEDGER_METADATA_COLUMNS};
pub use normalize::{NormalizedReport, NormalizedRow, ProjectCodeTemplate, ReportNormalizer};
pub use period::{last_day_of_month, PeriodDialect, PeriodParser, ReportPeriod};
pub use rates::{CompanyDirectory, ConversionPair, ExchangeRateTable, REPORTING_CURRENCY};
pub use sheet::{Cell, RawSheet, SheetHeader, PROFIT_AND_LOSS_TITLE};

use std::ops::RangeInclusive;

use log::{debug, info, warn};

/// One-based spreadsheet row carrying the project column headers in the
/// stock export layout.
pub const DEFAULT_EXCEL_HEADER_ROW: usize = 5;

/// Pattern whose single capture group extracts the project code from the
/// front of a project column header.
pub const DEFAULT_PROJECT_CODE_TEMPLATE: &str = r"(^NM[ACIL]P[0-9]+)";

/// The assembled pipeline: one of these holds every component built from
/// the config and turns raw sheets into the merged ledger.
#[derive(Debug)]
pub struct MpsReporter {
    categories: CategoryMapping,
    rates: ExchangeRateTable,
    companies: CompanyDirectory,
    periods: PeriodParser,
    template: ProjectCodeTemplate,
    header_row: usize,
}

impl MpsReporter {
    /// Builds every component up front so a bad config fails here, before
    /// any spreadsheet is touched. `excel_header_row` is 1-based, as a
    /// spreadsheet user would count it.
    pub fn new(
        config: &ReportConfig,
        excel_header_row: usize,
        project_code_template: &str,
    ) -> Result<Self> {
        if excel_header_row < 1 {
            return Err(ReportError::Configuration(
                "excel_header_row is 1-based and must be at least 1".to_string(),
            ));
        }

        let reporter = Self {
            categories: CategoryMapping::from_config(config)?,
            rates: ExchangeRateTable::from_config(config)?,
            companies: CompanyDirectory::from_config(config)?,
            periods: PeriodParser::new(),
            template: ProjectCodeTemplate::new(project_code_template)?,
            header_row: excel_header_row,
        };

        debug!(
            "Reporter ready: {} companies, header row {}",
            reporter.companies.len(),
            reporter.header_row
        );
        Ok(reporter)
    }

    /// Restricts or widens the years the period parser will accept.
    pub fn with_year_range(mut self, years: RangeInclusive<i32>) -> Self {
        self.periods = self.periods.with_year_range(years);
        self
    }

    /// Normalizes a single recognized report. Callers batching whole
    /// folders usually want [`MpsReporter::build_ledger`] instead.
    pub fn normalize(&self, sheet: &RawSheet) -> Result<NormalizedReport> {
        self.normalizer().normalize(sheet)
    }

    /// Runs the full pipeline over a batch of sheets. Sheets that are not
    /// profit and loss reports are skipped with a warning; any error in a
    /// recognized sheet aborts the run, because a ledger missing a
    /// company's costs is worse than no ledger.
    pub fn build_ledger(&self, sheets: &[RawSheet]) -> Result<Ledger> {
        let mut reports = Vec::new();
        for sheet in sheets {
            if !sheet.is_profit_and_loss() {
                warn!(
                    "Ignoring \"{}\", format does not match profit and loss report",
                    sheet.name
                );
                continue;
            }
            reports.push(self.normalize(sheet)?);
        }

        info!(
            "Merging {} of {} sheets into the ledger",
            reports.len(),
            sheets.len()
        );
        Ok(merge_reports(&reports))
    }

    fn normalizer(&self) -> ReportNormalizer<'_> {
        ReportNormalizer::new(
            &self.categories,
            &self.rates,
            &self.companies,
            &self.periods,
            &self.template,
            self.header_row,
        )
    }
}

/// Convenience entry point using the stock header row and project code
/// template.
pub fn build_mps_report(config: &ReportConfig, sheets: &[RawSheet]) -> Result<Ledger> {
    let reporter = MpsReporter::new(config, DEFAULT_EXCEL_HEADER_ROW, DEFAULT_PROJECT_CODE_TEMPLATE)?;
    reporter.build_ledger(sheets)
}
