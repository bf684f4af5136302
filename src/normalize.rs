use log::{debug, info};
use regex::Regex;

use crate::categories::CategoryMapping;
use crate::classify::{classify, ProjectColumn, ProjectTable};
use crate::error::{ReportError, Result};
use crate::period::{PeriodParser, ReportPeriod};
use crate::rates::{CompanyDirectory, ExchangeRateTable};
use crate::sheet::{Cell, RawSheet};

/// The pattern splitting a project column header like "NMAP101 Coastal
/// Survey" into its code and name. Must carry exactly one capture group
/// isolating the code.
#[derive(Debug, Clone)]
pub struct ProjectCodeTemplate {
    pattern: Regex,
}

impl ProjectCodeTemplate {
    pub fn new(pattern: &str) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|e| {
            ReportError::Configuration(format!("Invalid project code template: {}", e))
        })?;
        // captures_len counts the implicit whole-match group.
        if pattern.captures_len() != 2 {
            return Err(ReportError::Configuration(format!(
                "Project code template must have exactly one capture group: \"{}\"",
                pattern.as_str()
            )));
        }
        Ok(Self { pattern })
    }

    /// Whether a column header carries a project code at all. Headers that
    /// fail this are subtotal or spacing columns.
    pub fn is_match(&self, header: &str) -> bool {
        self.pattern.is_match(header)
    }

    /// Splits a header into (code, name): the capture is the code and the
    /// rest of the header, minus leading whitespace, is the name.
    pub fn split(&self, header: &str) -> Result<(String, String)> {
        let no_code = || {
            ReportError::Configuration(format!(
                "Project header \"{}\" does not contain a project code",
                header
            ))
        };

        let captures = self.pattern.captures(header).ok_or_else(no_code)?;
        let code = captures.get(1).ok_or_else(no_code)?;
        let matched = captures.get(0).ok_or_else(no_code)?;

        let name = format!("{}{}", &header[..matched.start()], &header[matched.end()..]);
        Ok((code.as_str().to_string(), name.trim_start().to_string()))
    }
}

/// One report reduced to canonical form: category-summed, currency-converted
/// rows plus the metadata the merge keys on.
#[derive(Debug, Clone)]
pub struct NormalizedReport {
    pub company: String,
    pub period: ReportPeriod,
    pub source_currency: String,
    pub reporting_currency: String,
    /// The rate this report's values were scaled by.
    pub conversion_rate: f64,
    /// (pair name, rate) for every non-identity directory pair this period,
    /// in audit-pair order. Attached to every row for traceability.
    pub audit_rates: Vec<(String, f64)>,
    /// Sorted category codes; row values run parallel to this.
    pub categories: Vec<String>,
    pub rows: Vec<NormalizedRow>,
}

#[derive(Debug, Clone)]
pub struct NormalizedRow {
    pub project_code: String,
    pub project_name: String,
    pub values: Vec<f64>,
}

/// Turns one validated sheet into a `NormalizedReport`. Borrows the
/// run-wide components so one set of compiled patterns and lookups serves
/// every file in a run.
pub struct ReportNormalizer<'a> {
    categories: &'a CategoryMapping,
    rates: &'a ExchangeRateTable,
    companies: &'a CompanyDirectory,
    periods: &'a PeriodParser,
    template: &'a ProjectCodeTemplate,
    header_row: usize,
}

impl<'a> ReportNormalizer<'a> {
    /// `header_row` is the 1-based spreadsheet row holding the project
    /// column headers.
    pub fn new(
        categories: &'a CategoryMapping,
        rates: &'a ExchangeRateTable,
        companies: &'a CompanyDirectory,
        periods: &'a PeriodParser,
        template: &'a ProjectCodeTemplate,
        header_row: usize,
    ) -> Self {
        Self {
            categories,
            rates,
            companies,
            periods,
            template,
            header_row,
        }
    }

    pub fn normalize(&self, sheet: &RawSheet) -> Result<NormalizedReport> {
        // The pipeline has already filtered on the title, but normalize is
        // public; re-check so a direct caller gets an error, not garbage.
        if !sheet.is_profit_and_loss() {
            return Err(ReportError::NotAProfitAndLoss(sheet.name.clone()));
        }

        let header = sheet.header();
        let period = self.periods.parse(&header.period_text)?;

        let table = self.project_table(sheet);
        debug!(
            "Sheet \"{}\": {} project columns, {} line items",
            sheet.name,
            table.projects.len(),
            table.labels.len()
        );

        let classified = classify(&table, self.categories)?;

        let pair = self.companies.conversion_pair(&header.company)?;
        let month = period.month_name();
        let rate = self.rates.rate(pair, period.year(), &month)?;

        let mut audit_rates = Vec::new();
        for audit_pair in self.companies.audit_pairs() {
            let audit_rate = self.rates.rate(&audit_pair, period.year(), &month)?;
            audit_rates.push((audit_pair.to_string(), audit_rate));
        }

        let mut rows = Vec::with_capacity(classified.projects.len());
        for project in &classified.projects {
            let (project_code, project_name) = self.template.split(&project.header)?;
            rows.push(NormalizedRow {
                project_code,
                project_name,
                values: project.values.iter().map(|value| value * rate).collect(),
            });
        }

        info!(
            "Parsed {} {} {} using exchange rate {}",
            header.company,
            header.report_type,
            period.formatted(),
            rate
        );

        Ok(NormalizedReport {
            company: header.company,
            period,
            source_currency: pair.source.clone(),
            reporting_currency: pair.target.clone(),
            conversion_rate: rate,
            audit_rates,
            categories: classified.categories,
            rows,
        })
    }

    /// Carves the data region out of the sheet: project columns are the
    /// header-row cells matching the code template, labels come from the
    /// first column, and the final row (a generation timestamp) is dropped.
    fn project_table(&self, sheet: &RawSheet) -> ProjectTable {
        let header_index = self.header_row.saturating_sub(1);

        let header_cells: &[Cell] = sheet
            .rows
            .get(header_index)
            .map(|row| row.as_slice())
            .unwrap_or(&[]);

        let mut columns: Vec<(usize, String)> = Vec::new();
        for (index, cell) in header_cells.iter().enumerate().skip(1) {
            if let Some(text) = cell.text() {
                if self.template.is_match(&text) {
                    columns.push((index, text));
                }
            }
        }

        let data_start = header_index + 1;
        let data_end = sheet.rows.len().saturating_sub(1);
        let data_rows: &[Vec<Cell>] = if data_start < data_end {
            &sheet.rows[data_start..data_end]
        } else {
            &[]
        };

        let labels: Vec<String> = data_rows
            .iter()
            .map(|row| {
                row.first()
                    .and_then(|cell| cell.text())
                    .map(|text| text.to_lowercase())
                    .unwrap_or_default()
            })
            .collect();

        let projects = columns
            .into_iter()
            .map(|(index, header)| ProjectColumn {
                header,
                values: data_rows
                    .iter()
                    .map(|row| row.get(index).map(Cell::number_or_zero).unwrap_or(0.0))
                    .collect(),
            })
            .collect();

        ProjectTable { labels, projects }
    }
}
