use std::ops::RangeInclusive;

use chrono::{Datelike, Days, NaiveDate};
use regex::{Captures, Regex};

use crate::error::{ReportError, Result};

/// Years accepted in report periods unless a caller widens them. Finance
/// exports only carry dates in this window, so anything outside it is
/// treated as garbage rather than a date.
pub const DEFAULT_YEAR_RANGE: RangeInclusive<i32> = 2020..=2099;

/// The period-text layouts the finance system is known to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodDialect {
    /// "1-31 August, 2022"
    DayRangeFirst,
    /// "August 1-31, 2022"
    MonthFirst,
    /// "August 2022"
    MonthOnly,
}

/// A fully resolved reporting period: the terminal date of the covered
/// range plus the text it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportPeriod {
    pub date: NaiveDate,
    pub raw: String,
    pub dialect: PeriodDialect,
}

impl ReportPeriod {
    pub fn year(&self) -> i32 {
        self.date.year()
    }

    /// Full English month name, which is how the exchange-rate table keys
    /// its months.
    pub fn month_name(&self) -> String {
        self.date.format("%B").to_string()
    }

    /// Ledger rendering of the period date.
    pub fn formatted(&self) -> String {
        self.date.format("%d/%m/%Y").to_string()
    }
}

/// Parses period text against the known dialects. Dialects are tried in
/// order and the first structural match wins; a match that then fails to
/// resolve (year out of range, unknown month, impossible day) is an error,
/// never a fall-through to the next dialect.
#[derive(Debug)]
pub struct PeriodParser {
    dialects: Vec<(PeriodDialect, Regex)>,
    year_range: RangeInclusive<i32>,
}

impl PeriodParser {
    pub fn new() -> Self {
        let dialects = vec![
            (
                PeriodDialect::DayRangeFirst,
                Regex::new(r"^[1-9]+-(?P<end>[0-9]+) (?P<month>[a-zA-Z]+), (?P<year>[0-9]{4})$")
                    .expect("day-range dialect pattern"),
            ),
            (
                PeriodDialect::MonthFirst,
                Regex::new(r"^(?P<month>[a-zA-Z]+) [1-9]+-(?P<end>[0-9]+), (?P<year>[0-9]{4})$")
                    .expect("month-first dialect pattern"),
            ),
            (
                PeriodDialect::MonthOnly,
                Regex::new(r"^(?P<month>[a-zA-Z]+) (?P<year>[0-9]{4})$")
                    .expect("month-only dialect pattern"),
            ),
        ];
        Self {
            dialects,
            year_range: DEFAULT_YEAR_RANGE,
        }
    }

    /// Widens (or narrows) the accepted year window.
    pub fn with_year_range(mut self, year_range: RangeInclusive<i32>) -> Self {
        self.year_range = year_range;
        self
    }

    pub fn parse(&self, text: &str) -> Result<ReportPeriod> {
        let trimmed = text.trim();
        for (dialect, regex) in &self.dialects {
            if let Some(captures) = regex.captures(trimmed) {
                return self.resolve(*dialect, &captures, trimmed);
            }
        }
        Err(ReportError::UnrecognizedDateFormat(text.to_string()))
    }

    fn resolve(
        &self,
        dialect: PeriodDialect,
        captures: &Captures<'_>,
        raw: &str,
    ) -> Result<ReportPeriod> {
        let unrecognized = || ReportError::UnrecognizedDateFormat(raw.to_string());

        let year: i32 = captures["year"].parse().map_err(|_| unrecognized())?;
        if !self.year_range.contains(&year) {
            return Err(unrecognized());
        }

        let month = &captures["month"];
        let date = match captures.name("end") {
            // Ranged periods resolve to their ending day.
            Some(end) => {
                let candidate = format!("{} {} {}", end.as_str(), month, year);
                NaiveDate::parse_from_str(&candidate, "%d %B %Y").map_err(|_| unrecognized())?
            }
            // A bare month resolves to its last day.
            None => {
                let candidate = format!("1 {} {}", month, year);
                let first = NaiveDate::parse_from_str(&candidate, "%d %B %Y")
                    .map_err(|_| unrecognized())?;
                last_day_of_month(first.year(), first.month())
            }
        };

        Ok(ReportPeriod {
            date,
            raw: raw.to_string(),
            dialect,
        })
    }
}

impl Default for PeriodParser {
    fn default() -> Self {
        Self::new()
    }
}

pub fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let next_month = if month == 12 { 1 } else { month + 1 };
    let next_year = if month == 12 { year + 1 } else { year };

    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .unwrap()
        .checked_sub_days(Days::new(1))
        .unwrap()
}
