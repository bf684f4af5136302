/// Marker text identifying the one report layout this crate understands.
/// Compared case-insensitively against the cell below the company name.
pub const PROFIT_AND_LOSS_TITLE: &str = "profit and loss";

/// A single spreadsheet cell, reduced to the three shapes the report
/// layout actually uses.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    /// Trimmed text content. Numbers render as text so headers typed as
    /// numerics still participate; blank cells yield `None`.
    pub fn text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            Cell::Number(n) => Some(n.to_string()),
        }
    }

    /// Numeric value with spreadsheet-import coercion: numeric text counts,
    /// everything else is zero.
    pub fn number_or_zero(&self) -> f64 {
        match self {
            Cell::Number(n) => *n,
            Cell::Text(s) => s.trim().parse().unwrap_or(0.0),
            Cell::Empty => 0.0,
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

/// The metadata block every recognized report carries in its first three
/// rows: company name, report type, and the period text.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetHeader {
    pub company: String,
    pub report_type: String,
    pub period_text: String,
}

/// An untyped worksheet grid plus the name it was read from. The name only
/// feeds log lines and error messages.
#[derive(Debug, Clone)]
pub struct RawSheet {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

impl RawSheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// Trimmed text of the cell at (row, col), if the cell exists and has
    /// any content.
    pub fn text_at(&self, row: usize, col: usize) -> Option<String> {
        self.rows.get(row)?.get(col)?.text()
    }

    /// True when the cell below the company name reads "profit and loss",
    /// ignoring case and surrounding whitespace. Anything else is some
    /// other export that ended up in the drop folder.
    pub fn is_profit_and_loss(&self) -> bool {
        self.text_at(1, 0)
            .map(|t| t.to_lowercase() == PROFIT_AND_LOSS_TITLE)
            .unwrap_or(false)
    }

    /// The three metadata cells. Missing cells come back empty rather than
    /// failing here; downstream parsing reports the real problem.
    pub fn header(&self) -> SheetHeader {
        SheetHeader {
            company: self.text_at(0, 0).unwrap_or_default(),
            report_type: self.text_at(1, 0).unwrap_or_default().to_lowercase(),
            period_text: self.text_at(2, 0).unwrap_or_default(),
        }
    }
}
