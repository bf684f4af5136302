use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Found unmapped project cost: \"{0}\". Add this mapping to the config.")]
    UnmappedCategory(String),

    #[error("Could not find \"{marker}\" in cost categories")]
    MissingCategoryBoundary { marker: String },

    #[error("Unrecognised report date format \"{0}\"")]
    UnrecognizedDateFormat(String),

    #[error("No conversion currency defined for company: {0}")]
    UnknownCompany(String),

    #[error("No exchange rate for {pair} in {month} {year}")]
    MissingExchangeRate {
        pair: String,
        year: i32,
        month: String,
    },

    #[error("Exchange rate for {pair} in {month} {year} is not a number: \"{value}\"")]
    InvalidExchangeRate {
        pair: String,
        year: i32,
        month: String,
        value: String,
    },

    #[error("Sheet \"{0}\" is not a profit and loss report")]
    NotAProfitAndLoss(String),

    #[error("Failed to read spreadsheet {path}: {message}")]
    Spreadsheet { path: String, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;
