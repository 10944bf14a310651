//! Error types shared by the library modules.
use thiserror::Error;

/// Main error type for dashboard operations.
#[derive(Error, Debug)]
pub enum DashError {
    /// HTTP request failed (network error or non-2xx status)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with an error message instead of data
    #[error("world bank api error: {0}")]
    Api(String),

    /// Response body did not have the expected shape
    #[error("unexpected response payload: {0}")]
    Payload(String),

    /// Reading or writing delimited data failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Uploaded table lacks required columns
    #[error(
        "CSV must contain columns: country_code, country_name, indicator, year, value (missing: {})",
        .0.join(", ")
    )]
    MissingColumns(Vec<String>),

    /// Upload is not a delimited text file we accept
    #[error("unsupported file: {0}")]
    UnsupportedFile(String),

    /// Invalid user selection (years, sizes)
    #[error("invalid selection: {0}")]
    Selection(String),

    /// Chart drawing failed
    #[error("failed to render chart: {0}")]
    Render(String),

    /// PDF composition failed
    #[error("failed to compose PDF: {0}")]
    Pdf(String),

    /// Configuration file could not be parsed
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Type alias for Results using DashError
pub type Result<T> = std::result::Result<T, DashError>;
