use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error(
        "Filter column '{key}' not found. Available columns are: {}",
        .available.join(", ")
    )]
    UnknownFilterColumn { key: String, available: Vec<String> },

    #[error("Render error: {0}")]
    Render(String),
}

impl Error {
    /// Schema errors are user input problems and are shown verbatim; anything
    /// else is an unexpected failure.
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            Error::MissingColumns(_) | Error::UnknownFilterColumn { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
