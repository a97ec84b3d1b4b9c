use thiserror::Error;

pub type ReportResult<T> = Result<T, ReportError>;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("Cannot render a document without columns")]
    EmptyColumnSet,

    #[error("Encoding error: {value:?} contains {character:?}, which the PDF font cannot encode")]
    Encoding { value: String, character: char },

    #[error("Invalid page size: {width} x {height}")]
    InvalidPage { width: f64, height: f64 },

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReportError {
    pub fn missing_column(column: &str) -> Self {
        Self::Schema(format!("column {column:?} not found"))
    }
}
