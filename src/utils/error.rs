use crate::domain::model::Record;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifierError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Spreadsheet read error: {0}")]
    SpreadsheetError(#[from] calamine::Error),

    #[error("Report write error: {0}")]
    ReportError(#[from] rust_xlsxwriter::XlsxError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Archive target already exists: {path}")]
    ArchiveConflict { path: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Output,
    Network,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl NotifierError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            NotifierError::ConfigError { .. }
            | NotifierError::ConfigValidationError { .. }
            | NotifierError::InvalidConfigValueError { .. }
            | NotifierError::MissingConfigError { .. } => ErrorCategory::Configuration,
            NotifierError::SpreadsheetError(_) => ErrorCategory::Input,
            NotifierError::ReportError(_)
            | NotifierError::CsvError(_)
            | NotifierError::ArchiveConflict { .. } => ErrorCategory::Output,
            NotifierError::ApiError(_) => ErrorCategory::Network,
            NotifierError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Input | ErrorCategory::Output | ErrorCategory::Configuration => {
                ErrorSeverity::High
            }
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            NotifierError::MissingConfigError { .. } => {
                "Set the missing value in the config file, the environment or .env"
            }
            NotifierError::ConfigError { .. }
            | NotifierError::ConfigValidationError { .. }
            | NotifierError::InvalidConfigValueError { .. } => {
                "Check the TOML config file and the CLI flags"
            }
            NotifierError::SpreadsheetError(_) => {
                "Make sure the input file is a valid .xlsx/.xls workbook"
            }
            NotifierError::ReportError(_) | NotifierError::CsvError(_) => {
                "Check that the output directory is writable"
            }
            NotifierError::ArchiveConflict { .. } => {
                "Remove the existing file from the processed directory or change archive.on_conflict"
            }
            NotifierError::ApiError(_) => "Check network access and the SendGrid base URL",
            NotifierError::IoError(_) => "Check that the directories exist and are accessible",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Input => format!("Could not read input: {}", self),
            ErrorCategory::Output => format!("Could not write output: {}", self),
            ErrorCategory::Network => format!("Network problem: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, NotifierError>;

/// Source tag with no known onboarding target.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Source inválido: {record}")]
pub struct ResolutionError {
    pub record: Record,
}

/// Outcome of a failed send, surfaced as a row failure and never re-raised.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP Error {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("{0}")]
    Other(String),
}
