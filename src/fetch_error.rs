use crate::period::ConfigError;

/// Failure of a single request against the sheet source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("Sheet not found ({status}): {message}")]
    NotFound { status: u16, message: String },
    #[error("Access denied ({status}): {message}")]
    Denied { status: u16, message: String },
    #[error("Failed to decode response body: {0}")]
    InvalidBody(String),
}

impl SourceError {
    /// Whether another attempt may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            SourceError::Request(e) => !(e.is_decode() || e.is_builder()),
            SourceError::Server { .. } => true,
            SourceError::NotFound { .. }
            | SourceError::Denied { .. }
            | SourceError::InvalidBody(_) => false,
        }
    }
}

/// Failure of a period fetch as seen by callers.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Source unavailable for sheet '{sheet}' after {attempts} attempt(s): {source}")]
    SourceUnavailable {
        sheet: String,
        attempts: usize,
        source: SourceError,
    },
    #[error("Sheet '{sheet}' not found or not accessible: {source}")]
    SourceNotFound { sheet: String, source: SourceError },
    #[error("Invalid response for sheet '{sheet}': {source}")]
    InvalidResponse { sheet: String, source: SourceError },
}

impl FetchError {
    /// Classify the last transport error once retrying has stopped.
    pub fn from_source(sheet: &str, attempts: usize, err: SourceError) -> Self {
        let sheet = sheet.to_string();
        match err {
            SourceError::NotFound { .. } | SourceError::Denied { .. } => {
                FetchError::SourceNotFound { sheet, source: err }
            }
            SourceError::InvalidBody(_) => FetchError::InvalidResponse { sheet, source: err },
            SourceError::Request(ref e) if e.is_decode() => {
                FetchError::InvalidResponse { sheet, source: err }
            }
            _ => FetchError::SourceUnavailable {
                sheet,
                attempts,
                source: err,
            },
        }
    }
}
