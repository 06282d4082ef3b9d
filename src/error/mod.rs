//! Error handling for the cohort derivation pipeline.

use std::{fmt, io};

use crate::codelist::CodelistError;

/// Specialized error type for cohort derivation
///
/// Configuration problems (bad code lists, invalid window offsets, invalid
/// interval widths) and data-access problems (malformed event store) are
/// fatal and abort the run before any output is written. Per-patient
/// absence of data is never represented here; it flows through the pipeline
/// as ordinary `None`/`false` values.
#[derive(Debug)]
pub enum CohortError {
    /// Error opening or reading a file
    IoError(io::Error),
    /// Error loading or combining code lists
    CodelistError(CodelistError),
    /// Invalid study configuration (offset ordering, unknown code list, intervals)
    ConfigurationError(String),
    /// Malformed or unavailable event data (e.g. overlapping registration periods)
    DataAccessError(String),
    /// Error writing CSV output
    CsvError(csv::Error),
    /// Error serializing a report
    JsonError(serde_json::Error),
}

impl CohortError {
    /// Create a configuration error with a descriptive message
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::ConfigurationError(msg.into())
    }

    /// Create a data access error with a descriptive message
    pub fn data_access(msg: impl Into<String>) -> Self {
        Self::DataAccessError(msg.into())
    }
}

impl From<io::Error> for CohortError {
    fn from(error: io::Error) -> Self {
        Self::IoError(error)
    }
}

impl From<CodelistError> for CohortError {
    fn from(error: CodelistError) -> Self {
        Self::CodelistError(error)
    }
}

impl From<csv::Error> for CohortError {
    fn from(error: csv::Error) -> Self {
        Self::CsvError(error)
    }
}

impl From<serde_json::Error> for CohortError {
    fn from(error: serde_json::Error) -> Self {
        Self::JsonError(error)
    }
}

impl fmt::Display for CohortError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IoError(e) => write!(f, "IO error: {e}"),
            Self::CodelistError(e) => write!(f, "Code list error: {e}"),
            Self::ConfigurationError(msg) => write!(f, "Configuration error: {msg}"),
            Self::DataAccessError(msg) => write!(f, "Data access error: {msg}"),
            Self::CsvError(e) => write!(f, "CSV error: {e}"),
            Self::JsonError(e) => write!(f, "JSON error: {e}"),
        }
    }
}

impl std::error::Error for CohortError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::IoError(e) => Some(e),
            Self::CodelistError(e) => Some(e),
            Self::CsvError(e) => Some(e),
            Self::JsonError(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type for cohort derivation operations
pub type Result<T> = std::result::Result<T, CohortError>;
