//! Error types for the macro_cycle crate

use crate::source::SourceError;
use cycle_math::MathError;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Custom error types for the macro_cycle crate
#[derive(Debug, Error)]
pub enum MacroError {
    /// Alignment or composite construction left too few periods
    #[error("Insufficient history for '{series}': need {required} periods, have {available}")]
    InsufficientHistory {
        series: String,
        required: usize,
        available: usize,
    },

    /// Every candidate model failed to fit or produced non-finite predictions
    #[error("No viable model for '{series}': {}", .reasons.join("; "))]
    NoViableModel { series: String, reasons: Vec<String> },

    /// Missing constituent, violated weight invariant or too little overlap
    #[error("Composite index error ({index}): {reason}")]
    CompositeIndex { index: String, reason: String },

    /// Failure reported by the Series Source collaborator
    #[error("Series source failed for '{series}': {source}")]
    Source {
        series: String,
        #[source]
        source: SourceError,
    },

    /// Malformed raw series (duplicate dates, non-finite values)
    #[error("Invalid series: {0}")]
    InvalidSeries(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A single candidate model could not be fitted
    #[error("Model fit error: {0}")]
    ModelFit(String),

    /// Configuration could not be parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from CSV parsing
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error from numerical routines
    #[error("Math error: {0}")]
    Math(#[from] MathError),
}

/// Failure kinds surfaced to the Report Sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    InsufficientHistory,
    NoViableModel,
    CompositeIndex,
    SourceUnavailable,
    InvalidInput,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InsufficientHistory => "InsufficientHistoryError",
            ErrorKind::NoViableModel => "NoViableModelError",
            ErrorKind::CompositeIndex => "CompositeIndexError",
            ErrorKind::SourceUnavailable => "SourceUnavailableError",
            ErrorKind::InvalidInput => "InvalidInputError",
        };
        f.write_str(name)
    }
}

impl MacroError {
    /// Classify this error into the reporting taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            MacroError::InsufficientHistory { .. } => ErrorKind::InsufficientHistory,
            MacroError::NoViableModel { .. } | MacroError::ModelFit(_) => {
                ErrorKind::NoViableModel
            }
            MacroError::CompositeIndex { .. } => ErrorKind::CompositeIndex,
            MacroError::Source { .. } | MacroError::IoError(_) => ErrorKind::SourceUnavailable,
            MacroError::InvalidSeries(_)
            | MacroError::InvalidParameter(_)
            | MacroError::Config(_)
            | MacroError::Csv(_)
            | MacroError::Math(_) => ErrorKind::InvalidInput,
        }
    }

    pub(crate) fn composite(index: impl fmt::Display, reason: impl Into<String>) -> Self {
        MacroError::CompositeIndex {
            index: index.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, MacroError>;

impl From<toml::de::Error> for MacroError {
    fn from(err: toml::de::Error) -> Self {
        MacroError::Config(err.to_string())
    }
}
