//! Unified error handling for the rankwatch crate
//!
//! This module provides a unified error type that consolidates all domain-specific
//! errors into a single `Error` enum, while keeping the domain-specific errors
//! usable on their own.
//!
//! # Architecture
//!
//! - [`RankErrorTrait`] - Category lookup used when mapping errors to responses
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Unified error enum wrapping all domain-specific errors

use std::io;
use thiserror::Error;

pub use crate::utils::error::{ExtractError, IntakeError};

/// Common trait for rankwatch error types
pub trait RankErrorTrait: std::error::Error {
    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Result page extraction errors
    Parsing,
    /// Rejected submissions
    Intake,
    /// Storage and I/O errors
    Storage,
    /// Configuration and validation errors
    Config,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Parsing => "parsing",
            Self::Intake => "intake",
            Self::Storage => "storage",
            Self::Config => "config",
            Self::Other => "other",
        }
    }
}

/// Unified error type for the rankwatch crate
#[derive(Error, Debug)]
pub enum Error {
    /// Submission rejected at intake
    #[error("Intake error: {0}")]
    Intake(#[from] IntakeError),

    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}")]
    Other {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl RankErrorTrait for Error {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::Json(_) => ErrorCategory::Parsing,
            Self::Intake(_) => ErrorCategory::Intake,
            Self::Database(_) | Self::Io(_) => ErrorCategory::Storage,
            Self::Config(_) => ErrorCategory::Config,
            Self::Other { .. } => ErrorCategory::Other,
        }
    }
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generic error with context
    pub fn other(context: impl Into<String>) -> Self {
        Self::Other {
            context: context.into(),
            source: None,
        }
    }

    /// Create a generic error with context and source
    pub fn with_source(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Other {
            context: context.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category() {
        let intake_err = Error::Intake(IntakeError::EmptyText);
        assert_eq!(intake_err.category(), ErrorCategory::Intake);

        let io_err = Error::Io(io::Error::new(io::ErrorKind::TimedOut, "slow disk"));
        assert_eq!(io_err.category(), ErrorCategory::Storage);

        let json_err: Error = serde_json::from_str::<u32>("x").unwrap_err().into();
        assert_eq!(json_err.category(), ErrorCategory::Parsing);
    }

    #[test]
    fn test_error_conversion() {
        let unified: Error = IntakeError::MissingField("url").into();
        assert!(matches!(unified, Error::Intake(_)));
        assert_eq!(unified.to_string(), "Intake error: Missing required field: url");
    }

    #[test]
    fn test_config_error() {
        let err = Error::config("cycle_secs must be positive");
        assert_eq!(err.category(), ErrorCategory::Config);
    }

    #[test]
    fn test_other_error() {
        let err = Error::other("Something went wrong");
        assert_eq!(err.category(), ErrorCategory::Other);
        assert_eq!(ErrorCategory::Other.as_str(), "other");
    }
}
