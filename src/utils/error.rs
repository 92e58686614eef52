//! Error types for capture intake and result page extraction
//!
//! This module defines the leaf error types used by the parser and the
//! submission intake.

use thiserror::Error;

/// Errors that can occur while extracting a listing from a result page
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// The engine served a captcha interstitial instead of results
    #[error("Captcha detected")]
    CaptchaDetected,

    /// No result containers and no known marker; markup changed or capture is corrupt
    #[error("Unparseable page structure")]
    UnparseableStructure,
}

/// Errors raised when a submission is rejected at intake
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntakeError {
    /// A required field is missing or blank
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// The captured page text is empty
    #[error("Captured text is empty")]
    EmptyText,

    /// The captured page text is not valid base64
    #[error("Captured text is not valid base64: {0}")]
    InvalidBase64(String),
}
