//! Error kinds surfaced by a comparison run

use serde::Serialize;
use thiserror::Error;

/// Message shown when the form is submitted without both papers and a key
pub const MISSING_INPUTS_MESSAGE: &str =
    "Please upload both PDFs and enter your OpenAI API key.";

/// Every failure a comparison can end with.
///
/// The `Display` output is the original message text, so the boundary can
/// show it to the user unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComparisonError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Extraction(String),

    #[error("{0}")]
    RemoteCall(String),

    #[error("{0}")]
    Rendering(String),
}

/// Error kind without the message, for logging and response codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Extraction,
    RemoteCall,
    Rendering,
}

impl ComparisonError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ComparisonError::Validation(_) => ErrorKind::Validation,
            ComparisonError::Extraction(_) => ErrorKind::Extraction,
            ComparisonError::RemoteCall(_) => ErrorKind::RemoteCall,
            ComparisonError::Rendering(_) => ErrorKind::Rendering,
        }
    }

    /// Text shown to the user.
    ///
    /// Validation messages are shown as-is; anything that failed while the
    /// run was in progress is prefixed with `Error: `.
    pub fn user_message(&self) -> String {
        match self {
            ComparisonError::Validation(msg) => msg.clone(),
            other => format!("Error: {}", other),
        }
    }

    pub(crate) fn missing_inputs() -> Self {
        ComparisonError::Validation(MISSING_INPUTS_MESSAGE.to_string())
    }
}

impl From<reqwest::Error> for ComparisonError {
    fn from(err: reqwest::Error) -> Self {
        ComparisonError::RemoteCall(err.to_string())
    }
}

impl From<image::ImageError> for ComparisonError {
    fn from(err: image::ImageError) -> Self {
        ComparisonError::Rendering(err.to_string())
    }
}

impl From<zip::result::ZipError> for ComparisonError {
    fn from(err: zip::result::ZipError) -> Self {
        ComparisonError::Rendering(format!("Failed to write report: {}", err))
    }
}
