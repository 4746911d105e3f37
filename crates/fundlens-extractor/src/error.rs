//! Error types for the Extractor

use thiserror::Error;

/// Errors that can occur during extraction
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(String),

    /// LLM call did not finish in time
    #[error("LLM call timed out")]
    Timeout,

    /// Unexpected shape of an LLM response
    #[error("Invalid response format: {0}")]
    InvalidFormat(String),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// No field configuration with this key
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// The status registry task has stopped
    #[error("Status registry is shut down")]
    StatusClosed,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for ExtractorError {
    fn from(e: serde_json::Error) -> Self {
        ExtractorError::JsonParse(e.to_string())
    }
}

impl From<fundlens_chunker::ChunkerError> for ExtractorError {
    fn from(e: fundlens_chunker::ChunkerError) -> Self {
        ExtractorError::Config(e.to_string())
    }
}

impl From<fundlens_validator::ValidatorError> for ExtractorError {
    fn from(e: fundlens_validator::ValidatorError) -> Self {
        ExtractorError::Config(e.to_string())
    }
}
