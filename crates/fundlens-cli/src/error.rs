//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Chunker error
    #[error("Chunker error: {0}")]
    Chunker(#[from] fundlens_chunker::ChunkerError),

    /// Extractor error
    #[error("Extractor error: {0}")]
    Extractor(#[from] fundlens_extractor::ExtractorError),

    /// Validator error
    #[error("Validator error: {0}")]
    Validator(#[from] fundlens_validator::ValidatorError),

    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(#[from] fundlens_llm::LlmError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
