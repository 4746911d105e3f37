//! Validator error types

use thiserror::Error;

/// Errors that can occur while setting up validation
#[derive(Error, Debug)]
pub enum ValidatorError {
    /// Policy failed validation or could not be parsed
    #[error("Configuration error: {0}")]
    Config(String),
}
