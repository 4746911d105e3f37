//! Error types for the Chunker

use thiserror::Error;

/// Errors that can occur while setting up chunking
///
/// Chunking itself never fails; only an invalid configuration is rejected.
#[derive(Error, Debug)]
pub enum ChunkerError {
    /// Configuration failed validation
    #[error("Invalid chunking configuration: {0}")]
    InvalidConfig(String),
}
