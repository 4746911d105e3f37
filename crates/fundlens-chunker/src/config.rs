//! Configuration for the SemanticChunker

use serde::{Deserialize, Serialize};

/// Configuration for semantic chunking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Token budget per chunk (one token per four characters)
    pub max_tokens: usize,

    /// Tokens carried over from the previous chunk (about `overlap_tokens / 4` words)
    pub overlap_tokens: usize,

    /// Split on markdown headings; when false the document is one section
    pub preserve_structure: bool,

    /// Never split table, chart or metric sections
    pub financial_data_intact: bool,

    /// Sections shorter than this many characters are kept whole
    pub min_chunk_size: usize,
}

impl ChunkingConfig {
    /// Number of words seeded into the next chunk
    pub fn overlap_words(&self) -> usize {
        self.overlap_tokens / 4
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_tokens == 0 {
            return Err("max_tokens must be greater than 0".to_string());
        }
        if self.overlap_tokens >= self.max_tokens {
            return Err("overlap_tokens must be smaller than max_tokens".to_string());
        }
        Ok(())
    }
}

impl Default for ChunkingConfig {
    /// Default configuration matching the historical pipeline
    fn default() -> Self {
        Self {
            max_tokens: 512,
            overlap_tokens: 50,
            preserve_structure: true,
            financial_data_intact: true,
            min_chunk_size: 100,
        }
    }
}

impl ChunkingConfig {
    /// Fine preset: small chunks for embedding-sized retrieval units
    pub fn fine() -> Self {
        Self {
            max_tokens: 256,
            overlap_tokens: 25,
            ..Self::default()
        }
    }

    /// Coarse preset: large chunks for long-context models
    pub fn coarse() -> Self {
        Self {
            max_tokens: 1024,
            overlap_tokens: 100,
            min_chunk_size: 200,
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
