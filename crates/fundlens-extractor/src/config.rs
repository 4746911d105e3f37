//! Configuration for extraction and the document pipeline

use fundlens_chunker::ChunkingConfig;
use fundlens_domain::ScoringWeights;
use fundlens_validator::ValidationPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the RobustExtractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Cross-check every regex hit with an LLM validation prompt
    pub llm_validation: bool,

    /// Characters of document text included in LLM prompts
    pub excerpt_chars: usize,

    /// Maximum time for a single LLM call (seconds)
    pub llm_timeout_secs: u64,

    /// Extra attempts after a failed LLM call
    pub max_retries: u32,
}

impl ExtractorConfig {
    /// Get the LLM timeout as a Duration
    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.excerpt_chars == 0 {
            return Err("excerpt_chars must be greater than 0".to_string());
        }
        if self.llm_timeout_secs == 0 {
            return Err("llm_timeout_secs must be greater than 0".to_string());
        }
        if self.max_retries > 10 {
            return Err("max_retries cannot exceed 10".to_string());
        }
        Ok(())
    }

    /// Regex-only preset: no LLM cross-checks, no retries
    pub fn regex_only() -> Self {
        Self {
            llm_validation: false,
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Thorough preset: larger excerpts, longer timeouts and two retries
    pub fn thorough() -> Self {
        Self {
            llm_validation: true,
            excerpt_chars: 4000,
            llm_timeout_secs: 300,
            max_retries: 2,
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

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            llm_validation: true,
            excerpt_chars: 2000,
            llm_timeout_secs: 120,
            max_retries: 0,
        }
    }
}

/// Configuration for a whole DocumentPipeline run
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Chunking settings
    pub chunking: ChunkingConfig,
    /// Robust extraction settings
    pub extractor: ExtractorConfig,
    /// Validation weights and tolerances
    pub validation: ValidationPolicy,
    /// Confidence blend weights
    pub scoring: ScoringWeights,
}

impl PipelineConfig {
    /// Validate every section
    pub fn validate(&self) -> Result<(), String> {
        self.chunking.validate().map_err(|e| format!("chunking: {}", e))?;
        self.extractor.validate().map_err(|e| format!("extractor: {}", e))?;
        self.validation.validate().map_err(|e| format!("validation: {}", e))?;
        self.scoring.validate().map_err(|e| format!("scoring: {}", e))?;
        Ok(())
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DocumentPipeline;

    #[test]
    fn test_presets_are_valid() {
        assert!(ExtractorConfig::default().validate().is_ok());
        assert!(ExtractorConfig::regex_only().validate().is_ok());
        assert!(ExtractorConfig::thorough().validate().is_ok());
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_default_excerpt_is_2000_chars() {
        assert_eq!(ExtractorConfig::default().excerpt_chars, 2000);
        assert!(!ExtractorConfig::regex_only().llm_validation);
    }

    #[test]
    fn test_invalid_timeout() {
        let config = ExtractorConfig {
            llm_timeout_secs: 0,
            ..ExtractorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_pipeline_validate_names_section() {
        let mut config = PipelineConfig::default();
        config.chunking.max_tokens = 0;
        let err = config.validate().unwrap_err();
        assert!(err.starts_with("chunking:"));
    }

    #[test]
    fn test_negative_scoring_weight_rejected() {
        let config = PipelineConfig::from_toml("[scoring]\nfinancial = -2.0\n").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.starts_with("scoring:"));
        assert!(DocumentPipeline::regex_only(config).is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = PipelineConfig {
            extractor: ExtractorConfig::thorough(),
            ..PipelineConfig::default()
        };
        let toml_str = config.to_toml().unwrap();
        let parsed = PipelineConfig::from_toml(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed = PipelineConfig::from_toml("[extractor]\nmax_retries = 3\n").unwrap();
        assert_eq!(parsed.extractor.max_retries, 3);
        assert_eq!(parsed.extractor.excerpt_chars, 2000);
        assert_eq!(parsed.chunking, ChunkingConfig::default());
    }
}
