//! FundLens Extractor
//!
//! Turns fund report text into structured fund metrics.
//!
//! # Overview
//!
//! Extraction runs at two levels. [`RobustExtractor`] pulls individual fields
//! out of the full text, trying a field's regex patterns first and falling
//! back to an LLM when they miss. [`FieldExtractor`] is a keyword heuristic
//! over chunks that fills whatever the robust pass could not find.
//!
//! [`DocumentPipeline`] ties the stages together:
//!
//! ```text
//! Text → SemanticChunker → FieldExtractor ─┐
//!      └──────────────→ RobustExtractor ───┴→ FundMetrics → DataValidator → ConfidenceScore
//! ```
//!
//! Progress can be published to per-user subscribers through a
//! [`StatusRegistry`].
//!
//! # Example Usage
//!
//! ```
//! use fundlens_extractor::{DocumentPipeline, DocumentRequest, PipelineConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let runtime = tokio::runtime::Runtime::new()?;
//! let pipeline = DocumentPipeline::regex_only(PipelineConfig::default())?;
//!
//! let request = DocumentRequest::new("Total commitments: 50,000 kEUR\nTVPI: 1.8x");
//! let output = runtime.block_on(pipeline.process(&request));
//!
//! assert_eq!(output.fund_metrics.fund_size, Some(50000.0));
//! assert_eq!(output.fund_metrics.tvpi, Some(1.8));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod fields;
mod heuristic;
mod parser;
mod pipeline;
mod prompt;
mod robust;
mod status;

pub use config::{ExtractorConfig, PipelineConfig};
pub use error::ExtractorError;
pub use fields::{
    field_config, fields_for_document_type, vc_fund_field_configs, FieldConfig, FieldType,
    ValidationRules,
};
pub use heuristic::FieldExtractor;
pub use parser::{parse_extraction_response, parse_validation_response, LlmValidation};
pub use pipeline::{merge_fields, DocumentPipeline, DocumentRequest, PipelineOutput};
pub use prompt::{PromptBuilder, NOT_FOUND, VALIDATION_SCHEMA};
pub use robust::{NoLlm, RobustExtractor};
pub use status::{StatusEvent, StatusRegistry, Subscription, SubscriptionId};
