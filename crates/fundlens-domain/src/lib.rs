//! Fundlens Domain Layer
//!
//! Value objects shared by every stage of the fund-document pipeline, plus
//! the scoring functions that turn extracted values into confidence numbers.
//!
//! ## Key Concepts
//!
//! - **Section**: a heading-delimited span of a markdown document
//! - **Chunk**: the bounded unit handed to extraction
//! - **ExtractionResult**: one field's value, confidence and provenance
//! - **ValidationReport**: consistency errors and warnings over fund metrics
//! - **ConfidenceScore**: weighted blend of financial, portfolio and data-quality scores
//!
//! Nothing in this crate performs I/O. The LLM boundary is expressed as the
//! [`LlmProvider`] trait and implemented elsewhere.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chunk;
pub mod document;
pub mod extraction;
pub mod extraction_confidence;
pub mod metrics;
pub mod scoring;
pub mod section;
pub mod traits;
pub mod validation;

// Re-exports for convenience
pub use chunk::{Chunk, ChunkMetadata};
pub use document::{DocumentContext, DocumentId, DocumentType};
pub use extraction::{ExtractionMethod, ExtractionResult, FieldValidation, FieldValue};
pub use extraction_confidence::{ExtractionConfidence, QualityTier};
pub use metrics::{FundMetrics, PortfolioCompany};
pub use scoring::{calculate_confidence_score, ConfidenceScore, ScoringWeights};
pub use section::{ChunkType, Section};
pub use traits::LlmProvider;
pub use validation::{Severity, ValidationError, ValidationReport, ValidationWarning};
