//! Chunk module - the atomic unit handed to extraction

use crate::{ChunkType, DocumentContext};
use serde::{Deserialize, Serialize};

/// Position and provenance of a chunk within its document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkMetadata {
    /// Global index across all sections, in document order
    pub chunk_index: usize,
    /// Number of chunks produced for the document
    pub total_chunks: usize,
    /// Heading of the section this chunk came from
    pub parent_section: String,
    /// Content starts with text carried over from the previous chunk
    pub has_overlap: bool,
    /// The carried-over text, empty when `has_overlap` is false
    pub overlap_text: String,
    /// Chunk ends on a sentence boundary (false only for hard-wrapped sentences)
    pub semantic_boundary: bool,
}

/// A bounded unit of document text prepared for downstream extraction
///
/// Token count never exceeds the configured budget unless the chunk is
/// intact (tables, charts and metric sections are never split).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    /// Chunk text
    pub content: String,
    /// Type inherited from the parent section
    pub chunk_type: ChunkType,
    /// Estimated token count (one token per four characters, rounded up)
    pub token_count: usize,
    /// Parent section contains a table
    pub has_table: bool,
    /// Parent section contains a chart
    pub has_chart: bool,
    /// Metric strings detected in the parent section
    pub financial_metrics: Vec<String>,
    /// The section was kept whole rather than split
    pub intact: bool,
    /// Document-level context
    pub context: DocumentContext,
    /// Position metadata
    pub metadata: ChunkMetadata,
}
