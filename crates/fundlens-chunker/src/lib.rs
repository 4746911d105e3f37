//! Fundlens Chunker
//!
//! Turns a markdown fund report into bounded chunks for extraction.
//!
//! # Architecture
//!
//! ```text
//! Markdown → DocumentStructureParser → Sections → SemanticChunker → Chunks
//! ```
//!
//! Sections holding tables, charts or metric prose are kept whole so a
//! financial table is never cut mid-row. Everything else is packed into
//! sentence-aligned chunks under a token budget, each seeded with a few words
//! of the previous chunk.
//!
//! # Example Usage
//!
//! ```
//! use fundlens_chunker::{ChunkingConfig, DocumentMetadata, SemanticChunker};
//!
//! let chunker = SemanticChunker::new(ChunkingConfig::default()).unwrap();
//! let chunks = chunker.chunk_document(
//!     "## Fund Size\nTotal commitments: 50,000 kEUR",
//!     &DocumentMetadata::default(),
//! );
//! assert_eq!(chunks.len(), 1);
//! assert_eq!(chunks[0].metadata.parent_section, "Fund Size");
//! ```

#![warn(missing_docs)]

mod chunker;
mod config;
mod error;
mod parser;
mod patterns;
mod text;

pub use chunker::{merge_context, DocumentMetadata, SemanticChunker};
pub use config::ChunkingConfig;
pub use error::ChunkerError;
pub use parser::{classify, extract_document_context, DocumentStructureParser, ParsedDocument};
pub use text::{estimate_tokens, split_sentences};
