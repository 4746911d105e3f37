//! Semantic chunking of parsed sections

use crate::config::ChunkingConfig;
use crate::error::ChunkerError;
use crate::parser::DocumentStructureParser;
use crate::text::{estimate_tokens, split_sentences, word_suffix, wrap_words};
use fundlens_domain::{Chunk, ChunkMetadata, DocumentContext, DocumentType, Section};
use tracing::{debug, info};

/// Caller-supplied facts about the document
///
/// Values given here override whatever the parser detects.
#[derive(Debug, Clone, Default)]
pub struct DocumentMetadata {
    /// Document type
    pub document_type: Option<DocumentType>,
    /// Fund name known from upstream (e.g. the upload form)
    pub fund_name: Option<String>,
}

/// A chunk body before document-wide metadata is attached
#[derive(Debug)]
struct Piece {
    content: String,
    overlap: Option<String>,
    semantic_boundary: bool,
}

impl Piece {
    fn new(content: String, overlap: Option<String>) -> Self {
        Self {
            content,
            overlap,
            semantic_boundary: true,
        }
    }
}

/// Splits documents into token-bounded chunks
#[derive(Debug, Clone)]
pub struct SemanticChunker {
    config: ChunkingConfig,
}

impl SemanticChunker {
    /// Create a chunker
    ///
    /// # Errors
    ///
    /// Returns `ChunkerError::InvalidConfig` if the configuration does not validate.
    pub fn new(config: ChunkingConfig) -> Result<Self, ChunkerError> {
        config.validate().map_err(ChunkerError::InvalidConfig)?;
        Ok(Self { config })
    }

    /// Active configuration
    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    /// Chunk a whole document
    ///
    /// Chunk indices run across all sections in document order. Returns an
    /// empty list only for empty (or whitespace-only) input. The output is a
    /// pure function of the input and configuration.
    pub fn chunk_document(&self, content: &str, metadata: &DocumentMetadata) -> Vec<Chunk> {
        let parser = if self.config.preserve_structure {
            DocumentStructureParser::new()
        } else {
            DocumentStructureParser::flat()
        };
        let parsed = parser.parse(content);
        let context = merge_context(parsed.context, metadata);

        let mut chunks = Vec::new();
        for section in &parsed.sections {
            let intact = self.should_keep_intact(section);
            let pieces = if intact {
                vec![Piece::new(section.content.clone(), None)]
            } else {
                self.smart_text_split(&section.content)
            };
            debug!(
                heading = %section.heading,
                section_type = %section.section_type,
                intact,
                pieces = pieces.len(),
                "Chunked section"
            );

            for piece in pieces {
                chunks.push(Chunk {
                    token_count: estimate_tokens(&piece.content),
                    content: piece.content,
                    chunk_type: section.section_type,
                    has_table: section.has_table,
                    has_chart: section.has_chart,
                    financial_metrics: section.financial_metrics.clone(),
                    intact,
                    context: context.clone(),
                    metadata: ChunkMetadata {
                        chunk_index: chunks.len(),
                        total_chunks: 0,
                        parent_section: section.heading.clone(),
                        has_overlap: piece.overlap.is_some(),
                        overlap_text: piece.overlap.unwrap_or_default(),
                        semantic_boundary: piece.semantic_boundary,
                    },
                });
            }
        }

        let total = chunks.len();
        for chunk in &mut chunks {
            chunk.metadata.total_chunks = total;
        }

        info!(
            sections = parsed.sections.len(),
            chunks = total,
            "Chunked document"
        );
        chunks
    }

    /// Whether a section becomes exactly one chunk regardless of length
    pub fn should_keep_intact(&self, section: &Section) -> bool {
        (self.config.financial_data_intact && section.section_type.is_structured())
            || section.content.chars().count() < self.config.min_chunk_size
    }

    /// Pack sentences into chunks under the token budget
    fn smart_text_split(&self, text: &str) -> Vec<Piece> {
        let max_tokens = self.config.max_tokens;
        let overlap_words = self.config.overlap_words();

        let mut pieces = Vec::new();
        let mut current = String::new();
        let mut current_overlap: Option<String> = None;

        for sentence in split_sentences(text) {
            if estimate_tokens(sentence) > max_tokens {
                if !current.is_empty() {
                    pieces.push(Piece::new(std::mem::take(&mut current), current_overlap.take()));
                }
                pieces.extend(wrap_words(sentence, max_tokens).into_iter().map(|part| Piece {
                    content: part,
                    overlap: None,
                    semantic_boundary: false,
                }));
                continue;
            }

            if current.is_empty() {
                current.push_str(sentence);
                continue;
            }

            let combined = current.chars().count() + 1 + sentence.chars().count();
            if combined.div_ceil(4) <= max_tokens {
                current.push(' ');
                current.push_str(sentence);
                continue;
            }

            // overlap is dropped when seed + sentence would not fit
            let seed = word_suffix(&current, overlap_words)
                .filter(|seed| {
                    (seed.chars().count() + 1 + sentence.chars().count()).div_ceil(4) <= max_tokens
                })
                .map(str::to_string);
            pieces.push(Piece::new(std::mem::take(&mut current), current_overlap.take()));

            match seed {
                Some(seed) => {
                    current = format!("{} {}", seed, sentence);
                    current_overlap = Some(seed);
                }
                None => current.push_str(sentence),
            }
        }

        if !current.is_empty() {
            pieces.push(Piece::new(current, current_overlap));
        }
        pieces
    }
}

/// Detected context with caller-supplied metadata taking precedence
pub fn merge_context(detected: DocumentContext, metadata: &DocumentMetadata) -> DocumentContext {
    DocumentContext {
        fund_name: metadata.fund_name.clone().or(detected.fund_name),
        document_type: metadata.document_type.unwrap_or(detected.document_type),
        ..detected
    }
}
