//! Chunk command implementation.

use crate::cli::ChunkArgs;
use crate::config::Config;
use crate::error::CliError;
use crate::output::Formatter;
use fundlens_chunker::{DocumentMetadata, SemanticChunker};

use super::read_document;

/// Execute the chunk command.
pub fn execute_chunk(args: ChunkArgs, config: &Config, formatter: &Formatter) -> anyhow::Result<()> {
    let content = read_document(&args.file)?;
    let chunker = SemanticChunker::new(config.pipeline.chunking.clone()).map_err(CliError::from)?;

    let metadata = DocumentMetadata {
        fund_name: args.fund_name,
        ..DocumentMetadata::default()
    };
    let chunks = chunker.chunk_document(&content, &metadata);

    println!("{}", formatter.format_chunks(&chunks)?);
    Ok(())
}
