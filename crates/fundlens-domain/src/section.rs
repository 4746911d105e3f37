//! Section module - heading-delimited spans of a document

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classified content type of a section or chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkType {
    /// Markdown pipe table
    Table,
    /// Chart, graph or figure description
    Chart,
    /// Prose carrying fund performance keywords
    FinancialMetrics,
    /// Executive summary
    ExecutiveSummary,
    /// Any other summary
    Summary,
    /// Plain text
    Text,
}

impl ChunkType {
    /// Get the type name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkType::Table => "table",
            ChunkType::Chart => "chart",
            ChunkType::FinancialMetrics => "financial_metrics",
            ChunkType::ExecutiveSummary => "executive_summary",
            ChunkType::Summary => "summary",
            ChunkType::Text => "text",
        }
    }

    /// Whether splitting this content would corrupt structured financial data
    pub fn is_structured(&self) -> bool {
        matches!(self, ChunkType::Table | ChunkType::Chart | ChunkType::FinancialMetrics)
    }
}

impl fmt::Display for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A contiguous span of document text under one heading
///
/// Created once per parse pass and discarded after chunking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    /// Heading text without the leading `#` marks; empty for a leading unheaded section
    pub heading: String,
    /// Heading level 1-6, or 0 for the unheaded leading section
    pub level: u8,
    /// Trimmed section text including its heading line
    pub content: String,
    /// Classified content type
    pub section_type: ChunkType,
    /// Pipe-table patterns were found
    pub has_table: bool,
    /// Chart keywords were found
    pub has_chart: bool,
    /// Metric strings such as `IRR: 12.5%` found in the content
    pub financial_metrics: Vec<String>,
}
