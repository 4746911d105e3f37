//! Document structure parsing
//!
//! Splits markdown into heading-delimited sections, classifies each section's
//! content and scans the whole text for document-level context.

use crate::patterns::{
    any_match, ANNUAL_PATTERNS, CHART_PATTERNS, EXECUTIVE_SUMMARY_PATTERNS, FINANCIAL_PATTERNS,
    FUND_NAME_PATTERNS, METRIC_PATTERNS, PERIOD_PATTERNS, QUARTERLY_PATTERNS, SUMMARY_PATTERNS,
    TABLE_PATTERNS,
};
use fundlens_domain::{ChunkType, DocumentContext, Section};
use tracing::debug;

/// Sections plus document-level context
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    /// Sections in document order
    pub sections: Vec<Section>,
    /// Best-effort document context
    pub context: DocumentContext,
}

/// Splits markdown into sections
///
/// Never fails: heading-less input becomes a single section, empty input
/// yields no sections.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentStructureParser {
    preserve_structure: bool,
}

impl DocumentStructureParser {
    /// Parser that splits on markdown headings
    pub fn new() -> Self {
        Self {
            preserve_structure: true,
        }
    }

    /// Parser that treats the whole document as one section
    pub fn flat() -> Self {
        Self {
            preserve_structure: false,
        }
    }

    /// Parse a markdown document
    pub fn parse(&self, markdown: &str) -> ParsedDocument {
        let sections = if self.preserve_structure {
            split_sections(markdown)
        } else {
            build_section("", 0, markdown).into_iter().collect()
        };
        debug!(sections = sections.len(), "Parsed document structure");

        ParsedDocument {
            sections,
            context: extract_document_context(markdown),
        }
    }
}

/// Heading level and text if `line` is a markdown heading
fn heading(line: &str) -> Option<(u8, &str)> {
    let trimmed = line.trim_start();
    let hashes = trimmed.chars().take_while(|c| *c == '#').count();
    if !(1..=6).contains(&hashes) {
        return None;
    }
    let rest = &trimmed[hashes..];
    if !rest.starts_with(|c: char| c.is_whitespace()) {
        return None;
    }
    Some((hashes as u8, rest.trim()))
}

fn split_sections(markdown: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut current_heading = String::new();
    let mut current_level = 0u8;
    let mut current = String::new();

    for line in markdown.lines() {
        if let Some((level, text)) = heading(line) {
            sections.extend(build_section(&current_heading, current_level, &current));
            current_heading = text.to_string();
            current_level = level;
            current.clear();
        }
        current.push_str(line);
        current.push('\n');
    }
    sections.extend(build_section(&current_heading, current_level, &current));
    sections
}

fn build_section(heading: &str, level: u8, raw: &str) -> Option<Section> {
    let content = raw.trim();
    if content.is_empty() {
        return None;
    }
    Some(Section {
        heading: heading.to_string(),
        level,
        content: content.to_string(),
        section_type: classify(content),
        has_table: any_match(&TABLE_PATTERNS, content),
        has_chart: any_match(&CHART_PATTERNS, content),
        financial_metrics: detect_metrics(content),
    })
}

/// Classify section content
///
/// Priority: table, chart, financial metrics, executive summary, summary, text.
pub fn classify(content: &str) -> ChunkType {
    if any_match(&TABLE_PATTERNS, content) {
        ChunkType::Table
    } else if any_match(&CHART_PATTERNS, content) {
        ChunkType::Chart
    } else if any_match(&FINANCIAL_PATTERNS, content) {
        ChunkType::FinancialMetrics
    } else if any_match(&EXECUTIVE_SUMMARY_PATTERNS, content) {
        ChunkType::ExecutiveSummary
    } else if any_match(&SUMMARY_PATTERNS, content) {
        ChunkType::Summary
    } else {
        ChunkType::Text
    }
}

fn detect_metrics(content: &str) -> Vec<String> {
    METRIC_PATTERNS
        .iter()
        .flat_map(|re| re.find_iter(content).map(|m| m.as_str().trim().to_string()))
        .collect()
}

/// Scan the whole document for fund name, period and report type
pub fn extract_document_context(text: &str) -> DocumentContext {
    let fund_name = FUND_NAME_PATTERNS.iter().find_map(|re| {
        re.captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|name| !name.is_empty())
    });

    let (quarter, year) = PERIOD_PATTERNS
        .iter()
        .find_map(|re| re.captures(text))
        .map(|c| {
            let quarter = c
                .get(1)
                .map(|m| m.as_str().to_uppercase())
                .filter(|q| q.starts_with('Q') && q.len() == 2);
            let year = c.get(2).and_then(|m| m.as_str().parse::<u16>().ok());
            (quarter, year)
        })
        .unwrap_or((None, None));

    let report_type = if any_match(&ANNUAL_PATTERNS, text) {
        Some("annual".to_string())
    } else if any_match(&QUARTERLY_PATTERNS, text) {
        Some("quarterly".to_string())
    } else {
        None
    };

    DocumentContext {
        fund_name,
        quarter,
        year,
        report_type,
        ..DocumentContext::default()
    }
}
