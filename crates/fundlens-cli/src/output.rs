//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use fundlens_domain::{Chunk, ExtractionResult, FundMetrics, Severity, ValidationReport};
use fundlens_extractor::{PipelineOutput, StatusEvent};
use std::collections::BTreeMap;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

const PREVIEW_CHARS: usize = 48;

/// Output formatter.
#[derive(Debug, Clone)]
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format chunks.
    pub fn format_chunks(&self, chunks: &[Chunk]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(chunks)?),
            OutputFormat::Quiet => Ok(chunks.len().to_string()),
            OutputFormat::Table => Ok(self.chunks_table(chunks)),
        }
    }

    /// Format per-field extraction results.
    pub fn format_fields(&self, fields: &BTreeMap<String, ExtractionResult>) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(fields)?),
            OutputFormat::Quiet => Ok(fields
                .iter()
                .filter_map(|(key, r)| r.value.as_ref().map(|v| format!("{}={}", key, v)))
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => Ok(self.fields_table(fields)),
        }
    }

    /// Format a validation report.
    pub fn format_validation(&self, report: &ValidationReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
            OutputFormat::Quiet => Ok(self.verdict(report)),
            OutputFormat::Table => Ok(self.validation_tables(report)),
        }
    }

    /// Format a full pipeline result.
    pub fn format_output(&self, output: &PipelineOutput) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(output)?),
            OutputFormat::Quiet => Ok(format!("{:.2}", output.confidence_score.overall)),
            OutputFormat::Table => {
                let context = &output.context;
                let mut sections = vec![self.info(&format!(
                    "{} | {} | {} chunk(s)",
                    context.fund_name.as_deref().unwrap_or("Unknown fund"),
                    match (&context.quarter, context.year) {
                        (Some(q), Some(y)) => format!("{} {}", q, y),
                        (None, Some(y)) => y.to_string(),
                        _ => "period unknown".to_string(),
                    },
                    output.chunks.len()
                ))];
                sections.push(metrics_table(&output.fund_metrics));
                sections.push(self.validation_tables(&output.validation));
                sections.push(format!(
                    "Confidence: {:.2} (financial {:.2}, portfolio {:.2}, data quality {:.2}) | extraction quality: {}",
                    output.confidence_score.overall,
                    output.confidence_score.financial,
                    output.confidence_score.portfolio,
                    output.confidence_score.data_quality,
                    output.extraction_confidence.extraction_quality
                ));
                Ok(sections.join("\n\n"))
            }
        }
    }

    /// Format a progress event as one line.
    pub fn format_status(&self, event: &StatusEvent) -> String {
        let line = match event {
            StatusEvent::Started { document_id, content_chars } => {
                format!("[{}] started ({} chars)", document_id, content_chars)
            }
            StatusEvent::Chunked { document_id, total_chunks } => {
                format!("[{}] chunked into {}", document_id, total_chunks)
            }
            StatusEvent::Extracted {
                document_id,
                fields_found,
                fields_total,
            } => format!("[{}] extracted {}/{} fields", document_id, fields_found, fields_total),
            StatusEvent::Validated {
                document_id,
                errors,
                warnings,
            } => format!(
                "[{}] validated: {} error(s), {} warning(s)",
                document_id, errors, warnings
            ),
            StatusEvent::Completed {
                document_id,
                overall_confidence,
            } => format!("[{}] completed, confidence {:.2}", document_id, overall_confidence),
        };
        self.colorize(&line, "cyan")
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn chunks_table(&self, chunks: &[Chunk]) -> String {
        if chunks.is_empty() {
            return self.colorize("No chunks produced.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["#", "Type", "Tokens", "Intact", "Section", "Preview"]);
        for chunk in chunks {
            builder.push_record([
                chunk.metadata.chunk_index.to_string(),
                chunk.chunk_type.to_string(),
                chunk.token_count.to_string(),
                if chunk.intact { "yes" } else { "" }.to_string(),
                chunk.metadata.parent_section.clone(),
                preview(&chunk.content),
            ]);
        }
        styled(builder)
    }

    fn fields_table(&self, fields: &BTreeMap<String, ExtractionResult>) -> String {
        if fields.is_empty() {
            return self.colorize("No fields extracted.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["Field", "Value", "Confidence", "Method", "Note"]);
        for (key, result) in fields {
            let value = result
                .value
                .as_ref()
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".to_string());
            builder.push_record([
                key.clone(),
                value,
                format!("{:.2}", result.confidence),
                result.method.to_string(),
                result.validation.llm_confirmation.clone(),
            ]);
        }
        styled(builder)
    }

    fn validation_tables(&self, report: &ValidationReport) -> String {
        let mut out = vec![self.verdict(report)];

        if !report.errors.is_empty() {
            let mut builder = Builder::default();
            builder.push_record(["Severity", "Field", "Message"]);
            for error in &report.errors {
                builder.push_record([
                    self.colorize(error.severity.as_str(), severity_color(error.severity)),
                    error.field.clone(),
                    error.message.clone(),
                ]);
            }
            out.push(styled(builder));
        }

        if !report.warnings.is_empty() {
            let mut builder = Builder::default();
            builder.push_record(["Field", "Warning", "Suggestion"]);
            for warning in &report.warnings {
                builder.push_record([
                    warning.field.clone(),
                    warning.message.clone(),
                    warning.suggestion.clone(),
                ]);
            }
            out.push(styled(builder));
        }

        out.join("\n")
    }

    fn verdict(&self, report: &ValidationReport) -> String {
        let summary = format!(
            "{} error(s), {} warning(s), confidence {:.2}",
            report.errors.len(),
            report.warnings.len(),
            report.confidence
        );
        if report.is_valid {
            self.success(&format!("Valid: {}", summary))
        } else {
            self.error(&format!("Invalid: {}", summary))
        }
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            "magenta" => text.magenta().to_string(),
            _ => text.to_string(),
        }
    }
}

fn severity_color(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "magenta",
        Severity::High => "red",
        Severity::Medium => "yellow",
        Severity::Low => "blue",
    }
}

fn metrics_table(metrics: &FundMetrics) -> String {
    let rows: [(&str, Option<String>); 11] = [
        ("Fund name", metrics.company_name.clone()),
        ("Fund size", metrics.fund_size.map(amount)),
        ("Total commitments", metrics.total_commitments.map(amount)),
        ("NAV", metrics.fund_nav.map(amount)),
        ("Called capital", metrics.cumulative_called_capital.map(amount)),
        ("Uncalled capital", metrics.uncalled_capital.map(amount)),
        ("IRR", metrics.irr.map(|v| format!("{:.1}%", v))),
        ("MOIC", metrics.moic.map(multiple)),
        ("TVPI", metrics.tvpi.map(multiple)),
        ("DPI", metrics.dpi.map(multiple)),
        ("RVPI", metrics.rvpi.map(multiple)),
    ];

    let mut builder = Builder::default();
    builder.push_record(["Metric", "Value"]);
    for (label, value) in rows {
        builder.push_record([label.to_string(), value.unwrap_or_else(|| "-".to_string())]);
    }
    if !metrics.portfolio_companies.is_empty() {
        let names: Vec<&str> = metrics
            .portfolio_companies
            .iter()
            .filter_map(|c| c.name.as_deref())
            .collect();
        builder.push_record(["Portfolio".to_string(), names.join(", ")]);
    }
    styled(builder)
}

fn styled(builder: Builder) -> String {
    let mut table = builder.build();
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));
    table.to_string()
}

fn amount(value: f64) -> String {
    format!("{:.0}", value)
}

fn multiple(value: f64) -> String {
    format!("{:.2}x", value)
}

fn preview(content: &str) -> String {
    let flat: String = content.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= PREVIEW_CHARS {
        flat
    } else {
        let cut: String = flat.chars().take(PREVIEW_CHARS).collect();
        format!("{}…", cut)
    }
}
