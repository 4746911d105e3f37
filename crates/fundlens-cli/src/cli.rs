//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use fundlens_domain::DocumentType;
use std::path::PathBuf;

/// FundLens CLI - Chunk, extract and validate VC fund reports.
#[derive(Debug, Parser)]
#[command(name = "fundlens")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "FUNDLENS_CONFIG")]
    pub config: Option<PathBuf>,

    /// LLM backend for fallback extraction and validation
    #[arg(long, value_enum, global = true)]
    pub llm: Option<LlmArg>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (headline values only)
    Quiet,
}

/// LLM backend options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum LlmArg {
    /// Regex and heuristics only
    None,
    /// Local Ollama server
    Ollama,
}

/// Document type options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum DocumentTypeArg {
    /// Generic fund report
    FundReport,
    /// Quarterly report from a fund manager
    Quarterly,
    /// Capital account statement for a limited partner
    CapitalAccount,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Split a document into chunks
    Chunk(ChunkArgs),

    /// Extract fields from a document
    Extract(ExtractArgs),

    /// Validate fund metrics from a JSON file
    Validate(ValidateArgs),

    /// Run the full pipeline on a document
    Process(ProcessArgs),

    /// Manage the configuration file
    Config(ConfigArgs),
}

/// Arguments for the chunk command.
#[derive(Debug, Parser)]
pub struct ChunkArgs {
    /// Markdown or text file
    pub file: PathBuf,

    /// Fund name, overriding detection
    #[arg(long)]
    pub fund_name: Option<String>,
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// Markdown or text file
    pub file: PathBuf,

    /// Field keys to extract (repeatable); defaults to the document type's fields
    #[arg(short = 'F', long = "field")]
    pub fields: Vec<String>,

    /// Document type, overriding detection
    #[arg(short, long, value_enum)]
    pub document_type: Option<DocumentTypeArg>,
}

/// Arguments for the validate command.
#[derive(Debug, Parser)]
pub struct ValidateArgs {
    /// JSON file with fund metrics
    pub file: PathBuf,

    /// Use the strict validation policy
    #[arg(long, conflicts_with = "lenient")]
    pub strict: bool,

    /// Use the lenient validation policy
    #[arg(long)]
    pub lenient: bool,
}

/// Arguments for the process command.
#[derive(Debug, Parser)]
pub struct ProcessArgs {
    /// Markdown or text file
    pub file: PathBuf,

    /// Stream progress events for this user to stderr
    #[arg(short, long)]
    pub user: Option<String>,

    /// Document type, overriding detection
    #[arg(short, long, value_enum)]
    pub document_type: Option<DocumentTypeArg>,

    /// Fund name, overriding detection
    #[arg(long)]
    pub fund_name: Option<String>,
}

/// Arguments for configuration management.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

impl From<LlmArg> for crate::config::LlmBackend {
    fn from(llm: LlmArg) -> Self {
        match llm {
            LlmArg::None => crate::config::LlmBackend::None,
            LlmArg::Ollama => crate::config::LlmBackend::Ollama,
        }
    }
}

impl From<DocumentTypeArg> for DocumentType {
    fn from(document_type: DocumentTypeArg) -> Self {
        match document_type {
            DocumentTypeArg::FundReport => DocumentType::FundReport,
            DocumentTypeArg::Quarterly => DocumentType::FundQuarterlyReport,
            DocumentTypeArg::CapitalAccount => DocumentType::LpCapitalAccount,
        }
    }
}
