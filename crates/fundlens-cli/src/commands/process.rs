//! Process command implementation.

use crate::cli::ProcessArgs;
use crate::config::Config;
use crate::error::CliError;
use crate::output::Formatter;
use fundlens_domain::traits::LlmProvider;
use fundlens_domain::DocumentType;
use fundlens_extractor::{DocumentPipeline, DocumentRequest, PipelineOutput, StatusRegistry};
use fundlens_llm::OllamaProvider;
use std::fmt::Display;

use super::read_document;

/// Execute the process command.
pub async fn execute_process(
    args: ProcessArgs,
    config: &Config,
    llm: Option<OllamaProvider>,
    formatter: &Formatter,
) -> anyhow::Result<()> {
    let content = read_document(&args.file)?;

    let mut request = DocumentRequest::new(content);
    if let Some(document_type) = args.document_type {
        request = request.with_document_type(DocumentType::from(document_type));
    }
    if let Some(fund_name) = args.fund_name {
        request = request.with_fund_name(fund_name);
    }
    if let Some(user) = args.user {
        request = request.with_user(user);
    }

    let pipeline_config = config.pipeline.clone();
    let output = match llm {
        Some(provider) => {
            let pipeline = DocumentPipeline::with_llm(pipeline_config, provider).map_err(CliError::from)?;
            run(pipeline, &request, formatter).await?
        }
        None => {
            let pipeline = DocumentPipeline::regex_only(pipeline_config).map_err(CliError::from)?;
            run(pipeline, &request, formatter).await?
        }
    };

    println!("{}", formatter.format_output(&output)?);
    Ok(())
}

/// Run the pipeline, streaming progress to stderr when a user is given.
async fn run<L>(
    pipeline: DocumentPipeline<L>,
    request: &DocumentRequest,
    formatter: &Formatter,
) -> Result<PipelineOutput, CliError>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
{
    let Some(user) = request.user_id.as_deref() else {
        return Ok(pipeline.process(request).await);
    };

    let registry = StatusRegistry::spawn();
    let mut subscription = registry.subscribe(user).await?;
    let printer_formatter = formatter.clone();
    let printer = tokio::spawn(async move {
        while let Some(event) = subscription.recv().await {
            eprintln!("{}", printer_formatter.format_status(&event));
        }
    });

    let pipeline = pipeline.with_status(registry.clone());
    let output = pipeline.process(request).await;

    // Dropping the subscribers ends the printer once it has drained
    registry.shutdown().await?;
    if let Err(e) = printer.await {
        tracing::warn!("Status printer failed: {}", e);
    }
    Ok(output)
}
