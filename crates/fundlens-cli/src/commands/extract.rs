//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::config::Config;
use crate::error::CliError;
use crate::output::Formatter;
use fundlens_chunker::extract_document_context;
use fundlens_domain::DocumentType;
use fundlens_extractor::{
    field_config, fields_for_document_type, ExtractorError, FieldConfig, RobustExtractor,
};
use fundlens_llm::OllamaProvider;

use super::read_document;

/// Execute the extract command.
pub async fn execute_extract(
    args: ExtractArgs,
    config: &Config,
    llm: Option<OllamaProvider>,
    formatter: &Formatter,
) -> anyhow::Result<()> {
    let content = read_document(&args.file)?;
    let document_type = args
        .document_type
        .map(DocumentType::from)
        .unwrap_or_else(|| extract_document_context(&content).document_type);
    let fields = select_fields(&args.fields, document_type)?;

    let extractor_config = config.pipeline.extractor.clone();
    let results = match llm {
        Some(provider) => {
            RobustExtractor::new(provider, extractor_config)
                .extract_fields(&content, fields)
                .await
        }
        None => {
            RobustExtractor::regex_only(extractor_config)
                .extract_fields(&content, fields)
                .await
        }
    };

    println!("{}", formatter.format_fields(&results)?);
    Ok(())
}

/// Requested fields, or every field for the document type when none are named.
fn select_fields(
    keys: &[String],
    document_type: DocumentType,
) -> Result<Vec<&'static FieldConfig>, CliError> {
    if keys.is_empty() {
        return Ok(fields_for_document_type(document_type));
    }
    keys.iter()
        .map(|key| {
            field_config(key).ok_or_else(|| ExtractorError::UnknownField(key.clone()).into())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_fields_in_order() {
        let keys = vec!["tvpi".to_string(), "fundSize".to_string()];
        let fields = select_fields(&keys, DocumentType::FundReport).unwrap();
        let selected: Vec<&str> = fields.iter().map(|f| f.key).collect();
        assert_eq!(selected, vec!["tvpi", "fundSize"]);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let keys = vec!["carriedInterest".to_string()];
        let err = select_fields(&keys, DocumentType::FundReport).unwrap_err();
        assert!(matches!(err, CliError::Extractor(ExtractorError::UnknownField(_))));
    }

    #[test]
    fn test_document_type_defaults() {
        let fields = select_fields(&[], DocumentType::LpCapitalAccount).unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].key, "companyName");
    }
}
