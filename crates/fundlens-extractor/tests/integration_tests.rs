//! Integration tests for the document pipeline

use fundlens_domain::{ExtractionMethod, FieldValue, Severity};
use fundlens_extractor::{
    field_config, DocumentPipeline, DocumentRequest, ExtractorConfig, PipelineConfig,
    RobustExtractor, StatusEvent, StatusRegistry,
};
use fundlens_llm::MockProvider;

const QUARTERLY_REPORT: &str = "\
# Northwind Capital Fund III - Q2 2024 Quarterly Report

## Fund Overview
Fund size: 120,000 kEUR
Called capital: 84,000 kEUR
Uncalled capital: 36,000 kEUR
NAV: 97,500 kEUR

## Performance
Net IRR: 14.2%
TVPI: 1.6x
DPI: 0.4x
RVPI: 1.2x

## Portfolio
| Company | Investment | Valuation |
|---------|------------|-----------|
| Helio Robotics GmbH | 12,000 | 21,000 |
| Cobalt Data Ltd | 9,500 | 14,250 |
";

/// Helper to create a stub LLM that confirms every value
fn confirming_llm() -> MockProvider {
    let mut llm = MockProvider::new("NOT_FOUND");
    llm.add_response_containing(
        "Validate this extracted",
        r#"{"isCorrect": true, "isPresent": true, "confidence": 0.9, "reasoning": "Matches the document"}"#,
    );
    llm
}

#[tokio::test]
async fn test_fund_size_scenario_regex_match() {
    let extractor = RobustExtractor::new(confirming_llm(), ExtractorConfig::default());
    let field = field_config("fundSize").unwrap();

    let result = extractor
        .extract_field("## Fund Size\nTotal commitments: 50,000 kEUR", field)
        .await;

    assert_eq!(result.value, Some(FieldValue::Number(50000.0)));
    assert_eq!(result.method, ExtractionMethod::Regex);
    assert_eq!(result.confidence, 0.8);
    assert!(!result.validation.is_missing);
}

#[tokio::test]
async fn test_llm_fallback_when_regex_misses() {
    let mut llm = MockProvider::new("NOT_FOUND");
    llm.add_response_containing("Extract the Fund NAV", "97,500");
    let extractor = RobustExtractor::new(llm, ExtractorConfig::default());
    let field = field_config("fundNAV").unwrap();

    let result = extractor
        .extract_field("The portfolio was revalued during the quarter.", field)
        .await;

    assert_eq!(result.value, Some(FieldValue::Number(97500.0)));
    assert_eq!(result.method, ExtractionMethod::Llm);
    assert_eq!(result.confidence, 0.7);
}

#[tokio::test]
async fn test_quarterly_report_end_to_end() {
    let pipeline = DocumentPipeline::with_llm(PipelineConfig::default(), confirming_llm()).unwrap();
    let output = pipeline.process(&DocumentRequest::new(QUARTERLY_REPORT)).await;

    assert_eq!(output.context.quarter.as_deref(), Some("Q2"));
    assert_eq!(output.context.year, Some(2024));

    let metrics = &output.fund_metrics;
    assert_eq!(metrics.fund_size, Some(120000.0));
    assert_eq!(metrics.cumulative_called_capital, Some(84000.0));
    assert_eq!(metrics.uncalled_capital, Some(36000.0));
    assert_eq!(metrics.fund_nav, Some(97500.0));
    assert_eq!(metrics.irr, Some(14.2));
    assert_eq!(metrics.tvpi, Some(1.6));

    let names: Vec<&str> = metrics
        .portfolio_companies
        .iter()
        .filter_map(|c| c.name.as_deref())
        .collect();
    assert_eq!(names, vec!["Helio Robotics GmbH", "Cobalt Data Ltd"]);

    assert!(output.validation.is_valid);
    assert!(output.confidence_score.overall > 0.0);
    assert!(output.confidence_score.overall <= 1.0);
    assert_eq!(
        output.fields["fundSize"].validation.llm_confirmation,
        "Matches the document"
    );
}

#[tokio::test]
async fn test_consistent_report_has_no_warnings() {
    let pipeline = DocumentPipeline::regex_only(PipelineConfig::default()).unwrap();
    let output = pipeline.process(&DocumentRequest::new(QUARTERLY_REPORT)).await;

    assert_eq!(output.fund_metrics.portfolio_companies.len(), 2);
    assert!(output.validation.is_valid);
    assert!(
        output.validation.warnings.is_empty(),
        "unexpected warnings: {:?}",
        output.validation.warnings
    );
    assert_eq!(output.validation.confidence, 1.0);
}

#[tokio::test]
async fn test_tvpi_mismatch_reported() {
    let text = "## Performance\nTVPI: 2.0x\nDPI: 0.8x\nRVPI: 1.3x";
    let pipeline = DocumentPipeline::regex_only(PipelineConfig::default()).unwrap();
    let output = pipeline.process(&DocumentRequest::new(text)).await;

    let tvpi_errors: Vec<_> = output
        .validation
        .errors
        .iter()
        .filter(|e| e.field == "tvpi")
        .collect();
    assert_eq!(tvpi_errors.len(), 1);
    assert_eq!(tvpi_errors[0].severity, Severity::High);
    assert!((tvpi_errors[0].expected_value.unwrap() - 2.1).abs() < 1e-9);
    assert_eq!(tvpi_errors[0].actual_value, Some(2.0));
    assert!(!output.validation.is_valid);
}

#[tokio::test]
async fn test_llm_outage_degrades_gracefully() {
    let mut llm = MockProvider::new("NOT_FOUND");
    llm.add_error_containing("Validate");
    llm.add_error_containing("Extract");
    let pipeline = DocumentPipeline::with_llm(PipelineConfig::default(), llm).unwrap();

    let output = pipeline.process(&DocumentRequest::new(QUARTERLY_REPORT)).await;

    let fund_size = &output.fields["fundSize"];
    assert_eq!(fund_size.method, ExtractionMethod::Regex);
    assert_eq!(fund_size.validation.llm_confirmation, "LLM validation failed");
    assert_eq!(output.fund_metrics.fund_size, Some(120000.0));
}

#[tokio::test]
async fn test_status_events_follow_pipeline_stages() {
    let registry = StatusRegistry::spawn();
    let mut subscription = registry.subscribe("lp-relations").await.unwrap();
    let mut bystander = registry.subscribe("someone-else").await.unwrap();

    let pipeline = DocumentPipeline::regex_only(PipelineConfig::default())
        .unwrap()
        .with_status(registry.clone());
    let output = pipeline
        .process(&DocumentRequest::new(QUARTERLY_REPORT).with_user("lp-relations"))
        .await;
    let document_id = output.document_id.to_string();

    let first = subscription.recv().await.unwrap();
    assert_eq!(
        first,
        StatusEvent::Started {
            document_id: document_id.clone(),
            content_chars: QUARTERLY_REPORT.chars().count(),
        }
    );

    let mut last = first;
    while let Some(event) = subscription.try_recv() {
        last = event;
    }
    match last {
        StatusEvent::Completed {
            document_id: id,
            overall_confidence,
        } => {
            assert_eq!(id, document_id);
            assert_eq!(overall_confidence, output.confidence_score.overall);
        }
        unexpected => panic!("Expected completed event, got {:?}", unexpected),
    }

    assert!(bystander.try_recv().is_none());
    registry.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_processing_is_deterministic() {
    let pipeline = DocumentPipeline::regex_only(PipelineConfig::default()).unwrap();
    let request = DocumentRequest::new(QUARTERLY_REPORT).with_fund_name("Northwind III");

    let first = pipeline.process(&request).await;
    let second = pipeline.process(&request).await;

    assert_eq!(first.chunks, second.chunks);
    assert_eq!(first.fund_metrics, second.fund_metrics);
    assert_eq!(first.context.fund_name.as_deref(), Some("Northwind III"));
    assert_ne!(first.document_id, second.document_id);
}
