//! End-to-end processing of one document
//!
//! ```text
//! content → chunk → heuristic + robust extraction → merge → validate → score
//! ```
//!
//! Stages run one after another. Every stage degrades instead of failing, so
//! `process` always returns a result; only building the pipeline can fail.

use crate::config::PipelineConfig;
use crate::error::ExtractorError;
use crate::fields::fields_for_document_type;
use crate::heuristic::FieldExtractor;
use crate::robust::{NoLlm, RobustExtractor};
use crate::status::{StatusEvent, StatusRegistry};
use fundlens_chunker::{extract_document_context, merge_context, DocumentMetadata, SemanticChunker};
use fundlens_domain::traits::LlmProvider;
use fundlens_domain::scoring::{
    calculate_confidence_score_with, DataQualityMetrics, FinancialMetrics, IrrFigures,
    MoicFigures, PortfolioAnalysis, SectorSummary, StageSummary, TvpiFigures,
};
use fundlens_domain::{
    Chunk, ConfidenceScore, DocumentContext, DocumentId, DocumentType, ExtractionConfidence,
    ExtractionResult, FieldValue, FundMetrics, PortfolioCompany, ScoringWeights, ValidationReport,
};
use fundlens_validator::DataValidator;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Display;
use tracing::{info, warn};

/// A document to process
#[derive(Debug, Clone, Default)]
pub struct DocumentRequest {
    /// Markdown or plain text
    pub content: String,
    /// User whose status subscribers should see progress
    pub user_id: Option<String>,
    /// Document type, overriding detection
    pub document_type: Option<DocumentType>,
    /// Fund name, overriding detection
    pub fund_name: Option<String>,
}

impl DocumentRequest {
    /// Create a request for the given content
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// Publish progress to this user's subscribers
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Set the document type
    pub fn with_document_type(mut self, document_type: DocumentType) -> Self {
        self.document_type = Some(document_type);
        self
    }

    /// Set the fund name
    pub fn with_fund_name(mut self, fund_name: impl Into<String>) -> Self {
        self.fund_name = Some(fund_name.into());
        self
    }
}

/// Everything the pipeline produced for one document
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineOutput {
    /// Id assigned to this run
    pub document_id: DocumentId,
    /// Detected document context
    pub context: DocumentContext,
    /// Chunks in document order
    pub chunks: Vec<Chunk>,
    /// Per-field robust extraction results
    pub fields: BTreeMap<String, ExtractionResult>,
    /// Merged fund metrics
    pub fund_metrics: FundMetrics,
    /// Validation findings
    pub validation: ValidationReport,
    /// Per-field plausibility assessment
    pub extraction_confidence: ExtractionConfidence,
    /// Blended confidence score
    pub confidence_score: ConfidenceScore,
}

/// Runs chunking, extraction, validation and scoring for one document
pub struct DocumentPipeline<L = NoLlm> {
    chunker: SemanticChunker,
    heuristic: FieldExtractor,
    robust: RobustExtractor<L>,
    validator: DataValidator,
    weights: ScoringWeights,
    status: Option<StatusRegistry>,
}

impl DocumentPipeline<NoLlm> {
    /// Build a pipeline without an LLM
    pub fn regex_only(config: PipelineConfig) -> Result<Self, ExtractorError> {
        let robust = RobustExtractor::regex_only(config.extractor.clone());
        Self::build(config, robust)
    }
}

impl<L> DocumentPipeline<L>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
{
    /// Build a pipeline backed by an LLM provider
    pub fn with_llm(config: PipelineConfig, llm: L) -> Result<Self, ExtractorError> {
        let robust = RobustExtractor::new(llm, config.extractor.clone());
        Self::build(config, robust)
    }

    fn build(config: PipelineConfig, robust: RobustExtractor<L>) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;
        Ok(Self {
            chunker: SemanticChunker::new(config.chunking)?,
            heuristic: FieldExtractor::new(),
            robust,
            validator: DataValidator::new(config.validation)?,
            weights: config.scoring,
            status: None,
        })
    }

    /// Publish progress events to a status registry
    pub fn with_status(mut self, registry: StatusRegistry) -> Self {
        self.status = Some(registry);
        self
    }

    /// Process one document
    pub async fn process(&self, request: &DocumentRequest) -> PipelineOutput {
        let document_id = DocumentId::new();
        let id = document_id.to_string();
        info!(document_id = %id, chars = request.content.len(), "Processing document");

        self.publish(
            request,
            StatusEvent::Started {
                document_id: id.clone(),
                content_chars: request.content.chars().count(),
            },
        )
        .await;

        // 1. Chunk
        let metadata = DocumentMetadata {
            document_type: request.document_type,
            fund_name: request.fund_name.clone(),
        };
        let context = merge_context(extract_document_context(&request.content), &metadata);
        let chunks = self.chunker.chunk_document(&request.content, &metadata);
        self.publish(
            request,
            StatusEvent::Chunked {
                document_id: id.clone(),
                total_chunks: chunks.len(),
            },
        )
        .await;

        // 2. Extract
        let heuristic = self.heuristic.extract_from_chunks(&chunks);
        let field_configs = fields_for_document_type(context.document_type);
        let fields = self
            .robust
            .extract_fields(&request.content, field_configs.iter().copied())
            .await;
        self.publish(
            request,
            StatusEvent::Extracted {
                document_id: id.clone(),
                fields_found: fields.values().filter(|r| r.is_success()).count(),
                fields_total: fields.len(),
            },
        )
        .await;

        // 3. Merge; robust values win, heuristic values fill the gaps
        let fund_metrics = merge_fields(&fields, &heuristic);

        // 4. Validate
        let validation = self.validator.validate_all(&fund_metrics);
        self.publish(
            request,
            StatusEvent::Validated {
                document_id: id.clone(),
                errors: validation.errors.len(),
                warnings: validation.warnings.len(),
            },
        )
        .await;

        // 5. Score
        let extraction_confidence = ExtractionConfidence::assess(&fund_metrics, context.document_type);
        let confidence_score = calculate_confidence_score_with(
            &financial_inputs(&fund_metrics, &validation),
            &portfolio_inputs(&fund_metrics.portfolio_companies),
            &quality_inputs(&fields, &validation),
            &self.weights,
        );
        self.publish(
            request,
            StatusEvent::Completed {
                document_id: id.clone(),
                overall_confidence: confidence_score.overall,
            },
        )
        .await;

        info!(
            document_id = %id,
            chunks = chunks.len(),
            errors = validation.errors.len(),
            confidence = confidence_score.overall,
            "Document processed"
        );

        PipelineOutput {
            document_id,
            context,
            chunks,
            fields,
            fund_metrics,
            validation,
            extraction_confidence,
            confidence_score,
        }
    }

    async fn publish(&self, request: &DocumentRequest, event: StatusEvent) {
        let (Some(registry), Some(user)) = (&self.status, &request.user_id) else {
            return;
        };
        if let Err(e) = registry.publish(user, event).await {
            warn!("Failed to publish status: {}", e);
        }
    }
}

/// Fund metrics from robust results, gaps filled from the heuristic pass
pub fn merge_fields(
    fields: &BTreeMap<String, ExtractionResult>,
    heuristic: &FundMetrics,
) -> FundMetrics {
    let mut metrics = FundMetrics::default();

    for (key, result) in fields {
        let Some(value) = &result.value else {
            continue;
        };
        match (key.as_str(), value) {
            ("companyName", FieldValue::Text(name)) => metrics.company_name = Some(name.clone()),
            ("portfolioCompanies", FieldValue::List(names)) => {
                metrics.portfolio_companies =
                    names.iter().map(|n| PortfolioCompany::named(n.clone())).collect();
            }
            (key, FieldValue::Number(n)) => {
                metrics.set_numeric_field(key, *n);
            }
            _ => {}
        }
    }

    metrics.fill_missing_from(heuristic);
    metrics
}

fn financial_inputs(metrics: &FundMetrics, validation: &ValidationReport) -> FinancialMetrics {
    let identity_checked = metrics.tvpi.is_some() && metrics.dpi.is_some() && metrics.rvpi.is_some();
    FinancialMetrics {
        irr: IrrFigures {
            gross: metrics.irr,
            ..IrrFigures::default()
        },
        moic: MoicFigures {
            gross: metrics.moic,
            ..MoicFigures::default()
        },
        tvpi: TvpiFigures {
            total: metrics.tvpi,
            dpi: metrics.dpi,
            rvpi: metrics.rvpi,
            validated: identity_checked && !validation.errors.iter().any(|e| e.field == "tvpi"),
        },
    }
}

fn portfolio_inputs(companies: &[PortfolioCompany]) -> PortfolioAnalysis {
    let mut sectors: BTreeMap<String, SectorSummary> = BTreeMap::new();
    let mut stages: BTreeMap<String, StageSummary> = BTreeMap::new();

    for company in companies {
        let invested = company.investment.unwrap_or(0.0);
        let value = company.valuation.unwrap_or(0.0);

        if let Some(sector) = company.sector.as_deref().filter(|s| !s.is_empty()) {
            let entry = sectors.entry(sector.to_string()).or_insert_with(|| SectorSummary {
                sector: sector.to_string(),
                ..SectorSummary::default()
            });
            entry.count += 1;
            entry.total_invested += invested;
            entry.current_value += value;
        }
        if let Some(stage) = company.stage.as_deref().filter(|s| !s.is_empty()) {
            let entry = stages.entry(stage.to_string()).or_insert_with(|| StageSummary {
                stage: stage.to_string(),
                ..StageSummary::default()
            });
            entry.count += 1;
            entry.total_invested += invested;
            entry.current_value += value;
        }
    }

    PortfolioAnalysis {
        companies: companies.to_vec(),
        sectors: sectors.into_values().collect(),
        stages: stages.into_values().collect(),
    }
}

fn quality_inputs(
    fields: &BTreeMap<String, ExtractionResult>,
    validation: &ValidationReport,
) -> DataQualityMetrics {
    let found: Vec<&ExtractionResult> = fields.values().filter(|r| r.is_success()).collect();
    let completeness = if fields.is_empty() {
        0.0
    } else {
        found.len() as f64 / fields.len() as f64
    };
    let accuracy = if found.is_empty() {
        0.0
    } else {
        found.iter().map(|r| r.confidence).sum::<f64>() / found.len() as f64
    };

    DataQualityMetrics {
        completeness,
        accuracy,
        consistency: validation.confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fundlens_domain::ExtractionMethod;
    use fundlens_llm::MockProvider;

    const REPORT: &str = "\
# Acme Ventures Fund II - Q4 2023 Quarterly Report

## Fund Overview
Total commitments: 50,000 kEUR
Called capital: 30,000 kEUR
Uncalled capital: 20,000 kEUR
NAV: 42,000 kEUR

## Performance
Net IRR: 12.5%
TVPI: 1.8x
DPI: 0.5x
RVPI: 1.3x
";

    #[tokio::test]
    async fn test_regex_only_pipeline() {
        let pipeline = DocumentPipeline::regex_only(PipelineConfig::default()).unwrap();
        let output = pipeline.process(&DocumentRequest::new(REPORT)).await;

        assert!(!output.chunks.is_empty());
        assert_eq!(output.context.quarter.as_deref(), Some("Q4"));
        assert_eq!(output.context.year, Some(2023));
        assert_eq!(output.fields.len(), 11);
        assert_eq!(output.fields["fundSize"].method, ExtractionMethod::Regex);
        assert_eq!(output.fund_metrics.fund_size, Some(50000.0));
        assert_eq!(output.fund_metrics.fund_nav, Some(42000.0));
        assert_eq!(output.fund_metrics.tvpi, Some(1.8));
        assert!(output.validation.is_valid);
        assert!(output.confidence_score.overall > 0.0);
        assert!(output.confidence_score.overall <= 1.0);
    }

    #[tokio::test]
    async fn test_heuristic_fills_gaps() {
        // "Paid in capital" is not one of the called-capital regexes
        let text = "## Capital\nTotal commitments: 50,000 kEUR\nPaid in capital: 30,000 kEUR";
        let pipeline = DocumentPipeline::regex_only(PipelineConfig::default()).unwrap();
        let output = pipeline.process(&DocumentRequest::new(text)).await;

        assert_eq!(
            output.fields["cumulativeCalledCapital"].method,
            ExtractionMethod::Failed
        );
        assert_eq!(output.fund_metrics.cumulative_called_capital, Some(30000.0));
        assert_eq!(output.fund_metrics.uncalled_capital, Some(20000.0));
    }

    #[tokio::test]
    async fn test_lp_capital_account_fields() {
        let pipeline = DocumentPipeline::regex_only(PipelineConfig::default()).unwrap();
        let request = DocumentRequest::new(REPORT).with_document_type(DocumentType::LpCapitalAccount);
        let output = pipeline.process(&request).await;

        let keys: Vec<&String> = output.fields.keys().collect();
        assert_eq!(keys, vec!["companyName"]);
        assert_eq!(output.context.document_type, DocumentType::LpCapitalAccount);
        // heuristic figures still populate the metrics
        assert_eq!(output.fund_metrics.fund_size, Some(50000.0));
    }

    #[tokio::test]
    async fn test_validation_flags_inconsistent_report() {
        let text = "Total commitments: 100 kEUR\nCalled capital: 120 kEUR";
        let pipeline = DocumentPipeline::regex_only(PipelineConfig::default()).unwrap();
        let output = pipeline.process(&DocumentRequest::new(text)).await;

        assert!(!output.validation.is_valid);
        assert_eq!(
            output.validation.count(fundlens_domain::Severity::Critical),
            1
        );
    }

    #[tokio::test]
    async fn test_llm_pipeline_uses_fallback() {
        let mut llm = MockProvider::new("NOT_FOUND");
        llm.add_response_containing("Validate this extracted", r#"{"isPresent": true, "reasoning": "ok"}"#);
        llm.add_response_containing("Extract the DPI", "0.4");
        let text = "Total commitments: 50,000 kEUR";

        let pipeline = DocumentPipeline::with_llm(PipelineConfig::default(), llm).unwrap();
        let output = pipeline.process(&DocumentRequest::new(text)).await;

        assert_eq!(output.fields["dpi"].method, ExtractionMethod::Llm);
        assert_eq!(output.fields["dpi"].confidence, 0.7);
        assert_eq!(output.fund_metrics.dpi, Some(0.4));
        assert_eq!(output.fields["fundSize"].validation.llm_confirmation, "ok");
    }

    #[tokio::test]
    async fn test_status_events_published() {
        let registry = StatusRegistry::spawn();
        let mut sub = registry.subscribe("alice").await.unwrap();

        let pipeline = DocumentPipeline::regex_only(PipelineConfig::default())
            .unwrap()
            .with_status(registry.clone());
        pipeline
            .process(&DocumentRequest::new(REPORT).with_user("alice"))
            .await;

        let mut kinds = Vec::new();
        while let Some(event) = sub.try_recv() {
            kinds.push(serde_json::to_value(&event).unwrap()["type"].clone());
        }
        assert_eq!(
            kinds,
            vec!["started", "chunked", "extracted", "validated", "completed"]
        );
        registry.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_document() {
        let pipeline = DocumentPipeline::regex_only(PipelineConfig::default()).unwrap();
        let output = pipeline.process(&DocumentRequest::new("")).await;

        assert!(output.chunks.is_empty());
        assert!(output.fields.values().all(|r| !r.is_success()));
        assert_eq!(output.fund_metrics, FundMetrics::default());
        assert!(output.validation.is_valid);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = PipelineConfig::default();
        config.extractor.excerpt_chars = 0;
        assert!(matches!(
            DocumentPipeline::regex_only(config),
            Err(ExtractorError::Config(_))
        ));
    }

    #[test]
    fn test_merge_prefers_robust_values() {
        let mut fields = BTreeMap::new();
        fields.insert(
            "fundSize".to_string(),
            ExtractionResult::from_llm(FieldValue::Number(60000.0)),
        );
        fields.insert(
            "portfolioCompanies".to_string(),
            ExtractionResult::from_llm(FieldValue::List(vec!["Acme GmbH".into()])),
        );
        fields.insert("irr".to_string(), ExtractionResult::failed());
        let heuristic = FundMetrics {
            fund_size: Some(50000.0),
            irr: Some(11.0),
            ..Default::default()
        };

        let merged = merge_fields(&fields, &heuristic);
        assert_eq!(merged.fund_size, Some(60000.0));
        assert_eq!(merged.irr, Some(11.0));
        assert_eq!(merged.portfolio_companies[0].name.as_deref(), Some("Acme GmbH"));
    }
}
