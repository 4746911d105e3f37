//! Regex-first field extraction with LLM cross-checks and fallback

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::fields::{FieldConfig, FieldType};
use crate::parser::{
    json_to_field_value, parse_extraction_response, parse_validation_response, parse_value,
};
use crate::prompt::{PromptBuilder, VALIDATION_SCHEMA};
use fundlens_domain::traits::LlmProvider;
use fundlens_domain::{ExtractionResult, FieldValidation, FieldValue};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Placeholder provider for extractors that run without an LLM
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLlm;

impl LlmProvider for NoLlm {
    type Error = ExtractorError;

    fn generate(&self, _prompt: &str) -> Result<String, Self::Error> {
        Err(ExtractorError::Llm("no LLM provider configured".to_string()))
    }

    fn generate_structured(&self, prompt: &str, _schema: &str) -> Result<String, Self::Error> {
        self.generate(prompt)
    }
}

/// Extracts fields by regex first, falling back to an LLM
///
/// Every regex hit is cross-checked with a validation prompt when an LLM is
/// configured. A regex hit that breaks the field's rules counts as a miss.
/// LLM failures and timeouts never surface as errors; they degrade the
/// result instead.
pub struct RobustExtractor<L = NoLlm> {
    llm: Option<Arc<L>>,
    config: ExtractorConfig,
}

impl RobustExtractor<NoLlm> {
    /// Create an extractor that only uses regex patterns
    pub fn regex_only(config: ExtractorConfig) -> Self {
        Self { llm: None, config }
    }
}

impl<L> RobustExtractor<L>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
{
    /// Create an extractor backed by an LLM provider
    pub fn new(llm: L, config: ExtractorConfig) -> Self {
        Self {
            llm: Some(Arc::new(llm)),
            config,
        }
    }

    /// Get the active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Whether an LLM is configured
    pub fn has_llm(&self) -> bool {
        self.llm.is_some()
    }

    /// Extract one field
    pub async fn extract_field(&self, text: &str, field: &FieldConfig) -> ExtractionResult {
        if let Some(value) = self.try_regex(text, field) {
            debug!(field = field.key, value = %value, "Regex match");
            let validation = self.validate_with_llm(text, field, &value).await;
            return ExtractionResult::from_regex(value, validation);
        }

        match self.extract_with_llm(text, field).await {
            Some(value) => {
                debug!(field = field.key, value = %value, "LLM extraction");
                ExtractionResult::from_llm(value)
            }
            None => {
                debug!(field = field.key, "Field not found");
                ExtractionResult::failed()
            }
        }
    }

    /// Extract several fields, one after another
    pub async fn extract_fields<'f, I>(
        &self,
        text: &str,
        fields: I,
    ) -> BTreeMap<String, ExtractionResult>
    where
        I: IntoIterator<Item = &'f FieldConfig>,
    {
        let mut results = BTreeMap::new();
        for field in fields {
            let result = self.extract_field(text, field).await;
            results.insert(field.key.to_string(), result);
        }

        let found = results.values().filter(|r| r.is_success()).count();
        info!("Extracted {}/{} fields", found, results.len());
        results
    }

    /// Stage 1 and 2: first pattern whose capture passes the rules
    fn try_regex(&self, text: &str, field: &FieldConfig) -> Option<FieldValue> {
        for pattern in &field.patterns {
            let value = if field.expected_type == FieldType::Array {
                collect_names(pattern, text)
            } else {
                pattern.captures(text).and_then(|caps| {
                    let raw = caps.get(1).or_else(|| caps.get(0))?;
                    parse_value(raw.as_str(), field.expected_type)
                })
            };

            match value {
                Some(value) if field.rules.accepts(&value) => return Some(value),
                Some(value) => {
                    debug!(field = field.key, value = %value, "Regex hit rejected by rules");
                }
                None => {}
            }
        }
        None
    }

    /// Stage 3 for regex hits: ask the LLM to confirm
    async fn validate_with_llm(
        &self,
        text: &str,
        field: &FieldConfig,
        value: &FieldValue,
    ) -> FieldValidation {
        let Some(llm) = self.llm.as_ref().filter(|_| self.config.llm_validation) else {
            return FieldValidation::note(false, "LLM validation not available", Some(value.clone()));
        };

        let prompt = PromptBuilder::new(field, self.config.excerpt_chars).validation(text, value);
        let response = match self.call_llm(llm, prompt, Some(VALIDATION_SCHEMA)).await {
            Ok(response) => response,
            Err(e) => {
                warn!(field = field.key, "LLM validation failed: {}", e);
                return FieldValidation::note(false, "LLM validation failed", Some(value.clone()));
            }
        };

        match parse_validation_response(&response) {
            Ok(check) => {
                let suggested = json_to_field_value(&check.correct_value, field.expected_type)
                    .unwrap_or_else(|| value.clone());
                FieldValidation::note(!check.is_present, check.reasoning, Some(suggested))
            }
            Err(e) => {
                warn!(field = field.key, "Could not parse LLM validation: {}", e);
                FieldValidation::note(
                    true,
                    "Failed to parse LLM validation response",
                    Some(value.clone()),
                )
            }
        }
    }

    /// Stage 3 for regex misses: ask the LLM for the value
    async fn extract_with_llm(&self, text: &str, field: &FieldConfig) -> Option<FieldValue> {
        let llm = self.llm.as_ref()?;
        let prompt = PromptBuilder::new(field, self.config.excerpt_chars).extraction(text);

        let response = match self.call_llm(llm, prompt, None).await {
            Ok(response) => response,
            Err(e) => {
                warn!(field = field.key, "LLM extraction failed: {}", e);
                return None;
            }
        };

        let value = parse_extraction_response(&response, field)?;
        if field.rules.accepts(&value) {
            Some(value)
        } else {
            warn!(field = field.key, value = %value, "LLM value rejected by rules");
            None
        }
    }

    /// Call the LLM provider with timeout and retries
    ///
    /// With a schema the call goes through `generate_structured`.
    async fn call_llm(
        &self,
        llm: &Arc<L>,
        prompt: String,
        schema: Option<&'static str>,
    ) -> Result<String, ExtractorError> {
        let mut attempt = 0;
        loop {
            let result = timeout(
                self.config.llm_timeout(),
                generate_blocking(Arc::clone(llm), prompt.clone(), schema),
            )
            .await
            .map_err(|_| ExtractorError::Timeout)
            .and_then(|r| r);

            match result {
                Ok(response) => return Ok(response),
                Err(e) if attempt < self.config.max_retries => {
                    attempt += 1;
                    warn!("LLM call failed (attempt {}): {}", attempt, e);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

async fn generate_blocking<L>(
    llm: Arc<L>,
    prompt: String,
    schema: Option<&'static str>,
) -> Result<String, ExtractorError>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
{
    // Call in a blocking context since LlmProvider is not async
    tokio::task::spawn_blocking(move || {
        let response = match schema {
            Some(schema) => llm.generate_structured(&prompt, schema),
            None => llm.generate(&prompt),
        };
        response.map_err(|e| ExtractorError::Llm(e.to_string()))
    })
    .await
    .map_err(|e| ExtractorError::Llm(format!("Task join error: {}", e)))?
}

/// Every capture of the pattern, trimmed and deduplicated in document order
fn collect_names(pattern: &regex::Regex, text: &str) -> Option<FieldValue> {
    let mut names: Vec<String> = Vec::new();
    for caps in pattern.captures_iter(text) {
        if let Some(m) = caps.get(1) {
            let name = m.as_str().trim().to_string();
            if !name.is_empty() && !names.contains(&name) {
                names.push(name);
            }
        }
    }
    (!names.is_empty()).then_some(FieldValue::List(names))
}
