//! Per-field extraction results

use serde::{Deserialize, Serialize};
use std::fmt;

/// Confidence assigned to a value matched by a field regex
pub const REGEX_CONFIDENCE: f64 = 0.8;

/// Confidence assigned to a value produced by the LLM alone
pub const LLM_CONFIDENCE: f64 = 0.7;

/// A typed extracted value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Numeric value
    Number(f64),
    /// Free text
    Text(String),
    /// List of strings
    List(Vec<String>),
    /// Arbitrary JSON object
    Object(serde_json::Value),
}

impl FieldValue {
    /// The numeric value, if this is a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The text value, if this is text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The list value, if this is a list
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::List(items) => f.write_str(&items.join(", ")),
            FieldValue::Object(v) => write!(f, "{}", v),
        }
    }
}

/// How a field value was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMethod {
    /// Matched by one of the field's regex patterns
    Regex,
    /// Produced by the LLM after regex found nothing usable
    Llm,
    /// Neither strategy produced a value
    Failed,
}

impl ExtractionMethod {
    /// Get the method name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMethod::Regex => "regex",
            ExtractionMethod::Llm => "llm",
            ExtractionMethod::Failed => "failed",
        }
    }
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// LLM cross-check attached to an extraction result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldValidation {
    /// The field is believed to be absent from the document
    pub is_missing: bool,
    /// The LLM's reasoning, or a note on why no check happened
    pub llm_confirmation: String,
    /// Value the LLM considers correct
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_value: Option<FieldValue>,
}

impl FieldValidation {
    /// Validation note for results produced without an LLM cross-check
    pub fn note(is_missing: bool, message: impl Into<String>, suggested: Option<FieldValue>) -> Self {
        Self {
            is_missing,
            llm_confirmation: message.into(),
            suggested_value: suggested,
        }
    }
}

/// Outcome of extracting one field
///
/// Invariant: `method == Failed` implies `value.is_none()` and `confidence == 0.0`.
/// The constructors are the only way this crate builds results, which keeps
/// that invariant intact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    /// Extracted value
    pub value: Option<FieldValue>,
    /// Confidence in [0, 1]
    pub confidence: f64,
    /// Provenance
    pub method: ExtractionMethod,
    /// LLM cross-check
    pub validation: FieldValidation,
}

impl ExtractionResult {
    /// A regex hit
    pub fn from_regex(value: FieldValue, validation: FieldValidation) -> Self {
        Self {
            value: Some(value),
            confidence: REGEX_CONFIDENCE,
            method: ExtractionMethod::Regex,
            validation,
        }
    }

    /// A value produced by the LLM
    pub fn from_llm(value: FieldValue) -> Self {
        Self {
            value: Some(value),
            confidence: LLM_CONFIDENCE,
            method: ExtractionMethod::Llm,
            validation: FieldValidation::note(false, "LLM successfully extracted field", None),
        }
    }

    /// Neither strategy produced a value
    pub fn failed() -> Self {
        Self {
            value: None,
            confidence: 0.0,
            method: ExtractionMethod::Failed,
            validation: FieldValidation::note(true, "Field not found in document", None),
        }
    }

    /// Whether a value was produced
    pub fn is_success(&self) -> bool {
        self.method != ExtractionMethod::Failed
    }
}
