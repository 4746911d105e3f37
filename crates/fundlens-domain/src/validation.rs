//! Validation findings over extracted fund metrics

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Data contradicts itself in a way that cannot be right
    Critical,
    /// Identity or cross-check violated
    High,
    /// Implausible but possible
    Medium,
    /// Cosmetic
    Low,
}

impl Severity {
    /// Get the severity name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed consistency or range rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    /// Field (or rule family) the error refers to
    pub field: String,
    /// Human-readable message
    pub message: String,
    /// Severity
    pub severity: Severity,
    /// Value the rule expected, when it computes one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_value: Option<f64>,
    /// Value actually found
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_value: Option<f64>,
}

impl ValidationError {
    /// Create an error without expected/actual values
    pub fn new(field: impl Into<String>, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            severity,
            expected_value: None,
            actual_value: None,
        }
    }

    /// Attach the expected and actual values
    pub fn with_values(mut self, expected: f64, actual: f64) -> Self {
        self.expected_value = Some(expected);
        self.actual_value = Some(actual);
        self
    }
}

/// A suspicious but individually valid value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationWarning {
    /// Field the warning refers to
    pub field: String,
    /// Human-readable message
    pub message: String,
    /// What the reader should check
    pub suggestion: String,
}

impl ValidationWarning {
    /// Create a warning
    pub fn new(
        field: impl Into<String>,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }
}

/// Outcome of a validation pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    /// No errors were found (warnings do not count)
    pub is_valid: bool,
    /// Penalty-derived confidence in [0, 1]
    pub confidence: f64,
    /// Errors
    pub errors: Vec<ValidationError>,
    /// Warnings
    pub warnings: Vec<ValidationWarning>,
    /// Distinct suggestions collected from the warnings
    pub suggestions: Vec<String>,
}

impl ValidationReport {
    /// Count errors at a given severity
    pub fn count(&self, severity: Severity) -> usize {
        self.errors.iter().filter(|e| e.severity == severity).count()
    }
}
