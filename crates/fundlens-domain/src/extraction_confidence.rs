//! Field-level confidence for an extraction run
//!
//! Scores each extracted field by plausibility of its value, blends them with
//! per-field importance weights, and maps the result onto a quality tier with
//! matching recommendations.

use crate::{DocumentType, FundMetrics};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Weight used for fields without an explicit importance weight
const DEFAULT_FIELD_WEIGHT: f64 = 0.1;

/// Fields below this confidence get a "verify" recommendation
const LOW_FIELD_CONFIDENCE: f64 = 0.5;

/// Coarse quality tier of an extraction run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    /// Overall confidence at least 0.8
    High,
    /// Overall confidence at least 0.6
    Medium,
    /// Overall confidence at least 0.3
    Low,
    /// Anything below
    Failed,
}

impl QualityTier {
    /// Map an overall confidence onto a tier
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.8 {
            QualityTier::High
        } else if confidence >= 0.6 {
            QualityTier::Medium
        } else if confidence >= 0.3 {
            QualityTier::Low
        } else {
            QualityTier::Failed
        }
    }

    /// Get the tier name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityTier::High => "high",
            QualityTier::Medium => "medium",
            QualityTier::Low => "low",
            QualityTier::Failed => "failed",
        }
    }

    fn recommendation(&self) -> &'static str {
        match self {
            QualityTier::High => "Extraction quality is high - proceed with confidence",
            QualityTier::Medium => "Extraction quality is medium - review critical fields",
            QualityTier::Low => "Extraction quality is low - manual review recommended",
            QualityTier::Failed => "Extraction failed - manual processing required",
        }
    }

    fn fallback_strategies(&self) -> &'static [&'static str] {
        match self {
            QualityTier::High => &["No fallback needed - high confidence extraction"],
            QualityTier::Medium => &[
                "Use alternative extraction methods for low-confidence fields",
                "Cross-reference with source document",
                "Apply data validation rules",
            ],
            QualityTier::Low => &[
                "Manual data entry for critical fields",
                "Use template-based extraction",
                "Request document resubmission in better format",
            ],
            QualityTier::Failed => &[
                "Complete manual processing required",
                "Contact document provider for clarification",
                "Use alternative document sources",
            ],
        }
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Confidence assessment of one extraction run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionConfidence {
    /// Importance-weighted mean of the field confidences
    pub overall_confidence: f64,
    /// Per-field plausibility confidence
    pub field_confidences: BTreeMap<String, f64>,
    /// Quality tier derived from the overall confidence
    pub extraction_quality: QualityTier,
    /// Things a reviewer should look at
    pub recommendations: Vec<String>,
    /// What to do if the tier is not good enough
    pub fallback_strategies: Vec<String>,
}

impl ExtractionConfidence {
    /// Assess extracted fund metrics
    pub fn assess(metrics: &FundMetrics, document_type: DocumentType) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert("fundSize".to_string(), numeric_confidence(metrics.fund_size));
        fields.insert("fundNAV".to_string(), numeric_confidence(metrics.fund_nav));
        fields.insert("irr".to_string(), percentage_confidence(metrics.irr));
        fields.insert("moic".to_string(), ratio_confidence(metrics.moic));
        fields.insert("tvpi".to_string(), ratio_confidence(metrics.tvpi));

        if !metrics.portfolio_companies.is_empty() {
            let named = metrics
                .portfolio_companies
                .iter()
                .filter(|c| c.name.as_deref().is_some_and(|n| !n.is_empty()))
                .count();
            fields.insert(
                "portfolioCompanies".to_string(),
                named as f64 / metrics.portfolio_companies.len() as f64,
            );
        }

        if document_type == DocumentType::LpCapitalAccount {
            fields.insert(
                "totalCommitments".to_string(),
                numeric_confidence(metrics.total_commitments),
            );
            fields.insert(
                "cumulativeCalledCapital".to_string(),
                numeric_confidence(metrics.cumulative_called_capital),
            );
        }

        let overall = weighted_overall(&fields);
        let tier = QualityTier::from_confidence(overall);

        let mut recommendations: Vec<String> = fields
            .iter()
            .filter(|(_, c)| **c < LOW_FIELD_CONFIDENCE)
            .map(|(field, c)| {
                format!("Verify {} extraction - low confidence ({:.0}%)", field, c * 100.0)
            })
            .collect();
        recommendations.push(tier.recommendation().to_string());

        Self {
            overall_confidence: overall,
            field_confidences: fields,
            extraction_quality: tier,
            recommendations,
            fallback_strategies: tier
                .fallback_strategies()
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

fn field_weight(field: &str) -> f64 {
    match field {
        "fundSize" | "fundNAV" | "portfolioCompanies" => 0.2,
        "irr" | "moic" => 0.15,
        "tvpi" => 0.1,
        _ => DEFAULT_FIELD_WEIGHT,
    }
}

fn weighted_overall(fields: &BTreeMap<String, f64>) -> f64 {
    let (sum, total) = fields.iter().fold((0.0, 0.0), |(sum, total), (field, c)| {
        let w = field_weight(field);
        (sum + c * w, total + w)
    });
    if total > 0.0 {
        sum / total
    } else {
        0.0
    }
}

/// Plausibility of a monetary amount
pub fn numeric_confidence(value: Option<f64>) -> f64 {
    match value {
        None => 0.0,
        Some(v) if v < 0.0 => 0.5,
        Some(v) if v == 0.0 => 0.7,
        Some(_) => 0.9,
    }
}

/// Plausibility of a percentage such as IRR
pub fn percentage_confidence(value: Option<f64>) -> f64 {
    match value {
        None => 0.0,
        Some(v) if v < -100.0 => 0.2,
        Some(v) if v > 1000.0 => 0.3,
        Some(v) if (-50.0..=100.0).contains(&v) => 0.9,
        Some(_) => 0.6,
    }
}

/// Plausibility of a multiple such as MOIC or TVPI
pub fn ratio_confidence(value: Option<f64>) -> f64 {
    match value {
        None => 0.0,
        Some(v) if v < 0.0 => 0.2,
        Some(v) if v > 100.0 => 0.4,
        Some(v) if v <= 10.0 => 0.9,
        Some(_) => 0.7,
    }
}
