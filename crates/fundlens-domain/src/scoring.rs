//! Confidence scoring
//!
//! Blends a financial score, a portfolio score and a data-quality score into
//! one overall confidence. Every sub-scorer has the same shape: a base score
//! plus additive bonuses, capped at 1.0.
//!
//! The blend weights are historical constants with no statistical basis; they
//! live in [`ScoringWeights`] so callers can override them.

use crate::PortfolioCompany;
use serde::{Deserialize, Serialize};
use tracing::error;

/// Default weight of the financial sub-score
pub const FINANCIAL_WEIGHT: f64 = 0.4;

/// Default weight of the portfolio sub-score
pub const PORTFOLIO_WEIGHT: f64 = 0.3;

/// Default weight of the data-quality sub-score
pub const DATA_QUALITY_WEIGHT: f64 = 0.3;

/// Weight table for confidence scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Weight of the financial sub-score in the overall blend
    pub financial: f64,
    /// Weight of the portfolio sub-score in the overall blend
    pub portfolio: f64,
    /// Weight of the data-quality sub-score in the overall blend
    pub data_quality: f64,
    /// Weight of completeness inside the data-quality sub-score
    pub completeness: f64,
    /// Weight of accuracy inside the data-quality sub-score
    pub accuracy: f64,
    /// Weight of consistency inside the data-quality sub-score
    pub consistency: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            financial: FINANCIAL_WEIGHT,
            portfolio: PORTFOLIO_WEIGHT,
            data_quality: DATA_QUALITY_WEIGHT,
            completeness: 0.4,
            accuracy: 0.4,
            consistency: 0.2,
        }
    }
}

impl ScoringWeights {
    /// Validate the weight table
    ///
    /// Every weight must be finite and non-negative, and the overall blend
    /// needs at least one positive weight.
    pub fn validate(&self) -> Result<(), String> {
        let weights = [
            ("financial", self.financial),
            ("portfolio", self.portfolio),
            ("data_quality", self.data_quality),
            ("completeness", self.completeness),
            ("accuracy", self.accuracy),
            ("consistency", self.consistency),
        ];
        for (name, w) in weights {
            if !w.is_finite() || w < 0.0 {
                return Err(format!("{} must be a non-negative number, got {}", name, w));
            }
        }
        if self.financial + self.portfolio + self.data_quality <= 0.0 {
            return Err("financial, portfolio and data_quality weights sum to zero".to_string());
        }
        Ok(())
    }
}

/// IRR figures as reported
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IrrFigures {
    /// Gross IRR, percent
    pub gross: Option<f64>,
    /// Net IRR, percent
    pub net: Option<f64>,
    /// Description of the calculation method
    pub calculation: Option<String>,
}

/// MOIC figures as reported
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MoicFigures {
    /// Gross MOIC
    pub gross: Option<f64>,
    /// Net MOIC
    pub net: Option<f64>,
    /// Per-bucket breakdown (label, multiple)
    pub breakdown: Vec<(String, f64)>,
}

/// TVPI and its components
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TvpiFigures {
    /// Total value to paid-in
    pub total: Option<f64>,
    /// Distributed to paid-in
    pub dpi: Option<f64>,
    /// Residual value to paid-in
    pub rvpi: Option<f64>,
    /// The TVPI identity was checked and held
    pub validated: bool,
}

/// Financial inputs to scoring
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FinancialMetrics {
    /// IRR
    pub irr: IrrFigures,
    /// MOIC
    pub moic: MoicFigures,
    /// TVPI
    pub tvpi: TvpiFigures,
}

/// Aggregate figures for one sector
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SectorSummary {
    /// Sector label
    pub sector: String,
    /// Number of companies
    pub count: usize,
    /// Capital invested
    pub total_invested: f64,
    /// Current value
    pub current_value: f64,
    /// Average return
    pub average_return: Option<f64>,
    /// Best performing companies
    pub top_performers: Vec<String>,
    /// Worst performing companies
    pub underperformers: Vec<String>,
}

/// Aggregate figures for one investment stage
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StageSummary {
    /// Stage label
    pub stage: String,
    /// Number of companies
    pub count: usize,
    /// Capital invested
    pub total_invested: f64,
    /// Current value
    pub current_value: f64,
    /// Average return
    pub average_return: Option<f64>,
    /// Share of successful exits in [0, 1]
    pub success_rate: Option<f64>,
    /// Average holding period in years
    pub average_holding_period: f64,
}

/// Portfolio inputs to scoring
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PortfolioAnalysis {
    /// Individual companies
    pub companies: Vec<PortfolioCompany>,
    /// Sector rollups
    pub sectors: Vec<SectorSummary>,
    /// Stage rollups
    pub stages: Vec<StageSummary>,
}

/// Data-quality inputs to scoring, each in [0, 1]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DataQualityMetrics {
    /// Share of expected fields that were found
    pub completeness: f64,
    /// How far the values can be trusted
    pub accuracy: f64,
    /// How well the values agree with each other
    pub consistency: f64,
}

/// Overall confidence with its sub-scores, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceScore {
    /// Weighted blend, clamped to 1.0
    pub overall: f64,
    /// Financial sub-score
    pub financial: f64,
    /// Portfolio sub-score
    pub portfolio: f64,
    /// Data-quality sub-score
    pub data_quality: f64,
}

impl ConfidenceScore {
    /// All-zero score used when scoring cannot complete
    pub fn zero() -> Self {
        Self::default()
    }
}

/// Compute the confidence score with the default weights
///
/// Never fails: if any input is not a finite number the whole result
/// degrades to [`ConfidenceScore::zero`].
pub fn calculate_confidence_score(
    financial: &FinancialMetrics,
    portfolio: &PortfolioAnalysis,
    quality: &DataQualityMetrics,
) -> ConfidenceScore {
    calculate_confidence_score_with(financial, portfolio, quality, &ScoringWeights::default())
}

/// Compute the confidence score with an explicit weight table
pub fn calculate_confidence_score_with(
    financial: &FinancialMetrics,
    portfolio: &PortfolioAnalysis,
    quality: &DataQualityMetrics,
    weights: &ScoringWeights,
) -> ConfidenceScore {
    match try_score(financial, portfolio, quality, weights) {
        Ok(score) => score,
        Err(reason) => {
            error!(reason = %reason, "Failed to calculate confidence score");
            ConfidenceScore::zero()
        }
    }
}

fn try_score(
    financial: &FinancialMetrics,
    portfolio: &PortfolioAnalysis,
    quality: &DataQualityMetrics,
    weights: &ScoringWeights,
) -> Result<ConfidenceScore, String> {
    let financial_score = finite("financial", financial_confidence(financial))?;
    let portfolio_score = finite("portfolio", portfolio_confidence(portfolio))?;
    let quality_score =
        finite("data quality", data_quality_confidence(quality, weights))?.clamp(0.0, 1.0);

    let overall = financial_score * weights.financial
        + portfolio_score * weights.portfolio
        + quality_score * weights.data_quality;

    Ok(ConfidenceScore {
        overall: finite("overall", overall)?.clamp(0.0, 1.0),
        financial: financial_score,
        portfolio: portfolio_score,
        data_quality: quality_score,
    })
}

fn finite(label: &str, value: f64) -> Result<f64, String> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("{} score is not finite", label))
    }
}

fn positive(value: Option<f64>) -> bool {
    value.is_some_and(|v| v > 0.0)
}

fn mean(total: f64, factors: usize) -> f64 {
    if factors > 0 {
        total / factors as f64
    } else {
        0.0
    }
}

/// Average of the IRR, MOIC and TVPI scores for the metrics that are present
pub fn financial_confidence(metrics: &FinancialMetrics) -> f64 {
    let mut score = 0.0;
    let mut factors = 0;

    if positive(metrics.irr.gross) {
        score += score_irr(&metrics.irr);
        factors += 1;
    }
    if positive(metrics.moic.gross) {
        score += score_moic(&metrics.moic);
        factors += 1;
    }
    if positive(metrics.tvpi.total) {
        score += score_tvpi(&metrics.tvpi);
        factors += 1;
    }

    mean(score, factors)
}

/// Average of the company, sector and stage scores for the parts that are present
pub fn portfolio_confidence(analysis: &PortfolioAnalysis) -> f64 {
    let mut score = 0.0;
    let mut factors = 0;

    if !analysis.companies.is_empty() {
        score += score_companies(&analysis.companies);
        factors += 1;
    }
    if !analysis.sectors.is_empty() {
        score += score_sectors(&analysis.sectors);
        factors += 1;
    }
    if !analysis.stages.is_empty() {
        score += score_stages(&analysis.stages);
        factors += 1;
    }

    mean(score, factors)
}

/// Weighted sum of completeness, accuracy and consistency
pub fn data_quality_confidence(quality: &DataQualityMetrics, weights: &ScoringWeights) -> f64 {
    quality.completeness * weights.completeness
        + quality.accuracy * weights.accuracy
        + quality.consistency * weights.consistency
}

fn score_irr(irr: &IrrFigures) -> f64 {
    let mut score = 0.5;
    if positive(irr.gross) && positive(irr.net) {
        score += 0.2;
    }
    if irr
        .calculation
        .as_deref()
        .is_some_and(|c| !c.is_empty() && c != "Not available")
    {
        score += 0.2;
    }
    if irr.gross.is_some_and(|g| (-50.0..=500.0).contains(&g)) {
        score += 0.1;
    }
    f64::min(score, 1.0)
}

fn score_moic(moic: &MoicFigures) -> f64 {
    let mut score = 0.5;
    if positive(moic.gross) && positive(moic.net) {
        score += 0.2;
    }
    if !moic.breakdown.is_empty() {
        score += 0.2;
    }
    if moic.gross.is_some_and(|g| (0.0..=100.0).contains(&g)) {
        score += 0.1;
    }
    f64::min(score, 1.0)
}

fn score_tvpi(tvpi: &TvpiFigures) -> f64 {
    let mut score = 0.5;
    let (total, dpi, rvpi) = (tvpi.total, tvpi.dpi, tvpi.rvpi);
    if positive(total) && dpi.is_some_and(|d| d >= 0.0) && rvpi.is_some_and(|r| r >= 0.0) {
        score += 0.2;
    }
    if tvpi.validated {
        score += 0.2;
    }
    if let (Some(total), Some(dpi), Some(rvpi)) = (total, dpi, rvpi) {
        if (dpi + rvpi - total).abs() < 0.01 {
            score += 0.1;
        }
    }
    f64::min(score, 1.0)
}

fn score_companies(companies: &[PortfolioCompany]) -> f64 {
    let total: f64 = companies
        .iter()
        .map(|c| {
            let mut s = 0.3;
            let bonuses = [
                c.name.as_deref().is_some_and(|n| !n.is_empty()),
                c.stage.as_deref().is_some_and(|n| !n.is_empty()),
                c.sector.as_deref().is_some_and(|n| !n.is_empty()),
                positive(c.investment),
                positive(c.valuation),
                positive(c.moic),
                c.irr.is_some(),
            ];
            s += 0.1 * bonuses.iter().filter(|b| **b).count() as f64;
            f64::min(s, 1.0)
        })
        .sum();
    mean(total, companies.len())
}

fn score_sectors(sectors: &[SectorSummary]) -> f64 {
    let total: f64 = sectors
        .iter()
        .map(|s| {
            let bonuses = [
                s.count > 0,
                s.total_invested > 0.0,
                s.current_value > 0.0,
                s.average_return.is_some(),
                !s.top_performers.is_empty(),
                !s.underperformers.is_empty(),
            ];
            f64::min(0.4 + 0.1 * bonuses.iter().filter(|b| **b).count() as f64, 1.0)
        })
        .sum();
    mean(total, sectors.len())
}

fn score_stages(stages: &[StageSummary]) -> f64 {
    let total: f64 = stages
        .iter()
        .map(|s| {
            let bonuses = [
                s.count > 0,
                s.total_invested > 0.0,
                s.current_value > 0.0,
                s.average_return.is_some(),
                s.success_rate.is_some_and(|r| (0.0..=1.0).contains(&r)),
                s.average_holding_period > 0.0,
            ];
            f64::min(0.4 + 0.1 * bonuses.iter().filter(|b| **b).count() as f64, 1.0)
        })
        .sum();
    mean(total, stages.len())
}
