//! Fund and portfolio metrics extracted from a document

use serde::{Deserialize, Serialize};

/// One portfolio company as reported by the fund
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PortfolioCompany {
    /// Company name
    pub name: Option<String>,
    /// Sector label
    pub sector: Option<String>,
    /// Investment stage label
    pub stage: Option<String>,
    /// Amount invested
    pub investment: Option<f64>,
    /// Current valuation
    pub valuation: Option<f64>,
    /// Reported multiple on invested capital
    pub moic: Option<f64>,
    /// Reported IRR in percent
    pub irr: Option<f64>,
}

impl PortfolioCompany {
    /// Create a company with only a name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// True when the record carries a name and nothing else
    pub fn is_name_only(&self) -> bool {
        self.name.is_some()
            && self.sector.is_none()
            && self.stage.is_none()
            && self.investment.is_none()
            && self.valuation.is_none()
            && self.moic.is_none()
            && self.irr.is_none()
    }
}

/// Merged per-document fund metrics
///
/// Every field is optional. Monetary amounts are in the document's own unit
/// (typically kEUR); IRR is a percentage; multiples are plain ratios.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FundMetrics {
    /// Fund size as stated in the report
    pub fund_size: Option<f64>,
    /// Total LP commitments
    pub total_commitments: Option<f64>,
    /// Net asset value
    #[serde(rename = "fundNAV")]
    pub fund_nav: Option<f64>,
    /// Cumulative paid-in capital
    pub cumulative_called_capital: Option<f64>,
    /// Remaining unfunded commitments
    pub uncalled_capital: Option<f64>,
    /// Internal rate of return, percent
    pub irr: Option<f64>,
    /// Multiple on invested capital
    pub moic: Option<f64>,
    /// Total value to paid-in
    pub tvpi: Option<f64>,
    /// Distributed to paid-in
    pub dpi: Option<f64>,
    /// Residual value to paid-in
    pub rvpi: Option<f64>,
    /// Portfolio company count stated in the document
    pub portfolio_company_count: Option<usize>,
    /// Fund or company name
    pub company_name: Option<String>,
    /// Portfolio companies listed in the document
    pub portfolio_companies: Vec<PortfolioCompany>,
}

impl FundMetrics {
    /// Commitments used for deployment checks, falling back to fund size
    pub fn commitments(&self) -> Option<f64> {
        self.total_commitments.or(self.fund_size)
    }

    /// Sum of portfolio company valuations (missing valuations count as zero)
    pub fn portfolio_valuation_sum(&self) -> f64 {
        self.portfolio_companies
            .iter()
            .map(|c| c.valuation.unwrap_or(0.0))
            .sum()
    }

    /// Look up a numeric field by its camelCase name
    pub fn numeric_field(&self, name: &str) -> Option<f64> {
        match name {
            "fundSize" => self.fund_size,
            "totalCommitments" => self.total_commitments,
            "fundNAV" => self.fund_nav,
            "cumulativeCalledCapital" => self.cumulative_called_capital,
            "uncalledCapital" => self.uncalled_capital,
            "irr" => self.irr,
            "moic" => self.moic,
            "tvpi" => self.tvpi,
            "dpi" => self.dpi,
            "rvpi" => self.rvpi,
            _ => None,
        }
    }

    /// Set a numeric field by its camelCase name; returns false for unknown names
    pub fn set_numeric_field(&mut self, name: &str, value: f64) -> bool {
        let slot = match name {
            "fundSize" => &mut self.fund_size,
            "totalCommitments" => &mut self.total_commitments,
            "fundNAV" => &mut self.fund_nav,
            "cumulativeCalledCapital" => &mut self.cumulative_called_capital,
            "uncalledCapital" => &mut self.uncalled_capital,
            "irr" => &mut self.irr,
            "moic" => &mut self.moic,
            "tvpi" => &mut self.tvpi,
            "dpi" => &mut self.dpi,
            "rvpi" => &mut self.rvpi,
            _ => return false,
        };
        *slot = Some(value);
        true
    }

    /// Fill every field that is empty here from `other`
    pub fn fill_missing_from(&mut self, other: &FundMetrics) {
        macro_rules! fill {
            ($($field:ident),*) => {
                $(if self.$field.is_none() { self.$field = other.$field.clone(); })*
            };
        }
        fill!(
            fund_size,
            total_commitments,
            fund_nav,
            cumulative_called_capital,
            uncalled_capital,
            irr,
            moic,
            tvpi,
            dpi,
            rvpi,
            portfolio_company_count,
            company_name
        );
        if self.portfolio_companies.is_empty() {
            self.portfolio_companies = other.portfolio_companies.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commitments_fallback() {
        let mut m = FundMetrics {
            fund_size: Some(80.0),
            ..Default::default()
        };
        assert_eq!(m.commitments(), Some(80.0));
        m.total_commitments = Some(100.0);
        assert_eq!(m.commitments(), Some(100.0));
    }

    #[test]
    fn test_numeric_field_roundtrip_by_name() {
        let mut m = FundMetrics::default();
        assert!(m.set_numeric_field("fundNAV", 42.0));
        assert!(!m.set_numeric_field("portfolioCompanies", 1.0));
        assert_eq!(m.numeric_field("fundNAV"), Some(42.0));
        assert_eq!(m.fund_nav, Some(42.0));
    }

    #[test]
    fn test_fill_missing_keeps_existing() {
        let mut primary = FundMetrics {
            irr: Some(12.0),
            ..Default::default()
        };
        let fallback = FundMetrics {
            irr: Some(99.0),
            tvpi: Some(1.5),
            portfolio_companies: vec![PortfolioCompany::named("Acme GmbH")],
            ..Default::default()
        };
        primary.fill_missing_from(&fallback);
        assert_eq!(primary.irr, Some(12.0));
        assert_eq!(primary.tvpi, Some(1.5));
        assert_eq!(primary.portfolio_companies.len(), 1);
    }

    #[test]
    fn test_json_field_names() {
        let m = FundMetrics {
            fund_nav: Some(1.0),
            cumulative_called_capital: Some(2.0),
            ..Default::default()
        };
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["fundNAV"], 1.0);
        assert_eq!(json["cumulativeCalledCapital"], 2.0);
        let parsed: FundMetrics =
            serde_json::from_str(r#"{"totalCommitments":100,"cumulativeCalledCapital":120}"#).unwrap();
        assert_eq!(parsed.total_commitments, Some(100.0));
    }
}
