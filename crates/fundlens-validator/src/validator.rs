//! Fund metric validation logic

use crate::{ValidationPolicy, ValidatorError};
use fundlens_domain::{
    FundMetrics, PortfolioCompany, Severity, ValidationError, ValidationReport, ValidationWarning,
};
use tracing::debug;

/// Findings accumulated by one rule pass
#[derive(Debug, Default)]
struct Findings {
    errors: Vec<ValidationError>,
    warnings: Vec<ValidationWarning>,
}

impl Findings {
    fn extend(&mut self, other: Findings) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

/// The DataValidator checks extracted metrics for internal consistency
#[derive(Debug, Clone)]
pub struct DataValidator {
    policy: ValidationPolicy,
}

impl DataValidator {
    /// Create a validator with the given policy
    ///
    /// # Errors
    ///
    /// Returns `ValidatorError::Config` if the policy does not validate.
    pub fn new(policy: ValidationPolicy) -> Result<Self, ValidatorError> {
        policy.validate().map_err(ValidatorError::Config)?;
        Ok(Self { policy })
    }

    /// Create a validator with the default policy
    pub fn default_policy() -> Self {
        Self {
            policy: ValidationPolicy::default(),
        }
    }

    /// Active policy
    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    /// Validate fund-level metrics
    ///
    /// Rules:
    /// 1. TVPI must equal DPI + RVPI within tolerance (high error)
    /// 2. NAV should be close to the sum of portfolio valuations (warning)
    /// 3. Called capital must not exceed commitments (critical error), and
    ///    a deployment rate above the threshold raises a warning
    /// 4. IRR above the maximum is a medium error, below the minimum a warning
    pub fn validate_fund_metrics(&self, data: &FundMetrics) -> ValidationReport {
        self.report(self.fund_rules(data))
    }

    /// Validate each portfolio company
    pub fn validate_portfolio_companies(&self, companies: &[PortfolioCompany]) -> ValidationReport {
        self.report(self.company_rules(companies))
    }

    /// Cross-validate fund figures against the portfolio list
    pub fn cross_validate(
        &self,
        fund: &FundMetrics,
        companies: &[PortfolioCompany],
    ) -> ValidationReport {
        self.report(self.cross_rules(fund, companies))
    }

    /// Run all three passes and merge the findings into one report
    pub fn validate_all(&self, data: &FundMetrics) -> ValidationReport {
        let mut findings = self.fund_rules(data);
        findings.extend(self.company_rules(&data.portfolio_companies));
        findings.extend(self.cross_rules(data, &data.portfolio_companies));
        self.report(findings)
    }

    fn fund_rules(&self, data: &FundMetrics) -> Findings {
        let p = &self.policy;
        let mut f = Findings::default();

        // 1. TVPI = DPI + RVPI
        if let (Some(tvpi), Some(dpi), Some(rvpi)) = (data.tvpi, data.dpi, data.rvpi) {
            let expected = dpi + rvpi;
            if (tvpi - expected).abs() > p.tvpi_tolerance {
                f.errors.push(
                    ValidationError::new(
                        "tvpi",
                        format!(
                            "TVPI ({}) does not equal DPI ({}) + RVPI ({}) = {}",
                            tvpi, dpi, rvpi, expected
                        ),
                        Severity::High,
                    )
                    .with_values(expected, tvpi),
                );
            }
        }

        // 2. NAV vs portfolio total, only once some company carries a valuation
        if let Some(nav) = data.fund_nav.filter(|n| *n != 0.0) {
            if data.portfolio_companies.iter().any(|c| c.valuation.is_some()) {
                let total = data.portfolio_valuation_sum();
                if (nav - total).abs() > nav * p.nav_warning_ratio {
                    f.warnings.push(ValidationWarning::new(
                        "fundNAV",
                        format!(
                            "Fund NAV ({}) differs significantly from portfolio total ({})",
                            nav, total
                        ),
                        "Verify portfolio company valuations are current and complete",
                    ));
                }
            }
        }

        // 3. Capital deployment
        let commitments = data.commitments().filter(|c| *c != 0.0);
        let called = data.cumulative_called_capital.filter(|c| *c != 0.0);
        if let (Some(commitments), Some(called)) = (commitments, called) {
            let rate = called / commitments;
            if rate > 1.0 {
                f.errors.push(
                    ValidationError::new(
                        "cumulativeCalledCapital",
                        format!(
                            "Called capital ({}) exceeds total commitments ({})",
                            called, commitments
                        ),
                        Severity::Critical,
                    )
                    .with_values(commitments, called),
                );
            }
            if rate > p.deployment_warning_rate {
                f.warnings.push(ValidationWarning::new(
                    "deploymentRate",
                    format!("Fund is {:.1}% deployed", rate * 100.0),
                    "Consider fund lifecycle stage and remaining investment capacity",
                ));
            }
        }

        // 4. IRR sanity
        if let Some(irr) = data.irr.filter(|i| *i != 0.0) {
            if irr > p.irr_max {
                let mut error = ValidationError::new(
                    "irr",
                    format!("IRR of {}% seems unreasonably high", irr),
                    Severity::Medium,
                );
                error.actual_value = Some(irr);
                f.errors.push(error);
            }
            if irr < p.irr_min {
                f.warnings.push(ValidationWarning::new(
                    "irr",
                    format!("IRR of {}% indicates significant losses", irr),
                    "Verify IRR calculation and fund performance",
                ));
            }
        }

        f
    }

    fn company_rules(&self, companies: &[PortfolioCompany]) -> Findings {
        let p = &self.policy;
        let mut f = Findings::default();

        for (index, company) in companies.iter().enumerate() {
            let moic = company.moic.filter(|m| *m != 0.0);
            let investment = company.investment.filter(|i| *i != 0.0);
            let valuation = company.valuation.filter(|v| *v != 0.0);
            if let (Some(moic), Some(investment), Some(valuation)) = (moic, investment, valuation) {
                let expected = valuation / investment;
                if (moic - expected).abs() > p.moic_tolerance {
                    f.errors.push(
                        ValidationError::new(
                            format!("portfolioCompanies[{}].moic", index),
                            format!(
                                "MOIC ({}) doesn't match valuation/investment ratio ({:.2})",
                                moic, expected
                            ),
                            Severity::Medium,
                        )
                        .with_values(expected, moic),
                    );
                }
            }

            if let Some(irr) = company.irr.filter(|i| *i != 0.0) {
                if irr > p.company_irr_max || irr < p.company_irr_min {
                    f.warnings.push(ValidationWarning::new(
                        format!("portfolioCompanies[{}].irr", index),
                        format!("IRR of {}% seems unusual", irr),
                        "Verify IRR calculation methodology",
                    ));
                }
            }

            // A bare listing from the portfolio table is not an incomplete profile
            if company.is_name_only() {
                continue;
            }
            let blank = |v: &Option<String>| v.as_deref().is_none_or(str::is_empty);
            if blank(&company.name) || blank(&company.stage) || blank(&company.sector) {
                f.warnings.push(ValidationWarning::new(
                    format!("portfolioCompanies[{}]", index),
                    "Missing critical company information",
                    "Complete company profile data",
                ));
            }
        }

        f
    }

    fn cross_rules(&self, fund: &FundMetrics, companies: &[PortfolioCompany]) -> Findings {
        let mut f = Findings::default();
        if companies.is_empty() {
            return f;
        }

        // Names alone give no portfolio total to compare against
        let valued = companies.iter().any(|c| c.valuation.is_some());
        if let Some(nav) = fund.fund_nav.filter(|n| *n != 0.0 && valued) {
            let total: f64 = companies.iter().map(|c| c.valuation.unwrap_or(0.0)).sum();
            let percent = (nav - total).abs() / nav * 100.0;
            if percent > self.policy.nav_cross_check_percent {
                f.errors.push(
                    ValidationError::new(
                        "cross_validation",
                        format!(
                            "Fund NAV ({}) differs by {:.1}% from portfolio total ({})",
                            nav, percent, total
                        ),
                        Severity::High,
                    )
                    .with_values(nav, total),
                );
            }
        }

        if let Some(expected) = fund.portfolio_company_count.filter(|c| *c != 0) {
            let actual = companies.len();
            if actual != expected {
                f.warnings.push(ValidationWarning::new(
                    "portfolio_company_count",
                    format!(
                        "Portfolio company count mismatch: expected {}, found {}",
                        expected, actual
                    ),
                    "Verify all portfolio companies are included in the report",
                ));
            }
        }

        f
    }

    /// Penalty-derived confidence, floored at zero
    fn confidence(&self, errors: &[ValidationError], warnings: &[ValidationWarning]) -> f64 {
        let p = &self.policy;
        let error_score: f64 = errors
            .iter()
            .map(|e| match e.severity {
                Severity::Critical => p.critical_weight,
                Severity::High => p.high_weight,
                Severity::Medium => p.medium_weight,
                Severity::Low => p.low_weight,
            })
            .sum();
        let warning_score = warnings.len() as f64 * p.warning_weight;
        (1.0 - (error_score + warning_score)).max(0.0)
    }

    fn report(&self, findings: Findings) -> ValidationReport {
        let Findings { errors, warnings } = findings;
        let confidence = self.confidence(&errors, &warnings);

        let mut suggestions: Vec<String> = Vec::new();
        for w in &warnings {
            if !suggestions.contains(&w.suggestion) {
                suggestions.push(w.suggestion.clone());
            }
        }

        debug!(
            errors = errors.len(),
            warnings = warnings.len(),
            confidence,
            "Validation complete"
        );

        ValidationReport {
            is_valid: errors.is_empty(),
            confidence,
            errors,
            warnings,
            suggestions,
        }
    }
}

impl Default for DataValidator {
    fn default() -> Self {
        Self::default_policy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn validator() -> DataValidator {
        DataValidator::default_policy()
    }

    fn company(name: &str, valuation: f64) -> PortfolioCompany {
        PortfolioCompany {
            name: Some(name.to_string()),
            sector: Some("Software".to_string()),
            stage: Some("Seed".to_string()),
            valuation: Some(valuation),
            ..Default::default()
        }
    }

    #[test]
    fn test_tvpi_identity_violation() {
        let metrics = FundMetrics {
            tvpi: Some(2.0),
            dpi: Some(0.8),
            rvpi: Some(1.3),
            ..Default::default()
        };
        let report = validator().validate_fund_metrics(&metrics);

        assert_eq!(report.errors.len(), 1);
        let error = &report.errors[0];
        assert_eq!(error.severity, Severity::High);
        assert_eq!(error.field, "tvpi");
        assert!(approx(error.expected_value.unwrap(), 2.1));
        assert_eq!(error.actual_value, Some(2.0));
        assert!(!report.is_valid);
        assert!(approx(report.confidence, 0.7));
    }

    #[test]
    fn test_tvpi_identity_holds() {
        let metrics = FundMetrics {
            tvpi: Some(2.1),
            dpi: Some(0.8),
            rvpi: Some(1.3),
            ..Default::default()
        };
        let report = validator().validate_fund_metrics(&metrics);
        assert!(report.is_valid);
        assert_eq!(report.confidence, 1.0);
    }

    #[test]
    fn test_called_exceeds_committed() {
        let metrics = FundMetrics {
            total_commitments: Some(100.0),
            cumulative_called_capital: Some(120.0),
            ..Default::default()
        };
        let report = validator().validate_fund_metrics(&metrics);

        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].severity, Severity::Critical);
        assert_eq!(report.errors[0].expected_value, Some(100.0));
        assert_eq!(report.errors[0].actual_value, Some(120.0));
        // an over-deployed fund is also past the warning threshold
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].field, "deploymentRate");
        assert_eq!(report.warnings[0].message, "Fund is 120.0% deployed");
        assert!(approx(report.confidence, 0.55));
    }

    #[test]
    fn test_commitments_fall_back_to_fund_size() {
        let metrics = FundMetrics {
            fund_size: Some(100.0),
            cumulative_called_capital: Some(97.0),
            ..Default::default()
        };
        let report = validator().validate_fund_metrics(&metrics);
        assert!(report.is_valid);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.suggestions.len(), 1);
    }

    #[test]
    fn test_nav_vs_portfolio_warning() {
        let metrics = FundMetrics {
            fund_nav: Some(1000.0),
            portfolio_companies: vec![company("A", 400.0), company("B", 400.0)],
            ..Default::default()
        };
        let report = validator().validate_fund_metrics(&metrics);
        assert!(report.is_valid);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(
            report.suggestions,
            vec!["Verify portfolio company valuations are current and complete"]
        );
    }

    #[test]
    fn test_irr_bounds() {
        let high = FundMetrics {
            irr: Some(150.0),
            ..Default::default()
        };
        let report = validator().validate_fund_metrics(&high);
        assert_eq!(report.count(Severity::Medium), 1);
        assert_eq!(report.errors[0].actual_value, Some(150.0));
        assert!(report.errors[0].expected_value.is_none());

        let low = FundMetrics {
            irr: Some(-60.0),
            ..Default::default()
        };
        let report = validator().validate_fund_metrics(&low);
        assert!(report.is_valid);
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_confidence_floors_at_zero() {
        let metrics = FundMetrics {
            total_commitments: Some(100.0),
            cumulative_called_capital: Some(200.0),
            irr: Some(500.0),
            tvpi: Some(5.0),
            dpi: Some(0.1),
            rvpi: Some(0.1),
            ..Default::default()
        };
        let report = validator().validate_all(&metrics);
        // 0.4 + 0.3 + 0.2 + 0.05 = 0.95
        assert!(approx(report.confidence, 0.05));

        let strict = DataValidator::new(ValidationPolicy::strict()).unwrap();
        let report = strict.validate_all(&metrics);
        assert_eq!(report.confidence, 0.0);
    }

    #[test]
    fn test_portfolio_company_rules() {
        let companies = vec![
            PortfolioCompany {
                name: Some("Acme GmbH".to_string()),
                sector: Some("Fintech".to_string()),
                stage: Some("Series A".to_string()),
                investment: Some(100.0),
                valuation: Some(300.0),
                moic: Some(2.5),
                irr: Some(2000.0),
            },
            PortfolioCompany::named("Beta Ltd"),
            PortfolioCompany {
                name: Some("Gamma SA".to_string()),
                investment: Some(50.0),
                ..Default::default()
            },
        ];
        let report = validator().validate_portfolio_companies(&companies);

        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].field, "portfolioCompanies[0].moic");
        assert_eq!(report.errors[0].severity, Severity::Medium);
        assert!(report.errors[0].message.contains("(3.00)"));
        let fields: Vec<&str> = report.warnings.iter().map(|w| w.field.as_str()).collect();
        assert_eq!(fields, vec!["portfolioCompanies[0].irr", "portfolioCompanies[2]"]);
    }

    #[test]
    fn test_listed_names_raise_no_warnings() {
        let metrics = FundMetrics {
            fund_nav: Some(97_500.0),
            portfolio_companies: vec![
                PortfolioCompany::named("Helio Robotics GmbH"),
                PortfolioCompany::named("Cobalt Data Ltd"),
            ],
            ..Default::default()
        };
        let report = validator().validate_all(&metrics);
        assert!(report.is_valid);
        assert!(report.warnings.is_empty());
        assert_eq!(report.confidence, 1.0);
    }

    #[test]
    fn test_cross_validation() {
        let fund = FundMetrics {
            fund_nav: Some(1000.0),
            portfolio_company_count: Some(3),
            ..Default::default()
        };
        let companies = vec![company("A", 400.0), company("B", 400.0)];
        let report = validator().cross_validate(&fund, &companies);

        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].field, "cross_validation");
        assert_eq!(report.errors[0].severity, Severity::High);
        assert_eq!(report.errors[0].message, "Fund NAV (1000) differs by 20.0% from portfolio total (800)");
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].field, "portfolio_company_count");
    }

    #[test]
    fn test_cross_validation_within_tolerance() {
        let fund = FundMetrics {
            fund_nav: Some(1000.0),
            ..Default::default()
        };
        let report = validator().cross_validate(&fund, &[company("A", 900.0)]);
        assert!(report.is_valid);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_cross_validation_skipped_without_valuations() {
        let fund = FundMetrics {
            fund_nav: Some(1000.0),
            ..Default::default()
        };
        let companies = vec![PortfolioCompany::named("Acme GmbH")];
        let report = validator().cross_validate(&fund, &companies);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_invalid_policy_rejected() {
        let policy = ValidationPolicy {
            warning_weight: -1.0,
            ..ValidationPolicy::default()
        };
        assert!(matches!(DataValidator::new(policy), Err(ValidatorError::Config(_))));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: a high-severity TVPI error is reported iff the identity gap exceeds 0.01
            #[test]
            fn test_tvpi_identity_iff(tvpi in 0.01f64..10.0, dpi in 0.0f64..5.0, rvpi in 0.0f64..5.0) {
                let metrics = FundMetrics {
                    tvpi: Some(tvpi),
                    dpi: Some(dpi),
                    rvpi: Some(rvpi),
                    ..Default::default()
                };
                let report = DataValidator::default_policy().validate_fund_metrics(&metrics);
                let flagged = report.errors.iter().any(|e| e.field == "tvpi" && e.severity == Severity::High);
                prop_assert_eq!(flagged, (tvpi - (dpi + rvpi)).abs() > 0.01);
            }

            /// Property: confidence always stays in [0, 1]
            #[test]
            fn test_confidence_bounded(
                called in 0.0f64..500.0,
                committed in 1.0f64..500.0,
                irr in -200.0f64..500.0,
            ) {
                let metrics = FundMetrics {
                    total_commitments: Some(committed),
                    cumulative_called_capital: Some(called),
                    irr: Some(irr),
                    ..Default::default()
                };
                let report = DataValidator::default_policy().validate_all(&metrics);
                prop_assert!((0.0..=1.0).contains(&report.confidence));
                prop_assert_eq!(report.is_valid, report.errors.is_empty());
            }
        }
    }
}
