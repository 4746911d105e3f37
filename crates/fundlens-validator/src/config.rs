//! Validation policy
//!
//! Severity weights and tolerances. The defaults are historical constants and
//! reproduce earlier output exactly; nothing about them is statistically derived.

use serde::{Deserialize, Serialize};

/// Weights and tolerances used by the validator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationPolicy {
    /// Penalty per critical error
    pub critical_weight: f64,

    /// Penalty per high-severity error
    pub high_weight: f64,

    /// Penalty per medium-severity error
    pub medium_weight: f64,

    /// Penalty per low-severity error
    pub low_weight: f64,

    /// Penalty per warning
    pub warning_weight: f64,

    /// Allowed absolute gap in the TVPI identity
    pub tvpi_tolerance: f64,

    /// NAV vs portfolio gap (fraction of NAV) that raises a warning
    pub nav_warning_ratio: f64,

    /// NAV vs portfolio gap (percent of NAV) that raises a cross-validation error
    pub nav_cross_check_percent: f64,

    /// Deployment rate above which a warning is raised
    pub deployment_warning_rate: f64,

    /// Fund IRR above this is an error
    pub irr_max: f64,

    /// Fund IRR below this is a warning
    pub irr_min: f64,

    /// Allowed gap between a company's MOIC and valuation/investment
    pub moic_tolerance: f64,

    /// Company IRR above this is a warning
    pub company_irr_max: f64,

    /// Company IRR below this is a warning
    pub company_irr_min: f64,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            critical_weight: 0.4,
            high_weight: 0.3,
            medium_weight: 0.2,
            low_weight: 0.1,
            warning_weight: 0.05,
            tvpi_tolerance: 0.01,
            nav_warning_ratio: 0.1,
            nav_cross_check_percent: 15.0,
            deployment_warning_rate: 0.95,
            irr_max: 100.0,
            irr_min: -50.0,
            moic_tolerance: 0.1,
            company_irr_max: 1000.0,
            company_irr_min: -100.0,
        }
    }
}

impl ValidationPolicy {
    /// Strict preset: tighter tolerances and heavier warnings
    pub fn strict() -> Self {
        Self {
            warning_weight: 0.1,
            nav_warning_ratio: 0.05,
            nav_cross_check_percent: 10.0,
            deployment_warning_rate: 0.9,
            moic_tolerance: 0.05,
            ..Self::default()
        }
    }

    /// Lenient preset: looser tolerances for hand-typed or rounded reports
    pub fn lenient() -> Self {
        Self {
            warning_weight: 0.02,
            tvpi_tolerance: 0.05,
            nav_warning_ratio: 0.2,
            nav_cross_check_percent: 25.0,
            deployment_warning_rate: 0.99,
            moic_tolerance: 0.25,
            ..Self::default()
        }
    }

    /// Validate the policy
    pub fn validate(&self) -> Result<(), String> {
        let weights = [
            ("critical_weight", self.critical_weight),
            ("high_weight", self.high_weight),
            ("medium_weight", self.medium_weight),
            ("low_weight", self.low_weight),
            ("warning_weight", self.warning_weight),
        ];
        for (name, w) in weights {
            if !(0.0..=1.0).contains(&w) {
                return Err(format!("{} must be within [0.0, 1.0], got {}", name, w));
            }
        }
        if self.tvpi_tolerance < 0.0 || self.moic_tolerance < 0.0 {
            return Err("tolerances must not be negative".to_string());
        }
        if self.irr_min >= self.irr_max {
            return Err("irr_min must be below irr_max".to_string());
        }
        if self.company_irr_min >= self.company_irr_max {
            return Err("company_irr_min must be below company_irr_max".to_string());
        }
        Ok(())
    }

    /// Load a policy from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize the policy to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        assert!(ValidationPolicy::default().validate().is_ok());
        assert!(ValidationPolicy::strict().validate().is_ok());
        assert!(ValidationPolicy::lenient().validate().is_ok());
    }

    #[test]
    fn test_default_weights() {
        let policy = ValidationPolicy::default();
        assert_eq!(policy.critical_weight, 0.4);
        assert_eq!(policy.high_weight, 0.3);
        assert_eq!(policy.medium_weight, 0.2);
        assert_eq!(policy.low_weight, 0.1);
        assert_eq!(policy.warning_weight, 0.05);
    }

    #[test]
    fn test_out_of_range_weight_rejected() {
        let policy = ValidationPolicy {
            high_weight: 1.5,
            ..ValidationPolicy::default()
        };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_inverted_irr_bounds_rejected() {
        let policy = ValidationPolicy {
            irr_min: 200.0,
            ..ValidationPolicy::default()
        };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let policy = ValidationPolicy::strict();
        let parsed = ValidationPolicy::from_toml(&policy.to_toml().unwrap()).unwrap();
        assert_eq!(policy, parsed);
        let partial = ValidationPolicy::from_toml("warning_weight = 0.0").unwrap();
        assert_eq!(partial.warning_weight, 0.0);
        assert_eq!(partial.critical_weight, 0.4);
    }
}
