//! Fundlens Validator
//!
//! Cross-checks extracted fund metrics for internal consistency.
//!
//! The validator provides:
//! - The TVPI identity check (TVPI = DPI + RVPI)
//! - NAV against the sum of portfolio valuations
//! - Capital deployment (called vs committed)
//! - IRR sanity bounds
//! - Per-company checks and fund/portfolio cross-validation
//!
//! Findings never block downstream processing; they lower a penalty-derived
//! confidence instead.
//!
//! # Examples
//!
//! ```
//! use fundlens_domain::{FundMetrics, Severity};
//! use fundlens_validator::DataValidator;
//!
//! let validator = DataValidator::default_policy();
//! let metrics = FundMetrics {
//!     tvpi: Some(2.0),
//!     dpi: Some(0.8),
//!     rvpi: Some(1.3),
//!     ..Default::default()
//! };
//! let report = validator.validate_fund_metrics(&metrics);
//! assert_eq!(report.count(Severity::High), 1);
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod validator;

pub use config::ValidationPolicy;
pub use error::ValidatorError;
pub use validator::DataValidator;
