//! Validate command implementation.

use crate::cli::ValidateArgs;
use crate::config::Config;
use crate::error::CliError;
use crate::output::Formatter;
use anyhow::Context;
use fundlens_domain::FundMetrics;
use fundlens_validator::{DataValidator, ValidationPolicy};

use super::read_document;

/// Execute the validate command.
///
/// Returns whether the metrics passed validation.
pub fn execute_validate(args: ValidateArgs, config: &Config, formatter: &Formatter) -> anyhow::Result<bool> {
    let json = read_document(&args.file)?;
    let metrics: FundMetrics = serde_json::from_str(&json)
        .with_context(|| format!("{} is not a fund metrics document", args.file.display()))?;

    let policy = if args.strict {
        ValidationPolicy::strict()
    } else if args.lenient {
        ValidationPolicy::lenient()
    } else {
        config.pipeline.validation.clone()
    };
    let validator = DataValidator::new(policy).map_err(CliError::from)?;
    let report = validator.validate_all(&metrics);

    println!("{}", formatter.format_validation(&report)?);
    Ok(report.is_valid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_metrics(dir: &TempDir, json: &str) -> PathBuf {
        let path = dir.path().join("metrics.json");
        fs::write(&path, json).unwrap();
        path
    }

    fn validate(file: PathBuf) -> anyhow::Result<bool> {
        let args = ValidateArgs {
            file,
            strict: false,
            lenient: false,
        };
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        execute_validate(args, &Config::default(), &formatter)
    }

    #[test]
    fn test_tvpi_mismatch_fails() {
        let dir = TempDir::new().unwrap();
        let path = write_metrics(&dir, r#"{"tvpi": 2.0, "dpi": 0.8, "rvpi": 1.3}"#);
        assert!(!validate(path).unwrap());
    }

    #[test]
    fn test_consistent_metrics_pass() {
        let dir = TempDir::new().unwrap();
        let path = write_metrics(
            &dir,
            r#"{"fundSize": 50000, "cumulativeCalledCapital": 30000, "fundNAV": 42000, "tvpi": 1.8, "dpi": 0.5, "rvpi": 1.3}"#,
        );
        assert!(validate(path).unwrap());
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = write_metrics(&dir, "[1, 2, 3]");
        let err = validate(path).unwrap_err();
        assert!(err.to_string().contains("not a fund metrics document"));
    }
}
