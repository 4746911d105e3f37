//! VC fund field table
//!
//! Each field pairs an ordered list of regex patterns with an LLM prompt, an
//! expected value type and min/max/required rules. Patterns are tried in
//! order; capture group 1 holds the value.

use fundlens_domain::{DocumentType, FieldValue};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Expected type of a field value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Decimal number, thousands separators allowed
    Number,
    /// Trimmed text
    String,
    /// List of names
    Array,
    /// JSON object
    Object,
}

impl FieldType {
    /// Get the type name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Number => "number",
            FieldType::String => "string",
            FieldType::Array => "array",
            FieldType::Object => "object",
        }
    }
}

/// Acceptance rules for an extracted value
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ValidationRules {
    /// Inclusive lower bound for numbers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Inclusive upper bound for numbers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// The field is expected in every document
    pub required: bool,
}

impl ValidationRules {
    fn range(min: f64, max: f64, required: bool) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            required,
        }
    }

    fn required() -> Self {
        Self {
            required: true,
            ..Self::default()
        }
    }

    /// Check a value against the rules
    pub fn accepts(&self, value: &FieldValue) -> bool {
        match value {
            FieldValue::Number(n) => {
                n.is_finite()
                    && self.min.is_none_or(|min| *n >= min)
                    && self.max.is_none_or(|max| *n <= max)
            }
            FieldValue::Text(s) => !s.trim().is_empty(),
            FieldValue::List(items) => !items.is_empty(),
            FieldValue::Object(v) => !v.is_null(),
        }
    }
}

/// Extraction configuration for one field
#[derive(Debug, Clone)]
pub struct FieldConfig {
    /// Key used in output records, e.g. `fundSize`
    pub key: &'static str,
    /// Human-readable field name used in prompts
    pub field_name: &'static str,
    /// Patterns tried in order
    pub patterns: Vec<Regex>,
    /// Instruction for the LLM
    pub llm_prompt: &'static str,
    /// Expected value type
    pub expected_type: FieldType,
    /// Acceptance rules
    pub rules: ValidationRules,
}

impl FieldConfig {
    /// Build a field config, compiling its patterns
    pub fn new(
        key: &'static str,
        field_name: &'static str,
        patterns: &[&str],
        llm_prompt: &'static str,
        expected_type: FieldType,
        rules: ValidationRules,
    ) -> Self {
        Self {
            key,
            field_name,
            patterns: patterns.iter().filter_map(|p| Regex::new(p).ok()).collect(),
            llm_prompt,
            expected_type,
            rules,
        }
    }
}

// Monetary amounts are stated in kEUR, so 1,000,000 is 1B EUR.
const MAX_AMOUNT: f64 = 1_000_000.0;
const MAX_MULTIPLE: f64 = 100.0;

static VC_FUND_FIELDS: Lazy<Vec<FieldConfig>> = Lazy::new(|| {
    vec![
        FieldConfig::new(
            "fundSize",
            "Fund Size (Total Commitments)",
            &[
                r"(?i)Total committed[:\s]*([0-9,]+\.?[0-9]*)\s*(?:kEUR|EUR|€|k€)",
                r"(?i)Total commitments[:\s]*([0-9,]+\.?[0-9]*)\s*(?:kEUR|EUR|€|k€)",
                r"(?i)Fund size[:\s]*([0-9,]+\.?[0-9]*)\s*(?:kEUR|EUR|€|k€)",
            ],
            "Extract the total fund size or total commitments in EUR",
            FieldType::Number,
            ValidationRules::range(0.0, MAX_AMOUNT, true),
        ),
        FieldConfig::new(
            "fundNAV",
            "Fund NAV (Net Asset Value)",
            &[
                r"(?i)Net asset value[:\s]*\(NAV\)[:\s]*([0-9,]+\.?[0-9]*)\s*(?:kEUR|EUR|€|k€)",
                r"(?i)\bNAV[:\s]*([0-9,]+\.?[0-9]*)\s*(?:kEUR|EUR|€|k€)",
                r"(?i)Net asset value[:\s]*([0-9,]+\.?[0-9]*)\s*(?:kEUR|EUR|€|k€)",
            ],
            "Extract the Net Asset Value (NAV) of the fund in EUR",
            FieldType::Number,
            ValidationRules::range(0.0, MAX_AMOUNT, true),
        ),
        FieldConfig::new(
            "irr",
            "IRR (Internal Rate of Return)",
            &[
                r"(?i)\bIRR[,\s]*(?:gross|net)[:\s]*([0-9]+\.?[0-9]*)\s*%",
                r"(?i)Internal rate of return[:\s]*([0-9]+\.?[0-9]*)\s*%",
                r"(?i)\bIRR[:\s]*([0-9]+\.?[0-9]*)\s*%",
            ],
            "Extract the IRR (Internal Rate of Return) percentage",
            FieldType::Number,
            ValidationRules::range(-100.0, 1000.0, true),
        ),
        FieldConfig::new(
            "moic",
            "MOIC (Multiple on Invested Capital)",
            &[
                r"(?i)Multiple to investors[:\s]*([0-9]+\.?[0-9]*)\s*x",
                r"(?i)\bMOIC[:\s]*([0-9]+\.?[0-9]*)\s*x",
                r"(?i)Multiple on invested capital[:\s]*([0-9]+\.?[0-9]*)\s*x",
            ],
            "Extract the MOIC (Multiple on Invested Capital) ratio",
            FieldType::Number,
            ValidationRules::range(0.0, MAX_MULTIPLE, true),
        ),
        FieldConfig::new(
            "tvpi",
            "TVPI (Total Value to Paid-In Capital)",
            &[
                r"(?i)Total value to paid-in capital[:\s]*\(TVPI\)[:\s]*([0-9]+\.?[0-9]*)\s*x",
                r"(?i)\bTVPI[:\s]*([0-9]+\.?[0-9]*)\s*x",
                r"(?i)Total value to paid-in[:\s]*([0-9]+\.?[0-9]*)\s*x",
            ],
            "Extract the TVPI (Total Value to Paid-In Capital) ratio",
            FieldType::Number,
            ValidationRules::range(0.0, MAX_MULTIPLE, true),
        ),
        FieldConfig::new(
            "dpi",
            "DPI (Distributions to Paid-In Capital)",
            &[
                r"(?i)Distributions to paid-in capital[:\s]*\(DPI\)[:\s]*([0-9]+\.?[0-9]*)\s*x",
                r"(?i)\bDPI[:\s]*([0-9]+\.?[0-9]*)\s*x",
                r"(?i)Distributions to paid-in[:\s]*([0-9]+\.?[0-9]*)\s*x",
            ],
            "Extract the DPI (Distributions to Paid-In Capital) ratio",
            FieldType::Number,
            ValidationRules::range(0.0, MAX_MULTIPLE, false),
        ),
        FieldConfig::new(
            "rvpi",
            "RVPI (Residual Value to Paid-In Capital)",
            &[
                r"(?i)Residual value to paid-in capital[:\s]*\(RVPI\)[:\s]*([0-9]+\.?[0-9]*)\s*x",
                r"(?i)\bRVPI[:\s]*([0-9]+\.?[0-9]*)\s*x",
                r"(?i)Residual value to paid-in[:\s]*([0-9]+\.?[0-9]*)\s*x",
            ],
            "Extract the RVPI (Residual Value to Paid-In Capital) ratio",
            FieldType::Number,
            ValidationRules::range(0.0, MAX_MULTIPLE, false),
        ),
        FieldConfig::new(
            "cumulativeCalledCapital",
            "Cumulative Called Capital",
            &[
                r"(?i)Total capital calls[:\s]*/\s*in\s*%\s*of\s*committed\s*capital[:\s]*([0-9,]+\.?[0-9]*)\s*(?:kEUR|EUR|€|k€)",
                r"(?i)Capital calls[:\s]*([0-9,]+\.?[0-9]*)\s*(?:kEUR|EUR|€|k€)",
                r"(?i)\bCalled capital[:\s]*([0-9,]+\.?[0-9]*)\s*(?:kEUR|EUR|€|k€)",
            ],
            "Extract the total capital calls or called capital amount in EUR",
            FieldType::Number,
            ValidationRules::range(0.0, MAX_AMOUNT, true),
        ),
        FieldConfig::new(
            "uncalledCapital",
            "Uncalled Capital",
            &[
                r"(?i)Uncalled capital[:\s]*/\s*in\s*%\s*of\s*committed\s*capital[:\s]*([0-9,]+\.?[0-9]*)\s*(?:kEUR|EUR|€|k€)",
                r"(?i)Uncalled capital[:\s]*([0-9,]+\.?[0-9]*)\s*(?:kEUR|EUR|€|k€)",
                r"(?i)Remaining capital[:\s]*([0-9,]+\.?[0-9]*)\s*(?:kEUR|EUR|€|k€)",
            ],
            "Extract the uncalled or remaining capital amount in EUR",
            FieldType::Number,
            ValidationRules::range(0.0, MAX_AMOUNT, false),
        ),
        FieldConfig::new(
            "portfolioCompanies",
            "Portfolio Companies",
            &[
                r"\| ([A-Za-z ]+(?:GmbH & Co\. KG|GmbH|Ltd|Inc|Corp|LLC|AG|KG))\s+\|",
                r"(?i)Company Name[: \t]*([A-Za-z \t]+(?:GmbH|Ltd|Inc|Corp|LLC|AG|KG))",
                r"(?i)Portfolio[: \t]*([A-Za-z \t]+(?:GmbH|Ltd|Inc|Corp|LLC|AG|KG))",
            ],
            "Extract all portfolio company names from the document",
            FieldType::Array,
            ValidationRules::required(),
        ),
        FieldConfig::new(
            "companyName",
            "Company/Fund Name",
            &[
                r"(?i)\bFund(?:[ \t]+(?:II|III|IV|V|VI|VII|VIII|IX|X))?[ \t]+([A-Za-z][A-Za-z \t]*)",
                r"(?i)\bFund[: \t]*([A-Za-z][A-Za-z \t]*)",
                r"(?i)\bCompany[: \t]*([A-Za-z][A-Za-z \t]*)",
            ],
            "Extract the fund or company name",
            FieldType::String,
            ValidationRules::required(),
        ),
    ]
});

/// The full VC fund field table, in extraction order
pub fn vc_fund_field_configs() -> &'static [FieldConfig] {
    &VC_FUND_FIELDS
}

/// Look up a field by key
pub fn field_config(key: &str) -> Option<&'static FieldConfig> {
    VC_FUND_FIELDS.iter().find(|f| f.key == key)
}

/// Fields extracted for a document type
///
/// LP capital account statements only carry a name the table knows how to
/// find; every other document type gets the full table.
pub fn fields_for_document_type(document_type: DocumentType) -> Vec<&'static FieldConfig> {
    match document_type {
        DocumentType::LpCapitalAccount => field_config("companyName").into_iter().collect(),
        DocumentType::FundQuarterlyReport | DocumentType::FundReport => {
            VC_FUND_FIELDS.iter().collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_pattern_compiles() {
        assert_eq!(vc_fund_field_configs().len(), 11);
        for field in vc_fund_field_configs() {
            assert_eq!(field.patterns.len(), 3, "field {}", field.key);
        }
    }

    #[test]
    fn test_field_lookup() {
        let field = field_config("fundNAV").unwrap();
        assert_eq!(field.expected_type, FieldType::Number);
        assert_eq!(field.rules.max, Some(1_000_000.0));
        assert!(field_config("carry").is_none());
    }

    #[test]
    fn test_fields_for_document_type() {
        let quarterly = fields_for_document_type(DocumentType::FundQuarterlyReport);
        assert_eq!(quarterly.len(), 11);
        assert_eq!(quarterly[0].key, "fundSize");

        let lp = fields_for_document_type(DocumentType::LpCapitalAccount);
        let keys: Vec<&str> = lp.iter().map(|f| f.key).collect();
        assert_eq!(keys, vec!["companyName"]);

        assert_eq!(fields_for_document_type(DocumentType::FundReport).len(), 11);
    }

    #[test]
    fn test_rules() {
        let rules = field_config("irr").unwrap().rules;
        assert!(rules.accepts(&FieldValue::Number(-20.0)));
        assert!(!rules.accepts(&FieldValue::Number(1500.0)));
        assert!(!rules.accepts(&FieldValue::Number(f64::NAN)));
        assert!(!ValidationRules::required().accepts(&FieldValue::List(vec![])));
        assert!(!ValidationRules::required().accepts(&FieldValue::Text("  ".into())));
    }

    #[test]
    fn test_fund_size_pattern_matches_commitments_line() {
        let field = field_config("fundSize").unwrap();
        let text = "## Fund Size\nTotal commitments: 50,000 kEUR";
        let hit = field.patterns.iter().find_map(|p| p.captures(text));
        assert_eq!(hit.and_then(|c| c.get(1)).map(|m| m.as_str()), Some("50,000"));
    }
}
