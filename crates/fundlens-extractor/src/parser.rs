//! Parse LLM output and raw regex captures into field values

use crate::error::ExtractorError;
use crate::fields::{FieldConfig, FieldType};
use crate::prompt::NOT_FOUND;
use fundlens_domain::FieldValue;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

static NUMBER: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"-?\d[\d,]*(?:\.\d+)?").ok());

/// Answer to a validation prompt
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LlmValidation {
    /// The extracted value is right
    pub is_correct: Option<bool>,
    /// The field appears in the document
    pub is_present: bool,
    /// The value the model considers correct
    pub correct_value: Value,
    /// Model's own confidence
    pub confidence: Option<f64>,
    /// Explanation
    pub reasoning: String,
}

/// Parse a validation answer
pub fn parse_validation_response(response: &str) -> Result<LlmValidation, ExtractorError> {
    let json_str = strip_code_fences(response)?;
    let value: Value = serde_json::from_str(&json_str)?;
    if !value.is_object() {
        return Err(ExtractorError::InvalidFormat(
            "Expected JSON object".to_string(),
        ));
    }
    Ok(serde_json::from_value(value)?)
}

/// Parse an extraction answer; `None` when the model found nothing usable
pub fn parse_extraction_response(response: &str, field: &FieldConfig) -> Option<FieldValue> {
    let body = strip_code_fences(response).ok()?;
    let body = body.trim();
    if body.is_empty() || body.contains(NOT_FOUND) {
        return None;
    }

    if field.expected_type == FieldType::Array {
        if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(body) {
            return json_to_field_value(&Value::Array(items), FieldType::Array);
        }
    }

    parse_value(clean_value(body), field.expected_type)
}

/// Parse a raw string per the expected type
pub fn parse_value(raw: &str, expected_type: FieldType) -> Option<FieldValue> {
    match expected_type {
        FieldType::Number => parse_number(raw).map(FieldValue::Number),
        FieldType::String => {
            let s = raw.trim();
            (!s.is_empty()).then(|| FieldValue::Text(s.to_string()))
        }
        FieldType::Array => {
            let items: Vec<String> = raw
                .split(',')
                .map(|item| clean_value(item).to_string())
                .filter(|item| !item.is_empty())
                .collect();
            (!items.is_empty()).then_some(FieldValue::List(items))
        }
        FieldType::Object => {
            let raw = raw.trim();
            if raw.is_empty() {
                return None;
            }
            let value = serde_json::from_str::<Value>(raw)
                .ok()
                .filter(Value::is_object)
                .unwrap_or_else(|| serde_json::json!({ "value": raw }));
            Some(FieldValue::Object(value))
        }
    }
}

/// Convert a JSON value from a model answer into a field value
pub fn json_to_field_value(value: &Value, expected_type: FieldType) -> Option<FieldValue> {
    match value {
        Value::Null | Value::Bool(_) => None,
        Value::Number(n) => n.as_f64().map(FieldValue::Number),
        Value::String(s) if s.trim().eq_ignore_ascii_case("null") => None,
        Value::String(s) => parse_value(s, expected_type),
        Value::Array(items) => {
            let names: Vec<String> = items
                .iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s.trim().to_string()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .filter(|s| !s.is_empty())
                .collect();
            (!names.is_empty()).then_some(FieldValue::List(names))
        }
        Value::Object(_) => Some(FieldValue::Object(value.clone())),
    }
}

/// First number in `raw`, thousands separators removed
fn parse_number(raw: &str) -> Option<f64> {
    let re = NUMBER.as_ref()?;
    let m = re.find(raw)?;
    m.as_str().replace(',', "").parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Strip quotes, brackets and backticks the model wraps answers in
fn clean_value(raw: &str) -> &str {
    raw.trim()
        .trim_matches(|c: char| matches!(c, '"' | '\'' | '`' | '[' | ']'))
        .trim()
}

/// Extract the body of a response, handling markdown code blocks
pub fn strip_code_fences(response: &str) -> Result<String, ExtractorError> {
    let trimmed = response.trim();

    if trimmed.starts_with("```") {
        let lines: Vec<&str> = trimmed.lines().collect();
        if lines.len() < 2 {
            return Err(ExtractorError::InvalidFormat("Empty code block".to_string()));
        }

        // Skip the opening fence and, if present, the closing one
        let end = if lines[lines.len() - 1].trim_start().starts_with("```") {
            lines.len() - 1
        } else {
            lines.len()
        };
        Ok(lines[1..end].join("\n"))
    } else {
        Ok(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::field_config;

    #[test]
    fn test_parse_validation_json() {
        let response = r#"{
            "isCorrect": true,
            "isPresent": true,
            "correctValue": null,
            "confidence": 0.9,
            "reasoning": "Value appears verbatim"
        }"#;
        let v = parse_validation_response(response).unwrap();
        assert_eq!(v.is_correct, Some(true));
        assert!(v.is_present);
        assert!(v.correct_value.is_null());
        assert_eq!(v.reasoning, "Value appears verbatim");
    }

    #[test]
    fn test_parse_validation_with_markdown_wrapper() {
        let response = "```json\n{\"isPresent\": false, \"reasoning\": \"absent\"}\n```";
        let v = parse_validation_response(response).unwrap();
        assert!(!v.is_present);
        assert_eq!(v.reasoning, "absent");
    }

    #[test]
    fn test_parse_validation_invalid() {
        assert!(matches!(
            parse_validation_response("Looks right to me"),
            Err(ExtractorError::JsonParse(_))
        ));
        assert!(matches!(
            parse_validation_response("[1, 2]"),
            Err(ExtractorError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_extraction_not_found() {
        let field = field_config("fundSize").unwrap();
        assert_eq!(parse_extraction_response("NOT_FOUND", field), None);
        assert_eq!(parse_extraction_response("  ", field), None);
    }

    #[test]
    fn test_extraction_number_cleanup() {
        let field = field_config("fundSize").unwrap();
        assert_eq!(
            parse_extraction_response("[50,000 kEUR]", field),
            Some(FieldValue::Number(50000.0))
        );
        assert_eq!(
            parse_extraction_response("\"12.5%\"", field_config("irr").unwrap()),
            Some(FieldValue::Number(12.5))
        );
        assert_eq!(parse_extraction_response("unclear", field), None);
    }

    #[test]
    fn test_extraction_array() {
        let field = field_config("portfolioCompanies").unwrap();
        assert_eq!(
            parse_extraction_response(r#"["Acme GmbH", "Beta Ltd"]"#, field),
            Some(FieldValue::List(vec!["Acme GmbH".into(), "Beta Ltd".into()]))
        );
        assert_eq!(
            parse_extraction_response("Acme GmbH, Beta Ltd", field),
            Some(FieldValue::List(vec!["Acme GmbH".into(), "Beta Ltd".into()]))
        );
    }

    #[test]
    fn test_parse_value_types() {
        assert_eq!(
            parse_value("1,234.5", FieldType::Number),
            Some(FieldValue::Number(1234.5))
        );
        assert_eq!(
            parse_value("  Acme Ventures  ", FieldType::String),
            Some(FieldValue::Text("Acme Ventures".into()))
        );
        assert_eq!(
            parse_value("not json", FieldType::Object),
            Some(FieldValue::Object(serde_json::json!({ "value": "not json" })))
        );
    }

    #[test]
    fn test_json_to_field_value() {
        assert_eq!(json_to_field_value(&Value::Null, FieldType::Number), None);
        assert_eq!(
            json_to_field_value(&serde_json::json!("null"), FieldType::Number),
            None
        );
        assert_eq!(
            json_to_field_value(&serde_json::json!("45,000"), FieldType::Number),
            Some(FieldValue::Number(45000.0))
        );
        assert_eq!(
            json_to_field_value(&serde_json::json!(2.1), FieldType::Number),
            Some(FieldValue::Number(2.1))
        );
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```\n42\n```").unwrap(), "42");
        assert_eq!(strip_code_fences("plain").unwrap(), "plain");
        assert!(strip_code_fences("```").is_err());
    }
}
