//! LLM prompts for field extraction and validation

use crate::fields::FieldConfig;
use fundlens_domain::FieldValue;

/// Marker the model answers with when a field is absent
pub const NOT_FOUND: &str = "NOT_FOUND";

/// Builds prompts for one field
pub struct PromptBuilder<'a> {
    field: &'a FieldConfig,
    excerpt_chars: usize,
}

impl<'a> PromptBuilder<'a> {
    /// Create a new prompt builder
    pub fn new(field: &'a FieldConfig, excerpt_chars: usize) -> Self {
        Self {
            field,
            excerpt_chars,
        }
    }

    /// Prompt asking the model to extract the field from scratch
    pub fn extraction(&self, text: &str) -> String {
        let mut prompt = String::new();

        prompt.push_str(&format!(
            "Extract the {} from this financial document.\n\n",
            self.field.field_name
        ));
        prompt.push_str(self.field.llm_prompt);
        prompt.push_str("\n\n");

        self.push_excerpt(&mut prompt, text);
        self.push_field_header(&mut prompt);
        if let Ok(rules) = serde_json::to_string(&self.field.rules) {
            prompt.push_str(&format!("Validation rules: {}\n", rules));
        }
        prompt.push('\n');

        prompt.push_str(&format!(
            "Please extract the {} value. If the field is not present or unclear, respond with \"{}\".\n",
            self.field.field_name, NOT_FOUND
        ));
        prompt.push_str(EXTRACTION_FORMAT);

        prompt
    }

    /// Prompt asking the model to confirm a regex hit
    pub fn validation(&self, text: &str, value: &FieldValue) -> String {
        let mut prompt = String::new();

        prompt.push_str(&format!(
            "Validate this extracted {} value from a financial document.\n\n",
            self.field.field_name
        ));

        self.push_excerpt(&mut prompt, text);
        prompt.push_str(&format!("Extracted value: {}\n", value));
        self.push_field_header(&mut prompt);
        prompt.push('\n');

        prompt.push_str(&format!(
            "Please confirm:\n1. Is this value correct for the {} field?\n",
            self.field.field_name
        ));
        prompt.push_str(VALIDATION_FORMAT);

        prompt
    }

    fn push_excerpt(&self, prompt: &mut String, text: &str) {
        prompt.push_str("Document text:\n---\n");
        prompt.push_str(excerpt(text, self.excerpt_chars));
        prompt.push_str("...\n---\n\n");
    }

    fn push_field_header(&self, prompt: &mut String) {
        prompt.push_str(&format!("Field: {}\n", self.field.field_name));
        prompt.push_str(&format!("Field key: {}\n", self.field.key));
        prompt.push_str(&format!(
            "Expected type: {}\n",
            self.field.expected_type.as_str()
        ));
    }
}

/// The first `max_chars` characters of `text`
pub fn excerpt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// JSON schema for answers to [`PromptBuilder::validation`] prompts
pub const VALIDATION_SCHEMA: &str = r#"{
  "type": "object",
  "properties": {
    "isCorrect": {"type": "boolean"},
    "isPresent": {"type": "boolean"},
    "correctValue": {"type": ["string", "number", "null"]},
    "confidence": {"type": "number", "minimum": 0, "maximum": 1},
    "reasoning": {"type": "string"}
  },
  "required": ["isCorrect", "isPresent", "confidence", "reasoning"]
}"#;

const EXTRACTION_FORMAT: &str = r#"If found, respond with just the value in the expected format.

Response format:
- If found: [value]
- If not found: NOT_FOUND"#;

const VALIDATION_FORMAT: &str = r#"2. Is the field actually present in the document?
3. If incorrect, what should the correct value be?

Respond in JSON format:
{
  "isCorrect": true/false,
  "isPresent": true/false,
  "correctValue": "actual_value_or_null",
  "confidence": 0.0-1.0,
  "reasoning": "explanation"
}

Remember: Return ONLY valid JSON, no markdown code blocks, no explanations."#;
