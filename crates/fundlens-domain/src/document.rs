//! Document identity and document-level context

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a processed document based on UUIDv7
///
/// UUIDv7 keeps identifiers chronologically sortable, so pipeline runs can be
/// ordered by creation time without a separate timestamp column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentId(u128);

impl DocumentId {
    /// Generate a new UUIDv7-based DocumentId
    ///
    /// # Examples
    ///
    /// ```
    /// use fundlens_domain::DocumentId;
    ///
    /// let id = DocumentId::new();
    /// assert!(id.value() > 0);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create a DocumentId from a raw u128 value
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse a DocumentId from a UUID string
    ///
    /// # Examples
    ///
    /// ```
    /// use fundlens_domain::DocumentId;
    ///
    /// let id = DocumentId::new();
    /// let parsed = DocumentId::from_string(&id.to_string()).unwrap();
    /// assert_eq!(id, parsed);
    /// ```
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid document id: {}", e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }

    /// Milliseconds since the Unix epoch encoded in the top 48 bits
    pub fn timestamp(&self) -> u64 {
        (self.0 >> 80) as u64
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

impl Serialize for DocumentId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DocumentId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_string(&s).map_err(serde::de::Error::custom)
    }
}

/// Kind of document being processed
///
/// Selects which field configurations the robust extractor runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// Generic fund report (the default when nothing better is known)
    #[default]
    FundReport,
    /// Quarterly report issued by a fund manager
    FundQuarterlyReport,
    /// Capital account statement addressed to a limited partner
    LpCapitalAccount,
}

impl DocumentType {
    /// Get the document type name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::FundReport => "fund_report",
            DocumentType::FundQuarterlyReport => "fund_quarterly_report",
            DocumentType::LpCapitalAccount => "lp_capital_account",
        }
    }

    /// Parse a document type from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "fund_report" => Some(DocumentType::FundReport),
            "fund_quarterly_report" | "quarterly" => Some(DocumentType::FundQuarterlyReport),
            "lp_capital_account" | "capital_account" => Some(DocumentType::LpCapitalAccount),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Best-effort document-level facts scanned from the whole text
///
/// Every field is optional; a missing match is not an error.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentContext {
    /// Fund name phrase, if one was found
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fund_name: Option<String>,
    /// Reporting quarter such as `Q3`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quarter: Option<String>,
    /// Reporting year
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    /// `annual` or `quarterly`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_type: Option<String>,
    /// Document type, `fund_report` unless the caller says otherwise
    pub document_type: DocumentType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_id_ordering() {
        let a = DocumentId::new();
        let b = DocumentId::new();
        assert!(b >= a);
        assert!(a.timestamp() > 0);
    }

    #[test]
    fn test_document_id_serde() {
        let id = DocumentId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
        let back: DocumentId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }

    #[test]
    fn test_document_type_parse() {
        assert_eq!(DocumentType::parse("fund_quarterly_report"), Some(DocumentType::FundQuarterlyReport));
        assert_eq!(DocumentType::parse("LP-Capital-Account"), Some(DocumentType::LpCapitalAccount));
        assert_eq!(DocumentType::parse("cap_table"), None);
        assert_eq!(DocumentType::default().as_str(), "fund_report");
    }
}
