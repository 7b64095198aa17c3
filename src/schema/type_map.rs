//! Mapping from raw database column types to semantic type categories.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic category of a column, independent of the database dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticType {
    String,
    Number,
    Boolean,
    Date,
    Json,
    Text,
}

impl SemanticType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SemanticType::String => "string",
            SemanticType::Number => "number",
            SemanticType::Boolean => "boolean",
            SemanticType::Date => "date",
            SemanticType::Json => "json",
            SemanticType::Text => "text",
        }
    }

    /// TypeScript property type used by generated artifacts
    pub fn property_type(&self) -> &'static str {
        match self {
            SemanticType::Number => "number",
            SemanticType::Boolean => "boolean",
            SemanticType::Date => "Date",
            SemanticType::Json => "object",
            SemanticType::String | SemanticType::Text => "string",
        }
    }

    /// Parse the lowercase name used in module spec files
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "string" => Some(SemanticType::String),
            "number" => Some(SemanticType::Number),
            "boolean" => Some(SemanticType::Boolean),
            "date" => Some(SemanticType::Date),
            "json" => Some(SemanticType::Json),
            "text" => Some(SemanticType::Text),
            _ => None,
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Checked in order; the first family with a matching keyword wins.
const KEYWORD_FAMILIES: &[(&[&str], SemanticType)] = &[
    (
        &["int", "integer", "decimal", "double", "float", "real", "numeric"],
        SemanticType::Number,
    ),
    (&["boolean", "tinyint(1)", "bit"], SemanticType::Boolean),
    (&["datetime", "timestamp", "date"], SemanticType::Date),
    (&["json", "jsonb"], SemanticType::Json),
    (&["text"], SemanticType::Text),
];

/// Map a raw database type string to its semantic category.
///
/// Matching is a case-insensitive substring test. Families are tried in a
/// fixed precedence (number, boolean, date, json, text) and the first hit
/// wins, so `tinyint(1)` resolves to `Number` because it contains `int`.
/// Anything unmatched is a `String`.
pub fn map_type(db_type: &str) -> SemanticType {
    let lowered = db_type.to_lowercase();

    KEYWORD_FAMILIES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(_, semantic)| *semantic)
        .unwrap_or(SemanticType::String)
}
