//! Structured extraction schemas and result normalization.
//!
//! Each extract step asks the oracle for one of four shapes. The oracle hands
//! back untyped JSON; [`decode`] turns it into the schema's Rust type or fails
//! with a schema conformance error.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

use super::product_domain::ProductDomain;
use crate::ports::OracleError;

/// The shapes the oracle can be asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractionSchema {
    DomainClassification,
    Actions,
    Segments,
    Goals,
}

impl ExtractionSchema {
    pub fn name(&self) -> &'static str {
        match self {
            ExtractionSchema::DomainClassification => "domain_classification",
            ExtractionSchema::Actions => "extracted_actions",
            ExtractionSchema::Segments => "extracted_segments",
            ExtractionSchema::Goals => "extracted_goals",
        }
    }

    /// JSON Schema sent to the model alongside the prompt.
    pub fn json_schema(&self) -> Value {
        match self {
            ExtractionSchema::DomainClassification => json!({
                "type": "object",
                "properties": {
                    "domain": {
                        "type": "string",
                        "enum": ProductDomain::ALL.iter().map(|d| d.as_str()).collect::<Vec<_>>(),
                        "description": "Product domain"
                    },
                    "reasoning": {
                        "type": "string",
                        "description": "Brief explanation"
                    }
                },
                "required": ["domain", "reasoning"]
            }),
            ExtractionSchema::Actions => list_schema("actions", "List of key actions to track"),
            ExtractionSchema::Segments => list_schema("segments", "List of user segments"),
            ExtractionSchema::Goals => list_schema("goals", "List of business goals"),
        }
    }
}

impl fmt::Display for ExtractionSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

fn list_schema(field: &str, description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            field: {
                "type": "array",
                "items": { "type": "string" },
                "description": description
            }
        },
        "required": [field]
    })
}

/// A typed extraction result bound to its schema.
pub trait Extraction: DeserializeOwned {
    const SCHEMA: ExtractionSchema;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainClassification {
    pub domain: ProductDomain,
    #[serde(default)]
    pub reasoning: String,
}

impl Extraction for DomainClassification {
    const SCHEMA: ExtractionSchema = ExtractionSchema::DomainClassification;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedActions {
    pub actions: Vec<String>,
}

impl Extraction for ExtractedActions {
    const SCHEMA: ExtractionSchema = ExtractionSchema::Actions;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedSegments {
    pub segments: Vec<String>,
}

impl Extraction for ExtractedSegments {
    const SCHEMA: ExtractionSchema = ExtractionSchema::Segments;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedGoals {
    pub goals: Vec<String>,
}

impl Extraction for ExtractedGoals {
    const SCHEMA: ExtractionSchema = ExtractionSchema::Goals;
}

/// Decodes an oracle value into the typed result for `T`'s schema.
pub fn decode<T: Extraction>(value: Value) -> Result<T, OracleError> {
    serde_json::from_value(value)
        .map_err(|e| OracleError::schema_conformance(T::SCHEMA, e.to_string()))
}

/// Normalizes extracted action names into event identifiers.
///
/// Trims, lower-cases, joins words with `_`, drops empties and keeps the
/// first occurrence of each duplicate.
pub fn normalize_actions(raw: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for action in raw {
        let normalized = action
            .trim()
            .to_lowercase()
            .split(|c: char| c.is_whitespace() || c == '-')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("_");
        if !normalized.is_empty() && !out.contains(&normalized) {
            out.push(normalized);
        }
    }
    out
}

/// Trims entries and drops blanks, preserving order.
pub fn normalize_list(raw: Vec<String>) -> Vec<String> {
    raw.into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
