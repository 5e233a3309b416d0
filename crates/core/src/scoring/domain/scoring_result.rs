use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::rubric::domain::request_schema::{FieldKind, RequestSchema};
use crate::rubric::domain::schema_compiler::REASONING_KEY;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ResponseValidationError {
    #[error("scoring response is not a JSON object")]
    NotAnObject,
    #[error("scoring response is missing required field '{0}'")]
    MissingField(String),
    #[error("field '{key}' must be a {expected}")]
    WrongType { key: String, expected: &'static str },
    #[error("scoring response has undeclared field '{0}'")]
    UnexpectedField(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriterionScore {
    pub key: String,
    pub score: f64,
}

/// Per-criterion scores in rubric order, plus the scorer's reasoning.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoringResult {
    pub scores: Vec<CriterionScore>,
    pub reasoning: String,
}

impl ScoringResult {
    /// Checks a structured response against the schema it was requested with.
    ///
    /// Every required field must be present with its declared type and no
    /// undeclared field may appear.
    pub fn from_response(
        schema: &RequestSchema,
        response: &Value,
    ) -> Result<Self, ResponseValidationError> {
        let object = response
            .as_object()
            .ok_or(ResponseValidationError::NotAnObject)?;

        if let Some(extra) = object.keys().find(|k| schema.field(k).is_none()) {
            return Err(ResponseValidationError::UnexpectedField(extra.clone()));
        }

        let mut scores = Vec::new();
        let mut reasoning = String::new();
        for field in schema.fields() {
            let Some(value) = object.get(&field.key) else {
                if field.required {
                    return Err(ResponseValidationError::MissingField(field.key.clone()));
                }
                continue;
            };
            if !field.kind.accepts(value) {
                return Err(ResponseValidationError::WrongType {
                    key: field.key.clone(),
                    expected: field.kind.as_str(),
                });
            }
            match field.kind {
                FieldKind::Number => scores.push(CriterionScore {
                    key: field.key.clone(),
                    score: value.as_f64().unwrap_or_default(),
                }),
                FieldKind::String if field.key == REASONING_KEY => {
                    reasoning = value.as_str().unwrap_or_default().to_string();
                }
                FieldKind::String => {}
            }
        }

        Ok(Self { scores, reasoning })
    }

    pub fn score(&self, key: &str) -> Option<f64> {
        self.scores.iter().find(|s| s.key == key).map(|s| s.score)
    }

    /// Key/value pairs for tabular display, reasoning last.
    pub fn rows(&self) -> Vec<(String, String)> {
        let mut rows: Vec<_> = self
            .scores
            .iter()
            .map(|s| (s.key.clone(), format!("{}", s.score)))
            .collect();
        rows.push((REASONING_KEY.to_string(), self.reasoning.clone()));
        rows
    }
}
