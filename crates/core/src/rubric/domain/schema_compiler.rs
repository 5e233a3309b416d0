use thiserror::Error;

use super::criterion::Criterion;
use super::request_schema::{FieldKind, RequestSchema, RequestSchemaBuilder};

pub const REASONING_KEY: &str = "ReasoningForScores";
pub const REASONING_DESCRIPTION: &str = "Reason for all the scores";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SchemaCompilationError {
    #[error("rubric has no criteria to score")]
    EmptyRubric,
    #[error("criteria '{first}' and '{second}' both map to key '{key}'")]
    Collision {
        key: String,
        first: String,
        second: String,
    },
}

/// Compiles a rubric into the strict schema the scorer must answer with.
pub struct SchemaCompiler;

impl SchemaCompiler {
    /// One required number per criterion, in rubric order, then the
    /// required reasoning string.
    pub fn compile(criteria: &[Criterion]) -> Result<RequestSchema, SchemaCompilationError> {
        if criteria.is_empty() {
            return Err(SchemaCompilationError::EmptyRubric);
        }

        let mut builder = RequestSchemaBuilder::new();
        for (idx, criterion) in criteria.iter().enumerate() {
            if let Err(dup) =
                builder.required(criterion.key(), FieldKind::Number, &criterion.description)
            {
                return Err(collision(&criteria[..idx], dup.key, &criterion.name));
            }
        }
        if let Err(dup) = builder.required(REASONING_KEY, FieldKind::String, REASONING_DESCRIPTION) {
            return Err(collision(criteria, dup.key, REASONING_KEY));
        }

        Ok(builder.build())
    }
}

fn collision(earlier: &[Criterion], key: String, second: &str) -> SchemaCompilationError {
    let first = earlier
        .iter()
        .find(|c| c.key() == key)
        .map(|c| c.name.clone())
        .unwrap_or_default();
    SchemaCompilationError::Collision {
        key,
        first,
        second: second.to_string(),
    }
}
