use serde::{Deserialize, Serialize};

/// A named dimension of speech quality the scorer rates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criterion {
    pub name: String,
    pub description: String,
}

impl Criterion {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    /// Schema-safe property key: trimmed, lowercased, spaces to underscores.
    pub fn key(&self) -> String {
        normalize_key(&self.name)
    }

    /// Criteria every new rubric starts with.
    pub fn defaults() -> Vec<Criterion> {
        vec![
            Criterion::new(
                "English Fluency",
                "Measures speed, pauses, and hesitations.",
            ),
            Criterion::new(
                "Vocabulary",
                "Evaluates richness and diversity of words used.",
            ),
            Criterion::new("Grammar", "Checks grammatical correctness."),
            Criterion::new(
                "Relevance to the Topic",
                "Assesses response alignment with the topic.",
            ),
        ]
    }
}

pub fn normalize_key(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}
