use thiserror::Error;

use super::criterion::{normalize_key, Criterion};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("criterion name must not be empty")]
    EmptyName,
    #[error("criterion '{name}' collides with existing key '{key}'")]
    DuplicateKey { name: String, key: String },
    #[error("no criterion at position {index} (rubric has {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

/// The session's ordered, editable rubric.
///
/// Every successful edit bumps [`version`](Self::version), so a snapshot
/// can be matched to the rubric state it was taken from.
#[derive(Clone, Debug, Default)]
pub struct CriterionRegistry {
    criteria: Vec<Criterion>,
    version: u64,
}

/// Immutable copy of the rubric taken for one scoring request.
#[derive(Clone, Debug, PartialEq)]
pub struct RubricSnapshot {
    version: u64,
    criteria: Vec<Criterion>,
}

impl CriterionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        Self {
            criteria: Criterion::defaults(),
            version: 0,
        }
    }

    /// Appends a criterion, rejecting blank names and key collisions.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RegistryError::EmptyName);
        }
        let key = normalize_key(&name);
        if self.criteria.iter().any(|c| c.key() == key) {
            return Err(RegistryError::DuplicateKey { name, key });
        }
        self.criteria.push(Criterion::new(name, description));
        self.version += 1;
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<Criterion, RegistryError> {
        if index >= self.criteria.len() {
            return Err(RegistryError::IndexOutOfRange {
                index,
                len: self.criteria.len(),
            });
        }
        let removed = self.criteria.remove(index);
        self.version += 1;
        Ok(removed)
    }

    pub fn reset_to_defaults(&mut self) {
        self.criteria = Criterion::defaults();
        self.version += 1;
    }

    pub fn snapshot(&self) -> RubricSnapshot {
        RubricSnapshot {
            version: self.version,
            criteria: self.criteria.clone(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Criterion> {
        self.criteria.iter()
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    pub fn version(&self) -> u64 {
        self.version
    }
}

impl RubricSnapshot {
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }
}
