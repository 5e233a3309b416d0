use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::rubric::domain::criterion::Criterion;
use crate::rubric::domain::criterion_registry::{CriterionRegistry, RegistryError};
use crate::shared::constants::APP_DIR_NAME;

#[derive(Error, Debug)]
pub enum RubricFileError {
    #[error("failed to read rubric {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("rubric {path} is not a JSON list of criteria: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("rubric {path} has an invalid entry: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: RegistryError,
    },
    #[error("failed to serialize rubric for {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write rubric to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not determine config directory")]
    NoConfigDir,
}

/// JSON-file persistence for the rubric: a list of `{name, description}`.
pub struct RubricFile;

impl RubricFile {
    /// Platform config location, e.g. `~/.config/SpeechGrade/rubric.json`.
    pub fn default_path() -> Result<PathBuf, RubricFileError> {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR_NAME).join("rubric.json"))
            .ok_or(RubricFileError::NoConfigDir)
    }

    /// Loads a rubric, or the default criteria when the file does not exist.
    ///
    /// Entries pass through [`CriterionRegistry::add`], so blank or
    /// colliding names are rejected here rather than at scoring time.
    pub fn load(path: &Path) -> Result<CriterionRegistry, RubricFileError> {
        if !path.exists() {
            log::debug!("No rubric at {}, using defaults", path.display());
            return Ok(CriterionRegistry::with_defaults());
        }

        let json = fs::read_to_string(path).map_err(|e| RubricFileError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let criteria: Vec<Criterion> =
            serde_json::from_str(&json).map_err(|e| RubricFileError::Parse {
                path: path.to_path_buf(),
                source: e,
            })?;

        let mut registry = CriterionRegistry::new();
        for criterion in criteria {
            registry
                .add(criterion.name, criterion.description)
                .map_err(|e| RubricFileError::Invalid {
                    path: path.to_path_buf(),
                    source: e,
                })?;
        }
        Ok(registry)
    }

    /// Writes to a sibling temp file first, then renames over the target.
    pub fn save(registry: &CriterionRegistry, path: &Path) -> Result<(), RubricFileError> {
        let write_err = |p: &Path, e: std::io::Error| RubricFileError::Write {
            path: p.to_path_buf(),
            source: e,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| write_err(parent, e))?;
        }

        let criteria: Vec<&Criterion> = registry.iter().collect();
        let json =
            serde_json::to_string_pretty(&criteria).map_err(|e| RubricFileError::Serialize {
                path: path.to_path_buf(),
                source: e,
            })?;

        let temp_path = path.with_extension("part");
        fs::write(&temp_path, json).map_err(|e| write_err(&temp_path, e))?;
        fs::rename(&temp_path, path).map_err(|e| write_err(path, e))?;
        Ok(())
    }
}
