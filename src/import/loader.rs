//! JSON dump loading.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use super::model::{CodeLinkRecord, PaperRecord, ResearchField, TaskRecord};
use crate::error::{ImportResult, InputError};

/// Read a file holding one JSON array of records.
pub fn load_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, InputError> {
    let content = std::fs::read_to_string(path).map_err(|e| InputError::Read {
        path: path.display().to_string(),
        source: e,
    })?;
    let records: Vec<T> = serde_json::from_str(&content).map_err(|e| InputError::Parse {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    tracing::debug!(path = %path.display(), records = records.len(), "loaded input file");
    Ok(records)
}

/// Input file locations for one run. Absent files skip their pass.
#[derive(Debug, Clone, Default)]
pub struct InputPaths {
    pub abstracts: Option<PathBuf>,
    pub links: Option<PathBuf>,
    pub evaluations: Option<PathBuf>,
    pub fields: Option<PathBuf>,
}

/// Records for one run, loaded up front.
#[derive(Debug, Clone, Default)]
pub struct ImportInputs {
    pub papers: Option<Vec<PaperRecord>>,
    pub links: Option<Vec<CodeLinkRecord>>,
    pub tasks: Option<Vec<TaskRecord>>,
    pub fields: Option<Vec<ResearchField>>,
}

impl ImportInputs {
    /// Load every file that is set. Any unreadable or malformed file fails the whole load.
    pub fn load(paths: &InputPaths) -> ImportResult<Self> {
        fn load_opt<T: DeserializeOwned>(path: &Option<PathBuf>) -> ImportResult<Option<Vec<T>>> {
            Ok(path.as_deref().map(load_records::<T>).transpose()?)
        }

        Ok(Self {
            papers: load_opt(&paths.abstracts)?,
            links: load_opt(&paths.links)?,
            tasks: load_opt(&paths.evaluations)?,
            fields: load_opt(&paths.fields)?,
        })
    }

    /// Whether nothing was given.
    pub fn is_empty(&self) -> bool {
        self.papers.is_none() && self.links.is_none() && self.tasks.is_none() && self.fields.is_none()
    }
}
