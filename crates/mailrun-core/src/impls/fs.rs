//! File-system backed sources.

use std::collections::BTreeMap;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::domain::task::substitutions_from_map;
use crate::domain::{LookupError, Substitutions, TaskRecord};
use crate::ports::{ProfileStore, TaskSource, TemplateSource};

/// Extension of task files in the work directory.
pub const TASK_EXTENSION: &str = ".json";

fn read_text(path: &Path, name: &str) -> Result<String, LookupError> {
    std::fs::read_to_string(path).map_err(|source| match source.kind() {
        IoErrorKind::NotFound => LookupError::NotFound(name.to_string()),
        _ => LookupError::Io {
            name: name.to_string(),
            source,
        },
    })
}

/// Task files (`*.json`) directly inside the tasks directory.
#[derive(Debug, Clone)]
pub struct FsTaskSource {
    dir: PathBuf,
}

impl FsTaskSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl TaskSource for FsTaskSource {
    fn list(&self) -> Result<Vec<String>, LookupError> {
        let name = self.dir.display().to_string();
        let entries = std::fs::read_dir(&self.dir).map_err(|source| LookupError::Io {
            name: name.clone(),
            source,
        })?;

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| LookupError::Io {
                name: name.clone(),
                source,
            })?;
            let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
            let file_name = entry.file_name().to_string_lossy().into_owned();
            if is_file && file_name.ends_with(TASK_EXTENSION) {
                ids.push(file_name);
            }
        }
        ids.sort();
        debug!(dir = %name, count = ids.len(), "task files listed");
        Ok(ids)
    }

    fn load(&self, id: &str) -> Result<TaskRecord, LookupError> {
        let text = read_text(&self.dir.join(id), id)?;
        TaskRecord::from_json(&text).map_err(|e| LookupError::Malformed {
            name: id.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Template files inside the templates directory.
#[derive(Debug, Clone)]
pub struct FsTemplateSource {
    dir: PathBuf,
}

impl FsTemplateSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl TemplateSource for FsTemplateSource {
    fn load(&self, name: &str) -> Result<String, LookupError> {
        read_text(&self.dir.join(name), name)
    }
}

/// Recipient profiles from one JSON object keyed by address.
///
/// Read once when opened.
#[derive(Debug, Clone, Default)]
pub struct JsonProfileStore {
    profiles: BTreeMap<String, Substitutions>,
}

impl JsonProfileStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LookupError> {
        let path = path.as_ref();
        let name = path.display().to_string();
        let text = read_text(path, &name)?;
        Self::from_json(&name, &text)
    }

    pub fn from_json(name: &str, text: &str) -> Result<Self, LookupError> {
        let raw: BTreeMap<String, BTreeMap<String, Value>> =
            serde_json::from_str(text).map_err(|e| LookupError::Malformed {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
        let profiles = raw
            .into_iter()
            .map(|(address, values)| (address, substitutions_from_map(values)))
            .collect();
        Ok(Self { profiles })
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl ProfileStore for JsonProfileStore {
    fn lookup(&self, address: &str) -> Result<Substitutions, LookupError> {
        self.profiles
            .get(address)
            .cloned()
            .ok_or_else(|| LookupError::NotFound(address.to_string()))
    }
}
