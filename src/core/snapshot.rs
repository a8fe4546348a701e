//! Inventory snapshots - the four collections as captured by the fetch layer
//!
//! A snapshot directory holds one JSON file per collection, each either a
//! bare array of records or the platform's `{"data": [...]}` envelope.

use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::core::config::Config;
use crate::core::record::{
    parse_components, parse_workflows, Component, ComponentKind, RecordError, Workflow,
};

#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum SnapshotError {
    #[error("snapshot directory not found: {}", .0.display())]
    #[diagnostic(code(cinv::snapshot::not_found))]
    NotADirectory(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    #[diagnostic(code(cinv::snapshot::io))]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{} is not valid JSON: {source}", .path.display())]
    #[diagnostic(code(cinv::snapshot::json))]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("{}: {source}", .path.display())]
    #[diagnostic(code(cinv::snapshot::structure))]
    Structure {
        path: PathBuf,
        #[source]
        source: RecordError,
    },
}

/// The four normalized collections of one snapshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inventory {
    pub data_managers: Vec<Component>,
    pub single_exp: Vec<Component>,
    pub multi_exp: Vec<Component>,
    pub workflows: Vec<Workflow>,
}

impl Inventory {
    /// Load a snapshot directory, applying the configured file names and limits
    pub fn load(dir: &Path, config: &Config) -> Result<Self, SnapshotError> {
        if !dir.is_dir() {
            return Err(SnapshotError::NotADirectory(dir.to_path_buf()));
        }

        let mut inventory = Inventory::default();
        for &kind in ComponentKind::all() {
            let path = dir.join(config.files.for_kind(kind));
            let Some(value) = read_collection(&path, kind)? else {
                continue;
            };
            let limit = config.limits.for_kind(kind);
            let structure = |source| SnapshotError::Structure {
                path: path.clone(),
                source,
            };
            match kind {
                ComponentKind::Workflow => {
                    let mut workflows = parse_workflows(value).map_err(structure)?;
                    truncate(&mut workflows, limit, kind);
                    inventory.workflows = workflows;
                }
                ComponentKind::DataManager | ComponentKind::SingleExp | ComponentKind::MultiExp => {
                    let mut components = parse_components(value, kind).map_err(structure)?;
                    truncate(&mut components, limit, kind);
                    match kind {
                        ComponentKind::DataManager => inventory.data_managers = components,
                        ComponentKind::SingleExp => inventory.single_exp = components,
                        _ => inventory.multi_exp = components,
                    }
                }
            }
            debug!(kind = %kind, records = inventory.len(kind), "loaded collection");
        }

        Ok(inventory)
    }

    /// Number of records of a kind
    pub fn len(&self, kind: ComponentKind) -> usize {
        match kind {
            ComponentKind::DataManager => self.data_managers.len(),
            ComponentKind::SingleExp => self.single_exp.len(),
            ComponentKind::MultiExp => self.multi_exp.len(),
            ComponentKind::Workflow => self.workflows.len(),
        }
    }

    /// Total records across all collections
    pub fn total(&self) -> usize {
        ComponentKind::all().iter().map(|k| self.len(*k)).sum()
    }

    /// Component records of a kind (workflows as their component part)
    pub fn components(&self, kind: ComponentKind) -> Vec<&Component> {
        match kind {
            ComponentKind::DataManager => self.data_managers.iter().collect(),
            ComponentKind::SingleExp => self.single_exp.iter().collect(),
            ComponentKind::MultiExp => self.multi_exp.iter().collect(),
            ComponentKind::Workflow => self.workflows.iter().map(|w| &w.component).collect(),
        }
    }
}

/// Read one collection file; a missing file yields `None`
fn read_collection(path: &Path, kind: ComponentKind) -> Result<Option<Value>, SnapshotError> {
    if !path.exists() {
        warn!(kind = %kind, path = %path.display(), "collection file missing, treating as empty");
        return Ok(None);
    }
    let content = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|source| SnapshotError::Json {
            path: path.to_path_buf(),
            source,
        })
}

fn truncate<T>(records: &mut Vec<T>, limit: usize, kind: ComponentKind) {
    if records.len() > limit {
        warn!(kind = %kind, limit, dropped = records.len() - limit, "collection exceeds limit");
        records.truncate(limit);
    }
}
