//! Configuration - snapshot file names, collection limits, collision policy
//!
//! Lookup order for the config file:
//! 1. An explicit `--config` path
//! 2. `cinv.yaml` inside the snapshot directory
//! 3. `config.yaml` in the user config directory (e.g. `~/.config/cinv/`)
//!
//! Missing files fall back to defaults. Command-line flags and the limit
//! environment variables are applied on top by the CLI.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::index::CollisionPolicy;
use crate::core::record::ComponentKind;

/// Config file looked up inside a snapshot directory
pub const SNAPSHOT_CONFIG_FILE: &str = "cinv.yaml";

/// Records taken from each collection unless configured otherwise
pub const DEFAULT_LIMIT: usize = 10_000;

#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    #[diagnostic(code(cinv::config::io))]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file {}: {source}", .path.display())]
    #[diagnostic(code(cinv::config::parse), help("known keys: files, limits, on_collision, workers"))]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yml::Error,
    },
}

/// File name of each collection within a snapshot directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotFiles {
    pub data_manager: String,
    pub single_exp: String,
    pub multi_exp: String,
    pub workflow: String,
}

impl Default for SnapshotFiles {
    fn default() -> Self {
        Self {
            data_manager: "dm.json".to_string(),
            single_exp: "single-exp-manager.json".to_string(),
            multi_exp: "multiple-exp-manager.json".to_string(),
            workflow: "vp.json".to_string(),
        }
    }
}

impl SnapshotFiles {
    pub fn for_kind(&self, kind: ComponentKind) -> &str {
        match kind {
            ComponentKind::DataManager => &self.data_manager,
            ComponentKind::SingleExp => &self.single_exp,
            ComponentKind::MultiExp => &self.multi_exp,
            ComponentKind::Workflow => &self.workflow,
        }
    }
}

/// Maximum records taken from each collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub data_manager: usize,
    pub single_exp: usize,
    pub multi_exp: usize,
    pub workflow: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            data_manager: DEFAULT_LIMIT,
            single_exp: DEFAULT_LIMIT,
            multi_exp: DEFAULT_LIMIT,
            workflow: DEFAULT_LIMIT,
        }
    }
}

impl Limits {
    pub fn for_kind(&self, kind: ComponentKind) -> usize {
        match kind {
            ComponentKind::DataManager => self.data_manager,
            ComponentKind::SingleExp => self.single_exp,
            ComponentKind::MultiExp => self.multi_exp,
            ComponentKind::Workflow => self.workflow,
        }
    }

    pub fn set(&mut self, kind: ComponentKind, limit: usize) {
        match kind {
            ComponentKind::DataManager => self.data_manager = limit,
            ComponentKind::SingleExp => self.single_exp = limit,
            ComponentKind::MultiExp => self.multi_exp = limit,
            ComponentKind::Workflow => self.workflow = limit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub files: SnapshotFiles,
    pub limits: Limits,
    pub on_collision: CollisionPolicy,
    /// Resolver worker threads
    pub workers: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            files: SnapshotFiles::default(),
            limits: Limits::default(),
            on_collision: CollisionPolicy::default(),
            workers: 1,
        }
    }
}

impl Config {
    /// Resolve and load the config for a snapshot directory
    pub fn load(explicit: Option<&Path>, snapshot_dir: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let candidates = [
            Some(snapshot_dir.join(SNAPSHOT_CONFIG_FILE)),
            Self::user_config_path(),
        ];
        for path in candidates.into_iter().flatten() {
            if path.is_file() {
                return Self::from_file(&path);
            }
        }

        debug!("no config file found, using defaults");
        Ok(Self::default())
    }

    /// Read a config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&content, path)?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Parse config YAML; an empty document yields the defaults
    pub fn from_yaml(content: &str, path: &Path) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `config.yaml` in the platform user config directory
    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "cinv").map(|dirs| dirs.config_dir().join("config.yaml"))
    }
}
