//! Qualified keys - kind-namespaced identifiers used for index lookups
//!
//! Every addressable component is stored under `<kind>:<local id>`, e.g.
//! `dm:5` or `func:send_invoice`. Embedding the kind keeps a numeric Data
//! Manager id from ever colliding with a Single-Form id or a function name.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Separator between the kind tag and the local identifier
pub const KEY_SEPARATOR: char = ':';

/// Kind tag of a qualified key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KindTag {
    /// Data Manager, keyed by numeric id
    Dm,
    /// Single-Form Experience Manager, keyed by numeric id
    SingleExp,
    /// Multiple-Form Experience Manager, keyed by numeric id
    MultiExp,
    /// Workflow with a `function` trigger, keyed by function name
    Func,
    /// Workflow with a `job` trigger, keyed by job name
    Job,
    /// Workflow with a `dedicated_job` trigger, keyed by job name
    Djob,
}

impl KindTag {
    /// All kind tags, in index construction order
    pub fn all() -> &'static [KindTag] {
        &[
            KindTag::Dm,
            KindTag::SingleExp,
            KindTag::MultiExp,
            KindTag::Func,
            KindTag::Job,
            KindTag::Djob,
        ]
    }

    /// The textual tag used in keys
    pub fn as_str(&self) -> &'static str {
        match self {
            KindTag::Dm => "dm",
            KindTag::SingleExp => "single_exp",
            KindTag::MultiExp => "multi_exp",
            KindTag::Func => "func",
            KindTag::Job => "job",
            KindTag::Djob => "djob",
        }
    }

    /// Kind tag addressed by a workflow trigger or action of the given type
    ///
    /// Only `function`, `job` and `dedicated_job` are addressable by name.
    /// API triggers and everything else return `None`.
    pub fn from_invocation_type(kind: &str) -> Option<KindTag> {
        match kind {
            "function" => Some(KindTag::Func),
            "job" => Some(KindTag::Job),
            "dedicated_job" => Some(KindTag::Djob),
            _ => None,
        }
    }
}

impl fmt::Display for KindTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KindTag {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KindTag::all()
            .iter()
            .copied()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| KeyParseError::UnknownKind(s.to_string()))
    }
}

/// A kind-namespaced component key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedKey {
    kind: KindTag,
    local: String,
}

impl QualifiedKey {
    /// Build a key from a kind tag and a local identifier
    pub fn new(kind: KindTag, local: impl Into<String>) -> Self {
        Self {
            kind,
            local: local.into(),
        }
    }

    /// The kind tag
    pub fn kind(&self) -> KindTag {
        self.kind
    }

    /// The local identifier (numeric id or name)
    pub fn local(&self) -> &str {
        &self.local
    }
}

impl fmt::Display for QualifiedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.kind, KEY_SEPARATOR, self.local)
    }
}

impl FromStr for QualifiedKey {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, local) = s
            .split_once(KEY_SEPARATOR)
            .ok_or_else(|| KeyParseError::MissingSeparator(s.to_string()))?;
        if local.is_empty() {
            return Err(KeyParseError::EmptyLocal(s.to_string()));
        }
        Ok(QualifiedKey::new(kind.parse()?, local))
    }
}

impl Serialize for QualifiedKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for QualifiedKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error parsing a qualified key from text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyParseError {
    #[error("unknown kind tag '{0}'")]
    UnknownKind(String),

    #[error("key '{0}' has no '{sep}' separator", sep = KEY_SEPARATOR)]
    MissingSeparator(String),

    #[error("key '{0}' has an empty local identifier")]
    EmptyLocal(String),
}
