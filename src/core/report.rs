//! Missing-dependency report - append-only ledger of per-workflow entries

use serde::{Deserialize, Serialize};

use crate::core::key::QualifiedKey;

/// One analyzed workflow and the keys it could not resolve
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingDependencyEntry {
    pub component_id: Option<String>,
    pub component_name: Option<String>,
    /// Unresolved keys in action order; empty when fully resolved
    pub missing_dependencies: Vec<QualifiedKey>,
}

impl MissingDependencyEntry {
    pub fn has_missing(&self) -> bool {
        !self.missing_dependencies.is_empty()
    }
}

/// Accumulated report entries
///
/// Entries are never merged or deduplicated: analyzing the same workflow
/// twice records it twice. Start a new report for an independent run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DependencyReport {
    entries: Vec<MissingDependencyEntry>,
}

impl DependencyReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one entry
    pub fn record(&mut self, entry: MissingDependencyEntry) {
        self.entries.push(entry);
    }

    /// Append all entries of another report (e.g. from a worker)
    pub fn merge(&mut self, other: DependencyReport) {
        self.entries.extend(other.entries);
    }

    /// All entries accumulated so far
    pub fn entries(&self) -> &[MissingDependencyEntry] {
        &self.entries
    }

    /// Entries with at least one missing dependency
    pub fn with_missing(&self) -> impl Iterator<Item = &MissingDependencyEntry> {
        self.entries.iter().filter(|e| e.has_missing())
    }

    /// Total number of missing keys across all entries
    pub fn missing_count(&self) -> usize {
        self.entries.iter().map(|e| e.missing_dependencies.len()).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, missing: &[&str]) -> MissingDependencyEntry {
        MissingDependencyEntry {
            component_id: Some(id.to_string()),
            component_name: None,
            missing_dependencies: missing.iter().map(|k| k.parse().unwrap()).collect(),
        }
    }

    #[test]
    fn test_record_and_counts() {
        let mut report = DependencyReport::new();
        report.record(entry("1", &[]));
        report.record(entry("2", &["dm:9", "job:X"]));

        assert_eq!(report.len(), 2);
        assert_eq!(report.missing_count(), 2);
        assert_eq!(report.with_missing().count(), 1);
    }

    #[test]
    fn test_same_workflow_recorded_twice() {
        let mut report = DependencyReport::new();
        report.record(entry("1", &["dm:9"]));
        report.record(entry("1", &["dm:9"]));

        assert_eq!(report.len(), 2);
        assert_eq!(report.entries()[0], report.entries()[1]);
    }

    #[test]
    fn test_merge_appends() {
        let mut left = DependencyReport::new();
        left.record(entry("1", &[]));
        let mut right = DependencyReport::new();
        right.record(entry("2", &["func:a"]));
        right.record(entry("1", &[]));

        left.merge(right);
        let ids: Vec<_> = left
            .entries()
            .iter()
            .map(|e| e.component_id.clone().unwrap())
            .collect();
        assert_eq!(ids, vec!["1", "2", "1"]);
    }

    #[test]
    fn test_entry_serializes_keys_as_strings() {
        let json = serde_json::to_value(entry("4", &["dm:9"])).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "component_id": "4",
                "component_name": null,
                "missing_dependencies": ["dm:9"]
            })
        );
    }
}
