//! Reference resolver - walks workflow actions and classifies references
//!
//! Each action that names another component yields exactly one qualified
//! key. The key always goes on the dependency list; when the index has no
//! entry for it, it also goes on the missing list. Action order is kept
//! and nothing is deduplicated.

use serde::Serialize;
use serde_json::Value;

use crate::core::index::ComponentIndex;
use crate::core::key::{KindTag, QualifiedKey};
use crate::core::record::{Action, Fields, Workflow, RECORD_ACTIONS};
use crate::core::report::{DependencyReport, MissingDependencyEntry};

/// Field names used when echoing annotated workflow records
///
/// Prefixed so they never collide with fields the platform already stores.
pub const DEPENDENCIES_FIELD: &str = "vp_dependencies";
pub const MISSING_DEPENDENCIES_FIELD: &str = "vp_missing_dependencies";

/// Dependency lists of one workflow
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DependencyOutcome {
    /// Every referenced key, in action order
    pub dependencies: Vec<QualifiedKey>,
    /// Referenced keys with no index entry, in action order
    pub missing: Vec<QualifiedKey>,
}

/// A workflow together with its dependency annotations
#[derive(Debug, Clone)]
pub struct AnalyzedWorkflow<'w> {
    pub workflow: &'w Workflow,
    pub outcome: DependencyOutcome,
}

impl AnalyzedWorkflow<'_> {
    /// Report entry for this workflow
    pub fn report_entry(&self) -> MissingDependencyEntry {
        MissingDependencyEntry {
            component_id: self.workflow.id().map(str::to_string),
            component_name: self.workflow.name().map(str::to_string),
            missing_dependencies: self.outcome.missing.clone(),
        }
    }

    /// The original record with both dependency lists added
    pub fn annotated_fields(&self) -> Fields {
        let mut fields = self.workflow.component.fields.clone();
        fields.insert(
            DEPENDENCIES_FIELD.to_string(),
            keys_to_json(&self.outcome.dependencies),
        );
        fields.insert(
            MISSING_DEPENDENCIES_FIELD.to_string(),
            keys_to_json(&self.outcome.missing),
        );
        fields
    }
}

/// Key referenced by an action, if its type references a component
///
/// Returns `None` for unrecognized types (including API calls) and for
/// recognized types whose identifier is absent or empty.
pub fn action_key(action: &Action) -> Option<QualifiedKey> {
    let tag = if RECORD_ACTIONS.contains(&action.kind.as_str()) {
        KindTag::Dm
    } else {
        KindTag::from_invocation_type(&action.kind)?
    };
    let target = action.target.as_ref()?;
    Some(QualifiedKey::new(tag, target.clone()))
}

/// Resolve the actions of one workflow against the index
pub fn resolve_workflow(index: &ComponentIndex<'_>, workflow: &Workflow) -> DependencyOutcome {
    let mut outcome = DependencyOutcome::default();

    for key in workflow.actions.iter().filter_map(action_key) {
        if !index.contains(&key) {
            outcome.missing.push(key.clone());
        }
        outcome.dependencies.push(key);
    }

    outcome
}

/// Resolve a batch of workflows, producing annotations and a report
///
/// The returned report holds one entry per workflow, in input order.
pub fn resolve_batch<'w>(
    index: &ComponentIndex<'_>,
    workflows: &'w [Workflow],
) -> (Vec<AnalyzedWorkflow<'w>>, DependencyReport) {
    let mut report = DependencyReport::new();
    let analyzed = workflows
        .iter()
        .map(|workflow| {
            let analyzed = AnalyzedWorkflow {
                workflow,
                outcome: resolve_workflow(index, workflow),
            };
            report.record(analyzed.report_entry());
            analyzed
        })
        .collect();
    (analyzed, report)
}

fn keys_to_json(keys: &[QualifiedKey]) -> Value {
    Value::Array(keys.iter().map(|k| Value::String(k.to_string())).collect())
}
