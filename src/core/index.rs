//! Entity index - one namespaced lookup table over all four collections
//!
//! The index borrows the records of an [`Inventory`] and is read-only once
//! built, so it can be shared between resolver threads.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::core::key::{KindTag, QualifiedKey};
use crate::core::record::{Component, ComponentKind, Workflow};
use crate::core::snapshot::Inventory;

/// What to do when two records produce the same key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Later record replaces the earlier one; each collision is logged
    #[default]
    Overwrite,
    /// Abort index construction on the first collision
    Reject,
}

/// Errors from index construction
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum IndexError {
    #[error("duplicate component key: {key}")]
    #[diagnostic(
        code(cinv::index::key_collision),
        help("two records share this identifier; set `on_collision: overwrite` to keep the last one")
    )]
    KeyCollision { key: QualifiedKey },
}

/// A record owned by the index, tagged with its collection
#[derive(Debug, Clone, Copy)]
pub enum IndexedComponent<'a> {
    DataManager(&'a Component),
    SingleExp(&'a Component),
    MultiExp(&'a Component),
    Workflow(&'a Workflow),
}

impl<'a> IndexedComponent<'a> {
    pub fn component(&self) -> &'a Component {
        match self {
            IndexedComponent::DataManager(c)
            | IndexedComponent::SingleExp(c)
            | IndexedComponent::MultiExp(c) => c,
            IndexedComponent::Workflow(w) => &w.component,
        }
    }

    pub fn kind(&self) -> ComponentKind {
        match self {
            IndexedComponent::DataManager(_) => ComponentKind::DataManager,
            IndexedComponent::SingleExp(_) => ComponentKind::SingleExp,
            IndexedComponent::MultiExp(_) => ComponentKind::MultiExp,
            IndexedComponent::Workflow(_) => ComponentKind::Workflow,
        }
    }
}

/// Counters collected while building the index
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    /// Data/Single/Multi records skipped for lacking an id
    pub skipped: usize,
    /// Workflows whose trigger is not addressable by name
    pub unaddressable: usize,
    /// Keys produced more than once
    pub collisions: usize,
}

/// Namespaced lookup table from qualified key to owning record
#[derive(Debug, Default)]
pub struct ComponentIndex<'a> {
    entries: HashMap<QualifiedKey, IndexedComponent<'a>>,
    stats: IndexStats,
}

impl<'a> ComponentIndex<'a> {
    /// Build the index with last-write-wins semantics
    pub fn build(inventory: &'a Inventory) -> Self {
        let mut index = Self::default();
        for (key, entry) in index.addressable(inventory) {
            index.overwrite(key, entry);
        }
        index
    }

    /// Build the index, applying the given collision policy
    pub fn build_with_policy(
        inventory: &'a Inventory,
        policy: CollisionPolicy,
    ) -> Result<Self, IndexError> {
        match policy {
            CollisionPolicy::Overwrite => Ok(Self::build(inventory)),
            CollisionPolicy::Reject => {
                let mut index = Self::default();
                for (key, entry) in index.addressable(inventory) {
                    if index.entries.contains_key(&key) {
                        return Err(IndexError::KeyCollision { key });
                    }
                    index.entries.insert(key, entry);
                }
                Ok(index)
            }
        }
    }

    /// Every keyed record of the inventory, in insertion order
    fn addressable(&mut self, inventory: &'a Inventory) -> Vec<(QualifiedKey, IndexedComponent<'a>)> {
        let plain: [(KindTag, &'a [Component], fn(&'a Component) -> IndexedComponent<'a>); 3] = [
            (KindTag::Dm, inventory.data_managers.as_slice(), IndexedComponent::DataManager),
            (KindTag::SingleExp, inventory.single_exp.as_slice(), IndexedComponent::SingleExp),
            (KindTag::MultiExp, inventory.multi_exp.as_slice(), IndexedComponent::MultiExp),
        ];

        let mut keyed = Vec::with_capacity(inventory.total());
        for (tag, records, wrap) in plain {
            for (position, record) in records.iter().enumerate() {
                match &record.id {
                    Some(id) => keyed.push((QualifiedKey::new(tag, id.clone()), wrap(record))),
                    None => {
                        warn!(kind = %tag, position, "record has no id, skipping");
                        self.stats.skipped += 1;
                    }
                }
            }
            debug!(kind = %tag, records = records.len(), "indexed collection");
        }

        for workflow in &inventory.workflows {
            match workflow_key(workflow) {
                Some(key) => keyed.push((key, IndexedComponent::Workflow(workflow))),
                None => self.stats.unaddressable += 1,
            }
        }
        debug!(
            records = inventory.workflows.len(),
            unaddressable = self.stats.unaddressable,
            "indexed workflows"
        );

        keyed
    }

    fn overwrite(&mut self, key: QualifiedKey, entry: IndexedComponent<'a>) {
        let replacing = entry.component().id.clone();
        if let Some(previous) = self.entries.insert(key.clone(), entry) {
            warn!(
                %key,
                replaced_kind = %previous.kind(),
                replaced_id = previous.component().id.as_deref().unwrap_or_default(),
                by_id = replacing.as_deref().unwrap_or_default(),
                "duplicate component key, later record replaces earlier"
            );
            self.stats.collisions += 1;
        }
    }

    pub fn contains(&self, key: &QualifiedKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> IndexStats {
        self.stats
    }
}

/// Key under which a workflow is addressable, if its trigger allows it
///
/// API-triggered workflows and triggers without a name produce no key.
pub fn workflow_key(workflow: &Workflow) -> Option<QualifiedKey> {
    let trigger = workflow.trigger.as_ref()?;
    let tag = KindTag::from_invocation_type(&trigger.kind)?;
    let name = trigger.name.as_ref()?;
    Some(QualifiedKey::new(tag, name.clone()))
}
