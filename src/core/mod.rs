//! Core module - record normalization, indexing and dependency resolution

pub mod analyst;
pub mod config;
pub mod index;
pub mod key;
pub mod record;
pub mod report;
pub mod resolver;
pub mod snapshot;
pub mod window;

pub use analyst::DependencyAnalyst;
pub use config::{Config, ConfigError, Limits, SnapshotFiles};
pub use index::{CollisionPolicy, ComponentIndex, IndexError, IndexStats, IndexedComponent};
pub use key::{KeyParseError, KindTag, QualifiedKey};
pub use record::{Action, Component, ComponentKind, RecordError, Trigger, Workflow};
pub use report::{DependencyReport, MissingDependencyEntry};
pub use resolver::{action_key, resolve_batch, resolve_workflow, AnalyzedWorkflow, DependencyOutcome};
pub use snapshot::{Inventory, SnapshotError};
pub use window::UpdateWindow;
