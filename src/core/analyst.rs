//! Dependency analyst - one analysis run over an inventory snapshot
//!
//! The analyst owns the index built from a snapshot and the report that
//! accumulates across every [`DependencyAnalyst::analyze`] call. Calls are
//! additive; create a fresh analyst for an independent analysis.

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::core::index::{CollisionPolicy, ComponentIndex, IndexError};
use crate::core::record::Workflow;
use crate::core::report::{DependencyReport, MissingDependencyEntry};
use crate::core::resolver::{resolve_batch, resolve_workflow, AnalyzedWorkflow};
use crate::core::snapshot::Inventory;

/// Index plus cumulative missing-dependency report
#[derive(Debug)]
pub struct DependencyAnalyst<'a> {
    index: ComponentIndex<'a>,
    report: DependencyReport,
}

impl<'a> DependencyAnalyst<'a> {
    /// Index the full inventory with last-write-wins collisions
    pub fn new(inventory: &'a Inventory) -> Self {
        Self::from_index(ComponentIndex::build(inventory))
    }

    /// Index the full inventory with an explicit collision policy
    pub fn with_policy(inventory: &'a Inventory, policy: CollisionPolicy) -> Result<Self, IndexError> {
        Ok(Self::from_index(ComponentIndex::build_with_policy(inventory, policy)?))
    }

    pub fn from_index(index: ComponentIndex<'a>) -> Self {
        info!(
            keys = index.len(),
            skipped = index.stats().skipped,
            collisions = index.stats().collisions,
            "component index built"
        );
        Self {
            index,
            report: DependencyReport::new(),
        }
    }

    /// Resolve a batch of workflows and append their entries to the report
    pub fn analyze<'w>(&mut self, workflows: &'w [Workflow]) -> Vec<AnalyzedWorkflow<'w>> {
        let (analyzed, report) = resolve_batch(&self.index, workflows);
        self.absorb(report);
        analyzed
    }

    /// Like [`analyze`](Self::analyze), spreading the batch over a worker pool
    ///
    /// Workers share the read-only index. Results keep input order, so the
    /// report matches a sequential run.
    pub fn analyze_parallel<'w>(
        &mut self,
        workflows: &'w [Workflow],
        workers: usize,
    ) -> Vec<AnalyzedWorkflow<'w>> {
        if workers <= 1 || workflows.len() < 2 {
            return self.analyze(workflows);
        }

        let pool = match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
            Ok(pool) => pool,
            Err(e) => {
                warn!(error = %e, workers, "worker pool unavailable, resolving sequentially");
                return self.analyze(workflows);
            }
        };

        let index = &self.index;
        let analyzed: Vec<AnalyzedWorkflow<'w>> = pool.install(|| {
            workflows
                .par_iter()
                .map(|workflow| AnalyzedWorkflow {
                    workflow,
                    outcome: resolve_workflow(index, workflow),
                })
                .collect()
        });

        let mut report = DependencyReport::new();
        for workflow in &analyzed {
            report.record(workflow.report_entry());
        }
        self.absorb(report);
        analyzed
    }

    fn absorb(&mut self, report: DependencyReport) {
        debug!(
            workflows = report.len(),
            missing = report.missing_count(),
            "resolved workflow batch"
        );
        self.report.merge(report);
    }

    /// Entries accumulated across every analyze call so far
    pub fn missing_dependencies(&self) -> &[MissingDependencyEntry] {
        self.report.entries()
    }

    pub fn report(&self) -> &DependencyReport {
        &self.report
    }
}
