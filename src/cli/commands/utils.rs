//! Shared utilities for CLI commands

use chrono::NaiveDate;
use console::style;
use miette::Result;
use std::path::PathBuf;
use tracing::info;

use crate::cli::GlobalOpts;
use crate::core::{ComponentKind, Config, Inventory, UpdateWindow};

/// Snapshot location, update-time window and collection limits
#[derive(clap::Args, Debug, Clone)]
pub struct SnapshotArgs {
    /// Snapshot directory holding the collection JSON files
    pub snapshot: PathBuf,

    /// Only include records updated on or after this date (YYYY-MM-DD)
    #[arg(long)]
    pub since: Option<NaiveDate>,

    /// Only include records updated on or before this date (YYYY-MM-DD)
    #[arg(long)]
    pub until: Option<NaiveDate>,

    /// Maximum Data Manager records to read
    #[arg(long, env = "DATA_MANAGER_LIMIT")]
    pub dm_limit: Option<usize>,

    /// Maximum Single Exp. Manager records to read
    #[arg(long, env = "SINGLE_EXP_MANAGER_LIMIT")]
    pub single_limit: Option<usize>,

    /// Maximum Multiple Exp. Manager records to read
    #[arg(long, env = "MULTIPLE_EXP_MANAGER_LIMIT")]
    pub multi_limit: Option<usize>,

    /// Maximum Visual Programming (workflow) records to read
    #[arg(long, env = "VISUAL_PROGRAMMING_LIMIT")]
    pub vp_limit: Option<usize>,
}

impl SnapshotArgs {
    fn limit_overrides(&self) -> [(ComponentKind, Option<usize>); 4] {
        [
            (ComponentKind::DataManager, self.dm_limit),
            (ComponentKind::SingleExp, self.single_limit),
            (ComponentKind::MultiExp, self.multi_limit),
            (ComponentKind::Workflow, self.vp_limit),
        ]
    }

    /// Update-time window from `--since` / `--until`
    pub fn window(&self) -> Result<UpdateWindow> {
        if let (Some(since), Some(until)) = (self.since, self.until) {
            if since > until {
                return Err(miette::miette!(
                    "--since {} is after --until {}",
                    since,
                    until
                ));
            }
        }
        Ok(UpdateWindow::from_dates(self.since, self.until))
    }
}

/// A loaded snapshot with the settings that produced it
pub struct LoadedSnapshot {
    pub config: Config,
    pub inventory: Inventory,
    pub window: UpdateWindow,
}

/// Resolve config, apply limit overrides and load the full snapshot
///
/// The inventory is never windowed here: the index must see every
/// component, only what gets listed or analyzed is filtered.
pub fn load_snapshot(args: &SnapshotArgs, global: &GlobalOpts) -> Result<LoadedSnapshot> {
    let window = args.window()?;
    let mut config = Config::load(global.config.as_deref(), &args.snapshot)?;
    for (kind, limit) in args.limit_overrides() {
        if let Some(limit) = limit {
            config.limits.set(kind, limit);
        }
    }

    let inventory = Inventory::load(&args.snapshot, &config)?;
    info!(
        snapshot = %args.snapshot.display(),
        records = inventory.total(),
        "snapshot loaded"
    );

    Ok(LoadedSnapshot {
        config,
        inventory,
        window,
    })
}

/// Print the per-collection record counts to stderr
pub fn print_fetch_summary(inventory: &Inventory) {
    for kind in ComponentKind::all() {
        eprintln!(
            "{} Loaded {} {} components.",
            style("✓").green(),
            style(inventory.len(*kind)).cyan(),
            kind
        );
    }
}
