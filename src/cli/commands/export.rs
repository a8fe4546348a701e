//! `cinv export` command - Write component lists and the dependency report to a directory

use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::cli::commands::list::ComponentRow;
use crate::cli::commands::utils::{load_snapshot, print_fetch_summary, SnapshotArgs};
use crate::cli::helpers::{join_keys, KEY_LIST_SEPARATOR};
use crate::cli::GlobalOpts;
use crate::core::{ComponentKind, DependencyAnalyst, Inventory, UpdateWindow};

/// Report file for unresolved references
pub const MISSING_DEPENDENCIES_FILE: &str = "missing-dependencies.csv";

/// Workflow records with their dependency lists attached
pub const ANNOTATED_WORKFLOWS_FILE: &str = "vp-annotated.json";

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    #[command(flatten)]
    pub snapshot: SnapshotArgs,

    /// Output directory (created if missing)
    #[arg(long, short = 'd')]
    pub out: PathBuf,

    /// Resolver worker threads (default: `workers` from config)
    #[arg(long, short = 'j')]
    pub jobs: Option<usize>,
}

/// CSV list file name for a component kind
pub fn list_file_name(kind: ComponentKind) -> &'static str {
    match kind {
        ComponentKind::DataManager => "dm-list.csv",
        ComponentKind::SingleExp => "single-exp-manager-list.csv",
        ComponentKind::MultiExp => "multiple-exp-manager-list.csv",
        ComponentKind::Workflow => "vp-list.csv",
    }
}

/// Run the export command
pub fn run(args: ExportArgs, global: &GlobalOpts) -> Result<()> {
    let loaded = load_snapshot(&args.snapshot, global)?;
    if !global.quiet {
        print_fetch_summary(&loaded.inventory);
    }

    fs::create_dir_all(&args.out).into_diagnostic()?;

    for &kind in ComponentKind::all() {
        let path = args.out.join(list_file_name(kind));
        let written = write_component_list(&path, &loaded.inventory, kind, &loaded.window)?;
        report_written(global, &path, written);
    }

    let workflows = loaded.window.filter_workflows(&loaded.inventory.workflows);
    let mut analyst = match DependencyAnalyst::with_policy(&loaded.inventory, loaded.config.on_collision) {
        Ok(analyst) => analyst,
        Err(e) => {
            warn!(error = %e, "dependency analysis failed, exporting lists only");
            remove_stale_reports(&args.out)?;
            if !global.quiet {
                eprintln!(
                    "{} Dependency analysis skipped: {}",
                    style("!").yellow(),
                    e
                );
            }
            return Ok(());
        }
    };

    let jobs = args.jobs.unwrap_or(loaded.config.workers);
    let analyzed = analyst.analyze_parallel(&workflows, jobs);

    let path = args.out.join(MISSING_DEPENDENCIES_FILE);
    let mut writer = csv::Writer::from_path(&path).into_diagnostic()?;
    writer
        .write_record(["component_id", "component_name", "missing_dependencies"])
        .into_diagnostic()?;
    for entry in analyst.missing_dependencies() {
        let missing = join_keys(&entry.missing_dependencies, KEY_LIST_SEPARATOR);
        writer
            .write_record([
                entry.component_id.as_deref().unwrap_or_default(),
                entry.component_name.as_deref().unwrap_or_default(),
                missing.as_str(),
            ])
            .into_diagnostic()?;
    }
    writer.flush().into_diagnostic()?;
    report_written(global, &path, analyst.report().len());

    let path = args.out.join(ANNOTATED_WORKFLOWS_FILE);
    let annotated: Vec<_> = analyzed.iter().map(|a| a.annotated_fields()).collect();
    let file = File::create(&path).into_diagnostic()?;
    serde_json::to_writer_pretty(file, &annotated).into_diagnostic()?;
    report_written(global, &path, annotated.len());

    if !global.quiet {
        println!();
        println!(
            "{} workflow(s) analyzed, {} missing dependencies",
            style(analyst.report().len()).cyan(),
            style(analyst.report().missing_count()).yellow()
        );
    }

    Ok(())
}

fn write_component_list(
    path: &Path,
    inventory: &Inventory,
    kind: ComponentKind,
    window: &UpdateWindow,
) -> Result<usize> {
    let mut writer = csv::Writer::from_path(path).into_diagnostic()?;
    let components = window.filter_components(inventory.components(kind));
    for component in &components {
        writer
            .serialize(ComponentRow::from_component(component))
            .into_diagnostic()?;
    }
    let written = components.len();
    // Keep the header even for an empty list
    if written == 0 {
        writer
            .write_record(["id", "name", "created_at", "updated_at"])
            .into_diagnostic()?;
    }
    writer.flush().into_diagnostic()?;
    Ok(written)
}

/// Drop dependency files left by an earlier export into the same directory
fn remove_stale_reports(out: &Path) -> Result<()> {
    for file in [MISSING_DEPENDENCIES_FILE, ANNOTATED_WORKFLOWS_FILE] {
        match fs::remove_file(out.join(file)) {
            Ok(()) => debug!(file, "removed stale dependency report"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e).into_diagnostic(),
        }
    }
    Ok(())
}

fn report_written(global: &GlobalOpts, path: &Path, records: usize) {
    if !global.quiet {
        println!(
            "{} Wrote {} ({} records)",
            style("✓").green(),
            style(path.display()).cyan(),
            records
        );
    }
}
