//! `cinv analyze` command - Report unresolved workflow dependencies
//!
//! The index covers the whole snapshot; only the workflows inside the
//! update-time window are analyzed.

use console::style;
use miette::{IntoDiagnostic, Result};
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::cli::commands::utils::{load_snapshot, SnapshotArgs};
use crate::cli::helpers::{escape_md, join_keys, truncate_str, KEY_LIST_SEPARATOR};
use crate::cli::output::effective_format;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{DependencyAnalyst, MissingDependencyEntry};

#[derive(clap::Args, Debug)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub snapshot: SnapshotArgs,

    /// Only show workflows with at least one missing dependency
    #[arg(long)]
    pub missing_only: bool,

    /// Exit with an error if any dependency is missing
    #[arg(long)]
    pub fail_on_missing: bool,

    /// Resolver worker threads (default: `workers` from config)
    #[arg(long, short = 'j')]
    pub jobs: Option<usize>,

    /// Show count only
    #[arg(long)]
    pub count: bool,
}

#[derive(Tabled)]
struct ReportRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "MISSING DEPENDENCIES")]
    missing: String,
}

/// Run the analyze command
pub fn run(args: AnalyzeArgs, global: &GlobalOpts) -> Result<()> {
    let loaded = load_snapshot(&args.snapshot, global)?;
    let workflows = loaded.window.filter_workflows(&loaded.inventory.workflows);

    let mut analyst = DependencyAnalyst::with_policy(&loaded.inventory, loaded.config.on_collision)?;
    let jobs = args.jobs.unwrap_or(loaded.config.workers);
    analyst.analyze_parallel(&workflows, jobs);

    let report = analyst.report();
    let entries: Vec<&MissingDependencyEntry> = report
        .entries()
        .iter()
        .filter(|e| !args.missing_only || e.has_missing())
        .collect();

    if args.count {
        println!("{}", entries.len());
    } else {
        print_entries(&entries, global.output, report.len(), report.missing_count())?;
    }

    if args.fail_on_missing && report.missing_count() > 0 {
        return Err(miette::miette!(
            "{} missing dependencies across {} workflow(s)",
            report.missing_count(),
            report.with_missing().count()
        ));
    }

    Ok(())
}

fn print_entries(
    entries: &[&MissingDependencyEntry],
    format: OutputFormat,
    analyzed: usize,
    missing: usize,
) -> Result<()> {
    match effective_format(format) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(entries).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&entries).into_diagnostic()?);
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(std::io::stdout());
            writer
                .write_record(["component_id", "component_name", "missing_dependencies"])
                .into_diagnostic()?;
            for entry in entries {
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
        }
        OutputFormat::Table => {
            let rows = entries.iter().map(|e| ReportRow {
                id: e.component_id.clone().unwrap_or_default(),
                name: e.component_name.clone().unwrap_or_default(),
                missing: join_keys(&e.missing_dependencies, ", "),
            });
            let mut table = Table::new(rows);
            table.with(Style::rounded());
            println!("{}", table);
        }
        OutputFormat::Md => {
            println!("| ID | Name | Missing Dependencies |");
            println!("|---|---|---|");
            for entry in entries {
                println!(
                    "| {} | {} | {} |",
                    escape_md(entry.component_id.as_deref().unwrap_or_default()),
                    escape_md(entry.component_name.as_deref().unwrap_or_default()),
                    escape_md(&join_keys(&entry.missing_dependencies, ", "))
                );
            }
        }
        OutputFormat::Id => {
            for entry in entries {
                if let Some(id) = &entry.component_id {
                    println!("{}", id);
                }
            }
        }
        OutputFormat::Tsv | OutputFormat::Auto => {
            if entries.is_empty() {
                println!("No workflows to report.");
            } else {
                println!(
                    "{:<12} {:<32} {}",
                    style("ID").bold(),
                    style("NAME").bold(),
                    style("MISSING").bold()
                );
                println!("{}", "-".repeat(80));
                for entry in entries {
                    let missing_cell = if entry.has_missing() {
                        style(join_keys(&entry.missing_dependencies, ", ")).red()
                    } else {
                        style("-".to_string()).dim()
                    };
                    println!(
                        "{:<12} {:<32} {}",
                        style(truncate_str(entry.component_id.as_deref().unwrap_or_default(), 12)).cyan(),
                        truncate_str(entry.component_name.as_deref().unwrap_or_default(), 30),
                        missing_cell
                    );
                }
            }
            println!();
            println!(
                "{} workflow(s) analyzed, {} missing dependencies",
                style(analyzed).cyan(),
                if missing > 0 {
                    style(missing).red()
                } else {
                    style(missing).green()
                }
            );
        }
    }

    Ok(())
}
