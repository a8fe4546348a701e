//! `cinv list` command - List the components of one kind

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::cli::commands::utils::{load_snapshot, SnapshotArgs};
use crate::cli::helpers::{escape_md, format_timestamp, truncate_str};
use crate::cli::output::effective_format;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{Component, ComponentKind};

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub snapshot: SnapshotArgs,

    /// Component kind to list
    #[arg(long, short = 'k', value_enum)]
    pub kind: ComponentKind,

    /// Show count only
    #[arg(long)]
    pub count: bool,
}

/// One listed component, with display-formatted timestamps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct ComponentRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "NAME")]
    pub name: String,
    #[tabled(rename = "CREATED")]
    pub created_at: String,
    #[tabled(rename = "UPDATED")]
    pub updated_at: String,
}

impl ComponentRow {
    pub fn from_component(component: &Component) -> Self {
        Self {
            id: component.id.clone().unwrap_or_default(),
            name: component.name.clone().unwrap_or_default(),
            created_at: format_timestamp(component.created_at),
            updated_at: format_timestamp(component.updated_at),
        }
    }
}

/// Run the list command
pub fn run(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let loaded = load_snapshot(&args.snapshot, global)?;
    let rows: Vec<ComponentRow> = loaded
        .window
        .filter_components(loaded.inventory.components(args.kind))
        .into_iter()
        .map(ComponentRow::from_component)
        .collect();

    if args.count {
        println!("{}", rows.len());
        return Ok(());
    }

    match effective_format(global.output) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&rows).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&rows).into_diagnostic()?);
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(std::io::stdout());
            for row in &rows {
                writer.serialize(row).into_diagnostic()?;
            }
            writer.flush().into_diagnostic()?;
        }
        OutputFormat::Table => {
            let mut table = Table::new(&rows);
            table.with(Style::rounded());
            println!("{}", table);
        }
        OutputFormat::Md => {
            println!("| ID | Name | Created | Updated |");
            println!("|---|---|---|---|");
            for row in &rows {
                println!(
                    "| {} | {} | {} | {} |",
                    escape_md(&row.id),
                    escape_md(&row.name),
                    row.created_at,
                    row.updated_at
                );
            }
        }
        OutputFormat::Id => {
            for row in rows.iter().filter(|r| !r.id.is_empty()) {
                println!("{}", row.id);
            }
        }
        OutputFormat::Tsv | OutputFormat::Auto => {
            if rows.is_empty() {
                println!("No {} components found.", args.kind);
                return Ok(());
            }

            println!(
                "{:<12} {:<36} {:<20} {:<20}",
                style("ID").bold(),
                style("NAME").bold(),
                style("CREATED").bold(),
                style("UPDATED").bold()
            );
            println!("{}", "-".repeat(90));
            for row in &rows {
                println!(
                    "{:<12} {:<36} {:<20} {:<20}",
                    style(truncate_str(&row.id, 12)).cyan(),
                    truncate_str(&row.name, 34),
                    row.created_at,
                    row.updated_at
                );
            }
            println!();
            println!(
                "{} {} component(s)",
                style(rows.len()).cyan(),
                args.kind
            );
        }
    }

    Ok(())
}
