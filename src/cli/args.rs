//! Command-line argument definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::analyze::AnalyzeArgs;
use crate::cli::commands::completions::CompletionsArgs;
use crate::cli::commands::export::ExportArgs;
use crate::cli::commands::list::ListArgs;

#[derive(Parser, Debug)]
#[command(
    name = "cinv",
    version,
    about = "List low-code platform components and report unresolved dependencies",
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command
#[derive(clap::Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'o', global = true, value_enum, default_value_t = OutputFormat::Auto)]
    pub output: OutputFormat,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Config file (default: <SNAPSHOT>/cinv.yaml, then the user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Report missing dependencies of workflow components
    Analyze(AnalyzeArgs),

    /// List the components of one kind
    List(ListArgs),

    /// Write component lists and the dependency report as CSV files
    Export(ExportArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Output format for list-style commands
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// TSV for lists
    #[default]
    Auto,
    /// Aligned, styled columns
    Tsv,
    /// Boxed table
    Table,
    Json,
    Yaml,
    Csv,
    /// Markdown table
    Md,
    /// Identifiers only, one per line
    Id,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OutputFormat::Auto => "auto",
            OutputFormat::Tsv => "tsv",
            OutputFormat::Table => "table",
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
            OutputFormat::Csv => "csv",
            OutputFormat::Md => "md",
            OutputFormat::Id => "id",
        };
        f.write_str(name)
    }
}
