use clap::Parser;
use miette::Result;
use cinv::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Install miette's fancy error handler for beautiful diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    cinv::cli::logging::init(&cli.global);

    match cli.command {
        Commands::Analyze(args) => cinv::cli::commands::analyze::run(args, &cli.global),
        Commands::List(args) => cinv::cli::commands::list::run(args, &cli.global),
        Commands::Export(args) => cinv::cli::commands::export::run(args, &cli.global),
        Commands::Completions(args) => cinv::cli::commands::completions::run(args),
    }
}
