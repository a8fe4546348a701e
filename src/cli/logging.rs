//! Diagnostic logging setup
//!
//! Logs go to stderr so stdout stays usable in pipelines. `CINV_LOG` takes
//! an `EnvFilter` directive and overrides `-v`/`-q`.

use tracing_subscriber::EnvFilter;

use crate::cli::GlobalOpts;

/// Environment variable holding a log filter directive
pub const LOG_ENV: &str = "CINV_LOG";

/// Filter directive for the given verbosity flags
pub fn default_directive(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber; later calls are ignored
pub fn init(global: &GlobalOpts) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(global.verbose, global.quiet)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
