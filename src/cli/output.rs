//! Output formatting utilities

use crate::cli::OutputFormat;

/// Resolve `auto` to the concrete format used for terminal output
///
/// Every command prints record lists, which render as aligned columns.
pub fn effective_format(format: OutputFormat) -> OutputFormat {
    match format {
        OutputFormat::Auto => OutputFormat::Tsv,
        other => other,
    }
}
