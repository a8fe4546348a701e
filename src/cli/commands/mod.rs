//! CLI command implementations

pub mod analyze;
pub mod completions;
pub mod export;
pub mod list;
pub mod utils;
