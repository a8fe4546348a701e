//! Component Inventory: list low-code platform components and report
//! unresolved cross-component dependencies.
//!
//! The core builds a kind-namespaced index over Data Managers, Single and
//! Multiple Experience Managers and Workflows, then walks each workflow's
//! actions to classify every reference as resolved or missing.

pub mod cli;
pub mod core;
