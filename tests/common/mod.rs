//! Shared test helpers for integration tests
//!
//! Builds snapshot directories in temp dirs and runs the `cinv` binary.

#![allow(dead_code)]

use assert_cmd::cargo;
use assert_cmd::Command;
use serde_json::{json, Value};
use std::fs;
use tempfile::TempDir;

/// Helper to get a cinv command
pub fn cinv() -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("cinv"));
    // Keep the user's environment out of the tests
    for var in [
        "CINV_LOG",
        "DATA_MANAGER_LIMIT",
        "SINGLE_EXP_MANAGER_LIMIT",
        "MULTIPLE_EXP_MANAGER_LIMIT",
        "VISUAL_PROGRAMMING_LIMIT",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

/// Write one collection file into a snapshot directory
pub fn write_collection(tmp: &TempDir, file: &str, records: Value) {
    fs::write(tmp.path().join(file), records.to_string()).unwrap();
}

/// Snapshot directory with the given collections; `None` leaves the file out
pub fn setup_snapshot(
    dm: Option<Value>,
    single: Option<Value>,
    multi: Option<Value>,
    vp: Option<Value>,
) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for (file, records) in [
        ("dm.json", dm),
        ("single-exp-manager.json", single),
        ("multiple-exp-manager.json", multi),
        ("vp.json", vp),
    ] {
        if let Some(records) = records {
            write_collection(&tmp, file, records);
        }
    }
    tmp
}

/// Snapshot covering resolved and unresolved references of every kind
///
/// - workflow 100 (`job:nightly-sync`) reads Data Manager 5 and calls `func:billing`
/// - workflow 101 (`func:billing`) writes to Data Manager 9, which does not exist
/// - workflow 102 is API-triggered and calls the missing `djob:cleanup`
pub fn setup_sample_snapshot() -> TempDir {
    setup_snapshot(
        Some(json!([
            {"id": 5, "name": "Orders", "created_at": 1700000000, "updated_at": 1704067200},
            {"id": 6, "name": "Customers", "created_at": 1700000000, "updated_at": 1717200000}
        ])),
        Some(json!({"data": [{"id": 1, "name": "Order Form"}]})),
        Some(json!([])),
        Some(json!([
            {
                "id": 100,
                "name": "Nightly Sync",
                "updated_at": 1704067200,
                "trigger": {"type": "job", "job": {"name": "nightly-sync"}},
                "actions": [
                    {"type": "find_records", "form_data_id": 5},
                    {"type": "function", "function": {"name": "billing"}}
                ]
            },
            {
                "id": 101,
                "name": "Billing",
                "updated_at": 1717200000000u64,
                "trigger": {"type": "function", "function": {"name": "billing"}},
                "actions": [
                    {"type": "create_record", "form_data_id": "9"}
                ]
            },
            {
                "id": 102,
                "name": "Public Hook",
                "updated_at": 1717200000,
                "trigger": {"type": "api_v2", "api_v2": {"endpoint": "/hook"}},
                "actions": [
                    {"type": "api_call", "url": "https://example.invalid"},
                    {"type": "dedicated_job", "dedicated_job": {"name": "cleanup"}}
                ]
            }
        ])),
    )
}

/// Parse stdout as JSON
pub fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap()
}
