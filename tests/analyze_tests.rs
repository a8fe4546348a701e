//! Dependency analysis tests - resolution through the `analyze` command

mod common;

use common::{cinv, setup_sample_snapshot, setup_snapshot, stdout_json, write_collection};
use predicates::prelude::*;
use serde_json::json;

// ============================================================================
// Report Contents
// ============================================================================

#[test]
fn test_analyze_reports_every_workflow() {
    let tmp = setup_sample_snapshot();
    let output = cinv()
        .args(["analyze", "-o", "json"])
        .arg(tmp.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let report = stdout_json(&output);
    assert_eq!(
        report,
        json!([
            {"component_id": "100", "component_name": "Nightly Sync", "missing_dependencies": []},
            {"component_id": "101", "component_name": "Billing", "missing_dependencies": ["dm:9"]},
            {"component_id": "102", "component_name": "Public Hook", "missing_dependencies": ["djob:cleanup"]}
        ])
    );
}

#[test]
fn test_analyze_missing_only() {
    let tmp = setup_sample_snapshot();
    let output = cinv()
        .args(["analyze", "--missing-only", "-o", "json"])
        .arg(tmp.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let ids: Vec<_> = stdout_json(&output)
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["component_id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["101", "102"]);
}

#[test]
fn test_analyze_tsv_summary() {
    let tmp = setup_sample_snapshot();
    cinv()
        .args(["analyze", "-o", "tsv"])
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("dm:9"))
        .stdout(predicate::str::contains("djob:cleanup"))
        .stdout(predicate::str::contains("3 workflow(s) analyzed, 2 missing dependencies"));
}

#[test]
fn test_analyze_count() {
    let tmp = setup_sample_snapshot();
    cinv()
        .args(["analyze", "--missing-only", "--count"])
        .arg(tmp.path())
        .assert()
        .success()
        .stdout("2\n");
}

#[test]
fn test_analyze_csv_joins_keys() {
    let tmp = setup_snapshot(
        None,
        None,
        None,
        Some(json!([{
            "id": 7,
            "name": "Fan Out",
            "actions": [
                {"type": "update_record", "form_data_id": 1},
                {"type": "job", "job": {"name": "a"}},
                {"type": "update_record", "form_data_id": 1}
            ]
        }])),
    );
    cinv()
        .args(["analyze", "-o", "csv"])
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("component_id,component_name,missing_dependencies"))
        .stdout(predicate::str::contains("7,Fan Out,dm:1;job:a;dm:1"));
}

#[test]
fn test_analyze_fail_on_missing() {
    let tmp = setup_sample_snapshot();
    cinv()
        .args(["analyze", "--fail-on-missing"])
        .arg(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("2 missing dependencies"));
}

#[test]
fn test_analyze_fail_on_missing_passes_when_resolved() {
    let tmp = setup_snapshot(
        Some(json!([{"id": 5}])),
        None,
        None,
        Some(json!([{"id": 1, "actions": [{"type": "find_record", "form_data_id": 5}]}])),
    );
    cinv()
        .args(["analyze", "--fail-on-missing"])
        .arg(tmp.path())
        .assert()
        .success();
}

#[test]
fn test_analyze_parallel_matches_sequential() {
    let tmp = setup_sample_snapshot();
    let sequential = cinv()
        .args(["analyze", "-o", "json", "-j", "1"])
        .arg(tmp.path())
        .output()
        .unwrap();
    let parallel = cinv()
        .args(["analyze", "-o", "json", "-j", "4"])
        .arg(tmp.path())
        .output()
        .unwrap();
    assert_eq!(stdout_json(&sequential), stdout_json(&parallel));
}

// ============================================================================
// Resolution Rules
// ============================================================================

#[test]
fn test_reference_to_wrong_kind_is_missing() {
    // Single Exp. Manager 5 exists, but a record action addresses a Data Manager
    let tmp = setup_snapshot(
        None,
        Some(json!([{"id": 5}])),
        None,
        Some(json!([{"id": 1, "actions": [{"type": "find_record", "form_data_id": 5}]}])),
    );
    let output = cinv()
        .args(["analyze", "-o", "json"])
        .arg(tmp.path())
        .output()
        .unwrap();
    assert_eq!(stdout_json(&output)[0]["missing_dependencies"], json!(["dm:5"]));
}

#[test]
fn test_api_triggered_workflow_is_not_addressable() {
    let tmp = setup_snapshot(
        None,
        None,
        None,
        Some(json!([
            {"id": 1, "trigger": {"type": "api_v2", "api_v2": {"name": "hook"}}},
            {"id": 2, "actions": [{"type": "function", "function": {"name": "hook"}}]}
        ])),
    );
    let output = cinv()
        .args(["analyze", "-o", "json"])
        .arg(tmp.path())
        .output()
        .unwrap();
    assert_eq!(stdout_json(&output)[1]["missing_dependencies"], json!(["func:hook"]));
}

#[test]
fn test_empty_snapshot_reports_nothing() {
    let tmp = setup_snapshot(None, None, None, None);
    cinv()
        .args(["analyze"])
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No workflows to report."));
}

// ============================================================================
// Window and Configuration
// ============================================================================

#[test]
fn test_window_limits_analyzed_workflows_not_index() {
    // func:billing belongs to a workflow outside the window but must still resolve
    let tmp = setup_sample_snapshot();
    let output = cinv()
        .args(["analyze", "-o", "json", "--since", "2024-01-01", "--until", "2024-01-31"])
        .arg(tmp.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(
        stdout_json(&output),
        json!([
            {"component_id": "100", "component_name": "Nightly Sync", "missing_dependencies": []}
        ])
    );
}

#[test]
fn test_inverted_window_fails() {
    let tmp = setup_sample_snapshot();
    cinv()
        .args(["analyze", "--since", "2024-02-01", "--until", "2024-01-01"])
        .arg(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("is after"));
}

#[test]
fn test_reject_collision_policy_from_snapshot_config() {
    let tmp = setup_snapshot(
        None,
        None,
        None,
        Some(json!([
            {"id": 1, "trigger": {"type": "job", "job": {"name": "dup"}}},
            {"id": 2, "trigger": {"type": "job", "job": {"name": "dup"}}}
        ])),
    );
    std::fs::write(tmp.path().join("cinv.yaml"), "on_collision: reject\n").unwrap();

    cinv()
        .args(["analyze"])
        .arg(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("job:dup"));
}

#[test]
fn test_overwrite_collision_policy_by_default() {
    let tmp = setup_snapshot(
        None,
        None,
        None,
        Some(json!([
            {"id": 1, "trigger": {"type": "job", "job": {"name": "dup"}}},
            {"id": 2, "trigger": {"type": "job", "job": {"name": "dup"}}}
        ])),
    );
    cinv()
        .args(["analyze", "--count"])
        .arg(tmp.path())
        .assert()
        .success()
        .stdout("2\n");
}

#[test]
fn test_limit_env_truncates_workflows() {
    let tmp = setup_sample_snapshot();
    cinv()
        .env("VISUAL_PROGRAMMING_LIMIT", "1")
        .args(["analyze", "--count"])
        .arg(tmp.path())
        .assert()
        .success()
        .stdout("1\n");
}

#[test]
fn test_limit_flag_drops_referenced_component() {
    // With no Data Managers loaded, dm:5 no longer resolves
    let tmp = setup_sample_snapshot();
    let output = cinv()
        .args(["analyze", "-o", "json", "--dm-limit", "0"])
        .arg(tmp.path())
        .output()
        .unwrap();
    assert_eq!(stdout_json(&output)[0]["missing_dependencies"], json!(["dm:5"]));
}

// ============================================================================
// Malformed Input
// ============================================================================

#[test]
fn test_non_sequence_collection_fails() {
    let tmp = setup_sample_snapshot();
    write_collection(&tmp, "dm.json", json!({"error": "unauthorized"}));
    cinv()
        .args(["analyze"])
        .arg(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("dm.json"));
}

#[test]
fn test_missing_snapshot_directory_fails() {
    let tmp = setup_snapshot(None, None, None, None);
    cinv()
        .args(["analyze"])
        .arg(tmp.path().join("absent"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("snapshot directory not found"));
}
