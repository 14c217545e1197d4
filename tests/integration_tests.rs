//! Integration tests for the Aegis CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to get an aegis command
fn aegis() -> Command {
    Command::cargo_bin("aegis").unwrap()
}

/// Helper to create an empty test project in a temp directory
fn setup_test_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    aegis()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success();
    tmp
}

/// Helper to create a test project seeded with the sample dataset
fn setup_sample_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    aegis()
        .current_dir(tmp.path())
        .args(["init", "--samples"])
        .assert()
        .success();
    tmp
}

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    aegis()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("compliance program records"));
}

#[test]
fn test_version_displays() {
    aegis()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("aegis"));
}

#[test]
fn test_unknown_command_fails() {
    aegis().arg("unknown-command").assert().failure();
}

// ============================================================================
// Init Tests
// ============================================================================

#[test]
fn test_init_creates_structure() {
    let tmp = setup_test_project();
    assert!(tmp.path().join(".aegis/config.yaml").exists());
    for dir in ["risks", "controls", "incidents", "policies", "poams"] {
        assert!(tmp.path().join(dir).is_dir(), "missing {dir}/");
    }
}

#[test]
fn test_init_twice_fails_without_force() {
    let tmp = setup_test_project();
    aegis()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .failure();
    aegis()
        .current_dir(tmp.path())
        .args(["init", "--force"])
        .assert()
        .success();
}

#[test]
fn test_init_samples_seeds_registers() {
    let tmp = setup_sample_project();
    let risk_files = fs::read_dir(tmp.path().join("risks")).unwrap().count();
    assert_eq!(risk_files, 4);
}

// ============================================================================
// List Filtering Tests
// ============================================================================

#[test]
fn test_risk_list_shows_samples() {
    let tmp = setup_sample_project();
    aegis()
        .current_dir(tmp.path())
        .args(["risk", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Unpatched perimeter VPN"))
        .stdout(predicate::str::contains("4 risk(s) found"));
}

#[test]
fn test_risk_list_severity_filter() {
    let tmp = setup_sample_project();
    aegis()
        .current_dir(tmp.path())
        .args(["risk", "list", "--severity", "critical", "--count"])
        .assert()
        .success()
        .stdout(predicate::str::diff("1\n"));
}

#[test]
fn test_risk_list_status_filter() {
    let tmp = setup_sample_project();
    aegis()
        .current_dir(tmp.path())
        .args(["risk", "list", "--status", "open", "--count"])
        .assert()
        .success()
        .stdout(predicate::str::diff("2\n"));
}

#[test]
fn test_risk_list_search_flag() {
    let tmp = setup_sample_project();
    aegis()
        .current_dir(tmp.path())
        .args(["risk", "list", "--search", "vpn", "--count"])
        .assert()
        .success()
        .stdout(predicate::str::diff("1\n"));
}

#[test]
fn test_risk_list_overdue_excludes_terminal_statuses() {
    let tmp = setup_sample_project();
    // Two sample risks have past due dates, but one is mitigated
    aegis()
        .current_dir(tmp.path())
        .args(["risk", "list", "--overdue", "--count"])
        .assert()
        .success()
        .stdout(predicate::str::diff("1\n"));
}

#[test]
fn test_risk_list_sort_by_score_descending() {
    let tmp = setup_sample_project();
    aegis()
        .current_dir(tmp.path())
        .args(["risk", "list", "--sort", "score", "-r", "-f", "id"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "RISK-01J6QRS3TVWXYZABCDEFGH0001",
        ));
}

#[test]
fn test_risk_list_json_is_parseable() {
    let tmp = setup_sample_project();
    let output = aegis()
        .current_dir(tmp.path())
        .args(["risk", "list", "-f", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let parsed: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("list output should be valid JSON");
    assert_eq!(parsed.as_array().map(|a| a.len()), Some(4));
}

#[test]
fn test_risk_list_csv_header() {
    let tmp = setup_sample_project();
    aegis()
        .current_dir(tmp.path())
        .args(["risk", "list", "-f", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("ID,TITLE,SEVERITY"));
}

#[test]
fn test_ctrl_list_implementation_filter() {
    let tmp = setup_sample_project();
    aegis()
        .current_dir(tmp.path())
        .args(["ctrl", "list", "--status", "implemented", "--count"])
        .assert()
        .success()
        .stdout(predicate::str::diff("1\n"));
}

#[test]
fn test_ctrl_list_assessment_overdue_exempts_not_applicable() {
    let tmp = setup_sample_project();
    // Two controls have past assessment dates, but one is not_applicable
    aegis()
        .current_dir(tmp.path())
        .args(["ctrl", "list", "--overdue", "--count"])
        .assert()
        .success()
        .stdout(predicate::str::diff("1\n"));
}

#[test]
fn test_incident_list_response_overdue() {
    let tmp = setup_sample_project();
    aegis()
        .current_dir(tmp.path())
        .args(["incident", "list", "--overdue", "--count"])
        .assert()
        .success()
        .stdout(predicate::str::diff("1\n"));
}

#[test]
fn test_policy_list_review_overdue() {
    let tmp = setup_sample_project();
    aegis()
        .current_dir(tmp.path())
        .args(["policy", "list", "--overdue", "--count"])
        .assert()
        .success()
        .stdout(predicate::str::diff("1\n"));
}

#[test]
fn test_poam_list_overdue_excludes_completed() {
    let tmp = setup_sample_project();
    aegis()
        .current_dir(tmp.path())
        .args(["poam", "list", "--overdue", "--count"])
        .assert()
        .success()
        .stdout(predicate::str::diff("1\n"));
}

#[test]
fn test_critical_preset_matches_explicit_severity_filter() {
    let tmp = setup_sample_project();
    let preset = aegis()
        .current_dir(tmp.path())
        .args(["risk", "list", "--critical", "--count"])
        .output()
        .unwrap();
    let explicit = aegis()
        .current_dir(tmp.path())
        .args(["risk", "list", "--severity", "critical", "--count"])
        .output()
        .unwrap();
    // A redundant preset + filter combination yields the same set
    let both = aegis()
        .current_dir(tmp.path())
        .args(["risk", "list", "--critical", "--severity", "critical", "--count"])
        .output()
        .unwrap();
    assert_eq!(preset.stdout, explicit.stdout);
    assert_eq!(preset.stdout, both.stdout);
}

// ============================================================================
// Search Tests
// ============================================================================

#[test]
fn test_search_finds_across_registers() {
    let tmp = setup_sample_project();
    aegis()
        .current_dir(tmp.path())
        .args(["search", "phishing"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Spear phishing"));
}

#[test]
fn test_search_matches_source_field() {
    let tmp = setup_sample_project();
    // Both TLS and MFA POA&Ms cite the FY25 penetration test as source
    aegis()
        .current_dir(tmp.path())
        .args(["search", "penetration", "--count"])
        .assert()
        .success()
        .stdout(predicate::str::diff("2\n"));
}

#[test]
fn test_search_kind_filter() {
    let tmp = setup_sample_project();
    aegis()
        .current_dir(tmp.path())
        .args(["search", "access", "--kind", "policy", "--count"])
        .assert()
        .success()
        .stdout(predicate::str::diff("1\n"));
}

#[test]
fn test_search_is_case_insensitive() {
    let tmp = setup_sample_project();
    let lower = aegis()
        .current_dir(tmp.path())
        .args(["search", "tls", "--count"])
        .output()
        .unwrap();
    let upper = aegis()
        .current_dir(tmp.path())
        .args(["search", "TLS", "--count"])
        .output()
        .unwrap();
    assert_eq!(lower.stdout, upper.stdout);
    assert_eq!(String::from_utf8_lossy(&lower.stdout).trim(), "1");
}

// ============================================================================
// Status / Report Tests
// ============================================================================

#[test]
fn test_status_dashboard_renders() {
    let tmp = setup_sample_project();
    aegis()
        .current_dir(tmp.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Aegis Compliance Posture"))
        .stdout(predicate::str::contains("RISK REGISTER"))
        .stdout(predicate::str::contains("Posture:"));
}

#[test]
fn test_status_json_output() {
    let tmp = setup_sample_project();
    let output = aegis()
        .current_dir(tmp.path())
        .args(["status", "-f", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let parsed: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("status output should be valid JSON");
    // The sample dataset has overdue items and an open critical incident
    assert_eq!(parsed["posture"], "Critical");
    assert_eq!(parsed["risks"][0]["label"], "total");
    assert_eq!(parsed["risks"][0]["value"], 4.0);
}

#[test]
fn test_status_empty_project_is_healthy() {
    let tmp = setup_test_project();
    let output = aegis()
        .current_dir(tmp.path())
        .args(["status", "-f", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["posture"], "Healthy");
}

#[test]
fn test_report_posture_markdown() {
    let tmp = setup_sample_project();
    aegis()
        .current_dir(tmp.path())
        .args(["report", "posture"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# Compliance Posture Report"))
        .stdout(predicate::str::contains("access_control"));
}

#[test]
fn test_report_open_items_flags_overdue() {
    let tmp = setup_sample_project();
    aegis()
        .current_dir(tmp.path())
        .args(["report", "open-items"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# Open Items Report"))
        .stdout(predicate::str::contains("Retire TLS 1.0"));
}

// ============================================================================
// Validate Tests
// ============================================================================

#[test]
fn test_validate_sample_dataset_passes() {
    let tmp = setup_sample_project();
    aegis()
        .current_dir(tmp.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("All register files valid"));
}

#[test]
fn test_validate_flags_progress_out_of_range() {
    let tmp = setup_sample_project();
    let bad = tmp.path().join("poams/POAM-01J6QRS3TVWXYZABCDEFGH0018.yaml");
    fs::write(
        &bad,
        "id: POAM-01J6QRS3TVWXYZABCDEFGH0018\n\
         title: Broken entry\n\
         description: progress out of range\n\
         progress: 150\n\
         created: 2026-01-01T00:00:00Z\n\
         author: test\n",
    )
    .unwrap();
    aegis()
        .current_dir(tmp.path())
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("progress"));
}

#[test]
fn test_validate_rejects_duplicate_ids() {
    let tmp = setup_sample_project();
    let original = tmp.path().join("risks/RISK-01J6QRS3TVWXYZABCDEFGH0001.yaml");
    let copy = tmp.path().join("risks/RISK-copy.yaml");
    fs::copy(&original, &copy).unwrap();
    aegis()
        .current_dir(tmp.path())
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("duplicate record id"));
}

#[test]
fn test_validate_reports_unparsable_file() {
    let tmp = setup_sample_project();
    fs::write(tmp.path().join("risks/RISK-broken.yaml"), "title: [unclosed").unwrap();
    aegis()
        .current_dir(tmp.path())
        .arg("validate")
        .assert()
        .failure();
}

// ============================================================================
// New / Show Tests
// ============================================================================

#[test]
fn test_new_risk_then_show() {
    let tmp = setup_test_project();
    let output = aegis()
        .current_dir(tmp.path())
        .args([
            "risk",
            "new",
            "--title",
            "Expired code-signing certificate",
            "--severity",
            "high",
            "--likelihood",
            "2",
            "--impact",
            "4",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let id = stdout
        .split_whitespace()
        .find(|w| w.starts_with("RISK-"))
        .expect("new should print the created id")
        .to_string();

    aegis()
        .current_dir(tmp.path())
        .args(["risk", "show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Expired code-signing certificate"))
        .stdout(predicate::str::contains("risk_score: 8"));
}

#[test]
fn test_new_ctrl_requires_valid_family() {
    let tmp = setup_test_project();
    aegis()
        .current_dir(tmp.path())
        .args([
            "ctrl",
            "new",
            "--title",
            "Bad family",
            "--family",
            "nonsense",
        ])
        .assert()
        .failure();
}

#[test]
fn test_show_unknown_id_fails() {
    let tmp = setup_test_project();
    aegis()
        .current_dir(tmp.path())
        .args(["policy", "show", "POL-doesnotexist"])
        .assert()
        .failure();
}
