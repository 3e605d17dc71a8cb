use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

const LOAN: &str = "This loan agreement is made as of July 11, 2006 between ABC Corp and John Doe for $100,000.";

/// Runs the binary with an isolated config directory and no env overrides.
fn legal_ner(dir: &Path) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("legal-ner").into();
    cmd.current_dir(dir);
    cmd.env("NO_COLOR", "1");
    cmd.env("XDG_CONFIG_HOME", dir.join("xdg"));
    cmd.env_remove("LEGAL_NER_MERGE_KEY");
    cmd.env_remove("LEGAL_NER_TAGGER_TIMEOUT_MS");
    cmd.env_remove("LEGAL_NER_WINDOW_CHARS");
    cmd
}

fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

fn has_entity(report: &Value, text: &str, entity_type: &str) -> bool {
    report["entities"]
        .as_array()
        .unwrap()
        .iter()
        .any(|e| e[0] == text && e[1] == entity_type)
}

// --- Binary startup ---

#[test]
fn binary_runs() {
    let mut cmd: Command = cargo_bin_cmd!("legal-ner").into();
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("legal-ner"));
}

// --- Extract ---

#[test]
fn extract_prints_report() {
    let tmp = TempDir::new().unwrap();
    let doc = write_file(tmp.path(), "loan.txt", LOAN);

    let output = legal_ner(tmp.path())
        .arg("extract")
        .arg(&doc)
        .output()
        .unwrap();
    assert!(output.status.success());

    let report = stdout_json(&output);
    assert_eq!(report["source_identifier"], "loan.txt");
    assert_eq!(report["success"], true);
    assert_eq!(report["processing_method"], "rules_only");
    assert!(has_entity(&report, "$100,000", "AMOUNT"));
    assert!(has_entity(&report, "July 11, 2006", "EFFECTIVE_DATE"));
}

#[test]
fn extract_reads_stdin() {
    let tmp = TempDir::new().unwrap();
    legal_ner(tmp.path())
        .args(["extract", "-"])
        .write_stdin(LOAN)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""source_identifier":"stdin""#))
        .stderr(predicate::str::contains("rules_only"));
}

#[test]
fn extract_with_tagger_fixture_is_hybrid() {
    let tmp = TempDir::new().unwrap();
    let doc = write_file(tmp.path(), "loan.txt", LOAN);
    let fixture = write_file(tmp.path(), "tagger.json", r#"[["ABC Corp","LOCATION"]]"#);

    let output = legal_ner(tmp.path())
        .arg("extract")
        .arg(&doc)
        .arg("--tagger-fixture")
        .arg(&fixture)
        .output()
        .unwrap();
    assert!(output.status.success());

    let report = stdout_json(&output);
    assert_eq!(report["processing_method"], "hybrid");
    assert!(has_entity(&report, "ABC Corp", "PARTY"));
}

#[test]
fn extract_rejects_unknown_merge_key() {
    let tmp = TempDir::new().unwrap();
    let doc = write_file(tmp.path(), "loan.txt", LOAN);
    legal_ner(tmp.path())
        .arg("extract")
        .arg(&doc)
        .args(["--merge-key", "type"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown merge key"));
}

#[test]
fn extract_missing_file_fails() {
    let tmp = TempDir::new().unwrap();
    legal_ner(tmp.path())
        .args(["extract", "missing.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read missing.txt"));
}

#[test]
fn extract_pretty_output_is_indented() {
    let tmp = TempDir::new().unwrap();
    let doc = write_file(tmp.path(), "loan.txt", LOAN);
    legal_ner(tmp.path())
        .arg("extract")
        .arg(&doc)
        .arg("--pretty")
        .assert()
        .success()
        .stdout(predicate::str::contains("\n  \"source_identifier\""));
}

#[test]
fn extract_details_exposes_stage_lists() {
    let tmp = TempDir::new().unwrap();
    let doc = write_file(tmp.path(), "loan.txt", LOAN);

    let output = legal_ner(tmp.path())
        .arg("extract")
        .arg(&doc)
        .arg("--details")
        .output()
        .unwrap();
    assert!(output.status.success());

    let report = stdout_json(&output);
    let details = &report["details"];
    assert!(details["normalized_text"].as_str().unwrap().contains("July 11, 2006"));
    assert!(!details["rule_entities"].as_array().unwrap().is_empty());
    assert_eq!(details["tagger_entities"], serde_json::json!([]));
    assert!(details["validated"].is_array());
    assert!(has_entity(&report, "$100,000", "AMOUNT"));
}

#[test]
fn extract_without_details_omits_them() {
    let tmp = TempDir::new().unwrap();
    let doc = write_file(tmp.path(), "loan.txt", LOAN);
    let output = legal_ner(tmp.path()).arg("extract").arg(&doc).output().unwrap();
    assert!(output.status.success());
    assert!(stdout_json(&output).get("details").is_none());
}

// --- Batch ---

#[test]
fn batch_isolates_failures() {
    let tmp = TempDir::new().unwrap();
    let good = write_file(tmp.path(), "good.txt", LOAN);
    let empty = write_file(tmp.path(), "empty.txt", "   ");

    let output = legal_ner(tmp.path())
        .arg("batch")
        .arg(&good)
        .arg(&empty)
        .output()
        .unwrap();
    assert!(output.status.success());

    let report = stdout_json(&output);
    assert_eq!(report["batch_size"], 2);
    assert_eq!(report["results"][0]["status"], "succeeded");
    assert_eq!(report["results"][1]["status"], "failed");
    assert_eq!(report["results"][1]["index"], 1);
    assert!(String::from_utf8_lossy(&output.stderr).contains("1 succeeded, 1 failed"));
}

#[test]
fn batch_records_missing_file_at_its_index() {
    let tmp = TempDir::new().unwrap();
    write_file(tmp.path(), "good.txt", LOAN);

    let output = legal_ner(tmp.path())
        .args(["batch", "good.txt", "missing.txt"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report = stdout_json(&output);
    assert_eq!(report["batch_size"], 2);
    assert_eq!(report["results"][0]["status"], "succeeded");
    assert_eq!(report["results"][1]["status"], "failed");
    assert_eq!(report["results"][1]["index"], 1);
    assert!(report["results"][1]["error"]
        .as_str()
        .unwrap()
        .contains("Failed to read missing.txt"));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("missing.txt"));
    assert!(stderr.contains("1 succeeded, 1 failed"));
}

#[test]
fn batch_records_invalid_utf8_file() {
    let tmp = TempDir::new().unwrap();
    write_file(tmp.path(), "good.txt", LOAN);
    fs::write(tmp.path().join("binary.txt"), [0xff, 0xfe, 0x00, 0x41]).unwrap();

    let output = legal_ner(tmp.path())
        .args(["batch", "binary.txt", "good.txt"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report = stdout_json(&output);
    assert_eq!(report["results"][0]["status"], "failed");
    assert_eq!(report["results"][0]["index"], 0);
    assert_eq!(report["results"][1]["status"], "succeeded");
}

#[test]
fn batch_over_limit_fails() {
    let tmp = TempDir::new().unwrap();
    let doc = write_file(tmp.path(), "loan.txt", LOAN);
    let config = write_file(tmp.path(), "config.json", r#"{"limits":{"max_batch":1}}"#);

    legal_ner(tmp.path())
        .arg("--config")
        .arg(&config)
        .arg("batch")
        .arg(&doc)
        .arg(&doc)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Batch too large"));
}

// --- Normalize ---

#[test]
fn normalize_prints_canonical_text() {
    let tmp = TempDir::new().unwrap();
    legal_ner(tmp.path())
        .args(["normalize", "-"])
        .write_stdin("Signed 12 January 2024 by ABC Pvt Ltd under this Contract")
        .assert()
        .success()
        .stdout("Signed January 12, 2024 by ABC Corp under this contract\n");
}

// --- Config ---

#[test]
fn config_prints_defaults() {
    let tmp = TempDir::new().unwrap();
    let output = legal_ner(tmp.path()).arg("config").output().unwrap();
    assert!(output.status.success());

    let config = stdout_json(&output);
    assert_eq!(config["merge_key"], "text");
    assert_eq!(config["window_chars"], 10_000);
    assert_eq!(config["limits"]["max_batch"], 10);
}

#[test]
fn config_file_and_env_overrides() {
    let tmp = TempDir::new().unwrap();
    let config = write_file(tmp.path(), "config.json", r#"{"window_chars":500}"#);

    let output = legal_ner(tmp.path())
        .env("LEGAL_NER_MERGE_KEY", "text_and_type")
        .arg("--config")
        .arg(&config)
        .arg("config")
        .output()
        .unwrap();
    assert!(output.status.success());

    let config = stdout_json(&output);
    assert_eq!(config["window_chars"], 500);
    assert_eq!(config["merge_key"], "text_and_type");
}

#[test]
fn user_config_dir_is_used() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("xdg").join("legal-ner");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("config.json"), r#"{"tagger_timeout_ms":1234}"#).unwrap();

    let output = legal_ner(tmp.path()).arg("config").output().unwrap();
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["tagger_timeout_ms"], 1234);
}

#[test]
fn invalid_config_fails() {
    let tmp = TempDir::new().unwrap();
    let config = write_file(tmp.path(), "config.json", r#"{"window_chars":0}"#);
    legal_ner(tmp.path())
        .arg("--config")
        .arg(&config)
        .arg("config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config"));
}
