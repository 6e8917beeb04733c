//! CLI integration tests for the finqa binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn write_fixtures(dir: &std::path::Path) -> (std::path::PathBuf, std::path::PathBuf) {
    let dataset = serde_json::json!([
        {
            "id": "doc-1",
            "pre_text": ["Revenue grew from 1000 to 1141."],
            "table": [["year", "revenue"], ["2020", "1141"]],
            "qa": {"question": "What is the percentage of revenue growth?", "answer": "14.1%"}
        },
        {
            "id": "doc-2",
            "qa": {"question": "Did revenue grow?", "answer": "Yes"}
        },
        {
            "id": "doc-3",
            "pre_text": ["No annotation on this one."]
        }
    ]);
    let predictions = serde_json::json!([
        {"answer": "0.141", "processing_time": 1.5},
        {"answer": "No", "processing_time": 0.5}
    ]);

    let data_path = dir.join("train.json");
    let preds_path = dir.join("preds.json");
    fs::write(&data_path, serde_json::to_string_pretty(&dataset).unwrap()).unwrap();
    fs::write(&preds_path, serde_json::to_string_pretty(&predictions).unwrap()).unwrap();
    (data_path, preds_path)
}

#[test]
fn eval_prints_summary() {
    let dir = tempfile::tempdir().unwrap();
    let (data, preds) = write_fixtures(dir.path());

    Command::cargo_bin("finqa")
        .unwrap()
        .args(["eval", "--data"])
        .arg(&data)
        .arg("--predictions")
        .arg(&preds)
        .assert()
        .success()
        .stdout(predicate::str::contains("Total examples evaluated: 2"))
        .stdout(predicate::str::contains("Accuracy: 50.00%"))
        .stdout(predicate::str::contains("Unknown error type"));
}

#[test]
fn eval_json_output() {
    let dir = tempfile::tempdir().unwrap();
    let (data, preds) = write_fixtures(dir.path());

    let output = Command::cargo_bin("finqa")
        .unwrap()
        .args(["eval", "--format", "json", "--data"])
        .arg(&data)
        .arg("--predictions")
        .arg(&preds)
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["total"], 2);
    assert_eq!(value["correct"], 1);
    assert!(value["response_time"].is_object());
}

#[test]
fn eval_writes_report_files() {
    let dir = tempfile::tempdir().unwrap();
    let (data, preds) = write_fixtures(dir.path());
    let report_dir = dir.path().join("reports");

    Command::cargo_bin("finqa")
        .unwrap()
        .args(["eval", "--data"])
        .arg(&data)
        .arg("--predictions")
        .arg(&preds)
        .arg("--report-dir")
        .arg(&report_dir)
        .assert()
        .success();

    let entries: Vec<_> = fs::read_dir(&report_dir).unwrap().collect();
    assert_eq!(entries.len(), 2);
    let has_md = entries.iter().any(|e| {
        e.as_ref()
            .unwrap()
            .path()
            .extension()
            .is_some_and(|ext| ext == "md")
    });
    assert!(has_md);
}

#[test]
fn eval_rejects_mismatched_predictions() {
    let dir = tempfile::tempdir().unwrap();
    let (data, _) = write_fixtures(dir.path());

    let short_preds = dir.path().join("short.json");
    fs::write(&short_preds, r#"["only one"]"#).unwrap();

    Command::cargo_bin("finqa")
        .unwrap()
        .args(["eval", "--data"])
        .arg(&data)
        .arg("--predictions")
        .arg(&short_preds)
        .assert()
        .failure()
        .stderr(predicate::str::contains("counts must match"));
}

#[test]
fn info_prints_version() {
    Command::cargo_bin("finqa")
        .unwrap()
        .arg("info")
        .assert()
        .success()
        .stdout(predicate::str::contains("finqa"))
        .stdout(predicate::str::contains("tolerance"));
}
