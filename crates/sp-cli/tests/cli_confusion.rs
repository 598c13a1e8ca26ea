use std::path::PathBuf;
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn bin_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_spinestat"))
}

fn repo_root() -> PathBuf {
    // crates/sp-cli -> repo root
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..").canonicalize().unwrap()
}

fn fixture_path(name: &str) -> PathBuf {
    repo_root().join("tests/fixtures").join(name)
}

fn tmp_path(name: &str) -> PathBuf {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    let mut p = std::env::temp_dir();
    p.push(format!("spinestat_cli_{}_{}_{}", std::process::id(), nanos, name));
    p
}

fn run(args: &[&str]) -> Output {
    Command::new(bin_path())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("failed to run {:?} {:?}: {}", bin_path(), args, e))
}

fn run_json(args: &[&str]) -> serde_json::Value {
    let out = run(args);
    assert!(
        out.status.success(),
        "{:?} should succeed, stderr={}",
        args,
        String::from_utf8_lossy(&out.stderr)
    );
    serde_json::from_slice(&out.stdout).expect("stdout should be valid JSON")
}

#[test]
fn confusion_rows_are_reversed_and_normalised() {
    let cfg = fixture_path("analysis/analysis.yaml");
    assert!(cfg.exists(), "missing fixture: {}", cfg.display());

    let v = run_json(&["confusion", "--config", cfg.to_string_lossy().as_ref()]);
    assert_eq!(v["schema_version"], "spinestat_confusion_v0");
    assert_eq!(v["meta"]["tool"], "spinestat");
    assert_eq!(v["meta"]["title"], "Topology");
    assert_eq!(v["meta"]["exposure"].as_f64(), Some(2.0e20));
    assert_eq!(v["row_labels"], serde_json::json!(["Other", "1muNp", "1mu1p"]));
    assert_eq!(v["column_labels"], serde_json::json!(["1mu1p", "1muNp", "Other"]));
    assert_eq!(v["values"], serde_json::json!([[0.0, 0.0, 1.0], [0.0, 1.0, 0.0], [0.5, 0.5, 0.0]]));
    assert_eq!(v["annotations"][2][0], "50.00%");
    assert_eq!(v["accepted_events"], 5);
    assert_eq!(v["discarded_events"], 0);
}

#[test]
fn confusion_null_column_is_opt_in() {
    let cfg = fixture_path("analysis/analysis.yaml");
    let v = run_json(&[
        "confusion",
        "--config",
        cfg.to_string_lossy().as_ref(),
        "--show-null-column",
    ]);
    assert_eq!(v["show_null_column"], true);
    assert_eq!(v["column_labels"], serde_json::json!(["1mu1p", "1muNp", "Other", "Null"]));
    assert_eq!(v["values"][0], serde_json::json!([0.0, 0.0, 0.5, 0.5]));
    // The null true-label row is never drawn.
    assert_eq!(v["row_labels"].as_array().unwrap().len(), 3);
}

#[test]
fn confusion_role_and_output_file() {
    let cfg = fixture_path("analysis/analysis.yaml");
    let out_path = tmp_path("confusion.json");

    let out = run(&[
        "confusion",
        "--config",
        cfg.to_string_lossy().as_ref(),
        "--role",
        "signal",
        "--output",
        out_path.to_string_lossy().as_ref(),
    ]);
    assert!(
        out.status.success(),
        "confusion should succeed, stderr={}",
        String::from_utf8_lossy(&out.stderr)
    );
    assert!(out.stdout.is_empty(), "stdout should be empty when --output is given");

    let bytes = std::fs::read(&out_path).unwrap();
    let v: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(v["accepted_events"], 4);
    // 1mu1p row: 2 correct, 1 mislabelled, 1 without prediction (hidden column).
    let row = v["values"][2].as_array().unwrap();
    assert!((row[0].as_f64().unwrap() - 2.0 / 3.0).abs() < 1e-12);
    assert!((row[1].as_f64().unwrap() - 1.0 / 3.0).abs() < 1e-12);

    let _ = std::fs::remove_file(&out_path);
}

#[test]
fn confusion_rejects_unknown_role() {
    let cfg = fixture_path("analysis/analysis.yaml");
    let out = run(&["confusion", "--config", cfg.to_string_lossy().as_ref(), "--role", "beam"]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("unknown sample role"), "stderr={}", stderr);
}

#[test]
fn missing_config_fails() {
    let out = run(&["confusion", "--config", "/nonexistent/analysis.yaml"]);
    assert!(!out.status.success());
}
