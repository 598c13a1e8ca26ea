use std::path::PathBuf;
use std::process::{Command, Output};

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

fn run(args: &[&str]) -> Output {
    Command::new(bin_path())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("failed to run {:?} {:?}: {}", bin_path(), args, e))
}

fn stdout_lines(args: &[&str]) -> Vec<String> {
    let out = run(args);
    assert!(
        out.status.success(),
        "{:?} should succeed, stderr={}",
        args,
        String::from_utf8_lossy(&out.stderr)
    );
    String::from_utf8_lossy(&out.stdout).lines().map(str::to_string).collect()
}

#[test]
fn cutflow_prints_efficiency_then_purity() {
    let cfg = fixture_path("analysis/analysis.yaml");
    let lines = stdout_lines(&["cutflow", "--config", cfg.to_string_lossy().as_ref()]);
    assert_eq!(
        lines,
        vec![
            "No Cut Efficiency: 1.000",
            "Flash Cut Efficiency: 0.7500",
            "Fiducial Cut Efficiency: 0.5000",
            "No Cut Purity: 0.2857",
            "Flash Cut Purity: 0.3333",
            "Fiducial Cut Purity: 0.5000",
        ]
    );
}

#[test]
fn cutflow_empty_signal_is_undefined() {
    let cfg = fixture_path("analysis/empty_signal.yaml");
    let lines = stdout_lines(&["cutflow", "--config", cfg.to_string_lossy().as_ref()]);
    assert_eq!(lines[0], "No Cut Efficiency: undefined");
    assert_eq!(lines[1], "Flash Cut Efficiency: undefined");
    assert!(lines[2].starts_with("No Cut Purity: "));
}

#[test]
fn summary_prints_selected_efficiency_and_purity() {
    let cfg = fixture_path("analysis/analysis.yaml");
    let lines = stdout_lines(&["summary", "--config", cfg.to_string_lossy().as_ref()]);
    assert_eq!(lines, vec!["Efficiency: 0.5000", "Purity: 0.5000"]);
}

#[test]
fn version_prints_crate_version() {
    let lines = stdout_lines(&["version"]);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("spinestat "));
}
