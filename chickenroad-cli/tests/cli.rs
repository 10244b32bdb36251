use std::process::{Command, Output};

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "chickenroad-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

fn run(data_dir: &std::path::Path, args: &[&str]) -> Output {
    let exe = env!("CARGO_BIN_EXE_chickenroad");
    Command::new(exe)
        .env("NO_COLOR", "1")
        .arg("--data-dir")
        .arg(data_dir)
        .args(args)
        .output()
        .expect("run cli")
}

#[test]
fn cli_tiers_lists_every_tier() {
    let output = run(&temp_path("tiers"), &["tiers"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for name in ["easy", "medium", "hard", "hardcore"] {
        assert!(stdout.contains(&format!("({name})")), "missing {name}");
    }
}

#[test]
fn cli_predict_records_history() {
    let dir = temp_path("predict");
    let output = run(
        &dir,
        &[
            "--delay-ms",
            "0",
            "--seed",
            "5",
            "predict",
            "--tier",
            "easy",
            "--game-id",
            "round-1",
        ],
    );
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Cross at step:"));
    assert!(stdout.contains("Game ID: round-1"));

    let raw = std::fs::read_to_string(dir.join("predictionHistory.json")).expect("read history");
    let entries: serde_json::Value = serde_json::from_str(&raw).expect("history json");
    let entries = entries.as_array().expect("array");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["difficulty"], "easy");
    assert!(entries[0].get("stepCount").is_none());

    let history = run(&dir, &["history"]);
    assert!(history.status.success());
    assert!(String::from_utf8_lossy(&history.stdout).contains("Easy"));
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn cli_history_on_empty_dir_has_placeholder() {
    let output = run(&temp_path("empty"), &["history"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("No prediction history yet"));
}

#[test]
fn cli_rejects_unknown_tier() {
    let dir = temp_path("unknown");
    let output = run(&dir, &["--delay-ms", "0", "predict", "--tier", "impossible"]);
    assert!(!output.status.success());
    assert!(!dir.join("predictionHistory.json").exists());
}

#[test]
fn cli_simulate_writes_json_report() {
    let dir = temp_path("simulate");
    let report_path = temp_path("simulate-report.json");
    let output = run(
        &dir,
        &[
            "--seed",
            "9",
            "simulate",
            "--tier",
            "hard",
            "--samples",
            "500",
            "--report",
            "json",
            "--output",
            report_path.to_str().expect("utf-8 path"),
        ],
    );
    assert!(output.status.success());
    let raw = std::fs::read_to_string(&report_path).expect("read report");
    let report: serde_json::Value = serde_json::from_str(&raw).expect("report json");
    assert_eq!(report[0]["tier"], "hard");
    assert_eq!(report[0]["samples"], 500);
    assert_eq!(report[0]["seed"], 9);
    let _ = std::fs::remove_file(report_path);
}
