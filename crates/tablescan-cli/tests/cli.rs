//! Integration tests for the `tablescan` binary.

use std::path::Path;
use std::process::{Command, Output};

const SCORECARD_JSON: &str = r#"[
    {"text": "Player", "polygon": [[10, 0], [70, 0], [70, 20], [10, 20]], "confidence": 0.99},
    {"text": "Score", "polygon": [[120, 0], [170, 0], [170, 20], [120, 20]], "confidence": 0.98},
    {"text": "Smith", "polygon": [[10, 40], [65, 40], [65, 60], [10, 60]], "confidence": 0.97},
    {"text": "28", "polygon": [[120, 40], [140, 40], [140, 60], [120, 60]], "confidence": 0.95},
    {"text": "Jones", "polygon": [[10, 80], [65, 80], [65, 100], [10, 100]], "confidence": 0.96},
    {"text": "--", "polygon": [[120, 80], [135, 80], [135, 100], [120, 100]], "confidence": 0.94}
]"#;

fn tablescan(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tablescan"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run tablescan binary")
}

#[test]
fn test_reconstruct_json_detections_to_csv() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("card.json"), SCORECARD_JSON).unwrap();

    let output = tablescan(dir.path(), &["reconstruct", "card.json", "--output", "csv"]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "Player,Score\nSmith,28\nJones,\n"
    );
}

#[test]
fn test_reconstruct_markdown_without_header() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("card.json"), SCORECARD_JSON).unwrap();

    let output = tablescan(dir.path(), &["reconstruct", "card.json", "--no-header"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("| 0      | 1     |\n"), "got:\n{}", stdout);
    assert!(stdout.contains("| Player | Score |"));
}

#[test]
fn test_reconstruct_tsv_as_json_with_diagnostics() {
    let dir = tempfile::tempdir().unwrap();
    let tsv = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext\n\
               5\t1\t1\t1\t1\t1\t40\t100\t120\t40\t96\tHole\n\
               5\t1\t1\t1\t1\t2\t400\t100\t20\t40\t95\t1\n\
               5\t1\t1\t1\t2\t1\t40\t180\t110\t40\t93\tPar\n\
               5\t1\t1\t1\t2\t2\t400\t180\t20\t40\t10\t4\n";
    std::fs::write(dir.path().join("card.tsv"), tsv).unwrap();

    let output = tablescan(dir.path(), &["reconstruct", "card.tsv", "--output", "json"]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["table"]["headers"][0], "Hole");
    assert_eq!(json["table"]["rows"][0][0], "Par");
    assert!(json["table"]["rows"][0][1].is_null());
    assert_eq!(json["diagnostics"][0]["reason"], "low_confidence");
    assert_eq!(json["stages"][5], "done");
}

#[test]
fn test_config_file_and_invalid_override() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("card.json"), SCORECARD_JSON).unwrap();
    std::fs::write(
        dir.path().join("tablescan.toml"),
        "[table]\nenable_header_promotion = false\n",
    )
    .unwrap();

    let discovered = tablescan(dir.path(), &["reconstruct", "card.json", "--output", "csv"]);
    assert!(discovered.status.success());
    assert!(String::from_utf8_lossy(&discovered.stdout).starts_with("0,1\nPlayer,Score\n"));

    let invalid = tablescan(dir.path(), &["reconstruct", "card.json", "--row-threshold-factor=0"]);
    assert_eq!(invalid.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&invalid.stderr).contains("invalid table options"));
}

#[test]
fn test_missing_input_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = tablescan(dir.path(), &["reconstruct", "nope.json"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to read"));
}

#[test]
fn test_scan_with_unknown_backend_fails_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("tablescan.toml"), "[ocr]\nbackends = [\"cuneiform\"]\n").unwrap();
    std::fs::write(dir.path().join("card.png"), b"png").unwrap();

    let output = tablescan(dir.path(), &["scan", "card.png"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown OCR backend"));
}
