// CLI integration tests for load, print, and error reporting.
use std::path::Path;
use std::process::Command;

use serde_json::Value;

fn cmd() -> Command {
    let exe = env!("CARGO_BIN_EXE_chunkline");
    Command::new(exe)
}

fn parse_json_line(output: &[u8]) -> Value {
    let text = String::from_utf8_lossy(output);
    let line = text.lines().next().expect("json line");
    serde_json::from_str(line).expect("valid json")
}

fn write_fixture(dir: &Path, rows: usize) -> std::path::PathBuf {
    let mut text = String::from("id,fare,vendor\n");
    for i in 0..rows {
        text.push_str(&format!("{i},{}.{},v{}\n", i * 3, i % 100, i % 5));
    }
    let path = dir.join("trips.csv");
    std::fs::write(&path, text).expect("write fixture");
    path
}

#[test]
fn load_emits_json_summary() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = write_fixture(temp.path(), 250);

    let load = cmd()
        .args([
            "load",
            path.to_str().unwrap(),
            "--schema",
            "int,decimal,text",
            "--buffer-size",
            "256",
            "--workers",
            "3",
            "--carry-rows",
        ])
        .output()
        .expect("load");
    assert!(load.status.success(), "stderr: {}", String::from_utf8_lossy(&load.stderr));
    let summary = parse_json_line(&load.stdout);
    assert_eq!(summary["rows"], 250);
    assert_eq!(summary["columns"], 3);
    assert_eq!(summary["workers"], 3);
    assert_eq!(summary["buffer_size"], 256);
    assert_eq!(summary["boundary"], "carry");
    assert!(summary["chunks"].as_u64().unwrap() > 1);
    assert!(summary["path"].as_str().unwrap().ends_with("trips.csv"));
}

#[test]
fn print_renders_rows_in_source_order() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("small.csv");
    std::fs::write(&path, "h\n3,12.50,abc\n-7,-1.2,xy\n").expect("write");

    let load = cmd()
        .args([
            "load",
            path.to_str().unwrap(),
            "--schema",
            "INT,decimal,string",
            "--print",
        ])
        .output()
        .expect("load");
    assert!(load.status.success());
    assert_eq!(
        String::from_utf8(load.stdout).expect("utf8"),
        "3 12.50 abc\n-7 -1.2 xy\n"
    );
}

#[test]
fn print_matches_across_worker_counts() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = write_fixture(temp.path(), 400);

    let run = |workers: &str| {
        let output = cmd()
            .args([
                "load",
                path.to_str().unwrap(),
                "--schema",
                "int,decimal,text",
                "--buffer-size",
                "100",
                "--depth",
                "3",
                "--workers",
                workers,
                "--print",
            ])
            .output()
            .expect("load");
        assert!(output.status.success());
        output.stdout
    };
    assert_eq!(run("1"), run("6"));
}

#[test]
fn missing_file_reports_not_found() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("absent.csv");

    let load = cmd()
        .args(["load", path.to_str().unwrap(), "--schema", "int"])
        .output()
        .expect("load");
    assert_eq!(load.status.code(), Some(3));
    let err = parse_json_line(&load.stderr);
    assert_eq!(err["error"]["kind"], "NotFound");
    assert!(err["error"]["path"].as_str().unwrap().ends_with("absent.csv"));
}

#[test]
fn bad_arguments_are_usage_errors() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = write_fixture(temp.path(), 2);

    let unknown_type = cmd()
        .args(["load", path.to_str().unwrap(), "--schema", "int,float"])
        .output()
        .expect("load");
    assert_eq!(unknown_type.status.code(), Some(2));
    let err = parse_json_line(&unknown_type.stderr);
    assert_eq!(err["error"]["kind"], "Usage");
    let message = err["error"]["message"].as_str().unwrap_or_default();
    assert!(message.contains("unknown column type `float`"), "{message}");

    let zero_buffer = cmd()
        .args([
            "load",
            path.to_str().unwrap(),
            "--schema",
            "int",
            "--buffer-size",
            "0",
        ])
        .output()
        .expect("load");
    assert_eq!(zero_buffer.status.code(), Some(2));
}

#[test]
fn completion_writes_script() {
    let output = cmd().args(["completion", "bash"]).output().expect("completion");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("chunkline"));
}
