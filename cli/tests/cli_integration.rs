use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::tempdir;

fn linkedquad_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_linkedquad"))
}

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("lib")
        .join("fixtures")
        .join(name)
}

fn run(args: &[&str]) -> Output {
    Command::new(linkedquad_bin())
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("LINKEDQUAD_LOG")
        .output()
        .expect("run linkedquad")
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).to_string()
}

#[test]
fn stat_prints_json_counts() {
    let input = fixture("people.trig");
    let out = run(&["stat", "--json", input.to_str().unwrap()]);
    assert!(
        out.status.success(),
        "stat failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    let stats: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(stats["quads"], 7);
    assert_eq!(stats["graphs"], 2);
    assert_eq!(stats["subjects"], 3);
    assert_eq!(stats["predicates"], 4);
    assert_eq!(stats["objects"], 5);
}

#[test]
fn convert_then_compare_reports_equal() {
    let dir = tempdir().unwrap();
    let input = fixture("people.trig");
    let config = fixture("people.json");
    let output = dir.path().join("people.nq");
    let out = run(&[
        "--config",
        config.to_str().unwrap(),
        "convert",
        input.to_str().unwrap(),
        "--output",
        output.to_str().unwrap(),
    ]);
    assert!(out.status.success(), "convert failed: {}", String::from_utf8_lossy(&out.stderr));
    let written = fs::read_to_string(&output).unwrap();
    assert_eq!(written.lines().count(), 7);

    let out = run(&["compare", input.to_str().unwrap(), output.to_str().unwrap()]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("equal"));
}

#[test]
fn compare_fails_when_datasets_differ() {
    let dir = tempdir().unwrap();
    let input = fixture("people.trig");
    let remainder = dir.path().join("remainder.trig");
    let out = run(&[
        "--prefix",
        "ex=http://example.org/",
        "subtract",
        input.to_str().unwrap(),
        "--remove",
        fixture("removals.nq").to_str().unwrap(),
        "--output",
        remainder.to_str().unwrap(),
    ]);
    assert!(out.status.success(), "subtract failed: {}", String::from_utf8_lossy(&out.stderr));
    assert!(stdout(&out).contains("Removed 2 quads; 5 remain."));

    let out = run(&["compare", input.to_str().unwrap(), remainder.to_str().unwrap()]);
    assert!(!out.status.success());
    assert!(stdout(&out).contains("Datasets differ"));
}

#[test]
fn check_reports_no_issues() {
    let input = fixture("people.trig");
    let out = run(&["check", input.to_str().unwrap(), fixture("removals.nq").to_str().unwrap()]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("No issues found."));
}

#[test]
fn strict_mode_rejects_broken_input() {
    let dir = tempdir().unwrap();
    let broken = dir.path().join("broken.nq");
    fs::write(&broken, "<http://e/a> <http://e/p> .\n").unwrap();

    let out = run(&["stat", broken.to_str().unwrap()]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("Quads: 0"));

    let out = run(&["--strict", "stat", broken.to_str().unwrap()]);
    assert!(!out.status.success());
}
