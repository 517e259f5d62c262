use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

fn compose_check() -> Command {
    let bin_path = std::env::var("CARGO_BIN_EXE_compose-check")
        .unwrap_or_else(|_| "target/debug/compose-check".to_string());
    let mut command = Command::new(bin_path);
    command.env_remove("RUST_LOG");
    command
}

fn run_on(dir: &Path, name: &str, content: &str, extra: &[&str]) -> Output {
    let file = dir.join(name);
    std::fs::write(&file, content).expect("write compose file");
    compose_check()
        .current_dir(dir)
        .args(extra)
        .arg(&file)
        .output()
        .expect("run compose-check")
}

#[test]
fn test_valid_file_exits_zero() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = run_on(dir.path(), "compose.yaml", "services:\n  web:\n    image: nginx\n", &[]);
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.trim_end().ends_with(": valid"), "{}", stdout);
}

#[test]
fn test_invalid_file_exits_one() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = run_on(
        dir.path(),
        "compose.yaml",
        "services:\n  web:\n    image: nginx\n    depends_on: [db]\n",
        &[],
    );
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(":4:5: error: Service \"web\" depends on \"db\""), "{}", stdout);
}

#[test]
fn test_warnings_fail_only_when_asked() {
    let dir = tempfile::tempdir().expect("tempdir");
    let text = "version: '3'\nservices:\n  web:\n    image: nginx\n";
    assert_eq!(run_on(dir.path(), "compose.yaml", text, &[]).status.code(), Some(0));
    assert_eq!(
        run_on(dir.path(), "compose.yaml", text, &["--fail-on-warnings"]).status.code(),
        Some(1)
    );
}

#[test]
fn test_parse_failure_exits_two() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = run_on(dir.path(), "compose.yaml", "services: [\n", &[]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_json_output_for_json_input() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = run_on(
        dir.path(),
        "compose.json",
        "{\n  \"services\": {\n    \"web\": {}\n  }\n}\n",
        &["--format", "json"],
    );
    assert_eq!(output.status.code(), Some(1));

    let reports: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json output");
    assert_eq!(reports[0]["status"], "invalid");
    assert_eq!(reports[0]["errors"], 1);
    assert_eq!(reports[0]["diagnostics"][0]["path"], "services.web");
    assert_eq!(reports[0]["diagnostics"][0]["line"], 2);
}

#[test]
fn test_reads_standard_input() {
    let mut child = compose_check()
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("spawn compose-check");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(b"services:\n  web:\n    build: .\n")
        .expect("write stdin");
    let output = child.wait_with_output().expect("wait");
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("<stdin>: valid"));
}

#[test]
fn test_watch_rejects_standard_input() {
    let output = compose_check()
        .arg("--watch")
        .stdin(Stdio::null())
        .output()
        .expect("run compose-check");
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("--watch"));
}
