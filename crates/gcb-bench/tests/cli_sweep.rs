#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::{Mutex, MutexGuard};

// Stub scripts are written and spawned from this binary only, one test at a time.
static SPAWN_LOCK: Mutex<()> = Mutex::new(());

fn serial() -> MutexGuard<'static, ()> {
    SPAWN_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod");
    path
}

fn instance(root: &Path, rel: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(path, "p edge 2 1\n").expect("write instance");
}

fn utf8(path: &Path) -> &str {
    path.to_str().expect("utf8")
}

fn gcb(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_gcb"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("run gcb")
}

#[test]
fn generated_corpus_is_swept_and_failures_do_not_halt() {
    let _guard = serial();
    let dir = tempfile::tempdir().expect("tmp dir");
    let generator = script(dir.path(), "gen", r#"echo "p edge $1 0""#);
    let solver = script(dir.path(), "solver", "exit 1");
    let root = dir.path().join("corpus");

    let output = gcb(&[
        "sweep",
        "--corpus-root",
        utf8(&root),
        "--folder",
        "random",
        "--solver-path",
        utf8(&solver),
        "--generator-path",
        utf8(&generator),
        "--generate-sizes",
        "10,20",
        "--trials",
        "2",
        "--axis",
        "grasp-iterations=5,15",
    ]);
    assert_eq!(output.status.code(), Some(0), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("generated 4 instances in"), "{stdout}");
    assert!(
        stdout.contains("sweep random: 8 requests, 0 succeeded, 8 failed, 0 timed out"),
        "{stdout}"
    );
    assert!(stdout.contains("first failures:"), "{stdout}");
    assert_eq!(
        fs::read_to_string(root.join("random/20/2.col")).expect("generated"),
        "p edge 20 0\n"
    );
}

#[test]
fn stop_on_first_failure_exits_with_halt_code() {
    let _guard = serial();
    let dir = tempfile::tempdir().expect("tmp dir");
    let solver = script(dir.path(), "solver", "exit 1");
    let root = dir.path().join("corpus");
    instance(&root, "random/25/1.col");
    instance(&root, "random/25/2.col");

    let output = gcb(&[
        "sweep",
        "--corpus-root",
        utf8(&root),
        "--folder",
        "random",
        "--solver-path",
        utf8(&solver),
        "--stop-on-first-failure",
        "--axis",
        "grasp-iterations=5,15",
    ]);
    assert_eq!(output.status.code(), Some(2), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("4 requests, 0 succeeded, 1 failed, 0 timed out, 3 not attempted"),
        "{stdout}"
    );
}

#[test]
fn successful_sweep_writes_results_dir() {
    let _guard = serial();
    let dir = tempfile::tempdir().expect("tmp dir");
    let solver = script(dir.path(), "solver", r#"echo "colors: 3""#);
    let root = dir.path().join("corpus");
    instance(&root, "random/25/1.col");
    let results = dir.path().join("results");

    let output = gcb(&[
        "sweep",
        "--corpus-root",
        utf8(&root),
        "--folder",
        "random",
        "--size",
        "25",
        "--solver-path",
        utf8(&solver),
        "--results-dir",
        utf8(&results),
        "--axis",
        "grasp-iterations=5,15",
    ]);
    assert_eq!(output.status.code(), Some(0), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("sweep random (size 25): 2 requests, 2 succeeded"),
        "{stdout}"
    );
    assert!(stdout.contains("results written to"), "{stdout}");
    assert!(results.join("sweep_report.json").is_file());
    let registry = fs::read_to_string(results.join("runs.csv")).expect("registry");
    assert_eq!(registry.lines().count(), 3);
}
