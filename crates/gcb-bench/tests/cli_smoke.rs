use std::fs;
use std::process::{Command, Output};

use serde_json::Value;

fn gcb(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_gcb"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("run gcb")
}

fn lines(output: &Output) -> Vec<Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("json line"))
        .collect()
}

#[test]
fn plan_prints_one_canonical_line_per_config() {
    let output = gcb(&[
        "plan",
        "--axis",
        "algorithm=grasp,genetic",
        "--axis",
        "grasp-iterations=5,15",
        "--axis",
        "mutation-probaility=0.1",
        "--instance",
        "corpus/random/25/1.col",
    ]);
    assert!(output.status.success(), "{output:?}");
    let lines = lines(&output);
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["index"], 0);
    assert_eq!(lines[0]["config"]["algorithm"], "grasp");
    assert_eq!(lines[1]["config"]["grasp_iterations"], 15);
    assert_eq!(lines[2]["config"]["algorithm"], "genetic");

    let argv: Vec<&str> = lines[2]["argv"]
        .as_array()
        .expect("argv")
        .iter()
        .map(|arg| arg.as_str().expect("string"))
        .collect();
    assert_eq!(&argv[..4], &["-p", "corpus/random/25/1.col", "-a", "genetic"]);
    let flag = argv
        .iter()
        .position(|arg| *arg == "--mutation-probaility")
        .expect("misspelled flag");
    assert_eq!(argv[flag + 1], "0.1");
}

#[test]
fn plan_file_grids_are_replaced_by_cli_axes() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let plan = dir.path().join("plan.yaml");
    fs::write(
        &plan,
        "grids:\n  - algorithm: grasp-pr\n    axes:\n      - name: pr-solutions\n        values: [2, 3, 4]\n",
    )
    .expect("write plan");
    let plan = plan.to_str().expect("utf8");

    let from_file = gcb(&["plan", "--plan", plan]);
    assert!(from_file.status.success(), "{from_file:?}");
    assert_eq!(lines(&from_file).len(), 3);

    let overridden = gcb(&["plan", "--plan", plan, "--axis", "color-list-size=4"]);
    assert!(overridden.status.success(), "{overridden:?}");
    let lines = lines(&overridden);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["config"]["algorithm"], "grasp");
}

#[test]
fn invalid_grids_exit_with_harness_error() {
    let empty = gcb(&["plan", "--axis", "grasp-iterations=5", "--axis", "color-iterations="]);
    assert_eq!(empty.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&empty.stderr).contains("empty axis"));
    assert!(empty.stdout.is_empty());

    let nothing = gcb(&["plan"]);
    assert_eq!(nothing.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&nothing.stderr).contains("nothing-to-sweep"));

    let unknown = gcb(&["plan", "--axis", "temperature=1,2"]);
    assert_eq!(unknown.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&unknown.stderr).contains("axis-unknown"));
}

#[test]
fn sweep_without_solver_fails_before_running() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let root = dir.path().to_str().expect("utf8");
    let solver = dir.path().join("no-such-solver");
    let output = gcb(&[
        "sweep",
        "--corpus-root",
        root,
        "--folder",
        "random",
        "--solver-path",
        solver.to_str().expect("utf8"),
        "--axis",
        "grasp-iterations=5",
    ]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("solver-unavailable"), "{stderr}");
}
