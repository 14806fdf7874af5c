use gcb_core::errors::{ErrorInfo, HarnessError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("size", "500")
        .with_context("trial", "3")
}

#[test]
fn generation_failure_surface() {
    let err = HarnessError::GenerationFailure(sample_info("generator-exit", "exit status 1"));
    assert_eq!(err.info().code, "generator-exit");
    assert!(err.info().context.contains_key("size"));
    assert!(!err.is_run_level());
}

#[test]
fn path_conflict_surface() {
    let err = HarnessError::PathConflict(
        sample_info("instance-exists", "destination exists").with_hint("pass --overwrite"),
    );
    let rendered = err.to_string();
    assert!(rendered.starts_with("path conflict: destination exists (code: instance-exists)"));
    assert!(rendered.contains("size=500, trial=3"));
    assert!(rendered.ends_with("| hint: pass --overwrite"));
}

#[test]
fn empty_axis_surface() {
    let err = HarnessError::EmptyAxis(sample_info("axis-empty", "no values"));
    assert_eq!(err.info().message, "no values");
}

#[test]
fn run_level_errors_are_not_fatal() {
    let failure = HarnessError::RunFailure(sample_info("solver-exit", "exit 1"));
    let timeout = HarnessError::RunTimeout(sample_info("solver-timeout", "killed"));
    let invocation = HarnessError::SolverInvocation(sample_info("solver-missing", "no binary"));
    assert!(failure.is_run_level());
    assert!(timeout.is_run_level());
    assert!(!invocation.is_run_level());
}

#[test]
fn errors_serialize_with_family_tag() {
    let err = HarnessError::InvalidGrid(ErrorInfo::new("axis-duplicate", "duplicate axis"));
    let json = serde_json::to_value(&err).expect("encode");
    assert_eq!(json["family"], "InvalidGrid");
    assert_eq!(json["detail"]["code"], "axis-duplicate");
    let decoded: HarnessError = serde_json::from_value(json).expect("decode");
    assert_eq!(decoded, err);
}
