use std::ffi::OsString;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use chrono::Utc;
use gcb_core::errors::{ErrorInfo, HarnessError};
use gcb_core::hash::stable_hash_string;
use gcb_core::provenance::SchemaVersion;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::corpus::{select, CorpusSelector, GraphInstance};
use crate::grid::AlgorithmConfig;
use crate::plan::SweepPlan;
use crate::process::{resolve_binary, ChildGuard};
use crate::registry::{registry_append, REGISTRY_FILE};
use crate::report::{sweep_provenance, SweepReport, SweepTotals};

/// The atomic unit of work handed to the solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRequest {
    /// Zero-based position in the sweep's enumeration order.
    pub index: usize,
    pub instance: GraphInstance,
    pub config: AlgorithmConfig,
}

impl RunRequest {
    /// Solver argument vector: `-p <path> -a <algorithm>` followed by the variant flags.
    pub fn solver_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-p".into(),
            self.instance.path.clone().into_os_string(),
            "-a".into(),
            self.config.algorithm().as_str().into(),
        ];
        args.extend(self.config.solver_flags().into_iter().map(OsString::from));
        args
    }
}

/// Terminal status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunStatus {
    Succeeded,
    Failed,
    TimedOut,
}

impl RunStatus {
    pub fn is_success(self) -> bool {
        matches!(self, RunStatus::Succeeded)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Succeeded => "succeeded",
            RunStatus::Failed => "failed",
            RunStatus::TimedOut => "timed-out",
        }
    }
}

/// Lifecycle of a single run request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunState {
    Pending,
    Running,
    Finished(RunStatus),
}

impl RunState {
    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Finished(_))
    }

    /// Moves to `next`; only `Pending -> Running -> Finished(_)` is allowed.
    pub fn advance(self, next: RunState) -> Result<RunState, HarnessError> {
        match (self, next) {
            (RunState::Pending, RunState::Running) | (RunState::Running, RunState::Finished(_)) => {
                Ok(next)
            }
            _ => Err(HarnessError::Internal(
                ErrorInfo::new("run-state", "invalid run state transition")
                    .with_context("from", format!("{self:?}"))
                    .with_context("to", format!("{next:?}")),
            )),
        }
    }
}

/// Recorded result of one solver invocation. Solver output is never parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub request: RunRequest,
    pub status: RunStatus,
    /// Exit code, absent when the process was killed by a signal or timed out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    pub elapsed_ms: f64,
    /// Captured solver stdout, when a results directory is configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

impl RunOutcome {
    /// Run-level error describing a failed or timed-out outcome.
    pub fn error(&self) -> Option<HarnessError> {
        let info = || {
            let mut info = ErrorInfo::new("solver-run", self.request.config.to_string())
                .with_path(&self.request.instance.path)
                .with_context("index", self.request.index.to_string());
            if let Some(code) = self.exit_code {
                info = info.with_context("exit_code", code.to_string());
            }
            info
        };
        match self.status {
            RunStatus::Succeeded => None,
            RunStatus::Failed => Some(HarnessError::RunFailure(info())),
            RunStatus::TimedOut => Some(HarnessError::RunTimeout(info())),
        }
    }
}

/// Executor configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepOptions {
    pub corpus_root: PathBuf,
    pub solver_path: PathBuf,
    pub stop_on_first_failure: bool,
    pub timeout: Option<Duration>,
    /// Destination for captured solver output, the sweep report, and the run registry.
    ///
    /// `runs.csv` accumulates across sweeps. Output files and `sweep_report.json`
    /// describe the latest sweep only and are replaced by the next one.
    pub results_dir: Option<PathBuf>,
}

impl SweepOptions {
    pub fn new(corpus_root: impl Into<PathBuf>, solver_path: impl Into<PathBuf>) -> Self {
        Self {
            corpus_root: corpus_root.into(),
            solver_path: solver_path.into(),
            stop_on_first_failure: false,
            timeout: None,
            results_dir: None,
        }
    }
}

/// Lays out every run request in sweep order: instances outer, configs inner.
pub fn enumerate_requests<'a>(
    instances: &'a [GraphInstance],
    configs: &'a [AlgorithmConfig],
) -> impl Iterator<Item = RunRequest> + 'a {
    instances
        .iter()
        .flat_map(move |instance| configs.iter().map(move |config| (instance, config)))
        .enumerate()
        .map(|(index, (instance, config))| RunRequest {
            index,
            instance: instance.clone(),
            config: config.clone(),
        })
}

/// Runs solver sweeps one request at a time.
#[derive(Debug)]
pub struct SweepExecutor {
    options: SweepOptions,
    solver: PathBuf,
}

impl SweepExecutor {
    /// Resolves the solver binary up front; a missing or non-executable solver is fatal.
    pub fn new(options: SweepOptions) -> Result<Self, HarnessError> {
        let solver = resolve_binary(&options.solver_path).map_err(|problem| {
            HarnessError::SolverInvocation(
                ErrorInfo::new("solver-unavailable", problem.describe())
                    .with_path(&options.solver_path),
            )
        })?;
        Ok(Self { options, solver })
    }

    /// Executes `plan` against every instance matched by `selector`.
    ///
    /// The plan and the corpus are resolved before the first solver starts.
    /// Outcomes are recorded in enumeration order; a failed or timed-out run
    /// stops the sweep only when `stop_on_first_failure` is set.
    pub fn run(
        &self,
        selector: &CorpusSelector,
        plan: &SweepPlan,
    ) -> Result<SweepReport, HarnessError> {
        let configs = plan.configs()?;
        let instances = select(&self.options.corpus_root, selector)?;
        let plan_hash = stable_hash_string(&(plan, selector))?;
        let created_at = Utc::now().to_rfc3339();
        let total = instances.len() * configs.len();
        info!(
            folder = %selector.folder,
            instances = instances.len(),
            configs = configs.len(),
            total,
            "starting sweep"
        );
        if total == 0 {
            warn!(folder = %selector.folder, "sweep selected no run requests");
        }

        let mut totals = SweepTotals::default();
        let mut outcomes = Vec::with_capacity(total);
        let mut halted_early = false;
        for request in enumerate_requests(&instances, &configs) {
            let outcome = self.execute(request, selector, total)?;
            totals.record(outcome.status);
            let failed = !outcome.status.is_success();
            outcomes.push(outcome);
            if failed && self.options.stop_on_first_failure {
                halted_early = true;
                break;
            }
        }
        let not_attempted = total - outcomes.len();
        if halted_early {
            warn!(not_attempted, "stop-on-first-failure halted the sweep");
        }

        let report = SweepReport {
            schema: SchemaVersion::default(),
            provenance: sweep_provenance(&plan_hash, created_at, &self.solver),
            plan_hash,
            selector: selector.clone(),
            total_requests: total,
            totals,
            halted_early,
            not_attempted,
            outcomes,
        };
        if let Some(dir) = &self.options.results_dir {
            let report_path = report.persist(dir)?;
            registry_append(&dir.join(REGISTRY_FILE), &report)?;
            info!(path = %report_path.display(), "sweep report written");
        }
        Ok(report)
    }

    #[instrument(
        skip_all,
        fields(index = request.index, instance = %request.instance.key, algorithm = %request.config.algorithm())
    )]
    fn execute(
        &self,
        request: RunRequest,
        selector: &CorpusSelector,
        total: usize,
    ) -> Result<RunOutcome, HarnessError> {
        let mut state = RunState::Pending;
        let (stdout, stderr, output) = self.output_streams(&request, selector)?;

        let mut command = Command::new(&self.solver);
        command
            .args(request.solver_args())
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(stderr);
        debug!(args = ?request.solver_args(), "spawning solver");

        let started = Instant::now();
        let child = command.spawn().map_err(|err| {
            HarnessError::SolverInvocation(
                ErrorInfo::new("solver-spawn", err.to_string())
                    .with_path(&self.solver)
                    .with_context("index", request.index.to_string()),
            )
        })?;
        state = state.advance(RunState::Running)?;
        let waited = ChildGuard::new(child).wait(self.options.timeout);
        let elapsed = started.elapsed();
        let exit = waited.map_err(|err| {
            HarnessError::SolverInvocation(
                ErrorInfo::new("solver-wait", err.to_string()).with_path(&self.solver),
            )
        })?;

        let (status, exit_code) = match exit {
            Some(exit) if exit.success() => (RunStatus::Succeeded, exit.code()),
            Some(exit) => (RunStatus::Failed, exit.code()),
            None => (RunStatus::TimedOut, None),
        };
        state = state.advance(RunState::Finished(status))?;
        debug_assert!(state.is_terminal());

        info!(
            "run {}/{} {} on {}: {} in {:?}",
            request.index + 1,
            total,
            request.config,
            request.instance.key,
            status.as_str(),
            elapsed
        );
        Ok(RunOutcome {
            request,
            status,
            exit_code,
            elapsed_ms: elapsed.as_secs_f64() * 1000.0,
            output,
        })
    }

    fn output_streams(
        &self,
        request: &RunRequest,
        selector: &CorpusSelector,
    ) -> Result<(Stdio, Stdio, Option<PathBuf>), HarnessError> {
        let Some(results) = &self.options.results_dir else {
            return Ok((Stdio::null(), Stdio::null(), None));
        };
        let stdout_path = run_output_path(results, selector, request);
        let stderr_path = stdout_path.with_extension("err");
        if let Some(parent) = stdout_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|err| HarnessError::io("run-output-dir", parent, err))?;
        }
        let stdout = File::create(&stdout_path)
            .map_err(|err| HarnessError::io("run-output", &stdout_path, err))?;
        let stderr = File::create(&stderr_path)
            .map_err(|err| HarnessError::io("run-output", &stderr_path, err))?;
        Ok((stdout.into(), stderr.into(), Some(stdout_path)))
    }
}

/// `<results>/<folder>/<instance path without .col>/<index>-<algorithm>.out`
pub fn run_output_path(results: &Path, selector: &CorpusSelector, request: &RunRequest) -> PathBuf {
    let relative = request.instance.key.relative_path().with_extension("");
    results
        .join(&selector.folder)
        .join(relative)
        .join(format!(
            "{:05}-{}.out",
            request.index,
            request.config.algorithm()
        ))
}
