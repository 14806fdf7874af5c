use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use gcb_core::canonical::to_canonical_json_bytes;
use gcb_core::errors::HarnessError;
use gcb_core::provenance::{RunProvenance, SchemaVersion};
use serde::{Deserialize, Serialize};

use crate::corpus::CorpusSelector;
use crate::executor::{RunOutcome, RunStatus};

/// File name of the persisted sweep report inside a results directory.
pub const REPORT_FILE: &str = "sweep_report.json";

/// Exit code for a sweep where every request reached a terminal state.
pub const EXIT_COMPLETED: u8 = 0;
/// Exit code for a sweep halted by stop-on-first-failure.
pub const EXIT_HALTED: u8 = 2;

/// Per-status outcome counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SweepTotals {
    pub succeeded: usize,
    pub failed: usize,
    pub timed_out: usize,
}

impl SweepTotals {
    pub fn record(&mut self, status: RunStatus) {
        match status {
            RunStatus::Succeeded => self.succeeded += 1,
            RunStatus::Failed => self.failed += 1,
            RunStatus::TimedOut => self.timed_out += 1,
        }
    }

    /// Number of requests that reached a terminal state.
    pub fn completed(&self) -> usize {
        self.succeeded + self.failed + self.timed_out
    }
}

/// Aggregate sweep report persisted for reproducibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    pub schema: SchemaVersion,
    pub plan_hash: String,
    pub provenance: RunProvenance,
    pub selector: CorpusSelector,
    pub total_requests: usize,
    pub totals: SweepTotals,
    /// Whether stop-on-first-failure ended the sweep early.
    pub halted_early: bool,
    pub not_attempted: usize,
    /// Outcomes in enumeration order.
    pub outcomes: Vec<RunOutcome>,
}

impl SweepReport {
    /// Failed and timed-out outcomes, in enumeration order.
    pub fn failures(&self) -> impl Iterator<Item = &RunOutcome> {
        self.outcomes
            .iter()
            .filter(|outcome| !outcome.status.is_success())
    }

    /// [`EXIT_COMPLETED`] when every request ran, [`EXIT_HALTED`] otherwise.
    pub fn exit_code(&self) -> u8 {
        if self.not_attempted > 0 {
            EXIT_HALTED
        } else {
            EXIT_COMPLETED
        }
    }

    /// Human readable summary listing up to `max_failures` failing requests.
    pub fn summary(&self, max_failures: usize) -> SweepSummary<'_> {
        SweepSummary {
            report: self,
            max_failures,
        }
    }

    /// Writes the canonical JSON report to `<dir>/sweep_report.json`.
    pub fn persist(&self, dir: &Path) -> Result<PathBuf, HarnessError> {
        fs::create_dir_all(dir).map_err(|err| HarnessError::io("report-dir", dir, err))?;
        let path = dir.join(REPORT_FILE);
        let bytes = to_canonical_json_bytes(self)?;
        fs::write(&path, bytes).map_err(|err| HarnessError::io("report-write", &path, err))?;
        Ok(path)
    }
}

/// Provenance block for a sweep driven by `solver`.
pub fn sweep_provenance(input_hash: &str, created_at: String, solver: &Path) -> RunProvenance {
    let mut tools = BTreeMap::new();
    tools.insert("solver".to_string(), solver.display().to_string());
    let mut versions = BTreeMap::new();
    versions.insert("gcb-exp".to_string(), env!("CARGO_PKG_VERSION").to_string());
    RunProvenance {
        input_hash: input_hash.to_string(),
        created_at,
        tools,
        tool_versions: versions,
    }
}

/// Display adapter returned by [`SweepReport::summary`].
#[derive(Debug)]
pub struct SweepSummary<'a> {
    report: &'a SweepReport,
    max_failures: usize,
}

impl fmt::Display for SweepSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.report;
        write!(f, "sweep {}", report.selector.folder)?;
        if let Some(size) = report.selector.size_filter {
            write!(f, " (size {size})")?;
        }
        write!(
            f,
            ": {} requests, {} succeeded, {} failed, {} timed out",
            report.total_requests,
            report.totals.succeeded,
            report.totals.failed,
            report.totals.timed_out
        )?;
        if report.halted_early {
            write!(
                f,
                ", {} not attempted (stopped on first failure)",
                report.not_attempted
            )?;
        }
        let failures = report.totals.failed + report.totals.timed_out;
        if failures > 0 && self.max_failures > 0 {
            writeln!(f)?;
            write!(f, "first failures:")?;
            for outcome in report.failures().take(self.max_failures) {
                write!(
                    f,
                    "\n  #{} {} [{}] -> {}",
                    outcome.request.index,
                    outcome.request.instance.path.display(),
                    outcome.request.config,
                    outcome.status.as_str()
                )?;
                if let Some(code) = outcome.exit_code {
                    write!(f, " (exit {code})")?;
                }
            }
            if failures > self.max_failures {
                write!(f, "\n  ... {} more", failures - self.max_failures)?;
            }
        }
        Ok(())
    }
}
