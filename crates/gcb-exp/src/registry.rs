use std::fs::{self, File, OpenOptions};
use std::io::BufWriter;
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};
use gcb_core::canonical::to_canonical_json_bytes;
use gcb_core::errors::{ErrorInfo, HarnessError};
use serde::{Deserialize, Serialize};

use crate::report::SweepReport;

/// File name of the run registry inside a results directory.
pub const REGISTRY_FILE: &str = "runs.csv";

const HEADER: [&str; 9] = [
    "created_at",
    "plan_hash",
    "index",
    "instance",
    "algorithm",
    "params",
    "status",
    "exit_code",
    "elapsed_ms",
];

/// One registry line per recorded run outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryRow {
    pub created_at: String,
    pub plan_hash: String,
    pub index: usize,
    pub instance: String,
    pub algorithm: String,
    /// Canonical JSON of the algorithm configuration.
    pub params: String,
    pub status: String,
    pub exit_code: Option<i32>,
    pub elapsed_ms: f64,
}

fn wrap_csv(code: &str, path: &Path, err: csv::Error) -> HarnessError {
    HarnessError::Serde(
        ErrorInfo::new(code, "run registry I/O failed")
            .with_path(path)
            .with_hint(err.to_string()),
    )
}

/// Appends every outcome of `report` to the CSV registry at `path`.
/// The header is written only when the file is created.
pub fn registry_append(path: &Path, report: &SweepReport) -> Result<(), HarnessError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| HarnessError::io("registry-dir", parent, err))?;
    }
    let file_exists = path.exists();
    let file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .map_err(|err| {
            HarnessError::Io(
                ErrorInfo::new("registry-open", "failed to open CSV registry")
                    .with_path(path)
                    .with_hint(err.to_string()),
            )
        })?;
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(BufWriter::new(file));
    if !file_exists {
        writer
            .write_record(HEADER)
            .map_err(|err| wrap_csv("registry-write-header", path, err))?;
    }
    for outcome in &report.outcomes {
        let params = String::from_utf8(to_canonical_json_bytes(&outcome.request.config)?)
            .map_err(|err| {
                HarnessError::Serde(ErrorInfo::new("registry-params", err.to_string()))
            })?;
        let row = RegistryRow {
            created_at: report.provenance.created_at.clone(),
            plan_hash: report.plan_hash.clone(),
            index: outcome.request.index,
            instance: outcome.request.instance.path.display().to_string(),
            algorithm: outcome.request.config.algorithm().to_string(),
            params,
            status: outcome.status.as_str().to_string(),
            exit_code: outcome.exit_code,
            elapsed_ms: outcome.elapsed_ms,
        };
        writer
            .serialize(&row)
            .map_err(|err| wrap_csv("registry-write-row", path, err))?;
    }
    writer
        .flush()
        .map_err(|err| wrap_csv("registry-flush", path, err.into()))?;
    Ok(())
}

/// Reads every row of the registry at `path`.
pub fn registry_rows(path: &Path) -> Result<Vec<RegistryRow>, HarnessError> {
    let file = File::open(path).map_err(|err| HarnessError::io("registry-open", path, err))?;
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);
    reader
        .deserialize()
        .map(|row| row.map_err(|err| wrap_csv("registry-read-row", path, err)))
        .collect()
}
