use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use gcb_core::errors::{ErrorInfo, HarnessError};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{info, instrument, warn};

use crate::corpus::{instance_path, GraphInstance, InstanceKey};
use crate::process::resolve_binary;

const STDERR_EXCERPT: usize = 512;

/// Behaviour of the corpus loop after a failed generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Record the failure and move on to the next trial.
    #[default]
    Continue,
    /// Record the failure and skip the remaining trials of the same size.
    AbortBucket,
}

/// Sizes and trial counts to generate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusSpec {
    pub sizes: Vec<NonZeroU32>,
    pub trials: NonZeroU32,
    #[serde(default)]
    pub overwrite: bool,
    #[serde(default)]
    pub on_failure: FailurePolicy,
}

/// A single generation that did not produce an instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationFailureRecord {
    pub size: NonZeroU32,
    pub trial: NonZeroU32,
    pub error: HarnessError,
}

/// Outcome of a corpus generation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CorpusGenerationReport {
    pub generated: Vec<GraphInstance>,
    pub failures: Vec<GenerationFailureRecord>,
    /// Trials never attempted because their bucket was aborted.
    pub skipped: usize,
}

impl CorpusGenerationReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.skipped == 0
    }
}

/// Adapter around the external random-graph generator (`<binary> <size>`).
#[derive(Debug, Clone)]
pub struct Generator {
    binary: PathBuf,
}

impl Generator {
    /// Resolves the generator binary, failing if it cannot be executed.
    pub fn new(binary: impl AsRef<Path>) -> Result<Self, HarnessError> {
        let requested = binary.as_ref();
        let binary = resolve_binary(requested).map_err(|problem| {
            HarnessError::GenerationFailure(
                ErrorInfo::new("generator-unavailable", problem.describe())
                    .with_path(requested),
            )
        })?;
        Ok(Self { binary })
    }

    /// Generates one instance at `<corpus_root>/<size>/<trial>.col`.
    ///
    /// The generator's stdout is written verbatim through a temporary file in
    /// the destination directory, which is removed if anything fails.
    #[instrument(skip(self, corpus_root), fields(binary = %self.binary.display()))]
    pub fn generate(
        &self,
        size: NonZeroU32,
        trial: NonZeroU32,
        corpus_root: &Path,
        overwrite: bool,
    ) -> Result<GraphInstance, HarnessError> {
        let destination = instance_path(corpus_root, size, trial);
        if !overwrite && destination.exists() {
            return Err(path_conflict(&destination));
        }

        let output = Command::new(&self.binary)
            .arg(size.to_string())
            .stdin(Stdio::null())
            .output()
            .map_err(|err| {
                HarnessError::GenerationFailure(
                    ErrorInfo::new("generator-spawn", err.to_string())
                        .with_path(&self.binary)
                        .with_context("size", size.to_string()),
                )
            })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let excerpt: String = stderr.trim().chars().take(STDERR_EXCERPT).collect();
            return Err(HarnessError::GenerationFailure(
                ErrorInfo::new("generator-exit", format!("generator exited with {}", output.status))
                    .with_context("size", size.to_string())
                    .with_context("trial", trial.to_string())
                    .with_context("stderr", excerpt),
            ));
        }
        if output.stdout.is_empty() {
            return Err(HarnessError::GenerationFailure(
                ErrorInfo::new("generator-empty", "generator produced no output")
                    .with_context("size", size.to_string())
                    .with_context("trial", trial.to_string()),
            ));
        }

        let parent = destination
            .parent()
            .ok_or_else(|| HarnessError::io("instance-dir", &destination, "no parent directory"))?;
        fs::create_dir_all(parent).map_err(|err| HarnessError::io("instance-dir", parent, err))?;
        let mut staged = NamedTempFile::new_in(parent)
            .map_err(|err| HarnessError::io("instance-stage", parent, err))?;
        staged
            .write_all(&output.stdout)
            .and_then(|_| staged.as_file().sync_all())
            .map_err(|err| HarnessError::io("instance-write", staged.path(), err))?;
        if overwrite {
            staged
                .persist(&destination)
                .map_err(|err| HarnessError::io("instance-persist", &destination, err.error))?;
        } else {
            staged.persist_noclobber(&destination).map_err(|err| {
                if err.error.kind() == std::io::ErrorKind::AlreadyExists {
                    path_conflict(&destination)
                } else {
                    HarnessError::io("instance-persist", &destination, err.error)
                }
            })?;
        }

        info!(path = %destination.display(), bytes = output.stdout.len(), "instance generated");
        Ok(GraphInstance {
            key: InstanceKey::Sized { size, trial },
            path: destination,
        })
    }

    /// Generates every `(size, trial)` pair of `spec` under `corpus_root`.
    ///
    /// When overwriting is not requested, every destination is checked before
    /// the generator runs at all; a single existing file aborts the pass.
    pub fn generate_corpus(
        &self,
        spec: &CorpusSpec,
        corpus_root: &Path,
    ) -> Result<CorpusGenerationReport, HarnessError> {
        if spec.sizes.is_empty() {
            return Err(HarnessError::Config(ErrorInfo::new(
                "corpus-sizes-empty",
                "no instance sizes requested",
            )));
        }
        let mut seen = BTreeSet::new();
        if let Some(size) = spec.sizes.iter().find(|size| !seen.insert(**size)) {
            return Err(HarnessError::Config(
                ErrorInfo::new("corpus-sizes-duplicate", "instance size requested twice")
                    .with_context("size", size.to_string()),
            ));
        }
        if !spec.overwrite {
            for &size in &spec.sizes {
                for trial in trials(spec.trials) {
                    let destination = instance_path(corpus_root, size, trial);
                    if destination.exists() {
                        return Err(path_conflict(&destination));
                    }
                }
            }
        }

        let mut report = CorpusGenerationReport::default();
        for &size in &spec.sizes {
            let mut pending = trials(spec.trials);
            while let Some(trial) = pending.next() {
                match self.generate(size, trial, corpus_root, spec.overwrite) {
                    Ok(instance) => report.generated.push(instance),
                    Err(err @ HarnessError::PathConflict(_)) => return Err(err),
                    Err(error) => {
                        warn!(%size, %trial, %error, "instance generation failed");
                        report.failures.push(GenerationFailureRecord { size, trial, error });
                        if spec.on_failure == FailurePolicy::AbortBucket {
                            let skipped = pending.count();
                            warn!(%size, skipped, "aborting size bucket");
                            report.skipped += skipped;
                            break;
                        }
                    }
                }
            }
        }
        info!(
            generated = report.generated.len(),
            failed = report.failures.len(),
            skipped = report.skipped,
            "corpus generation finished"
        );
        Ok(report)
    }
}

/// Generates one instance with the generator at `binary`.
pub fn generate(
    binary: &Path,
    size: NonZeroU32,
    trial: NonZeroU32,
    corpus_root: &Path,
    overwrite: bool,
) -> Result<GraphInstance, HarnessError> {
    Generator::new(binary)?.generate(size, trial, corpus_root, overwrite)
}

fn trials(count: NonZeroU32) -> impl Iterator<Item = NonZeroU32> {
    (1..=count.get()).filter_map(NonZeroU32::new)
}

fn path_conflict(destination: &Path) -> HarnessError {
    HarnessError::PathConflict(
        ErrorInfo::new("instance-exists", "instance file already exists")
            .with_path(destination)
            .with_hint("pass --overwrite to replace existing instances"),
    )
}
