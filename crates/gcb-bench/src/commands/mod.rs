pub mod generate;
pub mod plan;
pub mod sweep;

use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use clap::Args;
use gcb_core::errors::HarnessError;
use gcb_exp::{
    load_plan, AxisSpec, CorpusGenerationReport, CorpusSpec, FailurePolicy, Generator, SweepPlan,
};

/// Grid sources shared by `sweep` and `plan`.
#[derive(Args, Debug, Clone)]
pub struct GridArgs {
    /// Sweep axis as `name=v1,v2,...`; repeatable. `algorithm=...` selects the grids.
    #[arg(long = "axis", value_name = "NAME=VALUES")]
    pub axes: Vec<AxisSpec>,
    /// YAML plan file declaring grids and sweep options.
    #[arg(long)]
    pub plan: Option<PathBuf>,
}

impl GridArgs {
    /// Loads the plan file, if any; command line axes replace its grids.
    pub fn resolve(&self) -> Result<SweepPlan, HarnessError> {
        let mut plan = match &self.plan {
            Some(path) => load_plan(path)?,
            None => SweepPlan::new(Vec::new()),
        };
        if !self.axes.is_empty() {
            plan.grids = SweepPlan::from_axis_specs(&self.axes)?.grids;
        }
        Ok(plan)
    }
}

/// Generation flags shared by `sweep` and `generate`.
#[derive(Args, Debug, Clone)]
pub struct GenerationFlags {
    /// Instances generated per size.
    #[arg(long, default_value = "1")]
    pub trials: NonZeroU32,
    /// Replace instance files that already exist.
    #[arg(long)]
    pub overwrite: bool,
    /// Skip the remaining trials of a size after its first failed generation.
    #[arg(long)]
    pub abort_bucket_on_failure: bool,
}

impl GenerationFlags {
    pub fn corpus_spec(&self, sizes: Vec<NonZeroU32>) -> CorpusSpec {
        CorpusSpec {
            sizes,
            trials: self.trials,
            overwrite: self.overwrite,
            on_failure: if self.abort_bucket_on_failure {
                FailurePolicy::AbortBucket
            } else {
                FailurePolicy::Continue
            },
        }
    }
}

/// Runs a generation pass into `folder_root` and prints its outcome.
pub fn run_generation(
    generator: &Path,
    folder_root: &Path,
    spec: &CorpusSpec,
) -> Result<CorpusGenerationReport, HarnessError> {
    let report = Generator::new(generator)?.generate_corpus(spec, folder_root)?;
    println!(
        "generated {} instances in {} ({} failed, {} skipped)",
        report.generated.len(),
        folder_root.display(),
        report.failures.len(),
        report.skipped
    );
    for failure in &report.failures {
        eprintln!(
            "  size {} trial {}: {}",
            failure.size, failure.trial, failure.error
        );
    }
    Ok(report)
}
