use std::error::Error;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use gcb_core::errors::{ErrorInfo, HarnessError};
use gcb_exp::{CorpusSelector, SweepExecutor, SweepOptions};
use tracing::warn;

use super::{run_generation, GenerationFlags, GridArgs};

#[derive(Args, Debug)]
pub struct SweepArgs {
    #[arg(long)]
    pub corpus_root: PathBuf,
    /// Corpus folder to sweep, e.g. `random` or `reg`.
    #[arg(long)]
    pub folder: String,
    /// Restrict a bucketed folder to one instance size.
    #[arg(long)]
    pub size: Option<NonZeroU32>,
    #[arg(long)]
    pub solver_path: PathBuf,
    /// Generator used for the optional generation phase.
    #[arg(long)]
    pub generator_path: Option<PathBuf>,
    /// Comma separated sizes to generate before sweeping.
    #[arg(long, value_delimiter = ',')]
    pub generate_sizes: Vec<NonZeroU32>,
    #[command(flatten)]
    pub generation: GenerationFlags,
    /// Halt after the first failed or timed-out run.
    #[arg(long)]
    pub stop_on_first_failure: bool,
    /// Per-run wall clock limit.
    #[arg(long)]
    pub timeout_seconds: Option<u64>,
    #[command(flatten)]
    pub grid: GridArgs,
    /// Directory for solver output, `sweep_report.json`, and `runs.csv`.
    #[arg(long)]
    pub results_dir: Option<PathBuf>,
    /// Failing runs listed in the closing summary.
    #[arg(long)]
    pub max_failures_listed: Option<usize>,
}

pub fn run(args: &SweepArgs) -> Result<u8, Box<dyn Error>> {
    let plan = args.grid.resolve()?;
    // Malformed grids fail before the generation phase spawns anything.
    plan.configs()?;
    let selector = CorpusSelector::new(args.folder.clone(), args.size);

    let timeout_seconds = args.timeout_seconds.or(plan.options.timeout_seconds);
    if timeout_seconds == Some(0) {
        return Err(HarnessError::Config(
            ErrorInfo::new("timeout-zero", "per-run timeout must be at least one second")
                .with_hint("omit --timeout-seconds to disable the timeout"),
        )
        .into());
    }
    let mut options = SweepOptions::new(&args.corpus_root, &args.solver_path);
    options.stop_on_first_failure =
        args.stop_on_first_failure || plan.options.stop_on_first_failure;
    options.timeout = timeout_seconds.map(Duration::from_secs);
    options.results_dir = args.results_dir.clone();
    let executor = SweepExecutor::new(options)?;

    match (&args.generator_path, args.generate_sizes.is_empty()) {
        (Some(generator), false) => {
            let folder_root = selector.folder_path(&args.corpus_root)?;
            let spec = args.generation.corpus_spec(args.generate_sizes.clone());
            run_generation(generator, &folder_root, &spec)?;
        }
        (Some(_), true) => {
            warn!("--generator-path given without --generate-sizes; skipping generation")
        }
        (None, false) => {
            warn!("--generate-sizes given without --generator-path; skipping generation")
        }
        (None, true) => {}
    }

    let report = executor.run(&selector, &plan)?;
    let listed = args
        .max_failures_listed
        .unwrap_or(plan.options.max_failures_listed);
    println!("{}", report.summary(listed));
    if let Some(dir) = &args.results_dir {
        println!("results written to {}", dir.display());
    }
    Ok(report.exit_code())
}
