use std::error::Error;
use std::num::NonZeroU32;
use std::path::PathBuf;

use clap::Args;
use gcb_exp::CorpusSelector;

use super::{run_generation, GenerationFlags};

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Random graph generator invoked as `<generator> <size>`.
    #[arg(long)]
    pub generator_path: PathBuf,
    #[arg(long)]
    pub corpus_root: PathBuf,
    /// Corpus folder receiving the `<size>/<trial>.col` buckets.
    #[arg(long)]
    pub folder: String,
    /// Comma separated instance sizes.
    #[arg(long, value_delimiter = ',', required = true)]
    pub sizes: Vec<NonZeroU32>,
    #[command(flatten)]
    pub generation: GenerationFlags,
}

pub fn run(args: &GenerateArgs) -> Result<(), Box<dyn Error>> {
    let folder_root =
        CorpusSelector::new(args.folder.clone(), None).folder_path(&args.corpus_root)?;
    let spec = args.generation.corpus_spec(args.sizes.clone());
    run_generation(&args.generator_path, &folder_root, &spec)?;
    Ok(())
}
