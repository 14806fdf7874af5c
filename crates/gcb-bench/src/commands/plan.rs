use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::Args;
use gcb_core::canonical::to_canonical_json_bytes;
use gcb_exp::{AlgorithmConfig, GraphInstance, InstanceKey, RunRequest};
use serde::Serialize;

use super::GridArgs;

#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub grid: GridArgs,
    /// Instance path substituted into the printed solver arguments.
    #[arg(long, default_value = "instance.col")]
    pub instance: PathBuf,
}

#[derive(Serialize)]
struct PlanLine<'a> {
    index: usize,
    config: &'a AlgorithmConfig,
    argv: Vec<String>,
}

pub fn run(args: &PlanArgs) -> Result<(), Box<dyn Error>> {
    let plan = args.grid.resolve()?;
    let configs = plan.configs()?;
    let file = args
        .instance
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let instance = GraphInstance {
        key: InstanceKey::Named { file },
        path: args.instance.clone(),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for (index, config) in configs.into_iter().enumerate() {
        let request = RunRequest {
            index,
            instance: instance.clone(),
            config,
        };
        let argv = request
            .solver_args()
            .into_iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        let line = PlanLine {
            index,
            config: &request.config,
            argv,
        };
        out.write_all(&to_canonical_json_bytes(&line)?)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}
