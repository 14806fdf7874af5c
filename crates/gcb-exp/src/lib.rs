//! Instance generation, parameter grids, and sequential solver sweeps.

mod corpus;
mod executor;
mod generator;
mod grid;
mod plan;
mod process;
mod registry;
mod report;

pub use corpus::{
    instance_path, select, CorpusSelector, GraphInstance, InstanceKey, INSTANCE_EXTENSION,
};
pub use executor::{
    enumerate_requests, run_output_path, RunOutcome, RunRequest, RunState, RunStatus,
    SweepExecutor, SweepOptions,
};
pub use generator::{
    generate, CorpusGenerationReport, CorpusSpec, FailurePolicy, GenerationFailureRecord,
    Generator,
};
pub use grid::{
    Algorithm, AlgorithmConfig, AxisName, AxisValue, GeneticParams, GraspParams, GraspPrParams,
    GridIter, ParameterGrid, SweepAxis, ValueDomain,
};
pub use plan::{load_plan, AxisSpec, PlanIter, PlanOptions, SweepPlan, ALGORITHM_AXIS};
pub use registry::{registry_append, registry_rows, RegistryRow, REGISTRY_FILE};
pub use report::{
    sweep_provenance, SweepReport, SweepSummary, SweepTotals, EXIT_COMPLETED, EXIT_HALTED,
    REPORT_FILE,
};
