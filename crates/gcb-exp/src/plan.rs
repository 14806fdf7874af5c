use std::fs;
use std::path::Path;
use std::str::FromStr;

use gcb_core::canonical::from_yaml_slice;
use gcb_core::errors::{ErrorInfo, HarnessError};
use serde::{Deserialize, Serialize};

use crate::grid::{
    Algorithm, AlgorithmConfig, AxisName, AxisValue, GridIter, ParameterGrid, SweepAxis,
};

/// Axis name reserved for fanning a sweep out over several algorithms.
pub const ALGORITHM_AXIS: &str = "algorithm";

/// Raw `name=v1,v2,...` axis declaration as given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxisSpec {
    pub name: String,
    pub values: Vec<String>,
}

impl FromStr for AxisSpec {
    type Err = HarnessError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let Some((name, values)) = text.split_once('=') else {
            return Err(HarnessError::InvalidGrid(
                ErrorInfo::new("axis-syntax", "axis must be written as name=v1,v2,...")
                    .with_context("axis", text),
            ));
        };
        let name = name.trim();
        if name.is_empty() {
            return Err(HarnessError::InvalidGrid(
                ErrorInfo::new("axis-syntax", "axis name is empty").with_context("axis", text),
            ));
        }
        let values = values
            .split(',')
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .collect();
        Ok(Self {
            name: name.to_string(),
            values,
        })
    }
}

/// Sweep execution options that may be declared in a plan file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanOptions {
    #[serde(default)]
    pub stop_on_first_failure: bool,
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
    #[serde(default = "PlanOptions::default_failures_listed")]
    pub max_failures_listed: usize,
}

impl PlanOptions {
    const fn default_failures_listed() -> usize {
        5
    }
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            stop_on_first_failure: false,
            timeout_seconds: None,
            max_failures_listed: Self::default_failures_listed(),
        }
    }
}

/// Iterator over every configuration of a [`SweepPlan`], grid after grid.
pub type PlanIter = std::iter::Flatten<std::vec::IntoIter<GridIter>>;

/// Ordered set of parameter grids, one per algorithm, plus execution options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPlan {
    pub grids: Vec<ParameterGrid>,
    #[serde(default)]
    pub options: PlanOptions,
}

impl SweepPlan {
    pub fn new(grids: Vec<ParameterGrid>) -> Self {
        Self {
            grids,
            options: PlanOptions::default(),
        }
    }

    /// Routes command line axes into per-algorithm grids.
    ///
    /// An `algorithm` axis lists the grids to build, in order; without one the
    /// algorithms are inferred from the axes in order of first appearance.
    pub fn from_axis_specs(specs: &[AxisSpec]) -> Result<Self, HarnessError> {
        if specs.is_empty() {
            return Err(nothing_to_sweep());
        }
        let mut selected: Option<Vec<Algorithm>> = None;
        let mut axes = Vec::new();
        for spec in specs {
            if spec.name == ALGORITHM_AXIS {
                if selected.is_some() {
                    return Err(HarnessError::InvalidGrid(
                        ErrorInfo::new("axis-duplicate", "axis declared more than once")
                            .with_context("axis", ALGORITHM_AXIS),
                    ));
                }
                selected = Some(parse_algorithms(&spec.values)?);
                continue;
            }
            let name: AxisName = spec.name.parse()?;
            let values = spec
                .values
                .iter()
                .map(|value| AxisValue::parse(value))
                .collect::<Result<Vec<_>, _>>()?;
            axes.push(SweepAxis { name, values });
        }

        let algorithms = match selected {
            Some(algorithms) => {
                if let Some(stray) = axes
                    .iter()
                    .find(|axis| !algorithms.contains(&axis.name.algorithm()))
                {
                    return Err(HarnessError::InvalidGrid(
                        ErrorInfo::new(
                            "axis-not-selected",
                            "axis belongs to an unselected algorithm",
                        )
                        .with_context("axis", stray.name.as_str())
                        .with_context("algorithm", stray.name.algorithm().as_str()),
                    ));
                }
                algorithms
            }
            None => {
                let mut inferred = Vec::new();
                for axis in &axes {
                    let algorithm = axis.name.algorithm();
                    if !inferred.contains(&algorithm) {
                        inferred.push(algorithm);
                    }
                }
                inferred
            }
        };

        let grids = algorithms
            .into_iter()
            .map(|algorithm| ParameterGrid {
                algorithm,
                axes: axes
                    .iter()
                    .filter(|axis| axis.name.algorithm() == algorithm)
                    .cloned()
                    .collect(),
            })
            .collect();
        Ok(Self::new(grids))
    }

    /// Validates every grid, then chains their expansions in declared order.
    pub fn expand(&self) -> Result<PlanIter, HarnessError> {
        if self.grids.is_empty() {
            return Err(nothing_to_sweep());
        }
        let mut seen = Vec::with_capacity(self.grids.len());
        let mut iters = Vec::with_capacity(self.grids.len());
        for grid in &self.grids {
            if seen.contains(&grid.algorithm) {
                return Err(HarnessError::InvalidGrid(
                    ErrorInfo::new("grid-duplicate", "algorithm has more than one grid")
                        .with_context("algorithm", grid.algorithm.as_str())
                        .with_hint("merge the axes into a single grid"),
                ));
            }
            seen.push(grid.algorithm);
            iters.push(grid.expand()?);
        }
        Ok(iters.into_iter().flatten())
    }

    /// Total number of configurations across all grids.
    pub fn cardinality(&self) -> Result<usize, HarnessError> {
        let mut total = 0usize;
        for grid in &self.grids {
            total = total.checked_add(grid.cardinality()?).ok_or_else(|| {
                HarnessError::InvalidGrid(ErrorInfo::new(
                    "grid-too-large",
                    "plan cardinality overflows usize",
                ))
            })?;
        }
        Ok(total)
    }

    /// Expands the plan eagerly.
    pub fn configs(&self) -> Result<Vec<AlgorithmConfig>, HarnessError> {
        Ok(self.expand()?.collect())
    }
}

fn parse_algorithms(values: &[String]) -> Result<Vec<Algorithm>, HarnessError> {
    if values.is_empty() {
        return Err(HarnessError::EmptyAxis(
            ErrorInfo::new("axis-empty", "axis declares no candidate values")
                .with_context("axis", ALGORITHM_AXIS),
        ));
    }
    let mut algorithms = Vec::with_capacity(values.len());
    for value in values {
        let algorithm: Algorithm = value.parse()?;
        if algorithms.contains(&algorithm) {
            return Err(HarnessError::InvalidGrid(
                ErrorInfo::new("value-duplicate", "axis repeats a candidate value")
                    .with_context("axis", ALGORITHM_AXIS),
            ));
        }
        algorithms.push(algorithm);
    }
    Ok(algorithms)
}

fn nothing_to_sweep() -> HarnessError {
    HarnessError::InvalidGrid(
        ErrorInfo::new("nothing-to-sweep", "no parameter grid declared")
            .with_hint("pass --axis algorithm=<name> or a --plan file"),
    )
}

/// Loads a YAML sweep plan from disk.
pub fn load_plan(path: &Path) -> Result<SweepPlan, HarnessError> {
    let bytes = fs::read(path).map_err(|err| HarnessError::io("plan-read", path, err))?;
    from_yaml_slice(&bytes)
}
