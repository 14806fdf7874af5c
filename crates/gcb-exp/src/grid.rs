use std::collections::BTreeSet;
use std::fmt;
use std::iter::FusedIterator;
use std::num::NonZeroU32;
use std::str::FromStr;

use gcb_core::errors::{ErrorInfo, HarnessError};
use serde::{Deserialize, Serialize};

const fn positive(value: u32) -> NonZeroU32 {
    match NonZeroU32::new(value) {
        Some(value) => value,
        None => panic!("solver defaults must be positive"),
    }
}

const DEFAULT_GENERATIONS: NonZeroU32 = positive(10_000);
const DEFAULT_POPULATION_SIZE: NonZeroU32 = positive(100);
const DEFAULT_OFFSPRING_SIZE: NonZeroU32 = positive(2);
const DEFAULT_MUTATION_PROBABILITY: f64 = 0.01;
const DEFAULT_POPULATION_RATIO: f64 = 0.2;
const DEFAULT_GRASP_ITERATIONS: NonZeroU32 = positive(10);
const DEFAULT_COLOR_ITERATIONS: NonZeroU32 = positive(5);
const DEFAULT_COLOR_LIST_SIZE: NonZeroU32 = positive(5);
const DEFAULT_PR_SOLUTIONS: NonZeroU32 = positive(5);

fn grid_error(code: &str, message: impl Into<String>) -> ErrorInfo {
    ErrorInfo::new(code, message)
}

/// Heuristic families selected through the solver's `-a` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    /// Genetic algorithm.
    Genetic,
    /// GRASP construction with local search.
    Grasp,
    /// GRASP followed by path relinking over the elite solutions.
    GraspPr,
}

impl Algorithm {
    /// Every algorithm understood by the solver.
    pub const ALL: [Algorithm; 3] = [Algorithm::Genetic, Algorithm::Grasp, Algorithm::GraspPr];

    /// Value passed to the solver's `-a` flag.
    pub fn as_str(self) -> &'static str {
        match self {
            Algorithm::Genetic => "genetic",
            Algorithm::Grasp => "grasp",
            Algorithm::GraspPr => "grasp-pr",
        }
    }

    /// Axes that parameterise this algorithm, in solver flag order.
    pub fn axes(self) -> &'static [AxisName] {
        match self {
            Algorithm::Genetic => &[
                AxisName::Generations,
                AxisName::PopulationSize,
                AxisName::OffspringSize,
                AxisName::MutationProbability,
                AxisName::PopulationRatio,
            ],
            Algorithm::Grasp => &[
                AxisName::GraspIterations,
                AxisName::ColorIterations,
                AxisName::ColorListSize,
            ],
            Algorithm::GraspPr => &[AxisName::PrSolutions],
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = HarnessError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let trimmed = text.trim();
        Algorithm::ALL
            .into_iter()
            .find(|algorithm| algorithm.as_str() == trimmed)
            .ok_or_else(|| {
                HarnessError::InvalidGrid(
                    grid_error("algorithm-unknown", "unknown algorithm")
                        .with_context("value", trimmed)
                        .with_hint("expected one of genetic, grasp, grasp-pr"),
                )
            })
    }
}

/// Domain constraint applied to the values of an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueDomain {
    /// Integer greater than zero.
    PositiveInt,
    /// Real number in `[0, 1]`.
    Probability,
    /// Real number in `(0, 1]`.
    Ratio,
}

/// Sweepable solver parameter. Names match the solver's long flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AxisName {
    /// `--generations`
    Generations,
    /// `--population-size`
    PopulationSize,
    /// `--offspring-size`
    OffspringSize,
    /// `--mutation-probaility`; the solver's flag is spelled this way.
    #[serde(rename = "mutation-probaility", alias = "mutation-probability")]
    MutationProbability,
    /// `--population-ratio`
    PopulationRatio,
    /// `--grasp-iterations`
    GraspIterations,
    /// `--color-iterations`
    ColorIterations,
    /// `--color-list-size`
    ColorListSize,
    /// `--pr-solutions`
    PrSolutions,
}

impl AxisName {
    /// Every sweepable parameter.
    pub const ALL: [AxisName; 9] = [
        AxisName::Generations,
        AxisName::PopulationSize,
        AxisName::OffspringSize,
        AxisName::MutationProbability,
        AxisName::PopulationRatio,
        AxisName::GraspIterations,
        AxisName::ColorIterations,
        AxisName::ColorListSize,
        AxisName::PrSolutions,
    ];

    /// Axis name as written in plans, without the leading dashes.
    pub fn as_str(self) -> &'static str {
        match self {
            AxisName::Generations => "generations",
            AxisName::PopulationSize => "population-size",
            AxisName::OffspringSize => "offspring-size",
            AxisName::MutationProbability => "mutation-probaility",
            AxisName::PopulationRatio => "population-ratio",
            AxisName::GraspIterations => "grasp-iterations",
            AxisName::ColorIterations => "color-iterations",
            AxisName::ColorListSize => "color-list-size",
            AxisName::PrSolutions => "pr-solutions",
        }
    }

    /// Solver flag carrying this parameter.
    pub fn flag(self) -> String {
        format!("--{}", self.as_str())
    }

    /// Algorithm the parameter belongs to.
    pub fn algorithm(self) -> Algorithm {
        match self {
            AxisName::Generations
            | AxisName::PopulationSize
            | AxisName::OffspringSize
            | AxisName::MutationProbability
            | AxisName::PopulationRatio => Algorithm::Genetic,
            AxisName::GraspIterations | AxisName::ColorIterations | AxisName::ColorListSize => {
                Algorithm::Grasp
            }
            AxisName::PrSolutions => Algorithm::GraspPr,
        }
    }

    /// Domain the parameter's values must fall into.
    pub fn domain(self) -> ValueDomain {
        match self {
            AxisName::MutationProbability => ValueDomain::Probability,
            AxisName::PopulationRatio => ValueDomain::Ratio,
            _ => ValueDomain::PositiveInt,
        }
    }
}

impl fmt::Display for AxisName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AxisName {
    type Err = HarnessError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let trimmed = text.trim().trim_start_matches("--");
        if trimmed == "mutation-probability" {
            return Ok(AxisName::MutationProbability);
        }
        AxisName::ALL
            .into_iter()
            .find(|name| name.as_str() == trimmed)
            .ok_or_else(|| {
                HarnessError::InvalidGrid(
                    grid_error("axis-unknown", "unknown sweep axis").with_context("axis", trimmed),
                )
            })
    }
}

/// Candidate axis value as written in a plan file or on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AxisValue {
    /// Non-negative integer literal.
    Int(u64),
    /// Real literal.
    Float(f64),
}

impl AxisValue {
    /// Parses a single textual value, preferring integers.
    pub fn parse(text: &str) -> Result<Self, HarnessError> {
        let trimmed = text.trim();
        if let Ok(value) = trimmed.parse::<u64>() {
            return Ok(AxisValue::Int(value));
        }
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(AxisValue::Float(value)),
            _ => Err(HarnessError::InvalidGrid(
                grid_error("value-unparseable", "axis value is not a number")
                    .with_context("value", trimmed),
            )),
        }
    }
}

impl From<u32> for AxisValue {
    fn from(value: u32) -> Self {
        AxisValue::Int(u64::from(value))
    }
}

impl From<u64> for AxisValue {
    fn from(value: u64) -> Self {
        AxisValue::Int(value)
    }
}

impl From<f64> for AxisValue {
    fn from(value: f64) -> Self {
        AxisValue::Float(value)
    }
}

impl fmt::Display for AxisValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AxisValue::Int(value) => write!(f, "{value}"),
            AxisValue::Float(value) => write!(f, "{value}"),
        }
    }
}

/// A named solver parameter with its ordered candidate values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepAxis {
    pub name: AxisName,
    pub values: Vec<AxisValue>,
}

impl SweepAxis {
    pub fn new<V: Into<AxisValue>>(name: AxisName, values: impl IntoIterator<Item = V>) -> Self {
        Self {
            name,
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// Genetic algorithm parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneticParams {
    pub generations: NonZeroU32,
    pub population_size: NonZeroU32,
    pub offspring_size: NonZeroU32,
    pub mutation_probability: f64,
    pub population_ratio: f64,
}

impl Default for GeneticParams {
    fn default() -> Self {
        Self {
            generations: DEFAULT_GENERATIONS,
            population_size: DEFAULT_POPULATION_SIZE,
            offspring_size: DEFAULT_OFFSPRING_SIZE,
            mutation_probability: DEFAULT_MUTATION_PROBABILITY,
            population_ratio: DEFAULT_POPULATION_RATIO,
        }
    }
}

/// GRASP parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraspParams {
    pub grasp_iterations: NonZeroU32,
    pub color_iterations: NonZeroU32,
    pub color_list_size: NonZeroU32,
}

impl Default for GraspParams {
    fn default() -> Self {
        Self {
            grasp_iterations: DEFAULT_GRASP_ITERATIONS,
            color_iterations: DEFAULT_COLOR_ITERATIONS,
            color_list_size: DEFAULT_COLOR_LIST_SIZE,
        }
    }
}

/// GRASP with path relinking parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraspPrParams {
    pub pr_solutions: NonZeroU32,
}

impl Default for GraspPrParams {
    fn default() -> Self {
        Self {
            pr_solutions: DEFAULT_PR_SOLUTIONS,
        }
    }
}

/// One fully specified solver configuration. Exactly one variant is active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "kebab-case")]
pub enum AlgorithmConfig {
    Genetic(GeneticParams),
    Grasp(GraspParams),
    GraspPr(GraspPrParams),
}

impl AlgorithmConfig {
    /// Configuration using the solver's defaults for every parameter.
    pub fn defaults(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::Genetic => AlgorithmConfig::Genetic(GeneticParams::default()),
            Algorithm::Grasp => AlgorithmConfig::Grasp(GraspParams::default()),
            Algorithm::GraspPr => AlgorithmConfig::GraspPr(GraspPrParams::default()),
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        match self {
            AlgorithmConfig::Genetic(_) => Algorithm::Genetic,
            AlgorithmConfig::Grasp(_) => Algorithm::Grasp,
            AlgorithmConfig::GraspPr(_) => Algorithm::GraspPr,
        }
    }

    /// Parameter flags of the active variant, in solver flag order.
    ///
    /// The `-p` and `-a` flags are not included; see
    /// [`RunRequest::solver_args`](crate::executor::RunRequest::solver_args).
    pub fn solver_flags(&self) -> Vec<String> {
        self.parameters()
            .into_iter()
            .flat_map(|(name, value)| [name.flag(), value])
            .collect()
    }

    /// `(axis, rendered value)` pairs for the active variant.
    pub fn parameters(&self) -> Vec<(AxisName, String)> {
        match self {
            AlgorithmConfig::Genetic(params) => vec![
                (AxisName::Generations, params.generations.to_string()),
                (AxisName::PopulationSize, params.population_size.to_string()),
                (AxisName::OffspringSize, params.offspring_size.to_string()),
                (
                    AxisName::MutationProbability,
                    params.mutation_probability.to_string(),
                ),
                (AxisName::PopulationRatio, params.population_ratio.to_string()),
            ],
            AlgorithmConfig::Grasp(params) => vec![
                (AxisName::GraspIterations, params.grasp_iterations.to_string()),
                (AxisName::ColorIterations, params.color_iterations.to_string()),
                (AxisName::ColorListSize, params.color_list_size.to_string()),
            ],
            AlgorithmConfig::GraspPr(params) => {
                vec![(AxisName::PrSolutions, params.pr_solutions.to_string())]
            }
        }
    }

    fn apply(&mut self, name: AxisName, value: Resolved) {
        match (self, name, value) {
            (AlgorithmConfig::Genetic(p), AxisName::Generations, Resolved::Count(n)) => {
                p.generations = n
            }
            (AlgorithmConfig::Genetic(p), AxisName::PopulationSize, Resolved::Count(n)) => {
                p.population_size = n
            }
            (AlgorithmConfig::Genetic(p), AxisName::OffspringSize, Resolved::Count(n)) => {
                p.offspring_size = n
            }
            (AlgorithmConfig::Genetic(p), AxisName::MutationProbability, Resolved::Real(x)) => {
                p.mutation_probability = x
            }
            (AlgorithmConfig::Genetic(p), AxisName::PopulationRatio, Resolved::Real(x)) => {
                p.population_ratio = x
            }
            (AlgorithmConfig::Grasp(p), AxisName::GraspIterations, Resolved::Count(n)) => {
                p.grasp_iterations = n
            }
            (AlgorithmConfig::Grasp(p), AxisName::ColorIterations, Resolved::Count(n)) => {
                p.color_iterations = n
            }
            (AlgorithmConfig::Grasp(p), AxisName::ColorListSize, Resolved::Count(n)) => {
                p.color_list_size = n
            }
            (AlgorithmConfig::GraspPr(p), AxisName::PrSolutions, Resolved::Count(n)) => {
                p.pr_solutions = n
            }
            // Axes are routed and resolved by `ParameterGrid::expand` before iteration.
            (config, name, _) => debug_assert!(
                false,
                "axis {name} does not apply to {}",
                config.algorithm()
            ),
        }
    }
}

impl fmt::Display for AlgorithmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.algorithm())?;
        for (name, value) in self.parameters() {
            write!(f, " {name}={value}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Resolved {
    Count(NonZeroU32),
    Real(f64),
}

impl Resolved {
    fn identity(self) -> u64 {
        match self {
            Resolved::Count(value) => u64::from(value.get()),
            // Adding +0.0 folds -0.0 into +0.0.
            Resolved::Real(value) => (value + 0.0).to_bits(),
        }
    }
}

#[derive(Debug, Clone)]
struct ResolvedAxis {
    name: AxisName,
    values: Vec<Resolved>,
}

fn resolve_value(name: AxisName, value: AxisValue) -> Result<Resolved, HarnessError> {
    let out_of_domain = |expected: &str| {
        HarnessError::InvalidGrid(
            grid_error("value-out-of-domain", format!("expected {expected}"))
                .with_context("axis", name.as_str())
                .with_context("value", value.to_string()),
        )
    };
    match name.domain() {
        ValueDomain::PositiveInt => match value {
            AxisValue::Int(raw) => u32::try_from(raw)
                .ok()
                .and_then(NonZeroU32::new)
                .map(Resolved::Count)
                .ok_or_else(|| out_of_domain("a positive 32-bit integer")),
            AxisValue::Float(_) => Err(out_of_domain("a positive integer")),
        },
        ValueDomain::Probability => {
            let real = as_real(value);
            if (0.0..=1.0).contains(&real) {
                Ok(Resolved::Real(real))
            } else {
                Err(out_of_domain("a probability in [0, 1]"))
            }
        }
        ValueDomain::Ratio => {
            let real = as_real(value);
            if real > 0.0 && real <= 1.0 {
                Ok(Resolved::Real(real))
            } else {
                Err(out_of_domain("a ratio in (0, 1]"))
            }
        }
    }
}

fn as_real(value: AxisValue) -> f64 {
    match value {
        AxisValue::Int(raw) => raw as f64,
        AxisValue::Float(real) => real,
    }
}

/// Sweep axes scoped to a single algorithm variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterGrid {
    pub algorithm: Algorithm,
    #[serde(default)]
    pub axes: Vec<SweepAxis>,
}

impl ParameterGrid {
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            axes: Vec::new(),
        }
    }

    /// Appends an axis; later axes vary faster during expansion.
    pub fn with_axis<V: Into<AxisValue>>(
        mut self,
        name: AxisName,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.axes.push(SweepAxis::new(name, values));
        self
    }

    /// Number of configurations the grid expands to.
    pub fn cardinality(&self) -> Result<usize, HarnessError> {
        Ok(self.expand()?.len())
    }

    /// Validates the grid and returns a lazy iterator over its Cartesian product.
    ///
    /// The first declared axis varies slowest. Validation completes before the
    /// iterator is returned, so a malformed grid never yields partial output.
    /// Every call yields the same sequence.
    pub fn expand(&self) -> Result<GridIter, HarnessError> {
        let mut seen = BTreeSet::new();
        let mut resolved = Vec::with_capacity(self.axes.len());
        for axis in &self.axes {
            if axis.values.is_empty() {
                return Err(HarnessError::EmptyAxis(
                    grid_error("axis-empty", "axis declares no candidate values")
                        .with_context("axis", axis.name.as_str())
                        .with_context("algorithm", self.algorithm.as_str()),
                ));
            }
            if axis.name.algorithm() != self.algorithm {
                return Err(HarnessError::InvalidGrid(
                    grid_error("axis-misrouted", "axis does not apply to this algorithm")
                        .with_context("axis", axis.name.as_str())
                        .with_context("algorithm", self.algorithm.as_str()),
                ));
            }
            if !seen.insert(axis.name) {
                return Err(HarnessError::InvalidGrid(
                    grid_error("axis-duplicate", "axis declared more than once")
                        .with_context("axis", axis.name.as_str()),
                ));
            }
            let mut identities = BTreeSet::new();
            let mut values = Vec::with_capacity(axis.values.len());
            for value in &axis.values {
                let value = resolve_value(axis.name, *value)?;
                if !identities.insert(value.identity()) {
                    return Err(HarnessError::InvalidGrid(
                        grid_error("value-duplicate", "axis repeats a candidate value")
                            .with_context("axis", axis.name.as_str()),
                    ));
                }
                values.push(value);
            }
            resolved.push(ResolvedAxis {
                name: axis.name,
                values,
            });
        }

        let total = resolved
            .iter()
            .try_fold(1usize, |acc, axis| acc.checked_mul(axis.values.len()))
            .ok_or_else(|| {
                HarnessError::InvalidGrid(
                    grid_error("grid-too-large", "grid cardinality overflows usize")
                        .with_context("algorithm", self.algorithm.as_str()),
                )
            })?;

        Ok(GridIter {
            base: AlgorithmConfig::defaults(self.algorithm),
            cursor: vec![0; resolved.len()],
            axes: resolved,
            remaining: total,
        })
    }
}

/// Lazy, finite iterator over a [`ParameterGrid`] expansion.
#[derive(Debug, Clone)]
pub struct GridIter {
    base: AlgorithmConfig,
    axes: Vec<ResolvedAxis>,
    cursor: Vec<usize>,
    remaining: usize,
}

impl Iterator for GridIter {
    type Item = AlgorithmConfig;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let mut config = self.base.clone();
        for (axis, &position) in self.axes.iter().zip(&self.cursor) {
            config.apply(axis.name, axis.values[position]);
        }
        self.remaining -= 1;
        for slot in (0..self.cursor.len()).rev() {
            self.cursor[slot] += 1;
            if self.cursor[slot] < self.axes[slot].values.len() {
                break;
            }
            self.cursor[slot] = 0;
        }
        Some(config)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for GridIter {}

impl FusedIterator for GridIter {}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(value: u32) -> NonZeroU32 {
        NonZeroU32::new(value).expect("positive")
    }

    #[test]
    fn outer_axis_varies_slowest() {
        let grid = ParameterGrid::new(Algorithm::Grasp)
            .with_axis(AxisName::GraspIterations, [5u32, 15])
            .with_axis(AxisName::ColorListSize, [3u32, 4, 5]);
        let order: Vec<(u32, u32)> = grid
            .expand()
            .expect("expand")
            .map(|config| match config {
                AlgorithmConfig::Grasp(p) => (p.grasp_iterations.get(), p.color_list_size.get()),
                other => panic!("unexpected variant {other:?}"),
            })
            .collect();
        assert_eq!(
            order,
            vec![(5, 3), (5, 4), (5, 5), (15, 3), (15, 4), (15, 5)]
        );
    }

    #[test]
    fn unswept_fields_use_solver_defaults() {
        let grid = ParameterGrid::new(Algorithm::Genetic).with_axis(AxisName::Generations, [50u32]);
        let configs: Vec<_> = grid.expand().expect("expand").collect();
        assert_eq!(
            configs,
            vec![AlgorithmConfig::Genetic(GeneticParams {
                generations: n(50),
                population_size: n(100),
                offspring_size: n(2),
                mutation_probability: 0.01,
                population_ratio: 0.2,
            })]
        );
    }

    #[test]
    fn grid_without_axes_yields_single_default_config() {
        let grid = ParameterGrid::new(Algorithm::GraspPr);
        let configs: Vec<_> = grid.expand().expect("expand").collect();
        assert_eq!(configs, vec![AlgorithmConfig::defaults(Algorithm::GraspPr)]);
    }

    #[test]
    fn empty_axis_is_rejected() {
        let grid = ParameterGrid::new(Algorithm::Grasp)
            .with_axis(AxisName::GraspIterations, [5u32, 15])
            .with_axis(AxisName::ColorIterations, Vec::<u32>::new());
        let err = grid.expand().expect_err("empty axis");
        assert!(matches!(err, HarnessError::EmptyAxis(_)));
        assert_eq!(err.info().context["axis"], "color-iterations");
    }

    #[test]
    fn misrouted_axis_is_rejected() {
        let grid = ParameterGrid::new(Algorithm::Grasp).with_axis(AxisName::Generations, [10u32]);
        let err = grid.expand().expect_err("misrouted");
        assert_eq!(err.info().code, "axis-misrouted");
    }

    #[test]
    fn duplicate_values_and_axes_are_rejected() {
        let values = ParameterGrid::new(Algorithm::Genetic)
            .with_axis(AxisName::MutationProbability, [0.1, 0.1]);
        assert_eq!(values.expand().expect_err("dup").info().code, "value-duplicate");

        let axes = ParameterGrid::new(Algorithm::Genetic)
            .with_axis(AxisName::Generations, [1u32])
            .with_axis(AxisName::Generations, [2u32]);
        assert_eq!(axes.expand().expect_err("dup").info().code, "axis-duplicate");
    }

    #[test]
    fn values_outside_domain_are_rejected() {
        let cases = [
            ParameterGrid::new(Algorithm::Grasp).with_axis(AxisName::ColorListSize, [0u32]),
            ParameterGrid::new(Algorithm::Grasp).with_axis(AxisName::ColorListSize, [2.5]),
            ParameterGrid::new(Algorithm::Genetic).with_axis(AxisName::MutationProbability, [1.5]),
            ParameterGrid::new(Algorithm::Genetic).with_axis(AxisName::PopulationRatio, [0.0]),
        ];
        for grid in cases {
            let err = grid.expand().expect_err("out of domain");
            assert_eq!(err.info().code, "value-out-of-domain", "{grid:?}");
        }
    }

    #[test]
    fn integer_literals_are_accepted_for_real_axes() {
        let grid = ParameterGrid::new(Algorithm::Genetic)
            .with_axis(AxisName::PopulationRatio, [1u32])
            .with_axis(AxisName::MutationProbability, [0u32]);
        let config = grid.expand().expect("expand").next().expect("one config");
        let flags = config.solver_flags();
        assert!(flags.windows(2).any(|w| w == ["--population-ratio", "1"]));
        assert!(flags.windows(2).any(|w| w == ["--mutation-probaility", "0"]));
    }

    #[test]
    fn genetic_flags_keep_solver_spelling() {
        let flags = AlgorithmConfig::defaults(Algorithm::Genetic).solver_flags();
        assert_eq!(
            flags,
            vec![
                "--generations",
                "10000",
                "--population-size",
                "100",
                "--offspring-size",
                "2",
                "--mutation-probaility",
                "0.01",
                "--population-ratio",
                "0.2",
            ]
        );
    }

    #[test]
    fn axis_names_parse_with_both_spellings() {
        assert_eq!(
            "mutation-probaility".parse::<AxisName>().expect("solver spelling"),
            AxisName::MutationProbability
        );
        assert_eq!(
            "mutation-probability".parse::<AxisName>().expect("dictionary spelling"),
            AxisName::MutationProbability
        );
        assert_eq!(
            "--color-list-size".parse::<AxisName>().expect("flag form"),
            AxisName::ColorListSize
        );
        assert!("colour-list-size".parse::<AxisName>().is_err());
    }

    #[test]
    fn axis_values_prefer_integers() {
        assert_eq!(AxisValue::parse(" 25 ").expect("int"), AxisValue::Int(25));
        assert_eq!(AxisValue::parse("0.05").expect("float"), AxisValue::Float(0.05));
        assert!(AxisValue::parse("inf").is_err());
        assert!(AxisValue::parse("five").is_err());
    }

    #[test]
    fn config_display_lists_parameters() {
        let config = AlgorithmConfig::defaults(Algorithm::Grasp);
        assert_eq!(
            config.to_string(),
            "grasp grasp-iterations=10 color-iterations=5 color-list-size=5"
        );
    }
}
