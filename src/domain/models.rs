use std::collections::BTreeMap;
use std::time::Duration;

use super::value_objects::{
    ConstraintType, OptimizationType, SolutionStatus, SolverBackend, VariableId, VariableType,
};

/// Decision variable in an optimization problem
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub variable_type: VariableType,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub name: String,
}

impl Variable {
    pub fn continuous(name: impl Into<String>) -> Self {
        Self {
            variable_type: VariableType::Continuous,
            lower_bound: 0.0,
            upper_bound: f64::INFINITY,
            name: name.into(),
        }
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self {
            variable_type: VariableType::Integer,
            lower_bound: 0.0,
            upper_bound: f64::INFINITY,
            name: name.into(),
        }
    }

    pub fn binary(name: impl Into<String>) -> Self {
        Self {
            variable_type: VariableType::Binary,
            lower_bound: 0.0,
            upper_bound: 1.0,
            name: name.into(),
        }
    }

    pub fn with_bounds(mut self, lower: f64, upper: f64) -> Self {
        self.lower_bound = lower;
        self.upper_bound = upper;
        self
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self.variable_type,
            VariableType::Integer | VariableType::Binary
        )
    }
}

/// Objective function to minimize or maximize
///
/// The value at a point `x` is
/// `offset + Σ linear[i]·x_i + Σ quadratic[(i, j)]·x_i·x_j`.
/// Quadratic keys are unordered pairs, stored with the smaller id first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectiveFunction {
    pub optimization_type: OptimizationType,
    pub linear: BTreeMap<VariableId, f64>,
    pub quadratic: BTreeMap<(VariableId, VariableId), f64>,
    pub offset: f64,
}

impl ObjectiveFunction {
    pub fn new(optimization_type: OptimizationType) -> Self {
        Self {
            optimization_type,
            ..Self::default()
        }
    }

    /// Set (not accumulate) the linear coefficient of `var`
    pub fn set_coefficient(&mut self, var: VariableId, coefficient: f64) {
        self.linear.insert(var, coefficient);
    }

    /// Set (not accumulate) the coefficient of the `a·b` term
    pub fn set_quadratic_coefficient(&mut self, a: VariableId, b: VariableId, coefficient: f64) {
        self.quadratic.insert(ordered_pair(a, b), coefficient);
    }

    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    pub fn has_quadratic_terms(&self) -> bool {
        self.quadratic.values().any(|&c| c != 0.0)
    }

    /// Every variable id the objective refers to
    pub fn variables(&self) -> impl Iterator<Item = VariableId> + '_ {
        self.linear
            .keys()
            .copied()
            .chain(self.quadratic.keys().flat_map(|&(a, b)| [a, b]))
    }

    pub fn evaluate(&self, values: &[f64]) -> f64 {
        let linear: f64 = self
            .linear
            .iter()
            .map(|(var, coeff)| coeff * values[var.index()])
            .sum();
        let quadratic: f64 = self
            .quadratic
            .iter()
            .map(|((a, b), coeff)| coeff * values[a.index()] * values[b.index()])
            .sum();
        self.offset + linear + quadratic
    }
}

fn ordered_pair(a: VariableId, b: VariableId) -> (VariableId, VariableId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Linear constraint `lower_bound ≤ Σ coefficients[i]·x_i ≤ upper_bound`
///
/// One-sided constraints use an infinite bound on the open side.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub coefficients: BTreeMap<VariableId, f64>,
    pub name: String,
}

impl Constraint {
    pub fn new(lower_bound: f64, upper_bound: f64) -> Self {
        Self {
            lower_bound,
            upper_bound,
            coefficients: BTreeMap::new(),
            name: String::new(),
        }
    }

    pub fn from_type(constraint_type: ConstraintType, rhs: f64) -> Self {
        let (lower, upper) = constraint_type.bounds(rhs);
        Self::new(lower, upper)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_coefficients(
        mut self,
        coefficients: impl IntoIterator<Item = (VariableId, f64)>,
    ) -> Self {
        for (var, coeff) in coefficients {
            self.set_coefficient(var, coeff);
        }
        self
    }

    /// Set (not accumulate) the coefficient of `var`
    pub fn set_coefficient(&mut self, var: VariableId, coefficient: f64) {
        self.coefficients.insert(var, coefficient);
    }

    pub fn num_variables(&self) -> usize {
        self.coefficients.len()
    }

    /// Left-hand side evaluated at `values`
    pub fn activity(&self, values: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .map(|(var, coeff)| coeff * values[var.index()])
            .sum()
    }

    /// Distance of the activity from `[lower_bound, upper_bound]`, zero when satisfied
    pub fn violation(&self, values: &[f64]) -> f64 {
        let activity = self.activity(values);
        (self.lower_bound - activity)
            .max(activity - self.upper_bound)
            .max(0.0)
    }
}

/// Configuration for the solver
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    pub backend: SolverBackend,
    /// Wall-clock limit in seconds
    pub time_limit: Option<f64>,
    /// Relative MIP gap at which the search stops
    pub gap_tolerance: Option<f64>,
    pub verbose: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            backend: SolverBackend::Auto,
            time_limit: None,
            gap_tolerance: None,
            verbose: false,
        }
    }
}

impl SolverConfig {
    pub fn with_backend(mut self, backend: SolverBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit = Some(seconds);
        self
    }

    pub fn with_gap_tolerance(mut self, gap: f64) -> Self {
        self.gap_tolerance = Some(gap);
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Complete optimization problem
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptimizationProblem {
    pub name: String,
    pub description: String,
    pub objective: ObjectiveFunction,
    pub constraints: Vec<Constraint>,
    pub variables: Vec<Variable>,
    pub solver_config: SolverConfig,
}

impl OptimizationProblem {
    pub fn new(objective: ObjectiveFunction) -> Self {
        Self {
            objective,
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn add_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn with_variables(mut self, variables: Vec<Variable>) -> Self {
        self.variables = variables;
        self
    }

    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.solver_config = config;
        self
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_integer_variables(&self) -> usize {
        self.variables.iter().filter(|v| v.is_integer()).count()
    }

    pub fn num_binary_variables(&self) -> usize {
        self.variables
            .iter()
            .filter(|v| v.variable_type == VariableType::Binary)
            .count()
    }

    pub fn is_mixed_integer(&self) -> bool {
        self.num_integer_variables() > 0
    }

    pub fn has_quadratic_objective(&self) -> bool {
        self.objective.has_quadratic_terms()
    }

    /// Largest bound violation over all constraints and variable bounds
    pub fn max_constraint_violation(&self, values: &[f64]) -> f64 {
        let rows = self.constraints.iter().map(|c| c.violation(values));
        let bounds = self.variables.iter().zip(values).map(|(var, &x)| {
            (var.lower_bound - x).max(x - var.upper_bound).max(0.0)
        });
        rows.chain(bounds).fold(0.0, f64::max)
    }

    /// Largest distance of an integer variable from the nearest integer
    pub fn max_integrality_violation(&self, values: &[f64]) -> f64 {
        self.variables
            .iter()
            .zip(values)
            .filter(|(var, _)| var.is_integer())
            .map(|(_, &x)| (x - x.round()).abs())
            .fold(0.0, f64::max)
    }
}

/// Statistics about the solve process
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolverStatistics {
    pub solve_time_ms: f64,
    pub num_variables: u32,
    pub num_constraints: u32,
    pub num_integer_vars: u32,
    pub num_binary_vars: u32,
    pub solver_backend: String,
}

impl SolverStatistics {
    pub fn for_problem(problem: &OptimizationProblem, backend: &str, elapsed: Duration) -> Self {
        Self {
            solve_time_ms: elapsed.as_secs_f64() * 1000.0,
            num_variables: problem.num_variables() as u32,
            num_constraints: problem.constraints.len() as u32,
            num_integer_vars: (problem.num_integer_variables() - problem.num_binary_variables())
                as u32,
            num_binary_vars: problem.num_binary_variables() as u32,
            solver_backend: backend.to_string(),
        }
    }
}

/// Quality metrics for the solution
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolutionQuality {
    pub max_constraint_violation: f64,
    pub max_integrality_violation: f64,
}

impl SolutionQuality {
    pub fn measure(problem: &OptimizationProblem, values: &[f64]) -> Self {
        Self {
            max_constraint_violation: problem.max_constraint_violation(values),
            max_integrality_violation: problem.max_integrality_violation(values),
        }
    }
}

/// Solution to an optimization problem
///
/// `optimal_value` and `variable_values` are only populated for
/// [`SolutionStatus::Optimal`].
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub status: SolutionStatus,
    pub optimal_value: Option<f64>,
    pub variable_values: Vec<f64>,
    pub message: String,
    pub statistics: SolverStatistics,
    pub quality: SolutionQuality,
}

impl Solution {
    pub fn new(status: SolutionStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            optimal_value: None,
            variable_values: Vec::new(),
            message: message.into(),
            statistics: SolverStatistics::default(),
            quality: SolutionQuality::default(),
        }
    }

    pub fn optimal(value: f64, variable_values: Vec<f64>) -> Self {
        Self {
            status: SolutionStatus::Optimal,
            optimal_value: Some(value),
            variable_values,
            message: "Optimal solution found".to_string(),
            statistics: SolverStatistics::default(),
            quality: SolutionQuality::default(),
        }
    }

    pub fn with_statistics(mut self, statistics: SolverStatistics) -> Self {
        self.statistics = statistics;
        self
    }

    pub fn with_quality(mut self, quality: SolutionQuality) -> Self {
        self.quality = quality;
        self
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolutionStatus::Optimal
    }

    /// Value assigned to `var`, if the solve was optimal
    pub fn value(&self, var: VariableId) -> Option<f64> {
        self.variable_values.get(var.index()).copied()
    }

    pub fn is_feasible_within(&self, tolerance: f64) -> bool {
        self.is_optimal()
            && self.quality.max_constraint_violation <= tolerance
            && self.quality.max_integrality_violation <= tolerance
    }
}
