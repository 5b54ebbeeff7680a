// Problem builder: construct a model step by step, then solve it once

use crate::domain::{
    models::{
        Constraint, ObjectiveFunction, OptimizationProblem, Solution, SolutionQuality,
        SolverConfig, Variable,
    },
    solver_service::{Result, SolverError},
    value_objects::{
        ConstraintId, ConstraintType, OptimizationType, SolverBackend, VariableId, VariableType,
    },
};
use crate::solver::SolverFactory;
use std::time::Instant;
use tracing::debug;

/// Builds one optimization problem and hands it to a solver backend
///
/// The backend is checked when the builder is created, so an unavailable
/// solver is reported before any variable is declared. Variable and
/// constraint ids are only meaningful for the builder that returned them.
#[derive(Debug, Clone)]
pub struct ProblemBuilder {
    problem: OptimizationProblem,
}

impl ProblemBuilder {
    /// Create a builder for a backend identifier such as `"HIGHS"` or `"CLARABEL"`
    pub fn create(backend_name: &str) -> Result<Self> {
        let backend = SolverFactory::parse_backend(backend_name)?;
        Self::with_backend(backend)
    }

    pub fn with_backend(backend: SolverBackend) -> Result<Self> {
        Self::with_config(SolverConfig::default().with_backend(backend))
    }

    pub fn with_config(config: SolverConfig) -> Result<Self> {
        if !config.backend.is_compiled() {
            return Err(SolverError::SolverNotAvailable(format!(
                "{} was not compiled into this build",
                config.backend
            )));
        }
        Ok(Self {
            problem: OptimizationProblem::default().with_config(config),
        })
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.problem.name = name.into();
        self
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.problem.description = description.into();
        self
    }

    /// Declare a decision variable
    ///
    /// Fails only when `lower > upper` or a bound is NaN.
    pub fn create_variable(
        &mut self,
        lower: f64,
        upper: f64,
        domain: VariableType,
        name: impl Into<String>,
    ) -> Result<VariableId> {
        let name = name.into();
        if lower.is_nan() || upper.is_nan() {
            return Err(SolverError::InvalidProblem(format!(
                "Variable '{}' has a NaN bound",
                name
            )));
        }
        if lower > upper {
            return Err(SolverError::InvalidProblem(format!(
                "Variable '{}' has lower bound ({}) > upper bound ({})",
                name, lower, upper
            )));
        }

        let id = VariableId(self.problem.variables.len());
        self.problem.variables.push(Variable {
            variable_type: domain,
            lower_bound: lower,
            upper_bound: upper,
            name,
        });
        Ok(id)
    }

    pub fn num_var(&mut self, lower: f64, upper: f64, name: impl Into<String>) -> Result<VariableId> {
        self.create_variable(lower, upper, VariableType::Continuous, name)
    }

    pub fn int_var(&mut self, lower: f64, upper: f64, name: impl Into<String>) -> Result<VariableId> {
        self.create_variable(lower, upper, VariableType::Integer, name)
    }

    pub fn bool_var(&mut self, name: impl Into<String>) -> Result<VariableId> {
        self.create_variable(0.0, 1.0, VariableType::Binary, name)
    }

    /// Add `lower ≤ Σ coefficient·variable ≤ upper`
    ///
    /// Use an infinite bound for a one-sided constraint. A variable listed
    /// twice keeps its last coefficient.
    pub fn add_constraint(
        &mut self,
        lower: f64,
        upper: f64,
        coefficients: impl IntoIterator<Item = (VariableId, f64)>,
    ) -> Result<ConstraintId> {
        self.push_constraint(Constraint::new(lower, upper).with_coefficients(coefficients))
    }

    pub fn add_named_constraint(
        &mut self,
        name: impl Into<String>,
        lower: f64,
        upper: f64,
        coefficients: impl IntoIterator<Item = (VariableId, f64)>,
    ) -> Result<ConstraintId> {
        self.push_constraint(
            Constraint::new(lower, upper)
                .with_name(name)
                .with_coefficients(coefficients),
        )
    }

    /// Add `Σ coefficient·variable <op> rhs`
    pub fn add_typed_constraint(
        &mut self,
        constraint_type: ConstraintType,
        rhs: f64,
        coefficients: impl IntoIterator<Item = (VariableId, f64)>,
    ) -> Result<ConstraintId> {
        self.push_constraint(Constraint::from_type(constraint_type, rhs).with_coefficients(coefficients))
    }

    /// Replace the objective
    ///
    /// Quadratic terms are `(a, b, c)` meaning `c·a·b`; only backends with
    /// quadratic support will accept them at solve time.
    pub fn set_objective(
        &mut self,
        linear: impl IntoIterator<Item = (VariableId, f64)>,
        quadratic: Option<Vec<(VariableId, VariableId, f64)>>,
        direction: OptimizationType,
    ) -> Result<()> {
        let mut objective = ObjectiveFunction::new(direction);
        for (var, coeff) in linear {
            self.check_owned(var, "Objective")?;
            objective.set_coefficient(var, coeff);
        }
        for (a, b, coeff) in quadratic.unwrap_or_default() {
            self.check_owned(a, "Objective")?;
            self.check_owned(b, "Objective")?;
            objective.set_quadratic_coefficient(a, b, coeff);
        }
        self.problem.objective = objective;
        Ok(())
    }

    pub fn problem(&self) -> &OptimizationProblem {
        &self.problem
    }

    pub fn variable(&self, id: VariableId) -> Option<&Variable> {
        self.problem.variables.get(id.index())
    }

    pub fn constraint(&self, id: ConstraintId) -> Option<&Constraint> {
        self.problem.constraints.get(id.index())
    }

    pub fn variable_ids(&self) -> impl Iterator<Item = VariableId> {
        (0..self.problem.variables.len()).map(VariableId)
    }

    /// Solve the problem, blocking until the backend returns
    ///
    /// Every adapter validates before computing, so a backend that cannot
    /// handle the problem (integer variables on a continuous solver, quadratic
    /// terms on a linear one) is reported as [`SolverError::SolverNotAvailable`].
    pub fn solve(&self) -> Result<Solution> {
        let solver = SolverFactory::create_solver(&self.problem)?;

        let start = Instant::now();
        let mut solution = solver.solve(&self.problem)?;
        debug!(
            problem = %self.problem.name,
            status = %solution.status,
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Solve finished"
        );

        if solution.is_optimal() {
            solution.quality = SolutionQuality::measure(&self.problem, &solution.variable_values);
        }
        Ok(solution)
    }

    fn push_constraint(&mut self, constraint: Constraint) -> Result<ConstraintId> {
        if constraint.lower_bound.is_nan() || constraint.upper_bound.is_nan() {
            return Err(SolverError::InvalidProblem(format!(
                "Constraint '{}' has a NaN bound",
                constraint.name
            )));
        }
        if constraint.lower_bound > constraint.upper_bound {
            return Err(SolverError::InvalidProblem(format!(
                "Constraint '{}' has lower bound ({}) > upper bound ({})",
                constraint.name, constraint.lower_bound, constraint.upper_bound
            )));
        }
        for &var in constraint.coefficients.keys() {
            self.check_owned(var, "Constraint")?;
        }

        let id = ConstraintId(self.problem.constraints.len());
        self.problem.constraints.push(constraint);
        Ok(id)
    }

    fn check_owned(&self, var: VariableId, context: &str) -> Result<()> {
        if var.index() < self.problem.variables.len() {
            Ok(())
        } else {
            Err(SolverError::InvalidProblem(format!(
                "{} refers to unknown variable #{}",
                context,
                var.index()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SolutionStatus;
    use approx::assert_abs_diff_eq;

    #[test]
    fn inverted_variable_bounds_fail() {
        let mut builder = ProblemBuilder::create("MICROLP").unwrap();
        let err = builder.num_var(3.0, 1.0, "x").unwrap_err();
        assert!(matches!(err, SolverError::InvalidProblem(_)));
        assert!(builder.problem().variables.is_empty());
    }

    #[test]
    fn nan_variable_bound_fails() {
        let mut builder = ProblemBuilder::create("MICROLP").unwrap();
        let err = builder
            .create_variable(f64::NAN, 1.0, VariableType::Continuous, "x")
            .unwrap_err();
        assert!(matches!(err, SolverError::InvalidProblem(msg) if msg.contains("NaN")));
        assert!(builder.problem().variables.is_empty());
    }

    #[test]
    fn nan_constraint_bound_fails() {
        let mut builder = ProblemBuilder::create("MICROLP").unwrap();
        let x = builder.num_var(0.0, 1.0, "x").unwrap();
        let err = builder.add_constraint(0.0, f64::NAN, [(x, 1.0)]).unwrap_err();
        assert!(matches!(err, SolverError::InvalidProblem(_)));
        assert!(builder.problem().constraints.is_empty());
    }

    #[test]
    fn equal_bounds_are_accepted() {
        let mut builder = ProblemBuilder::create("MICROLP").unwrap();
        let x = builder.num_var(2.0, 2.0, "x").unwrap();
        assert_eq!(builder.variable(x).unwrap().lower_bound, 2.0);
    }

    #[test]
    fn unknown_backend_fails_at_creation() {
        let err = ProblemBuilder::create("GLOP").unwrap_err();
        assert!(matches!(err, SolverError::SolverNotAvailable(_)));
    }

    #[test]
    fn foreign_variable_ids_are_rejected() {
        let mut other = ProblemBuilder::create("MICROLP").unwrap();
        other.num_var(0.0, 1.0, "a").unwrap();
        let foreign = other.num_var(0.0, 1.0, "b").unwrap();

        let mut builder = ProblemBuilder::create("MICROLP").unwrap();
        builder.num_var(0.0, 1.0, "x").unwrap();
        assert!(builder.add_constraint(0.0, 1.0, [(foreign, 1.0)]).is_err());
        assert!(builder
            .set_objective([(foreign, 1.0)], None, OptimizationType::Minimize)
            .is_err());
        assert!(builder.problem().constraints.is_empty());
    }

    #[test]
    fn inverted_constraint_bounds_fail() {
        let mut builder = ProblemBuilder::create("MICROLP").unwrap();
        let x = builder.num_var(0.0, 1.0, "x").unwrap();
        let err = builder.add_constraint(5.0, 4.0, [(x, 1.0)]).unwrap_err();
        assert!(matches!(err, SolverError::InvalidProblem(_)));
    }

    #[test]
    fn quadratic_objective_on_linear_backend_is_unavailable() {
        let mut builder = ProblemBuilder::create("MICROLP").unwrap();
        let x = builder.num_var(0.0, 1.0, "x").unwrap();
        builder
            .set_objective([(x, 0.0)], Some(vec![(x, x, 1.0)]), OptimizationType::Minimize)
            .unwrap();
        assert!(matches!(
            builder.solve(),
            Err(SolverError::SolverNotAvailable(_))
        ));
    }

    #[test]
    fn integer_variables_on_clarabel_are_unavailable() {
        let mut builder = ProblemBuilder::create("CLARABEL").unwrap();
        let n = builder.int_var(0.0, 5.0, "n").unwrap();
        builder
            .set_objective([(n, 1.0)], None, OptimizationType::Maximize)
            .unwrap();
        assert!(matches!(
            builder.solve(),
            Err(SolverError::SolverNotAvailable(_))
        ));
    }

    #[test]
    fn maximizing_a_convex_square_is_unavailable() {
        let mut builder = ProblemBuilder::create("CLARABEL").unwrap();
        let x = builder.num_var(-1.0, 1.0, "x").unwrap();
        builder
            .set_objective([(x, 0.0)], Some(vec![(x, x, 1.0)]), OptimizationType::Maximize)
            .unwrap();
        assert!(matches!(
            builder.solve(),
            Err(SolverError::SolverNotAvailable(_))
        ));
    }

    #[test]
    fn binary_choice_under_gap_tolerance() {
        let config = SolverConfig::default()
            .with_backend(SolverBackend::MicroLp)
            .with_gap_tolerance(1e-4);
        let mut builder = ProblemBuilder::with_config(config).unwrap();
        let a = builder.bool_var("a").unwrap();
        let b = builder.bool_var("b").unwrap();
        builder.add_constraint(f64::NEG_INFINITY, 1.0, [(a, 1.0), (b, 1.0)]).unwrap();
        builder
            .set_objective([(a, 3.0), (b, 2.0)], None, OptimizationType::Maximize)
            .unwrap();

        assert_eq!(builder.problem().num_binary_variables(), 2);
        assert_eq!(builder.problem().solver_config.gap_tolerance, Some(1e-4));
        let solution = builder.solve().unwrap();
        assert_abs_diff_eq!(solution.value(a).unwrap(), 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(solution.value(b).unwrap(), 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(solution.optimal_value.unwrap(), 3.0, epsilon = 1e-6);
    }

    #[cfg(not(feature = "coin_cbc"))]
    #[test]
    fn uncompiled_backend_fails_at_creation() {
        assert!(matches!(
            ProblemBuilder::create("CBC"),
            Err(SolverError::SolverNotAvailable(_))
        ));
        assert!(matches!(
            ProblemBuilder::with_backend(SolverBackend::CoinCbc),
            Err(SolverError::SolverNotAvailable(_))
        ));
    }

    #[test]
    fn solve_measures_solution_quality() {
        let mut builder = ProblemBuilder::create("MICROLP").unwrap().named("tiny");
        let x = builder.num_var(0.0, f64::INFINITY, "x").unwrap();
        let y = builder.num_var(0.0, f64::INFINITY, "y").unwrap();
        builder
            .add_typed_constraint(ConstraintType::LessThanOrEqual, 4.0, [(x, 1.0), (y, 1.0)])
            .unwrap();
        builder
            .set_objective([(x, 1.0), (y, 2.0)], None, OptimizationType::Maximize)
            .unwrap();

        let solution = builder.solve().unwrap();
        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert_abs_diff_eq!(solution.optimal_value.unwrap(), 8.0, epsilon = 1e-6);
        assert_abs_diff_eq!(solution.value(y).unwrap(), 4.0, epsilon = 1e-6);
        assert!(solution.is_feasible_within(1e-6));
    }
}
