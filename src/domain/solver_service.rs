// Domain service interface for solving optimization problems
// Defines the contract that any solver adapter must follow

use super::models::{OptimizationProblem, Solution};

/// Error types for the solver service
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    #[error("Invalid problem: {0}")]
    InvalidProblem(String),

    #[error("Solver not available: {0}")]
    SolverNotAvailable(String),

    #[error("Solver execution failed: {0}")]
    ExecutionFailed(String),
}

pub type Result<T> = std::result::Result<T, SolverError>;

/// Domain service interface for optimization solvers
///
/// Adapters translate an [`OptimizationProblem`] into their backend's API and
/// translate the backend status back into a [`Solution`]. Only optimal
/// solutions carry variable values.
pub trait SolverService: Send + Sync {
    /// Solve an optimization problem, blocking until the backend returns
    fn solve(&self, problem: &OptimizationProblem) -> Result<Solution>;

    /// Check the problem is well formed and within this backend's capabilities
    ///
    /// Capability mismatches are reported as [`SolverError::SolverNotAvailable`]
    /// so the caller can tell them apart from malformed input.
    fn validate(&self, problem: &OptimizationProblem) -> Result<()> {
        let mut errors = Vec::new();
        let num_vars = problem.num_variables();

        for (i, var) in problem.variables.iter().enumerate() {
            if var.lower_bound.is_nan() || var.upper_bound.is_nan() {
                errors.push(format!("Variable {} '{}' has a NaN bound", i, var.name));
            } else if var.lower_bound > var.upper_bound {
                errors.push(format!(
                    "Variable {} '{}' has lower bound ({}) > upper bound ({})",
                    i, var.name, var.lower_bound, var.upper_bound
                ));
            }
        }

        for (i, constraint) in problem.constraints.iter().enumerate() {
            if constraint.lower_bound > constraint.upper_bound {
                errors.push(format!(
                    "Constraint {} '{}' has lower bound ({}) > upper bound ({})",
                    i, constraint.name, constraint.lower_bound, constraint.upper_bound
                ));
            }
            if let Some(var) = constraint.coefficients.keys().find(|v| v.index() >= num_vars) {
                errors.push(format!(
                    "Constraint {} refers to variable #{} but problem has {} variables",
                    i,
                    var.index(),
                    num_vars
                ));
            }
        }

        if let Some(var) = problem.objective.variables().find(|v| v.index() >= num_vars) {
            errors.push(format!(
                "Objective refers to variable #{} but problem has {} variables",
                var.index(),
                num_vars
            ));
        }

        if !errors.is_empty() {
            return Err(SolverError::InvalidProblem(errors.join("; ")));
        }

        if problem.is_mixed_integer() && !self.supports_mip() {
            return Err(SolverError::SolverNotAvailable(format!(
                "{} does not support integer variables",
                self.name()
            )));
        }

        if problem.has_quadratic_objective() && !self.supports_quadratic() {
            return Err(SolverError::SolverNotAvailable(format!(
                "{} does not support quadratic objectives",
                self.name()
            )));
        }

        if problem.has_quadratic_objective() {
            self.check_objective(problem)?;
        }

        Ok(())
    }

    /// Backend-specific checks on a quadratic objective, run after the shared ones
    fn check_objective(&self, _problem: &OptimizationProblem) -> Result<()> {
        Ok(())
    }

    /// Get the name of this solver backend
    fn name(&self) -> &str;

    /// Check if this solver supports mixed-integer programming
    fn supports_mip(&self) -> bool;

    /// Check if this solver accepts quadratic objective terms
    fn supports_quadratic(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Constraint, ObjectiveFunction, OptimizationType, Variable, VariableId,
    };

    struct LinearOnly;

    impl SolverService for LinearOnly {
        fn solve(&self, _problem: &OptimizationProblem) -> Result<Solution> {
            unreachable!("validation tests never solve")
        }

        fn name(&self) -> &str {
            "linear-only"
        }

        fn supports_mip(&self) -> bool {
            false
        }
    }

    fn two_continuous() -> OptimizationProblem {
        OptimizationProblem::new(ObjectiveFunction::new(OptimizationType::Minimize))
            .with_variables(vec![Variable::continuous("x"), Variable::continuous("y")])
    }

    #[test]
    fn accepts_well_formed_problem() {
        let problem = two_continuous().add_constraint(
            Constraint::new(0.0, 1.0).with_coefficients([(VariableId(0), 1.0)]),
        );
        assert!(LinearOnly.validate(&problem).is_ok());
    }

    #[test]
    fn rejects_inverted_variable_bounds() {
        let problem = OptimizationProblem::default()
            .with_variables(vec![Variable::continuous("x").with_bounds(2.0, 1.0)]);
        let err = LinearOnly.validate(&problem).unwrap_err();
        assert!(matches!(err, SolverError::InvalidProblem(msg) if msg.contains("'x'")));
    }

    #[test]
    fn rejects_dangling_variable_ids() {
        let problem = two_continuous().add_constraint(
            Constraint::new(0.0, 1.0).with_coefficients([(VariableId(7), 1.0)]),
        );
        assert!(matches!(
            LinearOnly.validate(&problem),
            Err(SolverError::InvalidProblem(_))
        ));
    }

    #[test]
    fn capability_mismatch_is_unavailability() {
        let mut problem = two_continuous();
        problem
            .objective
            .set_quadratic_coefficient(VariableId(0), VariableId(0), 1.0);
        assert!(matches!(
            LinearOnly.validate(&problem),
            Err(SolverError::SolverNotAvailable(_))
        ));

        let problem = OptimizationProblem::default().with_variables(vec![Variable::integer("n")]);
        assert!(matches!(
            LinearOnly.validate(&problem),
            Err(SolverError::SolverNotAvailable(_))
        ));
    }
}
