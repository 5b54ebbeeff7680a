// HiGHS Solver Adapter
// Implements the SolverService interface for HiGHS
// Translates the domain model to a HiGHS row-wise problem

use crate::domain::{
    models::{OptimizationProblem, Solution as DomainSolution, SolverStatistics},
    solver_service::{Result, SolverError, SolverService},
    value_objects::{OptimizationType, SolutionStatus as DomainSolutionStatus, VariableId},
};
use highs::{HighsModelStatus, RowProblem, Sense};
use std::time::Instant;
use tracing::debug;

pub struct HighsSolver;

impl HighsSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HighsSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverService for HighsSolver {
    fn solve(&self, problem: &OptimizationProblem) -> Result<DomainSolution> {
        self.validate(problem)?;

        let start_time = Instant::now();
        let config = &problem.solver_config;

        // Columns first, each carrying its objective coefficient
        let mut pb = RowProblem::default();
        let mut cols = Vec::with_capacity(problem.num_variables());

        for (i, var_def) in problem.variables.iter().enumerate() {
            let bounds = var_def.lower_bound..=var_def.upper_bound;
            let obj_coeff = problem
                .objective
                .linear
                .get(&VariableId(i))
                .copied()
                .unwrap_or(0.0);

            let col = if var_def.is_integer() {
                pb.add_integer_column(obj_coeff, bounds)
            } else {
                pb.add_column(obj_coeff, bounds)
            };
            cols.push(col);
        }

        for constraint in &problem.constraints {
            let terms: Vec<_> = constraint
                .coefficients
                .iter()
                .filter(|(_, &coeff)| coeff != 0.0)
                .map(|(id, &coeff)| (cols[id.index()], coeff))
                .collect();
            pb.add_row(constraint.lower_bound..=constraint.upper_bound, &terms);
        }

        let sense = if problem.objective.optimization_type == OptimizationType::Maximize {
            Sense::Maximise
        } else {
            Sense::Minimise
        };

        let mut model = pb.optimise(sense);
        model.set_option("output_flag", config.verbose);
        if let Some(limit) = config.time_limit {
            model.set_option("time_limit", limit);
        }
        if let Some(gap) = config.gap_tolerance {
            model.set_option("mip_rel_gap", gap);
        }

        debug!(
            columns = cols.len(),
            rows = problem.constraints.len(),
            "Solving with HiGHS"
        );
        let solved = model.solve();
        let statistics = SolverStatistics::for_problem(problem, self.name(), start_time.elapsed());

        match solved.status() {
            HighsModelStatus::Optimal => {
                let variable_values = solved.get_solution().columns().to_vec();
                let objective_value = problem.objective.evaluate(&variable_values);

                let mut solution = DomainSolution::optimal(objective_value, variable_values)
                    .with_statistics(statistics);
                solution.message = format!("Optimal solution found for '{}'", problem.name);
                Ok(solution)
            }
            HighsModelStatus::ModelEmpty => {
                let mut solution = DomainSolution::optimal(problem.objective.offset, Vec::new())
                    .with_statistics(statistics);
                solution.message = format!("'{}' has no columns", problem.name);
                Ok(solution)
            }
            HighsModelStatus::Infeasible => Ok(DomainSolution::new(
                DomainSolutionStatus::Infeasible,
                "Problem is infeasible: no solution satisfies all constraints",
            )
            .with_statistics(statistics)),
            HighsModelStatus::Unbounded | HighsModelStatus::UnboundedOrInfeasible => {
                Ok(DomainSolution::new(
                    DomainSolutionStatus::Unbounded,
                    "Problem is unbounded: objective can be improved infinitely",
                )
                .with_statistics(statistics))
            }
            HighsModelStatus::ReachedTimeLimit => Ok(DomainSolution::new(
                DomainSolutionStatus::TimeLimit,
                "Time limit reached before optimality was proven",
            )
            .with_statistics(statistics)),
            HighsModelStatus::ReachedIterationLimit => Ok(DomainSolution::new(
                DomainSolutionStatus::IterationLimit,
                "Iteration limit reached before optimality was proven",
            )
            .with_statistics(statistics)),
            status => Err(SolverError::ExecutionFailed(format!(
                "HiGHS solver returned status: {:?}",
                status
            ))),
        }
    }

    fn name(&self) -> &str {
        "HiGHS"
    }

    fn supports_mip(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Constraint, ObjectiveFunction, Variable};
    use approx::assert_abs_diff_eq;

    #[test]
    fn solves_bounded_lp() {
        // maximize x + y, x + 2y <= 4, x <= 2
        let (x, y) = (VariableId(0), VariableId(1));
        let mut objective = ObjectiveFunction::new(OptimizationType::Maximize);
        objective.set_coefficient(x, 1.0);
        objective.set_coefficient(y, 1.0);
        let problem = OptimizationProblem::new(objective)
            .with_variables(vec![
                Variable::continuous("x").with_bounds(0.0, 2.0),
                Variable::continuous("y"),
            ])
            .add_constraint(
                Constraint::new(f64::NEG_INFINITY, 4.0).with_coefficients([(x, 1.0), (y, 2.0)]),
            );

        let solution = HighsSolver::new().solve(&problem).unwrap();
        assert!(solution.is_optimal());
        assert_abs_diff_eq!(solution.optimal_value.unwrap(), 3.0, epsilon = 1e-6);
        assert_abs_diff_eq!(solution.value(x).unwrap(), 2.0, epsilon = 1e-6);
        assert_abs_diff_eq!(solution.value(y).unwrap(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn empty_model_is_optimal_at_the_offset() {
        let problem = OptimizationProblem::new(
            ObjectiveFunction::new(OptimizationType::Maximize).with_offset(7.0),
        );

        let solution = HighsSolver::new().solve(&problem).unwrap();
        assert!(solution.is_optimal());
        assert!(solution.variable_values.is_empty());
        assert_abs_diff_eq!(solution.optimal_value.unwrap(), 7.0, epsilon = 1e-9);
    }

    #[test]
    fn reports_infeasible_without_values() {
        let x = VariableId(0);
        let mut objective = ObjectiveFunction::new(OptimizationType::Minimize);
        objective.set_coefficient(x, 1.0);
        let problem = OptimizationProblem::new(objective)
            .with_variables(vec![Variable::integer("x").with_bounds(0.0, 1.0)])
            .add_constraint(Constraint::new(3.0, f64::INFINITY).with_coefficients([(x, 1.0)]));

        let solution = HighsSolver::new().solve(&problem).unwrap();
        assert!(!solution.is_optimal());
        assert!(solution.variable_values.is_empty());
        assert_eq!(solution.optimal_value, None);
    }
}
