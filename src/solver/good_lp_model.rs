// Shared good_lp translation used by the CBC and microlp adapters

use crate::domain::{
    models::{OptimizationProblem, Solution as DomainSolution, SolverStatistics},
    solver_service::{Result, SolverError},
    value_objects::{OptimizationType, SolutionStatus as DomainSolutionStatus},
};
use good_lp::{
    variable, variable::UnsolvedProblem, Expression, ProblemVariables, ResolutionError,
    Solution as GoodLpSolutionTrait, SolverModel, Variable as GoodLpVariable,
};

/// Declare one good_lp variable per domain variable and attach the objective
pub(crate) fn declare(problem: &OptimizationProblem) -> (UnsolvedProblem, Vec<GoodLpVariable>) {
    let mut vars = ProblemVariables::new();
    let mut lp_variables = Vec::with_capacity(problem.num_variables());

    for var_def in &problem.variables {
        let definition = variable()
            .min(var_def.lower_bound)
            .max(var_def.upper_bound)
            .name(var_def.name.clone());
        let var = if var_def.is_integer() {
            vars.add(definition.integer())
        } else {
            vars.add(definition)
        };
        lp_variables.push(var);
    }

    let mut objective: Expression = problem.objective.offset.into();
    for (id, &coeff) in &problem.objective.linear {
        if coeff != 0.0 {
            objective += coeff * lp_variables[id.index()];
        }
    }

    let unsolved = match problem.objective.optimization_type {
        OptimizationType::Maximize => vars.maximise(objective),
        OptimizationType::Minimize => vars.minimise(objective),
    };
    (unsolved, lp_variables)
}

/// Add every constraint row to the model
///
/// Two-sided ranges become a pair of one-sided constraints; equal bounds
/// become an equality.
pub(crate) fn with_constraints<M: SolverModel>(
    mut model: M,
    problem: &OptimizationProblem,
    lp_variables: &[GoodLpVariable],
) -> M {
    for constraint in &problem.constraints {
        let mut lhs: Expression = 0.into();
        for (id, &coeff) in &constraint.coefficients {
            if coeff != 0.0 {
                lhs += coeff * lp_variables[id.index()];
            }
        }

        let (lower, upper) = (constraint.lower_bound, constraint.upper_bound);
        if lower == upper {
            model = model.with(lhs.eq(lower));
            continue;
        }
        if lower.is_finite() {
            model = model.with(lhs.clone().geq(lower));
        }
        if upper.is_finite() {
            model = model.with(lhs.leq(upper));
        }
    }
    model
}

/// Translate a good_lp resolution into a domain solution
pub(crate) fn interpret<S: GoodLpSolutionTrait>(
    result: std::result::Result<S, ResolutionError>,
    problem: &OptimizationProblem,
    lp_variables: &[GoodLpVariable],
    statistics: SolverStatistics,
) -> Result<DomainSolution> {
    match result {
        Ok(sol) => {
            let variable_values: Vec<f64> = lp_variables.iter().map(|&var| sol.value(var)).collect();
            let objective_value = problem.objective.evaluate(&variable_values);

            let mut solution =
                DomainSolution::optimal(objective_value, variable_values).with_statistics(statistics);
            solution.message = format!("Optimal solution found for '{}'", problem.name);
            Ok(solution)
        }
        Err(ResolutionError::Infeasible) => Ok(DomainSolution::new(
            DomainSolutionStatus::Infeasible,
            "Problem is infeasible: no solution satisfies all constraints",
        )
        .with_statistics(statistics)),
        Err(ResolutionError::Unbounded) => Ok(DomainSolution::new(
            DomainSolutionStatus::Unbounded,
            "Problem is unbounded: objective can be improved infinitely",
        )
        .with_statistics(statistics)),
        Err(e) => Err(SolverError::ExecutionFailed(format!("{:?}", e))),
    }
}
