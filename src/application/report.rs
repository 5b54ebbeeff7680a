// Human-readable rendering of solve outcomes

use crate::application::ProblemBuilder;
use crate::domain::{OptimizationType, Result, Solution, SolverError};
use std::fmt::Write;

/// Solve a freshly built problem and render whatever happened
///
/// A builder that could not be created (unavailable solver, bad input) is
/// rendered without attempting a solve.
pub fn solve_and_render(built: Result<ProblemBuilder>) -> String {
    match built {
        Ok(builder) => match builder.solve() {
            Ok(solution) => render_solution(&builder, &solution),
            Err(e) => render_error(&e),
        },
        Err(e) => render_error(&e),
    }
}

/// Optimal solutions list every variable and the objective; anything else
/// gets a single "no optimal solution" line naming the status.
pub fn render_solution(builder: &ProblemBuilder, solution: &Solution) -> String {
    let mut out = String::new();

    if !solution.is_optimal() {
        let _ = writeln!(
            out,
            "No optimal solution found (status: {}).",
            solution.status
        );
        let _ = write!(out, "  {}", solution.message);
        return out;
    }

    let _ = writeln!(out, "Optimal solution:");
    for id in builder.variable_ids() {
        if let (Some(var), Some(value)) = (builder.variable(id), solution.value(id)) {
            let _ = writeln!(out, "{} = {}", var.name, format_value(value));
        }
    }

    let label = match builder.problem().objective.optimization_type {
        OptimizationType::Maximize => "Maximized",
        OptimizationType::Minimize => "Minimized",
    };
    if let Some(value) = solution.optimal_value {
        let _ = writeln!(out, "{} objective value = {}", label, format_value(value));
    }
    let _ = write!(
        out,
        "Solved by {} in {:.2} ms (max constraint violation {:.2e})",
        solution.statistics.solver_backend,
        solution.statistics.solve_time_ms,
        solution.quality.max_constraint_violation
    );
    out
}

pub fn render_error(error: &SolverError) -> String {
    match error {
        SolverError::SolverNotAvailable(reason) => format!("Could not create solver: {}", reason),
        SolverError::InvalidProblem(reason) => format!("Problem rejected: {}", reason),
        SolverError::ExecutionFailed(reason) => format!("Solver failed: {}", reason),
    }
}

/// Trim solver noise such as `5.999999999` without hiding real fractions
fn format_value(value: f64) -> String {
    let rounded = value.round();
    if (value - rounded).abs() < 1e-9 {
        format!("{}", rounded + 0.0)
    } else {
        format!("{:.6}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Solution, SolutionStatus};

    #[test]
    fn formats_near_integers_plainly() {
        assert_eq!(format_value(5.9999999999), "6");
        assert_eq!(format_value(-0.0), "0");
        assert_eq!(format_value(2.0 / 3.0), "0.666667");
    }

    #[test]
    fn non_optimal_outcome_names_the_status() {
        let builder = ProblemBuilder::create("MICROLP").unwrap();
        let solution = Solution::new(SolutionStatus::Infeasible, "nothing fits");
        let text = render_solution(&builder, &solution);
        assert!(text.starts_with("No optimal solution found (status: Infeasible)."));
        assert!(!text.contains(" = "));
    }

    #[test]
    fn optimal_outcome_lists_variables() {
        let mut builder = ProblemBuilder::create("MICROLP").unwrap();
        let x = builder.num_var(0.0, 1.0, "x").unwrap();
        builder
            .set_objective([(x, 1.0)], None, OptimizationType::Maximize)
            .unwrap();
        let solution = Solution::optimal(1.0, vec![1.0]);

        let text = render_solution(&builder, &solution);
        assert!(text.contains("x = 1\n"));
        assert!(text.contains("Maximized objective value = 1\n"));
    }

    #[test]
    fn unavailable_solver_is_reported_without_solving() {
        let text = solve_and_render(ProblemBuilder::create("NO_SUCH_SOLVER"));
        assert!(text.starts_with("Could not create solver:"));
    }
}
