// microlp adapter, built on good_lp
// Pure Rust, so it is always compiled in

use crate::domain::{
    models::{OptimizationProblem, Solution as DomainSolution, SolverStatistics},
    solver_service::{Result, SolverService},
};
use crate::solver::good_lp_model;
use good_lp::{solvers::microlp, SolverModel};
use std::time::Instant;
use tracing::{debug, warn};

pub struct MicroLpSolver;

impl MicroLpSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MicroLpSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverService for MicroLpSolver {
    fn solve(&self, problem: &OptimizationProblem) -> Result<DomainSolution> {
        self.validate(problem)?;

        let config = &problem.solver_config;
        if config.time_limit.is_some() || config.gap_tolerance.is_some() {
            warn!("microlp ignores time_limit and gap_tolerance");
        }

        let start_time = Instant::now();
        let (unsolved, lp_variables) = good_lp_model::declare(problem);
        let lp_model = good_lp_model::with_constraints(
            unsolved.using(microlp::microlp),
            problem,
            &lp_variables,
        );

        debug!(
            columns = lp_variables.len(),
            rows = problem.constraints.len(),
            "Solving with microlp"
        );
        let result = lp_model.solve();
        let statistics = SolverStatistics::for_problem(problem, self.name(), start_time.elapsed());

        good_lp_model::interpret(result, problem, &lp_variables, statistics)
    }

    fn name(&self) -> &str {
        "microlp"
    }

    fn supports_mip(&self) -> bool {
        true
    }
}
