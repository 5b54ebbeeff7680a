// COIN-OR CBC adapter, built on good_lp

use crate::domain::{
    models::{OptimizationProblem, Solution as DomainSolution, SolverStatistics},
    solver_service::{Result, SolverService},
};
use crate::solver::good_lp_model;
use good_lp::{solvers::coin_cbc, SolverModel};
use std::time::Instant;
use tracing::debug;

pub struct CoinCbcSolver;

impl CoinCbcSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CoinCbcSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverService for CoinCbcSolver {
    fn solve(&self, problem: &OptimizationProblem) -> Result<DomainSolution> {
        self.validate(problem)?;

        let start_time = Instant::now();
        let config = &problem.solver_config;

        let (unsolved, lp_variables) = good_lp_model::declare(problem);
        let mut lp_model = unsolved.using(coin_cbc::coin_cbc);

        if !config.verbose {
            lp_model.set_parameter("logLevel", "0");
        }
        if let Some(limit) = config.time_limit {
            lp_model.set_parameter("seconds", &limit.to_string());
        }
        if let Some(gap) = config.gap_tolerance {
            lp_model.set_parameter("ratioGap", &gap.to_string());
        }

        let lp_model = good_lp_model::with_constraints(lp_model, problem, &lp_variables);

        debug!(
            columns = lp_variables.len(),
            rows = problem.constraints.len(),
            "Solving with COIN-OR CBC"
        );
        let result = lp_model.solve();
        let statistics = SolverStatistics::for_problem(problem, self.name(), start_time.elapsed());

        good_lp_model::interpret(result, problem, &lp_variables, statistics)
    }

    fn name(&self) -> &str {
        "COIN-OR CBC"
    }

    fn supports_mip(&self) -> bool {
        true
    }
}
