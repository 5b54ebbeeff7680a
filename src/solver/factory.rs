use crate::domain::{
    models::OptimizationProblem,
    solver_service::{Result, SolverError, SolverService},
    value_objects::SolverBackend,
};
use crate::solver::{ClarabelSolver, MicroLpSolver};
use std::sync::Arc;
use tracing::info;

#[cfg(feature = "coin_cbc")]
use crate::solver::CoinCbcSolver;
#[cfg(feature = "highs")]
use crate::solver::HighsSolver;

/// Factory for creating solver instances based on configuration
pub struct SolverFactory;

impl SolverFactory {
    /// Create a solver based on the problem configuration
    ///
    /// `Auto` resolves against the problem shape: quadratic objectives go to
    /// Clarabel, everything else to the default linear backend.
    pub fn create_solver(problem: &OptimizationProblem) -> Result<Arc<dyn SolverService>> {
        let backend = match problem.solver_config.backend {
            SolverBackend::Auto if problem.has_quadratic_objective() => SolverBackend::Clarabel,
            SolverBackend::Auto => Self::default_linear_backend(),
            explicit => explicit,
        };
        let solver = Self::create_from_backend(backend)?;
        info!(
            problem = %problem.name,
            requested = %problem.solver_config.backend,
            solver = solver.name(),
            "Selected solver"
        );
        Ok(solver)
    }

    /// Create a solver for a specific backend
    pub fn create_from_backend(backend: SolverBackend) -> Result<Arc<dyn SolverService>> {
        match backend {
            SolverBackend::Auto => Ok(Self::default_solver()),
            #[cfg(feature = "highs")]
            SolverBackend::Highs => Ok(Arc::new(HighsSolver::new())),
            #[cfg(feature = "coin_cbc")]
            SolverBackend::CoinCbc => Ok(Arc::new(CoinCbcSolver::new())),
            SolverBackend::MicroLp => Ok(Arc::new(MicroLpSolver::new())),
            SolverBackend::Clarabel => Ok(Arc::new(ClarabelSolver::new())),
            #[allow(unreachable_patterns)]
            missing => Err(SolverError::SolverNotAvailable(format!(
                "{} was not compiled into this build",
                missing
            ))),
        }
    }

    /// Create a solver from a backend identifier such as `"CBC"` or `"CLARABEL"`
    pub fn create_from_name(name: &str) -> Result<Arc<dyn SolverService>> {
        Self::create_from_backend(Self::parse_backend(name)?)
    }

    /// Resolve a backend identifier; whether it is compiled in is checked on creation
    pub fn parse_backend(name: &str) -> Result<SolverBackend> {
        name.parse()
            .map_err(|e| SolverError::SolverNotAvailable(format!("{}", e)))
    }

    /// Get the default solver for linear and mixed-integer problems
    pub fn default_solver() -> Arc<dyn SolverService> {
        match Self::default_linear_backend() {
            #[cfg(feature = "highs")]
            SolverBackend::Highs => Arc::new(HighsSolver::new()),
            _ => Arc::new(MicroLpSolver::new()),
        }
    }

    fn default_linear_backend() -> SolverBackend {
        if SolverBackend::Highs.is_compiled() {
            SolverBackend::Highs
        } else {
            SolverBackend::MicroLp
        }
    }
}
