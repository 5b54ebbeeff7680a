// Domain layer: modelling types and the solver contract
pub mod domain;

// Application layer: problem builder, sample problems and reporting
pub mod application;

// Solver adapters: concrete implementations of SolverService
pub mod solver;

// Re-export commonly used types
pub use domain::{
    Constraint, ConstraintId, ConstraintType, ObjectiveFunction, OptimizationProblem,
    OptimizationType, Solution, SolutionStatus, SolverBackend, SolverConfig, SolverError,
    SolverService, Variable, VariableId, VariableType,
};

pub use application::ProblemBuilder;

#[cfg(feature = "coin_cbc")]
pub use solver::CoinCbcSolver;
#[cfg(feature = "highs")]
pub use solver::HighsSolver;
pub use solver::{ClarabelSolver, MicroLpSolver, SolverFactory};
