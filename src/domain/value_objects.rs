// Domain value objects representing core modelling concepts

use std::fmt;
use std::str::FromStr;

/// Handle to a decision variable, valid for the problem that created it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VariableId(pub(crate) usize);

impl VariableId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Handle to a constraint, valid for the problem that created it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConstraintId(pub(crate) usize);

impl ConstraintId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Type of decision variable in the optimization problem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableType {
    /// Continuous real number (x ∈ ℝ)
    Continuous,
    /// Integer number (x ∈ ℤ)
    Integer,
    /// Binary variable (x ∈ {0, 1})
    Binary,
}

/// Type of constraint comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintType {
    /// Less than or equal (≤)
    LessThanOrEqual,
    /// Equal (=)
    Equal,
    /// Greater than or equal (≥)
    GreaterThanOrEqual,
}

impl ConstraintType {
    /// Two-sided `[lower, upper]` range equivalent to `lhs <op> rhs`
    pub fn bounds(self, rhs: f64) -> (f64, f64) {
        match self {
            ConstraintType::LessThanOrEqual => (f64::NEG_INFINITY, rhs),
            ConstraintType::Equal => (rhs, rhs),
            ConstraintType::GreaterThanOrEqual => (rhs, f64::INFINITY),
        }
    }
}

/// Direction of optimization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptimizationType {
    /// Minimize the objective function
    #[default]
    Minimize,
    /// Maximize the objective function
    Maximize,
}

impl fmt::Display for OptimizationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptimizationType::Minimize => write!(f, "Minimize"),
            OptimizationType::Maximize => write!(f, "Maximize"),
        }
    }
}

/// Status of the optimization solution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionStatus {
    /// Found optimal solution
    Optimal,
    /// Problem has no feasible solution
    Infeasible,
    /// Objective can be improved infinitely
    Unbounded,
    /// Time limit reached
    TimeLimit,
    /// Iteration limit reached
    IterationLimit,
    /// Solver error occurred
    Error,
}

impl fmt::Display for SolutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolutionStatus::Optimal => write!(f, "Optimal"),
            SolutionStatus::Infeasible => write!(f, "Infeasible"),
            SolutionStatus::Unbounded => write!(f, "Unbounded"),
            SolutionStatus::TimeLimit => write!(f, "Time Limit Reached"),
            SolutionStatus::IterationLimit => write!(f, "Iteration Limit Reached"),
            SolutionStatus::Error => write!(f, "Error"),
        }
    }
}

/// Solver backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolverBackend {
    /// Pick a backend from the problem shape
    #[default]
    Auto,
    /// HiGHS (LP + MIP)
    Highs,
    /// COIN-OR CBC (LP + MIP)
    CoinCbc,
    /// Pure Rust microlp (LP + MIP)
    MicroLp,
    /// Clarabel interior point (LP + convex QP)
    Clarabel,
}

impl SolverBackend {
    /// Whether this backend was compiled into the binary
    pub fn is_compiled(self) -> bool {
        match self {
            SolverBackend::Highs => cfg!(feature = "highs"),
            SolverBackend::CoinCbc => cfg!(feature = "coin_cbc"),
            SolverBackend::Auto | SolverBackend::MicroLp | SolverBackend::Clarabel => true,
        }
    }
}

impl fmt::Display for SolverBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverBackend::Auto => write!(f, "Auto"),
            SolverBackend::Highs => write!(f, "HiGHS"),
            SolverBackend::CoinCbc => write!(f, "COIN-OR CBC"),
            SolverBackend::MicroLp => write!(f, "microlp"),
            SolverBackend::Clarabel => write!(f, "Clarabel"),
        }
    }
}

/// Backend name that matches no known solver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownBackend(pub String);

impl fmt::Display for UnknownBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown solver backend '{}'", self.0)
    }
}

impl std::error::Error for UnknownBackend {}

impl FromStr for SolverBackend {
    type Err = UnknownBackend;

    /// Accepts the usual backend identifiers, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AUTO" => Ok(SolverBackend::Auto),
            "HIGHS" | "HIGHS_MIXED_INTEGER_PROGRAMMING" => Ok(SolverBackend::Highs),
            "CBC" | "COIN_CBC" | "CBC_MIXED_INTEGER_PROGRAMMING" => Ok(SolverBackend::CoinCbc),
            "MICROLP" => Ok(SolverBackend::MicroLp),
            "CLARABEL" => Ok(SolverBackend::Clarabel),
            _ => Err(UnknownBackend(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_backend_aliases() {
        let parse = |s: &str| s.parse::<SolverBackend>().ok();
        assert_eq!(parse("cbc"), Some(SolverBackend::CoinCbc));
        assert_eq!(
            parse("CBC_MIXED_INTEGER_PROGRAMMING"),
            Some(SolverBackend::CoinCbc)
        );
        assert_eq!(parse(" Clarabel "), Some(SolverBackend::Clarabel));
        assert_eq!(parse("auto"), Some(SolverBackend::Auto));
    }

    #[test]
    fn rejects_unknown_backend() {
        let err = "GUROBI".parse::<SolverBackend>().unwrap_err();
        assert_eq!(err, UnknownBackend("GUROBI".to_string()));
    }

    #[test]
    fn constraint_type_bounds() {
        assert_eq!(
            ConstraintType::LessThanOrEqual.bounds(14.0),
            (f64::NEG_INFINITY, 14.0)
        );
        assert_eq!(ConstraintType::Equal.bounds(3.0), (3.0, 3.0));
        assert_eq!(
            ConstraintType::GreaterThanOrEqual.bounds(0.0),
            (0.0, f64::INFINITY)
        );
    }
}
