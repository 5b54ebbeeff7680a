// Clarabel Solver Adapter
// Interior point solver for continuous LPs and convex QPs
//
// Clarabel solves   min ½xᵀPx + qᵀx   s.t.   Ax + s = b,  s ∈ K
// so every range constraint is split into rows of the zero cone (equalities)
// and the nonnegative cone (one row per finite side).

use crate::domain::{
    models::{OptimizationProblem, Solution as DomainSolution, SolverStatistics},
    solver_service::{Result, SolverError, SolverService},
    value_objects::{OptimizationType, SolutionStatus as DomainSolutionStatus},
};
use clarabel::algebra::CscMatrix;
use clarabel::solver::implementations::default::DefaultSettingsBuilder;
use clarabel::solver::SupportedConeT::{self, NonnegativeConeT, ZeroConeT};
use clarabel::solver::{DefaultSolver, IPSolver, SolverStatus};
use std::collections::BTreeSet;
use std::time::Instant;
use tracing::{debug, warn};

pub struct ClarabelSolver;

impl ClarabelSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ClarabelSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverService for ClarabelSolver {
    fn solve(&self, problem: &OptimizationProblem) -> Result<DomainSolution> {
        self.validate(problem)?;

        let start_time = Instant::now();
        let config = &problem.solver_config;
        let data = ConicData::from_problem(problem);

        let mut settings = DefaultSettingsBuilder::<f64>::default();
        settings.verbose(config.verbose);
        if let Some(limit) = config.time_limit {
            settings.time_limit(limit);
        }
        if config.gap_tolerance.is_some() {
            warn!("Clarabel ignores gap_tolerance");
        }
        let settings = settings
            .build()
            .map_err(|e| SolverError::ExecutionFailed(format!("Invalid Clarabel settings: {}", e)))?;

        debug!(
            columns = data.q.len(),
            rows = data.b.len(),
            hessian_nonzeros = data.p.nnz(),
            "Solving with Clarabel"
        );
        let mut solver = DefaultSolver::new(&data.p, &data.q, &data.a, &data.b, &data.cones, settings);
        solver.solve();
        let statistics = SolverStatistics::for_problem(problem, self.name(), start_time.elapsed());

        let status = solver.solution.status;
        let outcome = match status {
            SolverStatus::Solved | SolverStatus::AlmostSolved => {
                let variable_values = solver.solution.x.clone();
                let objective_value = problem.objective.evaluate(&variable_values);

                let mut solution = DomainSolution::optimal(objective_value, variable_values);
                solution.message = format!("Optimal solution found for '{}'", problem.name);
                solution
            }
            SolverStatus::PrimalInfeasible | SolverStatus::AlmostPrimalInfeasible => {
                DomainSolution::new(
                    DomainSolutionStatus::Infeasible,
                    "Problem is infeasible: no solution satisfies all constraints",
                )
            }
            SolverStatus::DualInfeasible | SolverStatus::AlmostDualInfeasible => {
                DomainSolution::new(
                    DomainSolutionStatus::Unbounded,
                    "Problem is unbounded: objective can be improved infinitely",
                )
            }
            SolverStatus::MaxTime => DomainSolution::new(
                DomainSolutionStatus::TimeLimit,
                "Time limit reached before optimality was proven",
            ),
            SolverStatus::MaxIterations => DomainSolution::new(
                DomainSolutionStatus::IterationLimit,
                "Iteration limit reached before optimality was proven",
            ),
            SolverStatus::NumericalError | SolverStatus::InsufficientProgress => {
                DomainSolution::new(
                    DomainSolutionStatus::Error,
                    format!("Clarabel stopped early: {:?}", status),
                )
            }
            other => {
                return Err(SolverError::ExecutionFailed(format!(
                    "Clarabel solver returned status: {:?}",
                    other
                )))
            }
        };

        Ok(outcome.with_statistics(statistics))
    }

    fn name(&self) -> &str {
        "Clarabel"
    }

    fn supports_mip(&self) -> bool {
        false
    }

    fn supports_quadratic(&self) -> bool {
        true
    }

    /// Clarabel needs a positive semidefinite P once the direction is folded in
    fn check_objective(&self, problem: &OptimizationProblem) -> Result<()> {
        if is_positive_semidefinite(signed_hessian(problem)) {
            Ok(())
        } else {
            Err(SolverError::SolverNotAvailable(format!(
                "{} cannot {} a non-convex quadratic objective",
                self.name(),
                problem.objective.optimization_type.to_string().to_lowercase()
            )))
        }
    }
}

/// Dense Hessian of the minimised objective, restricted to variables with quadratic terms
fn signed_hessian(problem: &OptimizationProblem) -> Vec<Vec<f64>> {
    let sign = match problem.objective.optimization_type {
        OptimizationType::Minimize => 1.0,
        OptimizationType::Maximize => -1.0,
    };
    let involved: Vec<usize> = problem
        .objective
        .quadratic
        .keys()
        .flat_map(|&(a, b)| [a.index(), b.index()])
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let slot = |index: usize| involved.binary_search(&index).unwrap_or_default();

    let mut hessian = vec![vec![0.0; involved.len()]; involved.len()];
    for (&(a, b), &coeff) in &problem.objective.quadratic {
        let (i, j) = (slot(a.index()), slot(b.index()));
        if i == j {
            hessian[i][i] += sign * 2.0 * coeff;
        } else {
            hessian[i][j] += sign * coeff;
            hessian[j][i] += sign * coeff;
        }
    }
    hessian
}

/// Symmetric elimination without pivoting; a zero pivot must have a zero column below it
fn is_positive_semidefinite(mut m: Vec<Vec<f64>>) -> bool {
    let n = m.len();
    let scale = m
        .iter()
        .flatten()
        .fold(0.0_f64, |acc, v| acc.max(v.abs()))
        .max(1.0);
    let tol = 1e-9 * scale;

    for k in 0..n {
        let pivot = m[k][k];
        if pivot < -tol {
            return false;
        }
        if pivot <= tol {
            if (k + 1..n).any(|i| m[i][k].abs() > tol) {
                return false;
            }
            continue;
        }
        for i in k + 1..n {
            let factor = m[i][k] / pivot;
            for j in k + 1..n {
                m[i][j] -= factor * m[k][j];
            }
        }
    }
    true
}

/// Problem data in Clarabel's standard conic form
struct ConicData {
    p: CscMatrix<f64>,
    q: Vec<f64>,
    a: CscMatrix<f64>,
    b: Vec<f64>,
    cones: Vec<SupportedConeT<f64>>,
}

impl ConicData {
    fn from_problem(problem: &OptimizationProblem) -> Self {
        let n = problem.num_variables();
        // Clarabel only minimises
        let sign = match problem.objective.optimization_type {
            OptimizationType::Minimize => 1.0,
            OptimizationType::Maximize => -1.0,
        };

        let mut q = vec![0.0; n];
        for (id, &coeff) in &problem.objective.linear {
            q[id.index()] = sign * coeff;
        }

        // c·xᵢ·xⱼ contributes Pᵢⱼ = Pⱼᵢ = c off the diagonal and Pᵢᵢ = 2c on it.
        // Only the upper triangle is passed.
        let mut p = CscBuilder::new(n);
        for (&(i, j), &coeff) in &problem.objective.quadratic {
            let value = if i == j { 2.0 * coeff } else { coeff };
            p.push(i.index(), j.index(), sign * value);
        }

        let mut equalities = CscBuilder::new(n);
        let mut eq_rhs = Vec::new();
        let mut inequalities = CscBuilder::new(n);
        let mut ineq_rhs = Vec::new();

        for constraint in &problem.constraints {
            let (lower, upper) = (constraint.lower_bound, constraint.upper_bound);
            let terms = constraint.coefficients.iter().map(|(id, &c)| (id.index(), c));

            if lower == upper {
                equalities.push_row(terms, 1.0);
                eq_rhs.push(lower);
                continue;
            }
            if upper.is_finite() {
                inequalities.push_row(terms.clone(), 1.0);
                ineq_rhs.push(upper);
            }
            if lower.is_finite() {
                inequalities.push_row(terms, -1.0);
                ineq_rhs.push(-lower);
            }
        }

        for (j, var) in problem.variables.iter().enumerate() {
            if var.lower_bound == var.upper_bound {
                equalities.push_row([(j, 1.0)], 1.0);
                eq_rhs.push(var.lower_bound);
                continue;
            }
            if var.upper_bound.is_finite() {
                inequalities.push_row([(j, 1.0)], 1.0);
                ineq_rhs.push(var.upper_bound);
            }
            if var.lower_bound.is_finite() {
                inequalities.push_row([(j, 1.0)], -1.0);
                ineq_rhs.push(-var.lower_bound);
            }
        }

        let mut cones = Vec::new();
        if !eq_rhs.is_empty() {
            cones.push(ZeroConeT(eq_rhs.len()));
        }
        if !ineq_rhs.is_empty() {
            cones.push(NonnegativeConeT(ineq_rhs.len()));
        }

        let mut a = equalities;
        a.append_rows(inequalities);
        let mut b = eq_rhs;
        b.extend(ineq_rhs);

        Self {
            p: p.build(n),
            q,
            a: a.build(b.len()),
            b,
            cones,
        }
    }
}

/// Column-bucketed sparse matrix assembly
struct CscBuilder {
    /// `(row, value)` entries of each column
    columns: Vec<Vec<(usize, f64)>>,
    rows: usize,
}

impl CscBuilder {
    fn new(n_cols: usize) -> Self {
        Self {
            columns: vec![Vec::new(); n_cols],
            rows: 0,
        }
    }

    fn push(&mut self, row: usize, col: usize, value: f64) {
        if value != 0.0 {
            self.columns[col].push((row, value));
        }
    }

    fn push_row(&mut self, terms: impl IntoIterator<Item = (usize, f64)>, scale: f64) {
        let row = self.rows;
        for (col, value) in terms {
            self.push(row, col, scale * value);
        }
        self.rows += 1;
    }

    /// Stack `other` below the rows already pushed
    fn append_rows(&mut self, other: CscBuilder) {
        let offset = self.rows;
        for (col, entries) in other.columns.into_iter().enumerate() {
            self.columns[col].extend(entries.into_iter().map(|(row, v)| (row + offset, v)));
        }
        self.rows += other.rows;
    }

    fn build(self, n_rows: usize) -> CscMatrix<f64> {
        let n_cols = self.columns.len();
        let mut colptr = Vec::with_capacity(n_cols + 1);
        let mut rowval = Vec::new();
        let mut nzval = Vec::new();
        colptr.push(0);

        for mut entries in self.columns {
            entries.sort_by_key(|&(row, _)| row);
            for (row, value) in entries {
                rowval.push(row);
                nzval.push(value);
            }
            colptr.push(rowval.len());
        }

        CscMatrix::new(n_rows, n_cols, colptr, rowval, nzval)
    }
}
