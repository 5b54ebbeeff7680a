//! The sample problems shipped with the harness.
//!
//! Each function only builds the model; solving and printing are left to the
//! caller so the same problems can be checked in tests.

use crate::application::ProblemBuilder;
use crate::domain::{ConstraintType, OptimizationType, Result, VariableId};

/// Maximize `3x + 4y` over non-negative integers with
/// `x + 2y ≤ 14`, `3x − y ≥ 0` and `x − y ≤ 2`.
pub fn toy_integer_lp(backend: &str) -> Result<ProblemBuilder> {
    let mut builder = ProblemBuilder::create(backend)?
        .named("Toy integer LP")
        .described("maximize 3x + 4y over two integer variables");

    let x = builder.int_var(0.0, f64::INFINITY, "x")?;
    let y = builder.int_var(0.0, f64::INFINITY, "y")?;

    builder.add_typed_constraint(ConstraintType::LessThanOrEqual, 14.0, [(x, 1.0), (y, 2.0)])?;
    builder.add_typed_constraint(ConstraintType::GreaterThanOrEqual, 0.0, [(x, 3.0), (y, -1.0)])?;
    builder.add_typed_constraint(ConstraintType::LessThanOrEqual, 2.0, [(x, 1.0), (y, -1.0)])?;

    builder.set_objective([(x, 3.0), (y, 4.0)], None, OptimizationType::Maximize)?;
    Ok(builder)
}

/// Integer program over `x_1..x_n`:
///
/// - `constraint1`: `Σ i·x_i ≤ 10`
/// - `constraint2`: `2x_1 − x_2 − … − x_n ≥ 5`
/// - maximize `Σ (i + 1)·x_i`
pub fn integer_program(backend: &str, n: usize) -> Result<ProblemBuilder> {
    let mut builder = ProblemBuilder::create(backend)?
        .named("Integer program")
        .described(format!("{} non-negative integer variables", n));

    let x = (1..=n)
        .map(|i| builder.int_var(0.0, f64::INFINITY, format!("x_{}", i)))
        .collect::<Result<Vec<VariableId>>>()?;

    builder.add_named_constraint(
        "constraint1",
        f64::NEG_INFINITY,
        10.0,
        x.iter().enumerate().map(|(i, &var)| (var, (i + 1) as f64)),
    )?;
    builder.add_named_constraint(
        "constraint2",
        5.0,
        f64::INFINITY,
        x.iter()
            .enumerate()
            .map(|(i, &var)| (var, if i == 0 { 2.0 } else { -1.0 })),
    )?;

    builder.set_objective(
        x.iter().enumerate().map(|(i, &var)| (var, (i + 2) as f64)),
        None,
        OptimizationType::Maximize,
    )?;
    Ok(builder)
}

/// Continuous `rows × cols` matrix `x_i_j ≥ 0` with every row sum `≤ 5` and
/// every column sum `≥ 2`, minimizing `Σ (x_ij² + 3·x_ij)`.
pub fn matrix_qp(backend: &str, rows: usize, cols: usize) -> Result<ProblemBuilder> {
    let mut builder = ProblemBuilder::create(backend)?
        .named("Matrix QP")
        .described(format!("{}x{} continuous matrix, quadratic objective", rows, cols));

    let mut x = Vec::with_capacity(rows);
    for i in 0..rows {
        let row = (0..cols)
            .map(|j| builder.num_var(0.0, f64::INFINITY, format!("x_{}_{}", i, j)))
            .collect::<Result<Vec<VariableId>>>()?;
        x.push(row);
    }

    for (i, row) in x.iter().enumerate() {
        builder.add_named_constraint(
            format!("row_constraint_{}", i),
            f64::NEG_INFINITY,
            5.0,
            row.iter().map(|&var| (var, 1.0)),
        )?;
    }
    for j in 0..cols {
        builder.add_named_constraint(
            format!("column_constraint_{}", j),
            2.0,
            f64::INFINITY,
            x.iter().map(|row| (row[j], 1.0)),
        )?;
    }

    let cells: Vec<VariableId> = x.into_iter().flatten().collect();
    builder.set_objective(
        cells.iter().map(|&var| (var, 3.0)),
        Some(cells.iter().map(|&var| (var, var, 1.0)).collect()),
        OptimizationType::Minimize,
    )?;
    Ok(builder)
}
