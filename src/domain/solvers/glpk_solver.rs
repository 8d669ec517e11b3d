use std::collections::HashMap;

use glpk_rust::{
    solve_ilps as glpk_solve_ilps, Bound, IntegerSparseMatrix as GlpkMatrix, Solution,
    SparseLEIntegerPolyhedron as GlpkPoly, Status as GlpkStatus, Variable as GlpkVar,
};
use log::debug;

use crate::domain::program::{Comparison, LinearProgram, SolverDirection};
use crate::domain::solver::{LpSolution, SolveStatus, Solver};
use crate::error::SolverError;

const NO_TERMINAL_OUTPUT: bool = false;

/// GLPK integer solver implementation
pub struct GlpkSolver;

impl GlpkSolver {
    pub fn new() -> Self {
        GlpkSolver
    }

    fn backend_error(details: String) -> SolverError {
        SolverError::Backend {
            solver: "GLPK".to_string(),
            details,
        }
    }

    fn convert_status(status: GlpkStatus) -> SolveStatus {
        match status {
            GlpkStatus::Optimal => SolveStatus::Optimal,
            GlpkStatus::Infeasible | GlpkStatus::NoFeasible | GlpkStatus::EmptySpace => {
                SolveStatus::Infeasible
            }
            GlpkStatus::Unbounded => SolveStatus::Unbounded,
            _ => SolveStatus::NotSolved,
        }
    }
}

impl Default for GlpkSolver {
    fn default() -> Self {
        Self::new()
    }
}

fn to_i32(value: f64, what: &str) -> Result<i32, SolverError> {
    if value.fract() != 0.0 || value < i32::MIN as f64 || value > i32::MAX as f64 {
        return Err(GlpkSolver::backend_error(format!(
            "{} {} is not a 32-bit integer",
            what, value
        )));
    }
    Ok(value as i32)
}

/// GLPK takes `A x <= b` with integer coefficients only. `>=` rows are
/// negated and `=` rows become a `<=` pair.
fn to_le_rows(program: &LinearProgram) -> Result<(GlpkMatrix, Vec<Bound>), SolverError> {
    let mut matrix = GlpkMatrix {
        rows: Vec::new(),
        cols: Vec::new(),
        vals: Vec::new(),
    };
    let mut b: Vec<Bound> = Vec::new();

    let mut push_row = |entries: &[(usize, f64)], sign: f64, rhs: f64| -> Result<(), SolverError> {
        let row = b.len() as i32;
        for &(col, val) in entries {
            matrix.rows.push(row);
            matrix.cols.push(col as i32);
            matrix.vals.push(to_i32(sign * val, "coefficient")?);
        }
        b.push((0, to_i32(sign * rhs, "right-hand side")?));
        Ok(())
    };

    for (row, entries) in program.a.row_entries().iter().enumerate() {
        let rhs = program.b.get(row).copied().unwrap_or(0.0);
        match program.comparisons[row] {
            Comparison::LessEqual => push_row(entries, 1.0, rhs)?,
            Comparison::GreaterEqual => push_row(entries, -1.0, rhs)?,
            Comparison::Equal => {
                push_row(entries, 1.0, rhs)?;
                push_row(entries, -1.0, rhs)?;
            }
        }
    }

    Ok((matrix, b))
}

/// Upper bound for variables the program leaves unbounded. GLPK wants
/// finite integer bounds; the summed magnitudes of all right-hand sides
/// cover every flow of an optimal transshipment.
fn implicit_upper_bound(program: &LinearProgram) -> i32 {
    let total: f64 = program.b.iter().map(|v| v.abs()).sum();
    total.min(i32::MAX as f64) as i32
}

impl Solver for GlpkSolver {
    fn solve(&self, program: &LinearProgram) -> Result<LpSolution, SolverError> {
        let (a, b) = to_le_rows(program)?;
        let upper = implicit_upper_bound(program);

        let variables: Vec<GlpkVar> = program
            .variables
            .iter()
            .map(|v| {
                let lower = to_i32(v.lower, "lower bound")?;
                let upper = match v.upper {
                    Some(bound) => to_i32(bound, "upper bound")?,
                    None => upper,
                };
                Ok(GlpkVar {
                    id: v.id.as_str(),
                    bound: (lower, upper),
                })
            })
            .collect::<Result<_, SolverError>>()?;

        let objective: HashMap<&str, f64> = program
            .variables
            .iter()
            .map(|v| (v.id.as_str(), v.objective))
            .collect();

        let mut polyhedron = GlpkPoly {
            a,
            b,
            variables,
            double_bound: false,
        };

        debug!(
            "glpk: {} variables, {} rows after LE conversion",
            program.num_variables(),
            polyhedron.b.len()
        );

        let maximize = program.direction == SolverDirection::Maximize;
        let lib_solutions: Vec<Solution> = glpk_solve_ilps(
            &mut polyhedron,
            vec![objective],
            maximize,
            NO_TERMINAL_OUTPUT,
        );

        let Some(solution) = lib_solutions.into_iter().next() else {
            return Err(Self::backend_error("no solution returned".to_string()));
        };

        let status = Self::convert_status(solution.status);
        if status != SolveStatus::Optimal {
            return Ok(LpSolution::without_values(status, solution.error));
        }

        let values: HashMap<String, f64> = solution
            .solution
            .into_iter()
            .map(|(k, v)| (k.to_string(), v as f64))
            .collect();

        // GLPK rounds its objective; recompute it from the values.
        let column_values: Vec<f64> = program
            .variables
            .iter()
            .map(|v| values.get(&v.id).copied().unwrap_or(0.0))
            .collect();

        Ok(LpSolution {
            status,
            objective: Some(program.objective_value(&column_values)),
            values,
            error: solution.error,
        })
    }

    fn name(&self) -> &str {
        "GLPK"
    }
}
