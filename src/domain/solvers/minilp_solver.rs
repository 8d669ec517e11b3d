use std::collections::HashMap;

use good_lp::{
    minilp, variable, Expression, ProblemVariables, ResolutionError, Solution, SolverModel,
    Variable,
};
use log::debug;

use crate::domain::program::{Comparison, LinearProgram, SolverDirection};
use crate::domain::solver::{LpSolution, SolveStatus, Solver};
use crate::error::SolverError;

/// Pure-Rust simplex backend (minilp through good_lp).
///
/// minilp has no branch-and-bound, so integer variables are solved as
/// their LP relaxation. Callers that need whole units must check the
/// returned values for integrality.
pub struct MiniLpSolver;

impl MiniLpSolver {
    pub fn new() -> Self {
        MiniLpSolver
    }

    fn convert_error(error: ResolutionError) -> LpSolution {
        match error {
            ResolutionError::Infeasible => LpSolution::without_values(SolveStatus::Infeasible, None),
            ResolutionError::Unbounded => LpSolution::without_values(SolveStatus::Unbounded, None),
            other => LpSolution::without_values(SolveStatus::NotSolved, Some(other.to_string())),
        }
    }
}

impl Default for MiniLpSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Solver for MiniLpSolver {
    fn solve(&self, program: &LinearProgram) -> Result<LpSolution, SolverError> {
        if program.has_integer_variables() {
            debug!("minilp: solving LP relaxation of {} integer variables", program.num_variables());
        }

        let mut vars = ProblemVariables::new();
        let columns: Vec<Variable> = program
            .variables
            .iter()
            .map(|v| {
                let mut definition = variable().name(v.id.clone()).min(v.lower);
                if let Some(upper) = v.upper {
                    definition = definition.max(upper);
                }
                vars.add(definition)
            })
            .collect();

        let mut objective = Expression::with_capacity(columns.len());
        for (v, &column) in program.variables.iter().zip(&columns) {
            objective.add_mul(v.objective, column);
        }

        let unsolved = match program.direction {
            SolverDirection::Minimize => vars.minimise(objective),
            SolverDirection::Maximize => vars.maximise(objective),
        };
        let mut model = unsolved.using(minilp);

        for (row, entries) in program.a.row_entries().into_iter().enumerate() {
            let rhs = program.b.get(row).copied().unwrap_or(0.0);
            // minilp rejects rows without coefficients; decide them here.
            if entries.is_empty() {
                if !empty_row_holds(program.comparisons[row], rhs) {
                    return Ok(LpSolution::without_values(SolveStatus::Infeasible, None));
                }
                continue;
            }

            let mut lhs = Expression::with_capacity(entries.len());
            for (col, val) in entries {
                lhs.add_mul(val, columns[col]);
            }
            let constraint = match program.comparisons[row] {
                Comparison::LessEqual => lhs.leq(rhs),
                Comparison::GreaterEqual => lhs.geq(rhs),
                Comparison::Equal => lhs.eq(rhs),
            };
            model.add_constraint(constraint);
        }

        if columns.is_empty() {
            return Ok(LpSolution {
                status: SolveStatus::Optimal,
                objective: Some(0.0),
                values: HashMap::new(),
                error: None,
            });
        }

        let solution = match model.solve() {
            Ok(solution) => solution,
            Err(error) => return Ok(Self::convert_error(error)),
        };

        let column_values: Vec<f64> = columns.iter().map(|&c| solution.value(c)).collect();
        let objective = program.objective_value(&column_values);

        // minilp reports an unbounded ray as an "optimal" infinite value
        if !objective.is_finite() || column_values.iter().any(|v| !v.is_finite()) {
            return Ok(LpSolution::without_values(SolveStatus::Unbounded, None));
        }

        let values: HashMap<String, f64> = program
            .variables
            .iter()
            .zip(column_values)
            .map(|(v, value)| (v.id.clone(), value))
            .collect();

        Ok(LpSolution {
            status: SolveStatus::Optimal,
            objective: Some(objective),
            values,
            error: None,
        })
    }

    fn name(&self) -> &str {
        "minilp"
    }
}

/// Whether `0 cmp rhs` is satisfied.
fn empty_row_holds(comparison: Comparison, rhs: f64) -> bool {
    match comparison {
        Comparison::LessEqual => 0.0 <= rhs,
        Comparison::GreaterEqual => 0.0 >= rhs,
        Comparison::Equal => rhs == 0.0,
    }
}
