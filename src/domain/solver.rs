use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::program::LinearProgram;
use crate::error::SolverError;

/// Terminal status of a solve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveStatus {
    Optimal,
    Infeasible,
    Unbounded,
    /// Stopped before a verdict, e.g. on a time limit
    NotSolved,
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SolveStatus::Optimal => "Optimal",
            SolveStatus::Infeasible => "Infeasible",
            SolveStatus::Unbounded => "Unbounded",
            SolveStatus::NotSolved => "NotSolved",
        };
        f.write_str(name)
    }
}

/// What a backend reports for one program
#[derive(Debug, Clone, PartialEq)]
pub struct LpSolution {
    pub status: SolveStatus,
    /// Present only when `status` is `Optimal`
    pub objective: Option<f64>,
    /// Values keyed by variable id. A backend may leave out variables
    /// it never assigned.
    pub values: HashMap<String, f64>,
    pub error: Option<String>,
}

impl LpSolution {
    /// A solution without values, for every status but `Optimal`.
    pub fn without_values(status: SolveStatus, error: Option<String>) -> Self {
        LpSolution {
            status,
            objective: None,
            values: HashMap::new(),
            error,
        }
    }
}

/// Common interface for LP/ILP solvers
pub trait Solver: Send + Sync {
    /// Solve a linear program
    ///
    /// # Arguments
    /// * `program` - Variables, objective and constraint rows
    ///
    /// # Returns
    /// The solve status and, when optimal, the variable values. Statuses
    /// such as `Infeasible` are returned in `Ok`; `Err` is reserved for
    /// backends that could not run at all.
    fn solve(&self, program: &LinearProgram) -> Result<LpSolution, SolverError>;

    /// Get the solver name for logging/debugging
    fn name(&self) -> &str;
}
