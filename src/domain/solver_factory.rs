use std::sync::Arc;

use crate::domain::solver::Solver;
use crate::domain::solvers::MiniLpSolver;

#[cfg(feature = "glpk-solver")]
use crate::domain::solvers::GlpkSolver;

/// Available solver backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverType {
    MiniLp,
    #[cfg(feature = "glpk-solver")]
    Glpk,
}

impl SolverType {
    /// Parse solver type from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "minilp" => Some(SolverType::MiniLp),
            #[cfg(feature = "glpk-solver")]
            "glpk" => Some(SolverType::Glpk),
            _ => None,
        }
    }
}

impl Default for SolverType {
    fn default() -> Self {
        SolverType::MiniLp
    }
}

/// Create a solver instance based on the specified type
pub fn create_solver(solver_type: SolverType) -> Arc<dyn Solver> {
    match solver_type {
        SolverType::MiniLp => Arc::new(MiniLpSolver::new()),
        #[cfg(feature = "glpk-solver")]
        SolverType::Glpk => Arc::new(GlpkSolver::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solver_type_from_str() {
        assert_eq!(SolverType::from_str("minilp"), Some(SolverType::MiniLp));
        assert_eq!(SolverType::from_str("MiniLP"), Some(SolverType::MiniLp));
        #[cfg(feature = "glpk-solver")]
        assert_eq!(SolverType::from_str("glpk"), Some(SolverType::Glpk));
        #[cfg(feature = "glpk-solver")]
        assert_eq!(SolverType::from_str("GLPK"), Some(SolverType::Glpk));
        assert_eq!(SolverType::from_str("unknown"), None);
    }

    #[test]
    fn test_create_minilp_solver() {
        let solver = create_solver(SolverType::MiniLp);
        assert_eq!(solver.name(), "minilp");
    }

    #[cfg(feature = "glpk-solver")]
    #[test]
    fn test_create_glpk_solver() {
        let solver = create_solver(SolverType::Glpk);
        assert_eq!(solver.name(), "GLPK");
    }
}
