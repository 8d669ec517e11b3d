pub mod minilp_solver;

#[cfg(feature = "glpk-solver")]
pub mod glpk_solver;

pub use minilp_solver::MiniLpSolver;

#[cfg(feature = "glpk-solver")]
pub use glpk_solver::GlpkSolver;
