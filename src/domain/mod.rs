pub mod builder;
pub mod extract;
pub mod network;
pub mod program;
pub mod solve;
pub mod solver;
pub mod solver_factory;
pub mod solvers;
pub mod validate;
