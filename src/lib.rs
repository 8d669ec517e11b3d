pub mod config;
pub mod convert;
pub mod domain;
pub mod error;
pub mod loading;
pub mod models;
pub mod report;
pub mod routes;
pub mod sample;
pub mod solve;

pub use domain::network::Network;
pub use domain::solve::{Planner, SolveOptions, SolveOutcome};
pub use domain::solver::{SolveStatus, Solver};
pub use error::{PlanError, Result};
