use std::path::{Path, PathBuf};

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::convert::{to_api_solution, to_network, to_solve_options};
use crate::domain::network::Network;
use crate::domain::solve::{Planner, SolveOutcome};
use crate::error::{LoadError, PlanError};
use crate::loading::default_network;
use crate::models::{ApiError, ApiSolution, NetworkRequest};
use crate::report::PlanReport;

/// Shared state of the HTTP service
pub struct AppState {
    pub planner: Planner,
    pub data_dir: PathBuf,
    pub sample_seed: u64,
}

/// Errors surfaced by request handlers
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("solver pool is unavailable")]
    Blocking,
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Plan(e) if e.is_input_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ApiError {
            error: self.to_string(),
        })
    }
}

/// Validate and plan a posted network.
pub fn solve_request(planner: &Planner, req: &NetworkRequest) -> Result<ApiSolution, ServiceError> {
    let network = to_network(req).map_err(PlanError::from)?;
    let options = to_solve_options(req.options.as_ref(), planner.options());
    let planner = planner.with_options(options);

    let outcome = planner.plan(&network)?;
    Ok(to_api_solution(&network, &outcome, planner.solver_name()))
}

/// Plan the default network: CSV tables from `data_dir` if present,
/// otherwise the synthetic sample.
pub fn solve_default(
    planner: &Planner,
    data_dir: &Path,
    seed: u64,
) -> Result<(Network, SolveOutcome), ServiceError> {
    let (network, _source) = default_network(data_dir, seed)?;
    let outcome = planner.plan(&network)?;
    Ok((network, outcome))
}

/// Render a plan either as JSON or as the text report.
pub fn render(network: &Network, outcome: &SolveOutcome, solver: &str, as_text: bool) -> HttpResponse {
    if as_text {
        HttpResponse::Ok()
            .content_type("text/plain; charset=utf-8")
            .body(PlanReport::new(network, outcome).to_string())
    } else {
        HttpResponse::Ok().json(to_api_solution(network, outcome, solver))
    }
}
