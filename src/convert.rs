use std::time::Duration;

use crate::domain::network::Network;
use crate::domain::solve::{SolveOptions, SolveOutcome};
use crate::error::NetworkError;
use crate::models::{ApiFlows, ApiMetrics, ApiSolution, ApiSolveOptions, NetworkRequest};

/// Build a validated network from a request, generating any
/// identifiers the client left out.
pub fn to_network(req: &NetworkRequest) -> Result<Network, NetworkError> {
    let generated = Network::new(
        req.inbound_cost.clone(),
        req.outbound_cost.clone(),
        req.demand.clone(),
    )?;

    if req.plants.is_none() && req.dcs.is_none() && req.stores.is_none() {
        return Ok(generated);
    }

    let pick = |ids: &Option<Vec<String>>, fallback: &[String]| {
        ids.clone().unwrap_or_else(|| fallback.to_vec())
    };
    Network::with_ids(
        pick(&req.plants, generated.plants()),
        pick(&req.dcs, generated.dcs()),
        pick(&req.stores, generated.stores()),
        req.inbound_cost.clone(),
        req.outbound_cost.clone(),
        req.demand.clone(),
    )
}

/// Request options layered over the server defaults.
pub fn to_solve_options(api: Option<&ApiSolveOptions>, defaults: SolveOptions) -> SolveOptions {
    let Some(api) = api else {
        return defaults;
    };
    SolveOptions {
        integrality: api.integrality,
        time_limit: api
            .time_limit_ms
            .map(Duration::from_millis)
            .or(defaults.time_limit),
    }
}

/// Flatten an outcome into the wire shape. Flows and metrics are only
/// present for optimal outcomes.
pub fn to_api_solution(network: &Network, outcome: &SolveOutcome, solver: &str) -> ApiSolution {
    ApiSolution {
        status: outcome.status,
        solver: solver.to_string(),
        objective: outcome.objective,
        plants: network.plants().to_vec(),
        dcs: network.dcs().to_vec(),
        stores: network.stores().to_vec(),
        flows: outcome.flows.as_ref().map(|flows| ApiFlows {
            inbound: flows.inbound().to_vec(),
            outbound: flows.outbound().to_vec(),
        }),
        metrics: outcome.metrics.as_ref().map(ApiMetrics::from),
        error: outcome.message.clone(),
    }
}
