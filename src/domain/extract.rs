use serde::Serialize;

use crate::domain::builder::TransshipmentModel;
use crate::domain::network::Network;
use crate::domain::solver::{LpSolution, SolveStatus};
use crate::error::ExtractionError;

/// Distance from the nearest integer a solved flow may have.
pub const INTEGRALITY_TOLERANCE: f64 = 1e-6;

/// Whole-unit flows of an optimal plan. Never modified after extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowAssignment {
    /// `inbound[p][d]`: units shipped plant -> DC
    inbound: Vec<Vec<u64>>,
    /// `outbound[d][s]`: units shipped DC -> store
    outbound: Vec<Vec<u64>>,
}

impl FlowAssignment {
    pub fn inbound(&self) -> &[Vec<u64>] {
        &self.inbound
    }

    pub fn outbound(&self) -> &[Vec<u64>] {
        &self.outbound
    }

    /// Units entering each DC (column sums of the inbound flows).
    pub fn dc_inbound(&self) -> Vec<u64> {
        let dcs = self.outbound.len();
        let mut totals = vec![0; dcs];
        for row in &self.inbound {
            for (d, &units) in row.iter().enumerate() {
                totals[d] += units;
            }
        }
        totals
    }

    /// Units leaving each DC (row sums of the outbound flows).
    pub fn dc_outbound(&self) -> Vec<u64> {
        self.outbound.iter().map(|row| row.iter().sum()).collect()
    }

    /// Units received by each store.
    pub fn store_received(&self) -> Vec<u64> {
        let stores = self.outbound.first().map_or(0, Vec::len);
        let mut totals = vec![0; stores];
        for row in &self.outbound {
            for (s, &units) in row.iter().enumerate() {
                totals[s] += units;
            }
        }
        totals
    }

    pub fn total_shipped(&self) -> u64 {
        self.outbound.iter().flatten().sum()
    }

    /// Transport cost of these flows under the network's unit costs.
    pub fn total_cost(&self, network: &Network) -> f64 {
        let inbound: f64 = self
            .inbound
            .iter()
            .enumerate()
            .flat_map(|(p, row)| {
                row.iter()
                    .enumerate()
                    .map(move |(d, &units)| network.inbound_cost(p, d) * units as f64)
            })
            .sum();
        let outbound: f64 = self
            .outbound
            .iter()
            .enumerate()
            .flat_map(|(d, row)| {
                row.iter()
                    .enumerate()
                    .map(move |(s, &units)| network.outbound_cost(d, s) * units as f64)
            })
            .sum();
        inbound + outbound
    }
}

/// Aggregates derived from a flow assignment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanMetrics {
    /// Units passing through each DC
    pub dc_throughput: Vec<u64>,
    /// Number of stores each DC ships a positive quantity to
    pub stores_served: Vec<usize>,
    pub total_demand: u64,
    pub total_shipped: u64,
    /// `total_shipped / total_demand`, or 1.0 when nothing is demanded
    pub fill_rate: f64,
    /// Cost recomputed from flows and unit costs
    pub total_cost: f64,
}

impl PlanMetrics {
    pub fn from_flows(flows: &FlowAssignment, network: &Network) -> Self {
        let total_demand = network.total_demand();
        let total_shipped = flows.total_shipped();
        let fill_rate = if total_demand == 0 {
            1.0
        } else {
            total_shipped as f64 / total_demand as f64
        };

        PlanMetrics {
            dc_throughput: flows.dc_inbound(),
            stores_served: flows
                .outbound
                .iter()
                .map(|row| row.iter().filter(|&&units| units > 0).count())
                .collect(),
            total_demand,
            total_shipped,
            fill_rate,
            total_cost: flows.total_cost(network),
        }
    }
}

/// Read one variable as whole units.
///
/// A variable missing from the solution reads as zero: backends may
/// leave out variables they never moved off their zero lower bound.
fn read_units(solution: &LpSolution, id: &str) -> Result<u64, ExtractionError> {
    let Some(&value) = solution.values.get(id) else {
        return Ok(0);
    };
    let rounded = value.round();
    if !value.is_finite() || (value - rounded).abs() > INTEGRALITY_TOLERANCE {
        return Err(ExtractionError::NonIntegralFlow {
            variable: id.to_string(),
            value,
        });
    }
    // -0.0000001 is solver noise around a zero bound
    Ok(rounded.max(0.0) as u64)
}

/// Read the solved flow variables of `model` into dense matrices.
///
/// Only an `Optimal` solution can be extracted. The resulting flows are
/// checked for conservation at every DC.
pub fn extract_flows(
    model: &TransshipmentModel,
    network: &Network,
    solution: &LpSolution,
) -> Result<FlowAssignment, ExtractionError> {
    if solution.status != SolveStatus::Optimal {
        return Err(ExtractionError::NotOptimal {
            status: solution.status.to_string(),
        });
    }

    let inbound = model
        .inbound
        .iter()
        .map(|row| {
            row.iter()
                .map(|&col| read_units(solution, model.variable_id(col)))
                .collect::<Result<Vec<u64>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;

    let outbound = model
        .outbound
        .iter()
        .map(|row| {
            row.iter()
                .map(|&col| read_units(solution, model.variable_id(col)))
                .collect::<Result<Vec<u64>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;

    let flows = FlowAssignment { inbound, outbound };

    for (d, (into_dc, out_of_dc)) in flows
        .dc_inbound()
        .into_iter()
        .zip(flows.dc_outbound())
        .enumerate()
    {
        if into_dc != out_of_dc {
            return Err(ExtractionError::ConservationViolated {
                dc: network.dcs()[d].clone(),
                inbound: into_dc,
                outbound: out_of_dc,
            });
        }
    }

    Ok(flows)
}
