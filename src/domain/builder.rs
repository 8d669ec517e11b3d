use log::debug;
use serde::{Deserialize, Serialize};

use crate::domain::network::Network;
use crate::domain::program::{Comparison, LinearProgram, ProgramVariable, SolverDirection};
use crate::error::BuildError;

/// Whether flow variables are restricted to whole units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Integrality {
    #[default]
    Integer,
    Continuous,
}

/// The transshipment program for one network, plus the column index of
/// every flow variable so solved values can be mapped back.
#[derive(Debug, Clone)]
pub struct TransshipmentModel {
    pub program: LinearProgram,
    /// `inbound[p][d]` is the column of `I[p][d]`
    pub inbound: Vec<Vec<usize>>,
    /// `outbound[d][s]` is the column of `O[d][s]`
    pub outbound: Vec<Vec<usize>>,
    /// One `>=` row per store
    pub demand_rows: Vec<usize>,
    /// One `=` row per DC
    pub conservation_rows: Vec<usize>,
}

impl TransshipmentModel {
    pub fn variable_id(&self, col: usize) -> &str {
        &self.program.variables[col].id
    }
}

pub fn inbound_variable_id(p: usize, d: usize) -> String {
    format!("inbound_{}_{}", p, d)
}

pub fn outbound_variable_id(d: usize, s: usize) -> String {
    format!("outbound_{}_{}", d, s)
}

/// Build the two-stage transshipment program for `network`.
///
/// Variables `I[p][d] >= 0` and `O[d][s] >= 0`, minimising
/// `sum(inbound_cost * I) + sum(outbound_cost * O)` subject to
///
/// * `sum_d O[d][s] >= demand[s]` for every store,
/// * `sum_p I[p][d] = sum_s O[d][s]` for every DC.
///
/// Flows have no upper bound.
pub fn build_model(network: &Network, integrality: Integrality) -> TransshipmentModel {
    let integer = integrality == Integrality::Integer;
    let mut program = LinearProgram::new(SolverDirection::Minimize);

    let inbound: Vec<Vec<usize>> = (0..network.plant_count())
        .map(|p| {
            (0..network.dc_count())
                .map(|d| {
                    program.add_variable(ProgramVariable {
                        id: inbound_variable_id(p, d),
                        lower: 0.0,
                        upper: None,
                        integer,
                        objective: network.inbound_cost(p, d),
                    })
                })
                .collect()
        })
        .collect();

    let outbound: Vec<Vec<usize>> = (0..network.dc_count())
        .map(|d| {
            (0..network.store_count())
                .map(|s| {
                    program.add_variable(ProgramVariable {
                        id: outbound_variable_id(d, s),
                        lower: 0.0,
                        upper: None,
                        integer,
                        objective: network.outbound_cost(d, s),
                    })
                })
                .collect()
        })
        .collect();

    let demand_rows: Vec<usize> = network
        .demand()
        .iter()
        .enumerate()
        .map(|(s, &units)| {
            let terms = outbound.iter().map(|row| (row[s], 1.0));
            program.add_constraint(terms, Comparison::GreaterEqual, units as f64)
        })
        .collect();

    let conservation_rows: Vec<usize> = (0..network.dc_count())
        .map(|d| {
            let into_dc = inbound.iter().map(|row| (row[d], 1.0));
            let out_of_dc = outbound[d].iter().map(|&col| (col, -1.0));
            program.add_constraint(into_dc.chain(out_of_dc), Comparison::Equal, 0.0)
        })
        .collect();

    debug!(
        "built transshipment model: {} plants, {} dcs, {} stores -> {} variables, {} constraints",
        network.plant_count(),
        network.dc_count(),
        network.store_count(),
        program.num_variables(),
        program.num_constraints(),
    );

    TransshipmentModel {
        program,
        inbound,
        outbound,
        demand_rows,
        conservation_rows,
    }
}

/// Validate raw tables and build the model in one step.
pub fn build_model_from_tables(
    inbound_cost: Vec<Vec<f64>>,
    outbound_cost: Vec<Vec<f64>>,
    demand: Vec<i64>,
    integrality: Integrality,
) -> Result<TransshipmentModel, BuildError> {
    let network = Network::new(inbound_cost, outbound_cost, demand)?;
    Ok(build_model(&network, integrality))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NetworkError;

    fn two_by_two() -> Network {
        Network::new(
            vec![vec![3.0, 5.0], vec![2.0, 6.0]],
            vec![vec![1.0], vec![9.0]],
            vec![100],
        )
        .unwrap()
    }

    #[test]
    fn test_build_model_should_create_one_variable_per_route() {
        let model = build_model(&two_by_two(), Integrality::Integer);
        // 2x2 inbound + 2x1 outbound
        assert_eq!(model.program.num_variables(), 6);
        // 1 store + 2 DCs
        assert_eq!(model.program.num_constraints(), 3);
        assert!(model.program.has_integer_variables());
        assert_eq!(model.variable_id(model.inbound[1][0]), "inbound_1_0");
        assert_eq!(model.variable_id(model.outbound[1][0]), "outbound_1_0");
    }

    #[test]
    fn test_build_model_should_use_costs_as_objective() {
        let model = build_model(&two_by_two(), Integrality::Integer);
        let vars = &model.program.variables;
        assert_eq!(vars[model.inbound[0][1]].objective, 5.0);
        assert_eq!(vars[model.outbound[1][0]].objective, 9.0);
        assert!(vars.iter().all(|v| v.lower == 0.0 && v.upper.is_none()));
    }

    #[test]
    fn test_build_model_should_add_demand_and_conservation_rows() {
        let model = build_model(&two_by_two(), Integrality::Integer);
        let program = &model.program;
        let rows = program.a.row_entries();

        let demand_row = model.demand_rows[0];
        assert_eq!(program.comparisons[demand_row], Comparison::GreaterEqual);
        assert_eq!(program.b[demand_row], 100.0);
        assert_eq!(
            rows[demand_row],
            vec![(model.outbound[0][0], 1.0), (model.outbound[1][0], 1.0)]
        );

        let dc_row = model.conservation_rows[1];
        assert_eq!(program.comparisons[dc_row], Comparison::Equal);
        assert_eq!(program.b[dc_row], 0.0);
        assert_eq!(
            rows[dc_row],
            vec![
                (model.inbound[0][1], 1.0),
                (model.inbound[1][1], 1.0),
                (model.outbound[1][0], -1.0),
            ]
        );
    }

    #[test]
    fn test_build_model_given_continuous_should_relax_integrality() {
        let model = build_model(&two_by_two(), Integrality::Continuous);
        assert!(!model.program.has_integer_variables());
    }

    #[test]
    fn test_build_model_from_tables_given_mismatch_should_return_build_error() {
        let result = build_model_from_tables(
            vec![vec![1.0, 2.0]],
            vec![vec![1.0]],
            vec![1],
            Integrality::Integer,
        );
        assert!(matches!(
            result,
            Err(BuildError::InvalidNetwork(NetworkError::DimensionMismatch { .. }))
        ));
    }
}
