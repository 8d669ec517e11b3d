use serde::Serialize;

use crate::domain::validate::{validate_costs, validate_demand, validate_dimensions, validate_ids};
use crate::error::NetworkError;

/// A two-echelon distribution network: plants ship to distribution
/// centers (DCs), DCs ship to stores.
///
/// Constructed once from input tables and read-only afterwards. All
/// shape and value invariants are checked on construction, so holding a
/// `Network` means the tables are consistent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Network {
    plants: Vec<String>,
    dcs: Vec<String>,
    stores: Vec<String>,
    inbound_cost: Vec<Vec<f64>>,
    outbound_cost: Vec<Vec<f64>>,
    demand: Vec<u64>,
}

impl Network {
    /// Build a network with generated identifiers `P1..`, `D1..`, `S1..`.
    ///
    /// `inbound_cost` is plants x DCs, `outbound_cost` is DCs x stores and
    /// `demand` has one entry per store.
    pub fn new(
        inbound_cost: Vec<Vec<f64>>,
        outbound_cost: Vec<Vec<f64>>,
        demand: Vec<i64>,
    ) -> Result<Self, NetworkError> {
        let (plants, dcs, stores) = validate_dimensions(&inbound_cost, &outbound_cost, &demand)?;
        Self::with_ids(
            numbered_ids("P", plants),
            numbered_ids("D", dcs),
            numbered_ids("S", stores),
            inbound_cost,
            outbound_cost,
            demand,
        )
    }

    /// Build a network with explicit plant, DC and store identifiers.
    pub fn with_ids(
        plants: Vec<String>,
        dcs: Vec<String>,
        stores: Vec<String>,
        inbound_cost: Vec<Vec<f64>>,
        outbound_cost: Vec<Vec<f64>>,
        demand: Vec<i64>,
    ) -> Result<Self, NetworkError> {
        let (n_plants, n_dcs, n_stores) =
            validate_dimensions(&inbound_cost, &outbound_cost, &demand)?;
        validate_ids(&plants, n_plants, "plant")?;
        validate_ids(&stores, n_stores, "store")?;
        validate_ids(&dcs, n_dcs, "dc")?;

        validate_costs(&inbound_cost, "inbound_cost")?;
        validate_costs(&outbound_cost, "outbound_cost")?;
        validate_demand(&demand)?;

        let demand = demand.into_iter().map(|units| units as u64).collect();

        Ok(Network {
            plants,
            dcs,
            stores,
            inbound_cost,
            outbound_cost,
            demand,
        })
    }

    pub fn plants(&self) -> &[String] {
        &self.plants
    }

    pub fn dcs(&self) -> &[String] {
        &self.dcs
    }

    pub fn stores(&self) -> &[String] {
        &self.stores
    }

    pub fn plant_count(&self) -> usize {
        self.plants.len()
    }

    pub fn dc_count(&self) -> usize {
        self.dcs.len()
    }

    pub fn store_count(&self) -> usize {
        self.stores.len()
    }

    /// Cost per unit shipped from plant `p` to DC `d`.
    pub fn inbound_cost(&self, p: usize, d: usize) -> f64 {
        self.inbound_cost[p][d]
    }

    /// Cost per unit shipped from DC `d` to store `s`.
    pub fn outbound_cost(&self, d: usize, s: usize) -> f64 {
        self.outbound_cost[d][s]
    }

    pub fn inbound_costs(&self) -> &[Vec<f64>] {
        &self.inbound_cost
    }

    pub fn outbound_costs(&self) -> &[Vec<f64>] {
        &self.outbound_cost
    }

    pub fn demand(&self) -> &[u64] {
        &self.demand
    }

    pub fn total_demand(&self) -> u64 {
        self.demand.iter().sum()
    }
}

fn numbered_ids(prefix: &str, count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("{}{}", prefix, i)).collect()
}
