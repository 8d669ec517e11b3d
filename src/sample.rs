//! Synthetic demo network, used when no data files are available.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::network::Network;
use crate::error::NetworkError;

pub const DEFAULT_SEED: u64 = 42;

const SAMPLE_STORES: usize = 10;

/// Two plants, two DCs and ten stores with fixed inbound costs, random
/// outbound costs in `[1, 10)` and random demand in `[50, 300)`.
///
/// The same seed always yields the same network.
pub fn sample_network(seed: u64) -> Result<Network, NetworkError> {
    let mut rng = StdRng::seed_from_u64(seed);

    let inbound_cost = vec![vec![3.0, 5.0], vec![2.3, 6.6]];

    let outbound_cost: Vec<Vec<f64>> = (0..2)
        .map(|_| {
            (0..SAMPLE_STORES)
                .map(|_| rng.random_range(1.0..10.0))
                .collect()
        })
        .collect();

    let demand: Vec<i64> = (0..SAMPLE_STORES)
        .map(|_| rng.random_range(50..300))
        .collect();

    Network::with_ids(
        vec!["P1".to_string(), "P2".to_string()],
        vec!["D1".to_string(), "D2".to_string()],
        (1..=SAMPLE_STORES).map(|i| format!("S{}", i)).collect(),
        inbound_cost,
        outbound_cost,
        demand,
    )
}
