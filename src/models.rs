use serde::{Deserialize, Serialize};

use crate::domain::builder::Integrality;
use crate::domain::extract::PlanMetrics;
use crate::domain::solver::SolveStatus;

// ---------- API (wire) types: owned & serde-friendly ----------

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ApiSolveOptions {
    #[serde(default)]
    pub integrality: Integrality,
    /// Wall-clock cap in milliseconds; overrides the server default
    #[serde(default)]
    pub time_limit_ms: Option<u64>,
}

/// A network as posted by clients. Identifiers are optional and default
/// to `P1..`, `D1..`, `S1..`.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NetworkRequest {
    #[serde(default)]
    pub plants: Option<Vec<String>>,
    #[serde(default)]
    pub dcs: Option<Vec<String>>,
    #[serde(default)]
    pub stores: Option<Vec<String>>,
    pub inbound_cost: Vec<Vec<f64>>,
    pub outbound_cost: Vec<Vec<f64>>,
    pub demand: Vec<i64>,
    #[serde(default)]
    pub options: Option<ApiSolveOptions>,
}

// ---------- API response types (decoupled from the domain) ----------

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ApiFlows {
    pub inbound: Vec<Vec<u64>>,
    pub outbound: Vec<Vec<u64>>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ApiMetrics {
    pub dc_throughput: Vec<u64>,
    pub stores_served: Vec<usize>,
    pub total_demand: u64,
    pub total_shipped: u64,
    pub fill_rate: f64,
    pub total_cost: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ApiSolution {
    pub status: SolveStatus,
    pub solver: String,
    pub objective: Option<f64>,
    pub plants: Vec<String>,
    pub dcs: Vec<String>,
    pub stores: Vec<String>,
    pub flows: Option<ApiFlows>,
    pub metrics: Option<ApiMetrics>,
    pub error: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ApiError {
    pub error: String,
}

impl From<&PlanMetrics> for ApiMetrics {
    fn from(m: &PlanMetrics) -> Self {
        ApiMetrics {
            dc_throughput: m.dc_throughput.clone(),
            stores_served: m.stores_served.clone(),
            total_demand: m.total_demand,
            total_shipped: m.total_shipped,
            fill_rate: m.fill_rate,
            total_cost: m.total_cost,
        }
    }
}
