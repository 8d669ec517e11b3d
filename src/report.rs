//! Plain-text rendering of a plan.

use std::fmt;

use crate::domain::network::Network;
use crate::domain::solve::SolveOutcome;

const RULE_WIDTH: usize = 60;

/// Human-readable report of one solve
pub struct PlanReport<'a> {
    pub network: &'a Network,
    pub outcome: &'a SolveOutcome,
}

impl<'a> PlanReport<'a> {
    pub fn new(network: &'a Network, outcome: &'a SolveOutcome) -> Self {
        PlanReport { network, outcome }
    }
}

impl fmt::Display for PlanReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(RULE_WIDTH);
        writeln!(f, "{}", rule)?;
        writeln!(f, "SUPPLY PLANNING OPTIMIZATION RESULTS")?;
        writeln!(f, "{}", rule)?;
        writeln!(f)?;
        writeln!(f, "Status: {}", self.outcome.status)?;

        // Non-optimal outcomes carry no flows to show.
        let (Some(objective), Some(flows), Some(metrics)) = (
            self.outcome.objective,
            self.outcome.flows.as_ref(),
            self.outcome.metrics.as_ref(),
        ) else {
            if let Some(message) = &self.outcome.message {
                writeln!(f, "Message: {}", message)?;
            }
            return Ok(());
        };

        writeln!(f, "Total Transportation Cost: ${:.2}", objective)?;

        writeln!(f)?;
        writeln!(f, "--- INBOUND FLOWS (Plants to DCs) ---")?;
        let width = self
            .network
            .dcs()
            .iter()
            .map(String::len)
            .chain(flows.inbound().iter().flatten().map(|u| u.to_string().len()))
            .max()
            .unwrap_or(1)
            .max(4);
        let label_width = self.network.plants().iter().map(String::len).max().unwrap_or(0);
        write!(f, "{:label_width$}", "")?;
        for dc in self.network.dcs() {
            write!(f, " {:>width$}", dc)?;
        }
        writeln!(f)?;
        for (plant, row) in self.network.plants().iter().zip(flows.inbound()) {
            write!(f, "{:label_width$}", plant)?;
            for units in row {
                write!(f, " {:>width$}", units)?;
            }
            writeln!(f)?;
        }

        writeln!(f)?;
        writeln!(f, "--- DC THROUGHPUT ---")?;
        for (dc, units) in self.network.dcs().iter().zip(&metrics.dc_throughput) {
            writeln!(f, "{}: {} units", dc, units)?;
        }

        writeln!(f)?;
        writeln!(f, "--- OUTBOUND FLOWS (DCs to Stores) ---")?;
        for ((dc, row), served) in self
            .network
            .dcs()
            .iter()
            .zip(flows.outbound())
            .zip(&metrics.stores_served)
        {
            let shipped: u64 = row.iter().sum();
            writeln!(f, "{}: {} units to {} stores", dc, shipped, served)?;
        }

        writeln!(f)?;
        writeln!(f, "--- DEMAND FULFILLMENT ---")?;
        writeln!(f, "Total Demand: {} units", metrics.total_demand)?;
        writeln!(f, "Total Shipped: {} units", metrics.total_shipped)?;
        writeln!(f, "Fill Rate: {:.1}%", metrics.fill_rate * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::solve::{Planner, SolveOptions};
    use crate::domain::solver::SolveStatus;
    use crate::domain::solvers::MiniLpSolver;

    #[test]
    fn test_report_given_optimal_outcome_should_list_sections() {
        let network = Network::new(
            vec![vec![3.0, 5.0], vec![2.0, 6.0]],
            vec![vec![1.0], vec![9.0]],
            vec![100],
        )
        .unwrap();
        let planner = Planner::new(Arc::new(MiniLpSolver::new()), SolveOptions::default());
        let outcome = planner.plan(&network).unwrap();

        let text = PlanReport::new(&network, &outcome).to_string();

        assert!(text.contains("Status: Optimal"));
        assert!(text.contains("Total Transportation Cost: $300.00"));
        assert!(text.contains("D1: 100 units\n"));
        assert!(text.contains("D1: 100 units to 1 stores"));
        assert!(text.contains("D2: 0 units to 0 stores"));
        assert!(text.contains("Fill Rate: 100.0%"));
    }

    #[test]
    fn test_report_given_infeasible_outcome_should_omit_flows() {
        let network = Network::new(vec![], vec![], vec![]).unwrap();
        let outcome = SolveOutcome {
            status: SolveStatus::Infeasible,
            objective: None,
            flows: None,
            metrics: None,
            message: Some("no route".to_string()),
        };

        let text = PlanReport::new(&network, &outcome).to_string();

        assert!(text.contains("Status: Infeasible"));
        assert!(text.contains("Message: no route"));
        assert!(!text.contains("INBOUND FLOWS"));
        assert!(!text.contains("Fill Rate"));
    }
}
