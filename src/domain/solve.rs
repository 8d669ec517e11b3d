use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::{info, warn};
use serde::Serialize;

use crate::domain::builder::{build_model, Integrality};
use crate::domain::extract::{extract_flows, FlowAssignment, PlanMetrics};
use crate::domain::network::Network;
use crate::domain::program::LinearProgram;
use crate::domain::solver::{LpSolution, SolveStatus, Solver};
use crate::error::{PlanError, SolverError};

/// Per-solve settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SolveOptions {
    pub integrality: Integrality,
    /// Wall-clock cap on the solver; `None` waits for the backend.
    pub time_limit: Option<Duration>,
}

/// Result of planning one network.
///
/// `objective`, `flows` and `metrics` are present only when `status` is
/// `Optimal`; other statuses carry the backend message, if any.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolveOutcome {
    pub status: SolveStatus,
    pub objective: Option<f64>,
    pub flows: Option<FlowAssignment>,
    pub metrics: Option<PlanMetrics>,
    pub message: Option<String>,
}

impl SolveOutcome {
    fn unsolved(status: SolveStatus, message: Option<String>) -> Self {
        SolveOutcome {
            status,
            objective: None,
            flows: None,
            metrics: None,
            message,
        }
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolveStatus::Optimal
    }
}

/// Default cap on time-limited solver threads alive at once.
pub const DEFAULT_MAX_WORKERS: usize = 8;

/// Runs network -> model -> solver -> extraction.
///
/// Holds no per-solve state: every call builds its own model, so one
/// planner can serve concurrent callers.
///
/// Time-limited solves run on worker threads. A worker whose deadline
/// passes keeps running until its backend returns, so the planner caps
/// how many workers may be alive at once; past the cap, solves are
/// refused as `NotSolved`.
#[derive(Clone)]
pub struct Planner {
    solver: Arc<dyn Solver>,
    options: SolveOptions,
    active_workers: Arc<AtomicUsize>,
    max_workers: usize,
}

impl Planner {
    pub fn new(solver: Arc<dyn Solver>, options: SolveOptions) -> Self {
        Planner {
            solver,
            options,
            active_workers: Arc::new(AtomicUsize::new(0)),
            max_workers: DEFAULT_MAX_WORKERS,
        }
    }

    /// Same planner with a different worker cap (at least one).
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Time-limited workers currently running, including abandoned ones.
    pub fn active_workers(&self) -> usize {
        self.active_workers.load(Ordering::Acquire)
    }

    pub fn solver_name(&self) -> &str {
        self.solver.name()
    }

    pub fn options(&self) -> SolveOptions {
        self.options
    }

    /// Same planner with different options. The worker cap is shared.
    pub fn with_options(&self, options: SolveOptions) -> Self {
        Planner {
            solver: Arc::clone(&self.solver),
            options,
            active_workers: Arc::clone(&self.active_workers),
            max_workers: self.max_workers,
        }
    }

    /// Compute a cost-minimal flow plan for `network`.
    ///
    /// Infeasible, unbounded and unfinished solves are returned as
    /// `Ok` outcomes without flows. `Err` means the backend failed to
    /// run or its solution could not be read back.
    pub fn plan(&self, network: &Network) -> Result<SolveOutcome, PlanError> {
        let model = build_model(network, self.options.integrality);

        let solution = match self.options.time_limit {
            Some(limit) => match WorkerSlot::acquire(&self.active_workers, self.max_workers) {
                Some(slot) => solve_with_time_limit(
                    Arc::clone(&self.solver),
                    model.program.clone(),
                    limit,
                    slot,
                )?,
                None => LpSolution::without_values(
                    SolveStatus::NotSolved,
                    Some(format!(
                        "all {} solver workers are busy",
                        self.max_workers
                    )),
                ),
            },
            None => self.solver.solve(&model.program)?,
        };

        if solution.status != SolveStatus::Optimal {
            warn!(
                "{} finished with status {}{}",
                self.solver.name(),
                solution.status,
                solution
                    .error
                    .as_deref()
                    .map(|e| format!(": {}", e))
                    .unwrap_or_default()
            );
            return Ok(SolveOutcome::unsolved(solution.status, solution.error));
        }

        let flows = extract_flows(&model, network, &solution)?;
        let metrics = PlanMetrics::from_flows(&flows, network);
        let objective = solution.objective.unwrap_or(metrics.total_cost);

        info!(
            "{} found optimal plan: cost {:.2}, {} of {} units shipped",
            self.solver.name(),
            objective,
            metrics.total_shipped,
            metrics.total_demand,
        );

        Ok(SolveOutcome {
            status: SolveStatus::Optimal,
            objective: Some(objective),
            flows: Some(flows),
            metrics: Some(metrics),
            message: solution.error,
        })
    }
}

/// One counted worker thread; released when dropped, also on panic.
struct WorkerSlot(Arc<AtomicUsize>);

impl WorkerSlot {
    fn acquire(active: &Arc<AtomicUsize>, max: usize) -> Option<Self> {
        active
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < max).then_some(n + 1)
            })
            .ok()?;
        Some(WorkerSlot(Arc::clone(active)))
    }
}

impl Drop for WorkerSlot {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Run the backend on its own thread and give up after `limit`.
///
/// On expiry the worker is left to finish in the background and its
/// result is dropped; the caller sees `NotSolved`. The worker holds
/// `slot` until the backend returns.
fn solve_with_time_limit(
    solver: Arc<dyn Solver>,
    program: LinearProgram,
    limit: Duration,
    slot: WorkerSlot,
) -> Result<LpSolution, SolverError> {
    let (tx, rx) = mpsc::channel();
    let name = solver.name().to_string();

    thread::Builder::new()
        .name(format!("{}-solve", name))
        .spawn(move || {
            let _slot = slot;
            let result = solver.solve(&program);
            // The receiver is gone once the deadline has passed.
            let _ = tx.send(result);
        })
        .map_err(|e| SolverError::Backend {
            solver: name.clone(),
            details: format!("failed to spawn solver worker: {}", e),
        })?;

    match rx.recv_timeout(limit) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => {
            warn!("{} exceeded time limit of {:?}", name, limit);
            Ok(LpSolution::without_values(
                SolveStatus::NotSolved,
                Some(format!("time limit of {} ms reached", limit.as_millis())),
            ))
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => Err(SolverError::WorkerLost),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::domain::solvers::MiniLpSolver;

    /// Reports a fixed status without looking at the program
    struct FixedStatusSolver(SolveStatus);

    impl Solver for FixedStatusSolver {
        fn solve(&self, _program: &LinearProgram) -> Result<LpSolution, SolverError> {
            Ok(LpSolution::without_values(self.0, Some("fixed".to_string())))
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    /// Sleeps before answering
    struct SlowSolver(Duration);

    impl Solver for SlowSolver {
        fn solve(&self, _program: &LinearProgram) -> Result<LpSolution, SolverError> {
            thread::sleep(self.0);
            Ok(LpSolution {
                status: SolveStatus::Optimal,
                objective: Some(0.0),
                values: HashMap::new(),
                error: None,
            })
        }

        fn name(&self) -> &str {
            "slow"
        }
    }

    /// Fails on every call
    struct PanickingSolver;

    impl Solver for PanickingSolver {
        fn solve(&self, _program: &LinearProgram) -> Result<LpSolution, SolverError> {
            panic!("backend crashed");
        }

        fn name(&self) -> &str {
            "panicking"
        }
    }

    fn scenario() -> Network {
        Network::new(
            vec![vec![3.0, 5.0], vec![2.0, 6.0]],
            vec![vec![1.0], vec![9.0]],
            vec![100],
        )
        .unwrap()
    }

    #[test]
    fn test_plan_should_route_through_cheapest_dc() {
        let planner = Planner::new(Arc::new(MiniLpSolver::new()), SolveOptions::default());

        let outcome = planner.plan(&scenario()).unwrap();

        assert!(outcome.is_optimal());
        assert!((outcome.objective.unwrap() - 300.0).abs() < 1e-6);
        let flows = outcome.flows.unwrap();
        assert_eq!(flows.outbound(), [vec![100], vec![0]]);
        assert_eq!(flows.inbound(), [vec![0, 0], vec![100, 0]]);
        assert_eq!(outcome.metrics.unwrap().dc_throughput, vec![100, 0]);
    }

    #[test]
    fn test_plan_given_non_optimal_status_should_return_outcome_without_flows() {
        for status in [
            SolveStatus::Infeasible,
            SolveStatus::Unbounded,
            SolveStatus::NotSolved,
        ] {
            let planner = Planner::new(Arc::new(FixedStatusSolver(status)), SolveOptions::default());

            let outcome = planner.plan(&scenario()).unwrap();

            assert_eq!(outcome.status, status);
            assert!(outcome.objective.is_none());
            assert!(outcome.flows.is_none());
            assert!(outcome.metrics.is_none());
            assert_eq!(outcome.message.as_deref(), Some("fixed"));
        }
    }

    #[test]
    fn test_plan_given_time_limit_exceeded_should_return_not_solved() {
        let options = SolveOptions {
            integrality: Integrality::Integer,
            time_limit: Some(Duration::from_millis(20)),
        };
        let planner = Planner::new(Arc::new(SlowSolver(Duration::from_millis(500))), options);

        let outcome = planner.plan(&scenario()).unwrap();

        assert_eq!(outcome.status, SolveStatus::NotSolved);
        assert!(outcome.flows.is_none());
    }

    #[test]
    fn test_plan_given_all_workers_busy_should_refuse_until_one_finishes() {
        let options = SolveOptions {
            integrality: Integrality::Integer,
            time_limit: Some(Duration::from_millis(20)),
        };
        let planner = Planner::new(Arc::new(SlowSolver(Duration::from_millis(300))), options)
            .with_max_workers(1);

        let first = planner.plan(&scenario()).unwrap();
        assert_eq!(first.status, SolveStatus::NotSolved);
        assert!(first.message.unwrap().contains("time limit"));
        assert_eq!(planner.active_workers(), 1);

        let refused = planner.with_options(options).plan(&scenario()).unwrap();
        assert_eq!(refused.status, SolveStatus::NotSolved);
        assert!(refused.message.unwrap().contains("busy"));

        thread::sleep(Duration::from_millis(800));
        assert_eq!(planner.active_workers(), 0);
        let retried = planner.plan(&scenario()).unwrap();
        assert!(retried.message.unwrap().contains("time limit"));
    }

    #[test]
    fn test_plan_given_worker_panic_should_release_its_slot() {
        let options = SolveOptions {
            integrality: Integrality::Integer,
            time_limit: Some(Duration::from_secs(5)),
        };
        let planner = Planner::new(Arc::new(PanickingSolver), options).with_max_workers(1);

        assert!(planner.plan(&scenario()).is_err());
        assert_eq!(planner.active_workers(), 0);
    }

    #[test]
    fn test_plan_given_generous_time_limit_should_solve() {
        let options = SolveOptions {
            integrality: Integrality::Integer,
            time_limit: Some(Duration::from_secs(30)),
        };
        let planner = Planner::new(Arc::new(MiniLpSolver::new()), options);

        let outcome = planner.plan(&scenario()).unwrap();

        assert!(outcome.is_optimal());
    }

    #[test]
    fn test_plan_given_worker_panic_should_return_worker_lost() {
        let options = SolveOptions {
            integrality: Integrality::Integer,
            time_limit: Some(Duration::from_secs(5)),
        };
        let planner = Planner::new(Arc::new(PanickingSolver), options);

        let err = planner.plan(&scenario()).unwrap_err();

        assert_eq!(err, PlanError::Solver(SolverError::WorkerLost));
    }

    #[test]
    fn test_plan_given_continuous_integrality_should_solve_relaxation() {
        let planner = Planner::new(
            Arc::new(MiniLpSolver::new()),
            SolveOptions {
                integrality: Integrality::Continuous,
                time_limit: None,
            },
        );

        let outcome = planner.plan(&scenario()).unwrap();

        assert!((outcome.objective.unwrap() - 300.0).abs() < 1e-6);
    }
}
