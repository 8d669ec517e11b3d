use std::env;
use std::path::PathBuf;
use std::time::Duration;

use log::warn;

use crate::domain::solve::DEFAULT_MAX_WORKERS;
use crate::domain::solver_factory::SolverType;
use crate::sample::DEFAULT_SEED;

pub const DEFAULT_PORT: u16 = 9000;
pub const DEFAULT_JSON_LIMIT: usize = 2 * 1024 * 1024; // 2 MB
pub const DEFAULT_DATA_DIR: &str = "data";

/// Server settings, read from the environment (and `.env`).
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub port: u16,
    pub json_limit: usize,
    pub solver: SolverType,
    /// Wall-clock cap per solve. A solve past its deadline is answered as
    /// `NotSolved`, but its worker thread runs on until the backend
    /// returns; `max_workers` bounds how many such threads can pile up.
    pub time_limit: Option<Duration>,
    /// Worker threads allowed at once for time-limited solves
    pub max_workers: usize,
    pub data_dir: PathBuf,
    pub sample_seed: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            port: DEFAULT_PORT,
            json_limit: DEFAULT_JSON_LIMIT,
            solver: SolverType::default(),
            time_limit: None,
            max_workers: DEFAULT_MAX_WORKERS,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            sample_seed: DEFAULT_SEED,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any key lookup. Unparseable values fall back
    /// to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AppConfig::default();

        let port = lookup("PORT")
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(defaults.port);

        let json_limit = lookup("JSON_PAYLOAD_LIMIT")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(defaults.json_limit);

        let solver = match lookup("SOLVER") {
            Some(name) => SolverType::from_str(&name).unwrap_or_else(|| {
                warn!("unknown solver '{}', falling back to {:?}", name, defaults.solver);
                defaults.solver
            }),
            None => defaults.solver,
        };

        let time_limit = lookup("SOLVE_TIME_LIMIT_MS")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|&ms| ms > 0)
            .map(Duration::from_millis);

        let max_workers = lookup("SOLVE_MAX_WORKERS")
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(defaults.max_workers);

        let data_dir = lookup("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let sample_seed = lookup("SAMPLE_SEED")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults.sample_seed);

        AppConfig {
            port,
            json_limit,
            solver,
            time_limit,
            max_workers,
            data_dir,
            sample_seed,
        }
    }
}
