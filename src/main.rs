use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use log::info;

use supply_planner::config::AppConfig;
use supply_planner::domain::builder::Integrality;
use supply_planner::domain::solve::{Planner, SolveOptions};
use supply_planner::domain::solver_factory::create_solver;
use supply_planner::routes;
use supply_planner::solve::AppState;

// ---------- Server bootstrap ----------
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env();
    let planner = Planner::new(
        create_solver(config.solver),
        SolveOptions {
            integrality: Integrality::Integer,
            time_limit: config.time_limit,
        },
    )
    .with_max_workers(config.max_workers);

    info!(
        "Starting server on http://127.0.0.1:{} with {} solver",
        config.port,
        planner.solver_name()
    );

    let state = web::Data::new(AppState {
        planner,
        data_dir: config.data_dir.clone(),
        sample_seed: config.sample_seed,
    });
    let json_limit = config.json_limit;

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(|cfg| routes::configure(cfg, json_limit))
    })
    .bind(("0.0.0.0", config.port))?
    .run()
    .await
}
