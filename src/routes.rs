use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;

use crate::models::NetworkRequest;
use crate::solve::{render, solve_default, solve_request, AppState, ServiceError};

#[derive(Deserialize, Debug, Default)]
pub struct ReportQuery {
    #[serde(default)]
    pub format: Option<String>,
}

impl ReportQuery {
    fn wants_text(&self) -> bool {
        self.format
            .as_deref()
            .is_some_and(|f| f.eq_ignore_ascii_case("text"))
    }
}

/// POST /solve
pub async fn solve(
    state: web::Data<AppState>,
    req: web::Json<NetworkRequest>,
) -> Result<HttpResponse, ServiceError> {
    let req = req.into_inner();
    let solution = web::block(move || solve_request(&state.planner, &req))
        .await
        .map_err(|_| ServiceError::Blocking)??;

    Ok(HttpResponse::Ok().json(solution))
}

/// GET /solve/default
pub async fn solve_default_network(
    state: web::Data<AppState>,
    query: web::Query<ReportQuery>,
) -> Result<HttpResponse, ServiceError> {
    let worker_state = state.clone();
    let (network, outcome) = web::block(move || {
        solve_default(
            &worker_state.planner,
            &worker_state.data_dir,
            worker_state.sample_seed,
        )
    })
    .await
    .map_err(|_| ServiceError::Blocking)??;

    Ok(render(
        &network,
        &outcome,
        state.planner.solver_name(),
        query.wants_text(),
    ))
}

/// GET /health
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().body("OK")
}

/// GET / - Redirect to health
pub async fn root_redirect() -> impl Responder {
    HttpResponse::Found()
        .append_header(("Location", "/health"))
        .finish()
}

/// JSON extractor config: payload cap, and malformed bodies answered
/// with 400 `{ "error": ... }`.
pub fn json_config(json_limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(json_limit)
        .error_handler(|err, _| {
            let err_string = err.to_string();
            actix_web::error::InternalError::from_response(
                err,
                HttpResponse::BadRequest().json(serde_json::json!({ "error": err_string })),
            )
            .into()
        })
}

pub fn configure(cfg: &mut web::ServiceConfig, json_limit: usize) {
    cfg.app_data(json_config(json_limit))
        .route("/", web::get().to(root_redirect))
        .route("/health", web::get().to(health_check))
        .route("/solve", web::post().to(solve))
        .route("/solve/default", web::get().to(solve_default_network));
}
