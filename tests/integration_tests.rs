use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use serde_json::json;
use tempfile::TempDir;

use supply_planner::domain::solve::{Planner, SolveOptions};
use supply_planner::domain::solvers::MiniLpSolver;
use supply_planner::models::{ApiError, ApiSolution};
use supply_planner::routes;
use supply_planner::solve::AppState;
use supply_planner::SolveStatus;

const JSON_LIMIT: usize = 2 * 1024 * 1024;

fn state(data_dir: &TempDir) -> web::Data<AppState> {
    web::Data::new(AppState {
        planner: Planner::new(Arc::new(MiniLpSolver::new()), SolveOptions::default()),
        data_dir: data_dir.path().to_path_buf(),
        sample_seed: 42,
    })
}

macro_rules! service {
    ($dir:expr) => {
        test::init_service(
            App::new()
                .app_data(state($dir))
                .configure(|cfg| routes::configure(cfg, JSON_LIMIT)),
        )
        .await
    };
}

#[actix_web::test]
async fn test_health_endpoint() {
    let dir = TempDir::new().expect("temp dir");
    let app = service!(&dir);

    let req = test::TestRequest::get().uri("/health").to_request();
    let body = test::call_and_read_body(&app, req).await;

    assert_eq!(body, web::Bytes::from_static(b"OK"));
}

#[actix_web::test]
async fn test_root_redirects_to_health() {
    let dir = TempDir::new().expect("temp dir");
    let app = service!(&dir);

    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers().get("Location").unwrap(), "/health");
}

#[actix_web::test]
async fn test_solve_valid_request() {
    let dir = TempDir::new().expect("temp dir");
    let app = service!(&dir);

    let req = test::TestRequest::post()
        .uri("/solve")
        .set_json(json!({
            "inbound_cost": [[3.0, 5.0], [2.0, 6.0]],
            "outbound_cost": [[1.0], [9.0]],
            "demand": [100]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: ApiSolution = test::read_body_json(resp).await;
    assert_eq!(body.status, SolveStatus::Optimal);
    assert_eq!(body.solver, "minilp");
    assert!((body.objective.unwrap() - 300.0).abs() < 1e-6);
    assert_eq!(body.stores, ["S1"]);

    let flows = body.flows.expect("flows");
    assert_eq!(flows.inbound, [vec![0, 0], vec![100, 0]]);
    assert_eq!(flows.outbound, [vec![100], vec![0]]);

    let metrics = body.metrics.expect("metrics");
    assert_eq!(metrics.dc_throughput, [100, 0]);
    assert_eq!(metrics.stores_served, [1, 0]);
    assert_eq!(metrics.fill_rate, 1.0);
}

#[actix_web::test]
async fn test_solve_with_ids_and_options() {
    let dir = TempDir::new().expect("temp dir");
    let app = service!(&dir);

    let req = test::TestRequest::post()
        .uri("/solve")
        .set_json(json!({
            "plants": ["berlin"],
            "dcs": ["hub"],
            "stores": ["a", "b"],
            "inbound_cost": [[1.0]],
            "outbound_cost": [[2.0, 3.0]],
            "demand": [10, 20],
            "options": { "integrality": "continuous", "time_limit_ms": 5000 }
        }))
        .to_request();
    let body: ApiSolution = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body.status, SolveStatus::Optimal);
    assert_eq!(body.plants, ["berlin"]);
    assert!((body.objective.unwrap() - 110.0).abs() < 1e-6);
    assert_eq!(body.metrics.unwrap().total_shipped, 30);
}

#[actix_web::test]
async fn test_solve_infeasible_network() {
    let dir = TempDir::new().expect("temp dir");
    let app = service!(&dir);

    let req = test::TestRequest::post()
        .uri("/solve")
        .set_json(json!({
            "inbound_cost": [],
            "outbound_cost": [],
            "demand": [5]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: ApiSolution = test::read_body_json(resp).await;
    assert_eq!(body.status, SolveStatus::Infeasible);
    assert!(body.objective.is_none());
    assert!(body.flows.is_none());
}

#[actix_web::test]
async fn test_solve_dimension_mismatch() {
    let dir = TempDir::new().expect("temp dir");
    let app = service!(&dir);

    let req = test::TestRequest::post()
        .uri("/solve")
        .set_json(json!({
            "inbound_cost": [[1.0, 2.0]],
            "outbound_cost": [[1.0]],
            "demand": [5]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: ApiError = test::read_body_json(resp).await;
    assert!(!body.error.is_empty());
}

#[actix_web::test]
async fn test_solve_negative_cost() {
    let dir = TempDir::new().expect("temp dir");
    let app = service!(&dir);

    let req = test::TestRequest::post()
        .uri("/solve")
        .set_json(json!({
            "inbound_cost": [[-1.0]],
            "outbound_cost": [[1.0]],
            "demand": [5]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_solve_invalid_json() {
    let dir = TempDir::new().expect("temp dir");
    let app = service!(&dir);

    let req = test::TestRequest::post()
        .uri("/solve")
        .insert_header(("content-type", "application/json"))
        .set_payload("invalid json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["error"].is_string());
}

#[actix_web::test]
async fn test_solve_default_uses_sample_network() {
    let dir = TempDir::new().expect("temp dir");
    let app = service!(&dir);

    let req = test::TestRequest::get().uri("/solve/default").to_request();
    let body: ApiSolution = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body.status, SolveStatus::Optimal);
    assert_eq!(body.plants, ["P1", "P2"]);
    assert_eq!(body.stores.len(), 10);
    let metrics = body.metrics.expect("metrics");
    assert_eq!(metrics.total_shipped, metrics.total_demand);
}

#[actix_web::test]
async fn test_solve_default_as_text_report() {
    let dir = TempDir::new().expect("temp dir");
    let app = service!(&dir);

    let req = test::TestRequest::get()
        .uri("/solve/default?format=text")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/plain"));

    let body = test::read_body(resp).await;
    let text = std::str::from_utf8(&body).expect("utf-8 report");
    assert!(text.contains("SUPPLY PLANNING OPTIMIZATION RESULTS"));
    assert!(text.contains("Status: Optimal"));
    assert!(text.contains("Fill Rate: 100.0%"));
}

#[actix_web::test]
async fn test_solve_default_reads_data_dir() {
    let dir = TempDir::new().expect("temp dir");
    std::fs::write(dir.path().join("df_inprice.csv"), "FROM,D1\nP1,2.0\n").unwrap();
    std::fs::write(dir.path().join("df_outprice.csv"), "FROM,S1,S2\nD1,1.0,1.0\n").unwrap();
    std::fs::write(dir.path().join("df_demand.csv"), "STORE,DEMAND\nS1,4\nS2,6\n").unwrap();
    let app = service!(&dir);

    let req = test::TestRequest::get().uri("/solve/default").to_request();
    let body: ApiSolution = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body.status, SolveStatus::Optimal);
    assert!((body.objective.unwrap() - 30.0).abs() < 1e-6);
}

#[actix_web::test]
async fn test_solve_default_with_broken_data_is_server_error() {
    let dir = TempDir::new().expect("temp dir");
    std::fs::write(dir.path().join("df_inprice.csv"), "FROM,D1\nP1,2.0\n").unwrap();
    std::fs::write(dir.path().join("df_outprice.csv"), "FROM,S1\nD1,1.0\n").unwrap();
    std::fs::write(dir.path().join("df_demand.csv"), "STORE,DEMAND\nS7,4\n").unwrap();
    let app = service!(&dir);

    let req = test::TestRequest::get().uri("/solve/default").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[actix_web::test]
async fn test_nonexistent_endpoint() {
    let dir = TempDir::new().expect("temp dir");
    let app = service!(&dir);

    let req = test::TestRequest::get().uri("/nonexistent").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
