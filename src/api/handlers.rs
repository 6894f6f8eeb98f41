//! HTTP request handlers for the Efficiency Engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::EngineError;
use crate::orchestrator::{ComputeRequest, LiveEfficiencyEngine, SiteOutcome};
use crate::providers::{ActivityStore, EngineSources};

use super::request::ComputeEfficiencyRequest;
use super::response::{ApiError, ApiErrorResponse, ComputeEfficiencyResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/efficiency/compute", post(compute_handler))
        .with_state(state)
}

/// Handler for POST /efficiency/compute endpoint.
///
/// Runs the full pipeline over the posted batch and returns the records of
/// every site it names.
async fn compute_handler(
    State(state): State<AppState>,
    payload: Result<Json<ComputeEfficiencyRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing efficiency request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            let error = match rejection {
                JsonRejection::JsonDataError(err) => {
                    let body_text = err.body_text();
                    warn!(
                        correlation_id = %correlation_id,
                        error = %body_text,
                        "JSON data error"
                    );
                    if body_text.contains("missing field") {
                        ApiError::validation_error(body_text)
                    } else {
                        ApiError::malformed_json(body_text)
                    }
                }
                JsonRejection::JsonSyntaxError(err) => {
                    warn!(
                        correlation_id = %correlation_id,
                        error = %err,
                        "JSON syntax error"
                    );
                    ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
                }
                JsonRejection::MissingJsonContentType(_) => {
                    ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
                }
                _ => ApiError::malformed_json("Failed to parse request body"),
            };
            return json_response(StatusCode::BAD_REQUEST, error);
        }
    };

    let compute_request = match request.compute_request() {
        Ok(compute_request) => compute_request,
        Err(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "Invalid window");
            return error_response(err);
        }
    };

    let engine = build_engine(&state, request);
    let start_time = Instant::now();
    let outcomes = match run_engine(engine, compute_request).await {
        Ok(outcomes) => outcomes,
        Err(message) => {
            warn!(correlation_id = %correlation_id, error = %message, "Computation aborted");
            return json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::internal(message),
            );
        }
    };

    let mut sites = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        match outcome.result {
            Ok(records) => sites.push((outcome.site_code, records)),
            Err(err) => {
                warn!(
                    correlation_id = %correlation_id,
                    site_code = %outcome.site_code,
                    error = %err,
                    "Efficiency computation failed"
                );
                return error_response(err);
            }
        }
    }

    let response = ComputeEfficiencyResponse::from_sites(sites);
    info!(
        correlation_id = %correlation_id,
        sites = response.sites.len(),
        records = response.records.len(),
        duration_us = start_time.elapsed().as_micros() as u64,
        "Efficiency computation completed successfully"
    );

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        Json(response),
    )
        .into_response()
}

/// Builds an engine over the posted batch and the configured reference data.
fn build_engine(state: &AppState, request: ComputeEfficiencyRequest) -> LiveEfficiencyEngine {
    let config = state.config();
    let catalog = match request.as_of {
        Some(now) => config.catalog().with_fixed_now(now),
        None => config.catalog().clone(),
    };
    let store = ActivityStore::new(request.transactions, request.time_sheets);
    let sources = EngineSources::new(Arc::new(store), Arc::new(catalog));

    LiveEfficiencyEngine::new(sources, config.settings().clone(), state.site_locks())
}

/// Runs the engine off the async runtime; site locks block.
async fn run_engine(
    engine: LiveEfficiencyEngine,
    request: ComputeRequest,
) -> Result<Vec<SiteOutcome>, String> {
    tokio::task::spawn_blocking(move || engine.compute(&request))
        .await
        .map_err(|e| format!("Computation task failed: {}", e))
}

fn error_response(err: EngineError) -> Response {
    let api_error: ApiErrorResponse = err.into();
    json_response(api_error.status, api_error.error)
}

fn json_response(status: StatusCode, error: ApiError) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")], Json(error)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn create_test_state() -> AppState {
        let config = ConfigLoader::load("./config/default").expect("Failed to load config");
        AppState::new(config)
    }

    fn create_transaction(site: &str, code: &str, time: &str) -> Value {
        json!({
            "site_code": site,
            "site_employee_code": code,
            "transaction_type_code": "PICK",
            "quantity": "1",
            "quantity_processed": "1",
            "operational_date": "2026-03-02",
            "transaction_date": format!("2026-03-02T{}", time),
        })
    }

    fn create_body(transactions: Vec<Value>) -> Value {
        json!({
            "window": {"start": "2026-03-02T00:00:00", "end": "2026-03-02T23:59:00"},
            "as_of": "2026-03-02T18:00:00",
            "transactions": transactions,
        })
    }

    async fn post_compute(body: String, content_type: Option<&str>) -> (StatusCode, Value) {
        let router = create_router(create_test_state());
        let mut builder = Request::builder().method("POST").uri("/efficiency/compute");
        if let Some(content_type) = content_type {
            builder = builder.header("Content-Type", content_type);
        }

        let response = router
            .oneshot(builder.body(Body::from(body)).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_valid_request_returns_200() {
        let body = create_body(vec![
            create_transaction("DC01", "E100", "08:15:00"),
            create_transaction("DC01", "E100", "08:40:00"),
        ]);

        let (status, json) = post_compute(body.to_string(), Some("application/json")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["sites"][0]["site_code"], "DC01");
        let records = json["records"].as_array().unwrap();
        assert!(!records.is_empty());
        assert_eq!(json["sites"][0]["record_count"], records.len());
        assert!(records.iter().all(|r| r["hash_key"].as_str().unwrap().len() == 64));
    }

    #[tokio::test]
    async fn test_empty_batch_returns_no_records() {
        let (status, json) = post_compute(create_body(vec![]).to_string(), Some("application/json")).await;

        assert_eq!(status, StatusCode::OK);
        assert!(json["records"].as_array().unwrap().is_empty());
        assert!(json["sites"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_json_returns_400() {
        let (status, json) = post_compute("{invalid json".to_string(), Some("application/json")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "MALFORMED_JSON");
    }

    #[tokio::test]
    async fn test_missing_window_returns_validation_error() {
        let (status, json) = post_compute(json!({"transactions": []}).to_string(), Some("application/json")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert!(json["message"].as_str().unwrap().contains("missing field"));
    }

    #[tokio::test]
    async fn test_missing_content_type_returns_400() {
        let (status, json) = post_compute(create_body(vec![]).to_string(), None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "MISSING_CONTENT_TYPE");
    }

    #[tokio::test]
    async fn test_reversed_window_returns_400() {
        let body = json!({
            "window": {"start": "2026-03-02T23:59:00", "end": "2026-03-02T00:00:00"},
        });

        let (status, json) = post_compute(body.to_string(), Some("application/json")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "INVALID_RANGE");
    }

    #[tokio::test]
    async fn test_oversized_seconds_earned_returns_400() {
        let mut transaction = create_transaction("DC01", "E100", "08:15:00");
        transaction["seconds_earned"] = json!(9_300_000_000_000_000i64);
        let body = create_body(vec![transaction]);

        let (status, json) = post_compute(body.to_string(), Some("application/json")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "INVALID_TRANSACTION");
        assert!(json["message"].as_str().unwrap().contains("seconds_earned"));
    }

    #[tokio::test]
    async fn test_unknown_site_returns_500() {
        let body = create_body(vec![create_transaction("ZZ99", "E100", "08:15:00")]);

        let (status, json) = post_compute(body.to_string(), Some("application/json")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["code"], "REFERENCE_DATA_MISSING");
    }
}
