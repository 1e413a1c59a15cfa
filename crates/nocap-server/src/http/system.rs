use super::support::{finish, make_request_id, with_request_id};
use crate::{AppState, CONFIG_SCHEMA_VERSION, CRATE_NAME};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::sync::atomic::Ordering;
use std::time::Instant;

pub(crate) async fn landing_handler(State(state): State<AppState>) -> Response {
    let started = Instant::now();
    let request_id = make_request_id(&state);
    let payload = json!({
        "app": {
            "name": "No Cap",
            "description": "Equity management for the digital age",
            "version": env!("CARGO_PKG_VERSION"),
        },
        "endpoints": [
            "/healthz",
            "/readyz",
            "/metrics",
            "/v1/version",
            "/v1/companies",
            "/v1/stakeholders",
            "/v1/securities",
            "/v1/grants",
            "/v1/transactions",
            "/v1/vesting-schedules",
            "/v1/rules/check",
            "/v1/auth/login",
            "/v1/dashboards/founder/{company_id}",
            "/v1/dashboards/employee/{stakeholder_id}",
            "/v1/dashboards/investor/{stakeholder_id}",
        ],
    });
    let resp = Json(payload).into_response();
    finish(&state, "/", &request_id, started, resp).await
}

pub(crate) async fn healthz_handler(State(state): State<AppState>) -> Response {
    let started = Instant::now();
    let request_id = make_request_id(&state);
    let resp = (StatusCode::OK, "ok").into_response();
    finish(&state, "/healthz", &request_id, started, resp).await
}

pub(crate) async fn readyz_handler(State(state): State<AppState>) -> Response {
    let started = Instant::now();
    let request_id = make_request_id(&state);
    let resp = if state.ready.load(Ordering::Relaxed) {
        (StatusCode::OK, "ready").into_response()
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not-ready").into_response()
    };
    finish(&state, "/readyz", &request_id, started, resp).await
}

pub(crate) async fn metrics_handler(State(state): State<AppState>) -> Response {
    let request_id = make_request_id(&state);
    let body = state.metrics.render_text().await;
    let resp = (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4")],
        body,
    )
        .into_response();
    with_request_id(resp, &request_id)
}

pub(crate) async fn version_handler(State(state): State<AppState>) -> Response {
    let started = Instant::now();
    let request_id = make_request_id(&state);
    let payload = json!({
        "server": {
            "crate": CRATE_NAME,
            "version": env!("CARGO_PKG_VERSION"),
            "api_version": nocap_api::API_VERSION,
            "config_schema_version": CONFIG_SCHEMA_VERSION,
        }
    });
    let resp = Json(payload).into_response();
    finish(&state, "/v1/version", &request_id, started, resp).await
}
