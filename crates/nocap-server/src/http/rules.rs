use super::support::{
    api_error_response, decode_body, envelope_response, finish, propagated_request_id,
};
use crate::AppState;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Response;
use axum::Json;
use nocap_engine::{evaluate_transfer, RuleCheckRequest};
use nocap_model::StakeholderId;
use serde_json::Value;
use std::time::Instant;
use tracing::info;

pub(crate) async fn check_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    info!(request_id = %request_id, route = "/v1/rules/check", "rule check");

    let resp = match decode_body::<RuleCheckRequest>(&body) {
        Ok(request) => {
            let sender = match StakeholderId::parse(&request.from) {
                Ok(id) => state.store.find_stakeholder(&id).await,
                Err(_) => None,
            };
            let recipient = match StakeholderId::parse(&request.to) {
                Ok(id) => state.store.find_stakeholder(&id).await,
                Err(_) => None,
            };
            envelope_response(evaluate_transfer(
                &request,
                sender.as_ref(),
                recipient.as_ref(),
            ))
        }
        Err(e) => api_error_response(e.with_request_id(&request_id)),
    };
    finish(&state, "/v1/rules/check", &request_id, started, resp).await
}
