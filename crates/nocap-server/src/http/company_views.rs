use super::support::{
    api_error_response, created_response, decode_body, envelope_response, finish,
    propagated_request_id, store_error,
};
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::Response;
use axum::Json;
use nocap_api::{ActivityDraft, ApiError};
use nocap_engine::{aggregate_by_type, recompute_percentages, total_treasury_usd_cents};
use nocap_model::{ActivityId, CompanyId};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::time::Instant;
use time::OffsetDateTime;
use tracing::info;

fn parse_company_id(raw: &str, request_id: &str) -> Result<CompanyId, ApiError> {
    CompanyId::parse(raw)
        .map_err(|_| ApiError::invalid_param("id", raw).with_request_id(request_id))
}

pub(crate) async fn cap_table_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(query): Query<BTreeMap<String, String>>,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    info!(request_id = %request_id, route = "/v1/companies/{id}/cap-table", "request start");
    let resp = cap_table(&state, &id, &query, &request_id).await;
    finish(&state, "/v1/companies/{id}/cap-table", &request_id, started, resp).await
}

async fn cap_table(
    state: &AppState,
    id: &str,
    query: &BTreeMap<String, String>,
    request_id: &str,
) -> Response {
    let company_id = match parse_company_id(id, request_id) {
        Ok(v) => v,
        Err(e) => return api_error_response(e),
    };
    let group_by = match query.get("group_by").map(String::as_str) {
        None => None,
        Some("type") => Some("type"),
        Some(other) => {
            return api_error_response(
                ApiError::invalid_param("group_by", other).with_request_id(request_id),
            )
        }
    };
    let mut table = match state.store.get_cap_table(&company_id).await {
        Ok(t) => t,
        Err(e) => return api_error_response(store_error(e).with_request_id(request_id)),
    };
    // Percentages are derived, never trusted from storage.
    let total = table.total_shares;
    recompute_percentages(&mut table.entries, total);

    match group_by {
        None => envelope_response(table),
        Some(_) => {
            let stakeholders = match state.store.list_stakeholders().await {
                Ok(list) => list,
                Err(e) => {
                    return api_error_response(store_error(e).with_request_id(request_id))
                }
            };
            let by_type = aggregate_by_type(&table.entries, &stakeholders);
            envelope_response(json!({"cap_table": table, "by_type": by_type}))
        }
    }
}

pub(crate) async fn treasury_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let resp = match parse_company_id(&id, &request_id) {
        Ok(company_id) => match state.store.get_treasury(&company_id).await {
            Ok(treasury) => {
                let total = total_treasury_usd_cents(&treasury);
                envelope_response(json!({
                    "treasury": treasury,
                    "total_usd_cents": total,
                }))
            }
            Err(e) => api_error_response(store_error(e).with_request_id(&request_id)),
        },
        Err(e) => api_error_response(e),
    };
    finish(&state, "/v1/companies/{id}/treasury", &request_id, started, resp).await
}

pub(crate) async fn compliance_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let resp = match parse_company_id(&id, &request_id) {
        Ok(company_id) => match state.store.get_compliance(&company_id).await {
            Ok(record) => envelope_response(record),
            Err(e) => api_error_response(store_error(e).with_request_id(&request_id)),
        },
        Err(e) => api_error_response(e),
    };
    finish(&state, "/v1/companies/{id}/compliance", &request_id, started, resp).await
}

pub(crate) async fn activities_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let resp = match parse_company_id(&id, &request_id) {
        Ok(company_id) => match state.store.list_activities(&company_id).await {
            Ok(feed) => envelope_response(feed),
            Err(e) => api_error_response(store_error(e).with_request_id(&request_id)),
        },
        Err(e) => api_error_response(e),
    };
    finish(&state, "/v1/companies/{id}/activities", &request_id, started, resp).await
}

pub(crate) async fn create_activity_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let resp = match decode_body::<ActivityDraft>(&body) {
        Ok(draft) => {
            let raw = state.store.next_id("act");
            match ActivityId::parse(&raw) {
                Ok(id) => {
                    let record = draft.into_record(id, OffsetDateTime::now_utc());
                    match state.store.record_activity(record).await {
                        Ok(created) => created_response(created),
                        Err(e) => api_error_response(store_error(e).with_request_id(&request_id)),
                    }
                }
                Err(_) => api_error_response(
                    ApiError::internal("generated id rejected").with_request_id(&request_id),
                ),
            }
        }
        Err(e) => api_error_response(e.with_request_id(&request_id)),
    };
    finish(&state, "/v1/activities", &request_id, started, resp).await
}
