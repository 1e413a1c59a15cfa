use super::support::{
    api_error_response, created_response, decode_body, envelope_response, finish, merge_record,
    paged_response, propagated_request_id, store_error,
};
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::Response;
use axum::Json;
use nocap_api::{parse_list_params_with_limit, ApiError, PageMetadata, SecurityDraft, SortOrder};
use nocap_model::{Security, SecurityId};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Instant;
use time::OffsetDateTime;
use tracing::info;

fn parse_id(raw: &str, request_id: &str) -> Result<SecurityId, ApiError> {
    SecurityId::parse(raw)
        .map_err(|_| ApiError::invalid_param("id", raw).with_request_id(request_id))
}

pub(crate) async fn list_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<BTreeMap<String, String>>,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    info!(request_id = %request_id, route = "/v1/securities", "request start");

    let params = match parse_list_params_with_limit(
        &query,
        state.api.default_page_size,
        state.api.max_page_size,
    ) {
        Ok(p) => p,
        Err(e) => {
            let resp = api_error_response(e.with_request_id(&request_id));
            return finish(&state, "/v1/securities", &request_id, started, resp).await;
        }
    };

    let mut securities = match state.store.list_securities().await {
        Ok(list) => list,
        Err(e) => {
            let resp = api_error_response(store_error(e).with_request_id(&request_id));
            return finish(&state, "/v1/securities", &request_id, started, resp).await;
        }
    };

    if let Some(kind) = &params.kind {
        securities.retain(|s| s.kind.as_str() == kind.as_str());
    }
    securities.sort_by(|a, b| a.id.cmp(&b.id));
    if params.sort_order == SortOrder::Desc {
        securities.reverse();
    }

    let total = securities.len();
    let (start, end) = params.page_bounds(total);
    let page: Vec<Security> = securities[start..end].to_vec();
    let resp = paged_response(
        page,
        PageMetadata::for_page(params.page, params.page_size, total),
    );
    finish(&state, "/v1/securities", &request_id, started, resp).await
}

pub(crate) async fn create_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let resp = match decode_body::<SecurityDraft>(&body) {
        Ok(draft) => {
            let id = state.store.next_id("security");
            match SecurityId::parse(&id) {
                Ok(id) => {
                    let record = draft.into_record(id, OffsetDateTime::now_utc());
                    match state.store.create_security(record).await {
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
    finish(&state, "/v1/securities", &request_id, started, resp).await
}

pub(crate) async fn get_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let resp = match parse_id(&id, &request_id) {
        Ok(security_id) => match state.store.get_security(&security_id).await {
            Ok(security) => envelope_response(security),
            Err(e) => api_error_response(store_error(e).with_request_id(&request_id)),
        },
        Err(e) => api_error_response(e),
    };
    finish(&state, "/v1/securities/{id}", &request_id, started, resp).await
}

pub(crate) async fn update_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(patch): Json<Value>,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let resp = update_security(&state, &id, &patch, &request_id).await;
    finish(&state, "/v1/securities/{id}", &request_id, started, resp).await
}

async fn update_security(state: &AppState, id: &str, patch: &Value, request_id: &str) -> Response {
    let security_id = match parse_id(id, request_id) {
        Ok(v) => v,
        Err(e) => return api_error_response(e),
    };
    let existing = match state.store.get_security(&security_id).await {
        Ok(s) => s,
        Err(e) => return api_error_response(store_error(e).with_request_id(request_id)),
    };
    let mut merged: Security = match merge_record(&existing, patch) {
        Ok(m) => m,
        Err(e) => return api_error_response(e.with_request_id(request_id)),
    };
    merged.updated_at = Some(OffsetDateTime::now_utc());
    match state.store.update_security(merged).await {
        Ok(updated) => envelope_response(updated),
        Err(e) => api_error_response(store_error(e).with_request_id(request_id)),
    }
}
