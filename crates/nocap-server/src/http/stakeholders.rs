use super::support::{
    api_error_response, created_response, decode_body, envelope_response, finish, merge_record,
    paged_response, propagated_request_id, store_error,
};
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use nocap_api::{
    parse_list_params_with_limit, ApiError, PageMetadata, SortOrder, StakeholderDraft,
};
use nocap_model::{validate_stakeholder, Stakeholder, StakeholderId, StakeholderType};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Instant;
use time::OffsetDateTime;
use tracing::info;

fn parse_id(raw: &str, request_id: &str) -> Result<StakeholderId, ApiError> {
    StakeholderId::parse(raw)
        .map_err(|_| ApiError::invalid_param("id", raw).with_request_id(request_id))
}

fn validation_error(data: &Value, request_id: &str) -> Option<ApiError> {
    let report = validate_stakeholder(data);
    if report.valid {
        return None;
    }
    Some(
        ApiError::validation_failed(serde_json::to_value(&report.errors).unwrap_or(Value::Null))
            .with_request_id(request_id),
    )
}

pub(crate) async fn list_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<BTreeMap<String, String>>,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    info!(request_id = %request_id, route = "/v1/stakeholders", "request start");

    let params = match parse_list_params_with_limit(
        &query,
        state.api.default_page_size,
        state.api.max_page_size,
    ) {
        Ok(p) => p,
        Err(e) => {
            let resp = api_error_response(e.with_request_id(&request_id));
            return finish(&state, "/v1/stakeholders", &request_id, started, resp).await;
        }
    };

    let mut stakeholders = match state.store.list_stakeholders().await {
        Ok(list) => list,
        Err(e) => {
            let resp = api_error_response(store_error(e).with_request_id(&request_id));
            return finish(&state, "/v1/stakeholders", &request_id, started, resp).await;
        }
    };

    if let Some(kind) = &params.kind {
        match StakeholderType::parse(kind) {
            Some(wanted) => stakeholders.retain(|s| s.kind == wanted),
            None => {
                let resp = api_error_response(
                    ApiError::invalid_param("type", kind).with_request_id(&request_id),
                );
                return finish(&state, "/v1/stakeholders", &request_id, started, resp).await;
            }
        }
    }
    if let Some(status) = &params.status {
        stakeholders.retain(|s| s.kyc_status.as_str() == status.as_str());
    }
    if let Some(search) = &params.search {
        let needle = search.to_lowercase();
        stakeholders.retain(|s| {
            s.name.to_lowercase().contains(&needle) || s.email.to_lowercase().contains(&needle)
        });
    }

    match params.sort_by.as_deref() {
        None | Some("id") => stakeholders.sort_by(|a, b| a.id.cmp(&b.id)),
        Some("name") => stakeholders.sort_by(|a, b| a.name.cmp(&b.name)),
        Some(other) => {
            let resp =
                api_error_response(ApiError::invalid_param("sort_by", other).with_request_id(&request_id));
            return finish(&state, "/v1/stakeholders", &request_id, started, resp).await;
        }
    }
    if params.sort_order == SortOrder::Desc {
        stakeholders.reverse();
    }

    let total = stakeholders.len();
    let (start, end) = params.page_bounds(total);
    let page: Vec<Stakeholder> = stakeholders[start..end].to_vec();
    let resp = paged_response(
        page,
        PageMetadata::for_page(params.page, params.page_size, total),
    );
    finish(&state, "/v1/stakeholders", &request_id, started, resp).await
}

pub(crate) async fn create_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    info!(request_id = %request_id, route = "/v1/stakeholders", "create stakeholder");

    let resp = create_stakeholder(&state, &body, &request_id).await;
    finish(&state, "/v1/stakeholders", &request_id, started, resp).await
}

async fn create_stakeholder(state: &AppState, body: &Value, request_id: &str) -> Response {
    if let Some(err) = validation_error(body, request_id) {
        return api_error_response(err);
    }
    let draft: StakeholderDraft = match decode_body(body) {
        Ok(d) => d,
        Err(e) => return api_error_response(e.with_request_id(request_id)),
    };
    let id = state.store.next_id("stakeholder");
    let Ok(id) = StakeholderId::parse(&id) else {
        return api_error_response(
            ApiError::internal("generated id rejected").with_request_id(request_id),
        );
    };
    let record = draft.into_record(id, OffsetDateTime::now_utc());
    match state.store.create_stakeholder(record).await {
        Ok(created) => created_response(created),
        Err(e) => api_error_response(store_error(e).with_request_id(request_id)),
    }
}

pub(crate) async fn get_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let resp = match parse_id(&id, &request_id) {
        Ok(stakeholder_id) => match state.store.get_stakeholder(&stakeholder_id).await {
            Ok(stakeholder) => envelope_response(stakeholder),
            Err(e) => api_error_response(store_error(e).with_request_id(&request_id)),
        },
        Err(e) => api_error_response(e),
    };
    finish(&state, "/v1/stakeholders/{id}", &request_id, started, resp).await
}

pub(crate) async fn update_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(patch): Json<Value>,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let resp = update_stakeholder(&state, &id, &patch, &request_id).await;
    finish(&state, "/v1/stakeholders/{id}", &request_id, started, resp).await
}

async fn update_stakeholder(
    state: &AppState,
    id: &str,
    patch: &Value,
    request_id: &str,
) -> Response {
    let stakeholder_id = match parse_id(id, request_id) {
        Ok(v) => v,
        Err(e) => return api_error_response(e),
    };
    let existing = match state.store.get_stakeholder(&stakeholder_id).await {
        Ok(s) => s,
        Err(e) => return api_error_response(store_error(e).with_request_id(request_id)),
    };
    let mut merged: Stakeholder = match merge_record(&existing, patch) {
        Ok(m) => m,
        Err(e) => return api_error_response(e.with_request_id(request_id)),
    };
    let as_value = match serde_json::to_value(&merged) {
        Ok(v) => v,
        Err(e) => {
            return api_error_response(
                ApiError::internal(&e.to_string()).with_request_id(request_id),
            )
        }
    };
    if let Some(err) = validation_error(&as_value, request_id) {
        return api_error_response(err);
    }
    merged.updated_at = Some(OffsetDateTime::now_utc());
    match state.store.update_stakeholder(merged).await {
        Ok(updated) => envelope_response(updated),
        Err(e) => api_error_response(store_error(e).with_request_id(request_id)),
    }
}

pub(crate) async fn delete_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let resp = match parse_id(&id, &request_id) {
        Ok(stakeholder_id) => match state.store.delete_stakeholder(&stakeholder_id).await {
            Ok(()) => StatusCode::NO_CONTENT.into_response(),
            Err(e) => api_error_response(store_error(e).with_request_id(&request_id)),
        },
        Err(e) => api_error_response(e),
    };
    finish(&state, "/v1/stakeholders/{id}", &request_id, started, resp).await
}
