use super::support::{
    api_error_response, envelope_response, finish, merge_record, paged_response,
    propagated_request_id, store_error,
};
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::Response;
use axum::Json;
use nocap_api::{parse_list_params_with_limit, ApiError, PageMetadata, SortOrder};
use nocap_model::{validate_company, Company, CompanyId};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::time::Instant;
use time::OffsetDateTime;
use tracing::info;

fn parse_company_id(raw: &str, request_id: &str) -> Result<CompanyId, ApiError> {
    CompanyId::parse(raw)
        .map_err(|_| ApiError::invalid_param("id", raw).with_request_id(request_id))
}

pub(crate) async fn list_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<BTreeMap<String, String>>,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    info!(request_id = %request_id, route = "/v1/companies", "request start");

    let params = match parse_list_params_with_limit(
        &query,
        state.api.default_page_size,
        state.api.max_page_size,
    ) {
        Ok(p) => p,
        Err(e) => {
            let resp = api_error_response(e.with_request_id(&request_id));
            return finish(&state, "/v1/companies", &request_id, started, resp).await;
        }
    };

    let mut companies = match state.store.list_companies().await {
        Ok(list) => list,
        Err(e) => {
            let resp = api_error_response(store_error(e).with_request_id(&request_id));
            return finish(&state, "/v1/companies", &request_id, started, resp).await;
        }
    };

    if let Some(search) = &params.search {
        let needle = search.to_lowercase();
        companies.retain(|c| c.name.to_lowercase().contains(&needle));
    }
    companies.sort_by(|a, b| a.id.cmp(&b.id));
    if params.sort_order == SortOrder::Desc {
        companies.reverse();
    }

    let total = companies.len();
    let (start, end) = params.page_bounds(total);
    let page: Vec<Company> = companies[start..end].to_vec();
    let resp = paged_response(
        page,
        PageMetadata::for_page(params.page, params.page_size, total),
    );
    finish(&state, "/v1/companies", &request_id, started, resp).await
}

pub(crate) async fn get_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let resp = match parse_company_id(&id, &request_id) {
        Ok(company_id) => match state.store.get_company(&company_id).await {
            Ok(company) => envelope_response(company),
            Err(e) => api_error_response(store_error(e).with_request_id(&request_id)),
        },
        Err(e) => api_error_response(e),
    };
    finish(&state, "/v1/companies/{id}", &request_id, started, resp).await
}

pub(crate) async fn update_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(patch): Json<Value>,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let resp = update_company(&state, &id, &patch, &request_id).await;
    finish(&state, "/v1/companies/{id}", &request_id, started, resp).await
}

async fn update_company(
    state: &AppState,
    id: &str,
    patch: &Value,
    request_id: &str,
) -> Response {
    let company_id = match parse_company_id(id, request_id) {
        Ok(v) => v,
        Err(e) => return api_error_response(e),
    };
    let existing = match state.store.get_company(&company_id).await {
        Ok(c) => c,
        Err(e) => return api_error_response(store_error(e).with_request_id(request_id)),
    };
    let mut merged: Company = match merge_record(&existing, patch) {
        Ok(m) => m,
        Err(e) => return api_error_response(e.with_request_id(request_id)),
    };
    let report = validate_company(&json!({
        "name": merged.name,
        "valuation_usd_cents": merged.valuation_usd_cents,
        "stage": merged.stage,
        "sector": merged.sector,
    }));
    if !report.valid {
        let err = ApiError::validation_failed(
            serde_json::to_value(&report.errors).unwrap_or(Value::Null),
        )
        .with_request_id(request_id);
        return api_error_response(err);
    }
    merged.updated_at = Some(OffsetDateTime::now_utc());
    match state.store.update_company(merged).await {
        Ok(company) => envelope_response(company),
        Err(e) => api_error_response(store_error(e).with_request_id(request_id)),
    }
}
