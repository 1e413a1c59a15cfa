use super::support::{
    api_error_response, created_response, decode_body, envelope_response, finish, paged_response,
    propagated_request_id, store_error,
};
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::Response;
use axum::Json;
use nocap_api::{parse_list_params_with_limit, ApiError, PageMetadata, ScheduleDraft, SortOrder};
use nocap_model::{ScheduleId, VestingSchedule};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Instant;
use time::OffsetDateTime;
use tracing::info;

fn parse_id(raw: &str, request_id: &str) -> Result<ScheduleId, ApiError> {
    ScheduleId::parse(raw)
        .map_err(|_| ApiError::invalid_param("id", raw).with_request_id(request_id))
}

pub(crate) async fn list_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<BTreeMap<String, String>>,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    info!(request_id = %request_id, route = "/v1/vesting-schedules", "request start");

    let params = match parse_list_params_with_limit(
        &query,
        state.api.default_page_size,
        state.api.max_page_size,
    ) {
        Ok(p) => p,
        Err(e) => {
            let resp = api_error_response(e.with_request_id(&request_id));
            return finish(&state, "/v1/vesting-schedules", &request_id, started, resp).await;
        }
    };

    let mut schedules = match state.store.list_schedules().await {
        Ok(list) => list,
        Err(e) => {
            let resp = api_error_response(store_error(e).with_request_id(&request_id));
            return finish(&state, "/v1/vesting-schedules", &request_id, started, resp).await;
        }
    };
    schedules.sort_by(|a, b| a.id.cmp(&b.id));
    if params.sort_order == SortOrder::Desc {
        schedules.reverse();
    }

    let total = schedules.len();
    let (start, end) = params.page_bounds(total);
    let page: Vec<VestingSchedule> = schedules[start..end].to_vec();
    let resp = paged_response(
        page,
        PageMetadata::for_page(params.page, params.page_size, total),
    );
    finish(&state, "/v1/vesting-schedules", &request_id, started, resp).await
}

pub(crate) async fn create_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let resp = match decode_body::<ScheduleDraft>(&body) {
        Ok(draft) if draft.duration_months == 0 => api_error_response(
            ApiError::validation_failed(serde_json::json!([{
                "field": "duration_months",
                "message": "duration must be at least one month",
            }]))
            .with_request_id(&request_id),
        ),
        Ok(draft) => {
            let id = state.store.next_id("schedule");
            match ScheduleId::parse(&id) {
                Ok(id) => {
                    let record = draft.into_record(id, OffsetDateTime::now_utc());
                    match state.store.create_schedule(record).await {
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
    finish(&state, "/v1/vesting-schedules", &request_id, started, resp).await
}

pub(crate) async fn get_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let resp = match parse_id(&id, &request_id) {
        Ok(schedule_id) => match state.store.get_schedule(&schedule_id).await {
            Ok(schedule) => envelope_response(schedule),
            Err(e) => api_error_response(store_error(e).with_request_id(&request_id)),
        },
        Err(e) => api_error_response(e),
    };
    finish(&state, "/v1/vesting-schedules/{id}", &request_id, started, resp).await
}
