use super::support::{
    api_error_response, created_response, decode_body, envelope_response, finish, merge_record,
    paged_response, propagated_request_id, store_error,
};
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::Response;
use axum::Json;
use nocap_api::{
    parse_list_params_with_limit, ApiError, ApiErrorCode, ExerciseRequest, GrantDraft,
    PageMetadata, SortOrder,
};
use nocap_engine::{
    format_large_number, next_vesting_date, vested_quantity_for_grant, vesting_progress_pct,
};
use nocap_model::{
    validate_grant, Activity, ActivityId, ActivityType, Grant, GrantId, GrantStatus, StakeholderId,
    Transaction, TransactionId, TransactionStatus, TransactionType, VestingInterval,
};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::time::Instant;
use time::macros::format_description;
use time::{Date, OffsetDateTime};
use tracing::info;

fn parse_id(raw: &str, request_id: &str) -> Result<GrantId, ApiError> {
    GrantId::parse(raw).map_err(|_| ApiError::invalid_param("id", raw).with_request_id(request_id))
}

fn validation_error(data: &Value, request_id: &str) -> Option<ApiError> {
    let report = validate_grant(data);
    if report.valid {
        return None;
    }
    Some(
        ApiError::validation_failed(serde_json::to_value(&report.errors).unwrap_or(Value::Null))
            .with_request_id(request_id),
    )
}

/// The schedule interval on the grant's schedule, defaulting to monthly.
async fn grant_interval(state: &AppState, grant: &Grant) -> VestingInterval {
    if let Some(schedule_id) = &grant.vesting_schedule_id {
        if let Ok(schedule) = state.store.get_schedule(schedule_id).await {
            return schedule.vesting_interval;
        }
    }
    VestingInterval::Monthly
}

pub(crate) async fn list_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<BTreeMap<String, String>>,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    info!(request_id = %request_id, route = "/v1/grants", "request start");

    let params = match parse_list_params_with_limit(
        &query,
        state.api.default_page_size,
        state.api.max_page_size,
    ) {
        Ok(p) => p,
        Err(e) => {
            let resp = api_error_response(e.with_request_id(&request_id));
            return finish(&state, "/v1/grants", &request_id, started, resp).await;
        }
    };

    let listed = match &params.stakeholder_id {
        Some(raw) => match StakeholderId::parse(raw) {
            Ok(owner) => state.store.list_grants_for_stakeholder(&owner).await,
            Err(_) => {
                let resp = api_error_response(
                    ApiError::invalid_param("stakeholder_id", raw).with_request_id(&request_id),
                );
                return finish(&state, "/v1/grants", &request_id, started, resp).await;
            }
        },
        None => state.store.list_grants().await,
    };
    let mut grants = match listed {
        Ok(list) => list,
        Err(e) => {
            let resp = api_error_response(store_error(e).with_request_id(&request_id));
            return finish(&state, "/v1/grants", &request_id, started, resp).await;
        }
    };

    if let Some(status) = &params.status {
        grants.retain(|g| g.status.as_str() == status.as_str());
    }
    grants.sort_by(|a, b| a.id.cmp(&b.id));
    if params.sort_order == SortOrder::Desc {
        grants.reverse();
    }

    let total = grants.len();
    let (start, end) = params.page_bounds(total);
    let page: Vec<Grant> = grants[start..end].to_vec();
    let resp = paged_response(
        page,
        PageMetadata::for_page(params.page, params.page_size, total),
    );
    finish(&state, "/v1/grants", &request_id, started, resp).await
}

pub(crate) async fn create_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    info!(request_id = %request_id, route = "/v1/grants", "issue grant");
    let resp = create_grant(&state, &body, &request_id).await;
    finish(&state, "/v1/grants", &request_id, started, resp).await
}

async fn create_grant(state: &AppState, body: &Value, request_id: &str) -> Response {
    // Drafts may omit vested_quantity; validate with the default filled in.
    let mut for_validation = body.clone();
    if let Some(map) = for_validation.as_object_mut() {
        map.entry("vested_quantity").or_insert(json!(0));
        map.entry("status").or_insert(json!("active"));
    }
    if let Some(err) = validation_error(&for_validation, request_id) {
        return api_error_response(err);
    }
    let draft: GrantDraft = match decode_body(body) {
        Ok(d) => d,
        Err(e) => return api_error_response(e.with_request_id(request_id)),
    };
    let id = state.store.next_id("grant");
    let Ok(id) = GrantId::parse(&id) else {
        return api_error_response(
            ApiError::internal("generated id rejected").with_request_id(request_id),
        );
    };
    let record = draft.into_record(id, OffsetDateTime::now_utc());
    let created = match state.store.create_grant(record).await {
        Ok(g) => g,
        Err(e) => return api_error_response(store_error(e).with_request_id(request_id)),
    };

    let recipient = state.store.find_stakeholder(&created.stakeholder_id).await;
    let message = format!(
        "Issued {} shares to {}",
        format_large_number(created.quantity),
        recipient.map_or_else(|| created.stakeholder_id.to_string(), |s| s.name),
    );
    let activity = Activity {
        id: activity_id(state),
        kind: ActivityType::GrantIssued,
        company_id: created.company_id.clone(),
        actor_id: Some(created.stakeholder_id.clone()),
        message,
        details: Some(json!({"grant_id": created.id, "quantity": created.quantity})),
        tx_hash: None,
        timestamp: OffsetDateTime::now_utc(),
    };
    if let Err(e) = state.store.record_activity(activity).await {
        info!(request_id = %request_id, error = %e, "activity record skipped");
    }
    created_response(created)
}

fn activity_id(state: &AppState) -> ActivityId {
    let raw = state.store.next_id("act");
    ActivityId::parse(&raw).unwrap_or_else(|_| ActivityId::parse("act-0").expect("static id"))
}

pub(crate) async fn get_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let resp = match parse_id(&id, &request_id) {
        Ok(grant_id) => match state.store.get_grant(&grant_id).await {
            Ok(grant) => envelope_response(grant),
            Err(e) => api_error_response(store_error(e).with_request_id(&request_id)),
        },
        Err(e) => api_error_response(e),
    };
    finish(&state, "/v1/grants/{id}", &request_id, started, resp).await
}

pub(crate) async fn update_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(patch): Json<Value>,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let resp = update_grant(&state, &id, &patch, &request_id).await;
    finish(&state, "/v1/grants/{id}", &request_id, started, resp).await
}

async fn update_grant(state: &AppState, id: &str, patch: &Value, request_id: &str) -> Response {
    let grant_id = match parse_id(id, request_id) {
        Ok(v) => v,
        Err(e) => return api_error_response(e),
    };
    let existing = match state.store.get_grant(&grant_id).await {
        Ok(g) => g,
        Err(e) => return api_error_response(store_error(e).with_request_id(request_id)),
    };
    let mut merged: Grant = match merge_record(&existing, patch) {
        Ok(m) => m,
        Err(e) => return api_error_response(e.with_request_id(request_id)),
    };
    let as_value = match serde_json::to_value(&merged) {
        Ok(v) => v,
        Err(e) => {
            return api_error_response(ApiError::internal(&e.to_string()).with_request_id(request_id))
        }
    };
    if let Some(err) = validation_error(&as_value, request_id) {
        return api_error_response(err);
    }
    merged.updated_at = Some(OffsetDateTime::now_utc());
    match state.store.update_grant(merged).await {
        Ok(updated) => envelope_response(updated),
        Err(e) => api_error_response(store_error(e).with_request_id(request_id)),
    }
}

pub(crate) async fn vesting_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(query): Query<BTreeMap<String, String>>,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let resp = vesting_report(&state, &id, &query, &request_id).await;
    finish(&state, "/v1/grants/{id}/vesting", &request_id, started, resp).await
}

async fn vesting_report(
    state: &AppState,
    id: &str,
    query: &BTreeMap<String, String>,
    request_id: &str,
) -> Response {
    let grant_id = match parse_id(id, request_id) {
        Ok(v) => v,
        Err(e) => return api_error_response(e),
    };
    let as_of = match query.get("as_of") {
        Some(raw) => {
            let format = format_description!("[year]-[month]-[day]");
            match Date::parse(raw, &format) {
                Ok(date) => date,
                Err(_) => {
                    return api_error_response(
                        ApiError::invalid_param("as_of", raw).with_request_id(request_id),
                    )
                }
            }
        }
        None => OffsetDateTime::now_utc().date(),
    };
    let grant = match state.store.get_grant(&grant_id).await {
        Ok(g) => g,
        Err(e) => return api_error_response(store_error(e).with_request_id(request_id)),
    };
    let interval = grant_interval(state, &grant).await;
    envelope_response(json!({
        "grant_id": grant.id,
        "as_of": as_of,
        "vested_quantity": vested_quantity_for_grant(&grant, as_of),
        "progress_pct": vesting_progress_pct(&grant, as_of),
        "next_vesting_date": next_vesting_date(as_of, grant.vest_end, interval),
    }))
}

pub(crate) async fn exercise_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    info!(request_id = %request_id, route = "/v1/grants/{id}/exercise", "exercise grant");
    let resp = exercise_grant(&state, &id, &body, &request_id).await;
    finish(&state, "/v1/grants/{id}/exercise", &request_id, started, resp).await
}

async fn exercise_grant(state: &AppState, id: &str, body: &Value, request_id: &str) -> Response {
    let grant_id = match parse_id(id, request_id) {
        Ok(v) => v,
        Err(e) => return api_error_response(e),
    };
    let request: ExerciseRequest = match decode_body(body) {
        Ok(r) => r,
        Err(e) => return api_error_response(e.with_request_id(request_id)),
    };
    let grant = match state.store.get_grant(&grant_id).await {
        Ok(g) => g,
        Err(e) => return api_error_response(store_error(e).with_request_id(request_id)),
    };
    if grant.status != GrantStatus::Active {
        let err = ApiError::new(
            ApiErrorCode::Conflict,
            format!("grant {} is not active", grant.id),
            json!({"status": grant.status.as_str()}),
            request_id,
        );
        return api_error_response(err);
    }
    if request.quantity == 0 || request.quantity > grant.exercisable_quantity() {
        let err = ApiError::validation_failed(json!([{
            "field": "quantity",
            "message": format!(
                "quantity must be between 1 and the exercisable balance of {}",
                grant.exercisable_quantity()
            ),
        }]))
        .with_request_id(request_id);
        return api_error_response(err);
    }

    let now = OffsetDateTime::now_utc();
    let tx_id_raw = state.store.next_id("tx");
    let Ok(tx_id) = TransactionId::parse(&tx_id_raw) else {
        return api_error_response(
            ApiError::internal("generated id rejected").with_request_id(request_id),
        );
    };
    let transaction = Transaction {
        id: tx_id,
        kind: TransactionType::Exercise,
        from_stakeholder_id: None,
        to_stakeholder_id: grant.stakeholder_id.clone(),
        security_id: grant.security_id.clone(),
        quantity: request.quantity,
        price_per_share_cents: grant.strike_price_cents,
        total_value_cents: grant
            .strike_price_cents
            .map(|strike| strike.saturating_mul(request.quantity)),
        grant_id: Some(grant.id.clone()),
        transaction_date: now,
        tx_hash: None,
        status: TransactionStatus::Completed,
        notes: None,
        created_at: Some(now),
        updated_at: Some(now),
    };
    let transaction = match state.store.create_transaction(transaction).await {
        Ok(t) => t,
        Err(e) => return api_error_response(store_error(e).with_request_id(request_id)),
    };

    let mut updated = grant.clone();
    updated.exercised_quantity += request.quantity;
    updated.updated_at = Some(now);
    if let Err(e) = state.store.update_grant(updated).await {
        return api_error_response(store_error(e).with_request_id(request_id));
    }

    let holder = state.store.find_stakeholder(&grant.stakeholder_id).await;
    let activity = Activity {
        id: activity_id(state),
        kind: ActivityType::Exercise,
        company_id: grant.company_id.clone(),
        actor_id: Some(grant.stakeholder_id.clone()),
        message: format!(
            "{} exercised {} options",
            holder.map_or_else(|| grant.stakeholder_id.to_string(), |s| s.name),
            format_large_number(request.quantity),
        ),
        details: Some(json!({"grant_id": grant.id, "quantity": request.quantity})),
        tx_hash: None,
        timestamp: now,
    };
    if let Err(e) = state.store.record_activity(activity).await {
        info!(request_id = %request_id, error = %e, "activity record skipped");
    }
    created_response(transaction)
}

pub(crate) async fn cancel_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let resp = cancel_grant(&state, &id, &request_id).await;
    finish(&state, "/v1/grants/{id}/cancel", &request_id, started, resp).await
}

async fn cancel_grant(state: &AppState, id: &str, request_id: &str) -> Response {
    let grant_id = match parse_id(id, request_id) {
        Ok(v) => v,
        Err(e) => return api_error_response(e),
    };
    let grant = match state.store.get_grant(&grant_id).await {
        Ok(g) => g,
        Err(e) => return api_error_response(store_error(e).with_request_id(request_id)),
    };
    let mut cancelled = grant;
    cancelled.status = GrantStatus::Cancelled;
    cancelled.updated_at = Some(OffsetDateTime::now_utc());
    match state.store.update_grant(cancelled).await {
        Ok(updated) => envelope_response(updated),
        Err(e) => api_error_response(store_error(e).with_request_id(request_id)),
    }
}
