use super::support::{
    api_error_response, created_response, decode_body, envelope_response, finish, paged_response,
    propagated_request_id, store_error,
};
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::Response;
use axum::Json;
use nocap_api::{
    parse_list_params_with_limit, ApiError, PageMetadata, SortOrder, TransactionDraft,
    TransferPreviewRequest,
};
use nocap_engine::{evaluate_transfer, transaction_summary, RuleCheckRequest};
use nocap_model::{
    validate_transaction, Activity, ActivityId, ActivityType, CompanyId, SecurityId, Stakeholder,
    StakeholderId, Transaction, TransactionId, TransactionType,
};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::time::Instant;
use time::OffsetDateTime;
use tracing::info;

fn parse_id(raw: &str, request_id: &str) -> Result<TransactionId, ApiError> {
    TransactionId::parse(raw)
        .map_err(|_| ApiError::invalid_param("id", raw).with_request_id(request_id))
}

pub(crate) async fn list_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<BTreeMap<String, String>>,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    info!(request_id = %request_id, route = "/v1/transactions", "request start");

    let params = match parse_list_params_with_limit(
        &query,
        state.api.default_page_size,
        state.api.max_page_size,
    ) {
        Ok(p) => p,
        Err(e) => {
            let resp = api_error_response(e.with_request_id(&request_id));
            return finish(&state, "/v1/transactions", &request_id, started, resp).await;
        }
    };

    let listed = match &params.stakeholder_id {
        Some(raw) => match StakeholderId::parse(raw) {
            Ok(party) => {
                state
                    .store
                    .list_transactions_for_stakeholder(&party)
                    .await
            }
            Err(_) => {
                let resp = api_error_response(
                    ApiError::invalid_param("stakeholder_id", raw).with_request_id(&request_id),
                );
                return finish(&state, "/v1/transactions", &request_id, started, resp).await;
            }
        },
        None => state.store.list_transactions().await,
    };
    let mut transactions = match listed {
        Ok(list) => list,
        Err(e) => {
            let resp = api_error_response(store_error(e).with_request_id(&request_id));
            return finish(&state, "/v1/transactions", &request_id, started, resp).await;
        }
    };

    if let Some(kind) = &params.kind {
        transactions.retain(|t| t.kind.as_str() == kind.as_str());
    }
    transactions.sort_by(|a, b| a.transaction_date.cmp(&b.transaction_date));
    if params.sort_order == SortOrder::Desc {
        transactions.reverse();
    }

    let total = transactions.len();
    let (start, end) = params.page_bounds(total);
    let page: Vec<Transaction> = transactions[start..end].to_vec();
    let resp = paged_response(
        page,
        PageMetadata::for_page(params.page, params.page_size, total),
    );
    finish(&state, "/v1/transactions", &request_id, started, resp).await
}

pub(crate) async fn get_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let resp = match parse_id(&id, &request_id) {
        Ok(tx_id) => match state.store.get_transaction(&tx_id).await {
            Ok(tx) => envelope_response(tx),
            Err(e) => api_error_response(store_error(e).with_request_id(&request_id)),
        },
        Err(e) => api_error_response(e),
    };
    finish(&state, "/v1/transactions/{id}", &request_id, started, resp).await
}

pub(crate) async fn create_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    info!(request_id = %request_id, route = "/v1/transactions", "create transaction");
    let resp = create_transaction(&state, &body, &request_id).await;
    finish(&state, "/v1/transactions", &request_id, started, resp).await
}

async fn create_transaction(state: &AppState, body: &Value, request_id: &str) -> Response {
    // Created transactions are stamped completed; validate with that default.
    let mut for_validation = body.clone();
    if let Some(map) = for_validation.as_object_mut() {
        map.entry("status").or_insert(json!("completed"));
    }
    let report = validate_transaction(&for_validation);
    if !report.valid {
        let err = ApiError::validation_failed(
            serde_json::to_value(&report.errors).unwrap_or(Value::Null),
        )
        .with_request_id(request_id);
        return api_error_response(err);
    }
    let draft: TransactionDraft = match decode_body(body) {
        Ok(d) => d,
        Err(e) => return api_error_response(e.with_request_id(request_id)),
    };
    let id = state.store.next_id("tx");
    let Ok(id) = TransactionId::parse(&id) else {
        return api_error_response(
            ApiError::internal("generated id rejected").with_request_id(request_id),
        );
    };
    let record = draft.into_record(id, OffsetDateTime::now_utc());
    let created = match state.store.create_transaction(record).await {
        Ok(t) => t,
        Err(e) => return api_error_response(store_error(e).with_request_id(request_id)),
    };

    if created.kind == TransactionType::Transfer {
        record_transfer_activity(state, &created, request_id).await;
    }
    created_response(created)
}

/// The demo has no company field on transactions; recover it from the grant
/// ledger for the transferred security, when one exists.
async fn company_for_security(state: &AppState, security: &SecurityId) -> Option<CompanyId> {
    let grants = state.store.list_grants().await.ok()?;
    grants
        .into_iter()
        .find(|g| &g.security_id == security)
        .map(|g| g.company_id)
}

async fn record_transfer_activity(state: &AppState, tx: &Transaction, request_id: &str) {
    let Some(company_id) = company_for_security(state, &tx.security_id).await else {
        return;
    };
    let mut directory: BTreeMap<StakeholderId, Stakeholder> = BTreeMap::new();
    for id in [Some(&tx.to_stakeholder_id), tx.from_stakeholder_id.as_ref()]
        .into_iter()
        .flatten()
    {
        if let Some(party) = state.store.find_stakeholder(id).await {
            directory.insert(id.clone(), party);
        }
    }
    let raw = state.store.next_id("act");
    let Ok(id) = ActivityId::parse(&raw) else {
        return;
    };
    let activity = Activity {
        id,
        kind: ActivityType::Transfer,
        company_id,
        actor_id: tx.from_stakeholder_id.clone(),
        message: transaction_summary(tx, &directory),
        details: Some(json!({"transaction_id": tx.id, "quantity": tx.quantity})),
        tx_hash: tx.tx_hash.clone(),
        timestamp: tx.transaction_date,
    };
    if let Err(e) = state.store.record_activity(activity).await {
        info!(request_id = %request_id, error = %e, "activity record skipped");
    }
}

pub(crate) async fn preview_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    info!(request_id = %request_id, route = "/v1/transactions/preview", "preview transfer");

    let resp = match decode_body::<TransferPreviewRequest>(&body) {
        Ok(preview) => {
            let sender = state.store.find_stakeholder(&preview.from_stakeholder_id).await;
            let recipient = state.store.find_stakeholder(&preview.to_stakeholder_id).await;
            let request = RuleCheckRequest {
                from: preview.from_stakeholder_id.to_string(),
                to: preview.to_stakeholder_id.to_string(),
                security: preview.security_id.to_string(),
                quantity: preview.quantity,
            };
            envelope_response(evaluate_transfer(
                &request,
                sender.as_ref(),
                recipient.as_ref(),
            ))
        }
        Err(e) => api_error_response(e.with_request_id(&request_id)),
    };
    finish(&state, "/v1/transactions/preview", &request_id, started, resp).await
}
