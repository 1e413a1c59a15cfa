use crate::AppState;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, Uri};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use nocap_api::{map_error, ApiError, ApiErrorCode, ApiResponseEnvelope, PageMetadata};
use nocap_store::StoreError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::sync::atomic::Ordering;
use std::time::Instant;

pub(crate) fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

pub(crate) fn make_request_id(state: &AppState) -> String {
    let id = state.request_id_seed.fetch_add(1, Ordering::Relaxed);
    format!("req-{id:016x}")
}

pub(crate) fn propagated_request_id(headers: &HeaderMap, state: &AppState) -> String {
    if let Some(raw) = headers.get("x-request-id").and_then(|v| v.to_str().ok()) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    make_request_id(state)
}

pub(crate) fn with_request_id(mut response: Response, request_id: &str) -> Response {
    if let Ok(v) = HeaderValue::from_str(request_id) {
        response.headers_mut().insert("x-request-id", v);
    }
    response
}

pub(crate) fn api_error_response(err: ApiError) -> Response {
    let status = StatusCode::from_u16(map_error(&err).status_code)
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(json!({"error": err}))).into_response()
}

pub(crate) fn envelope_response<T: Serialize>(data: T) -> Response {
    Json(ApiResponseEnvelope::bare(data)).into_response()
}

pub(crate) fn created_response<T: Serialize>(data: T) -> Response {
    (
        StatusCode::CREATED,
        Json(ApiResponseEnvelope::bare(data)),
    )
        .into_response()
}

pub(crate) fn paged_response<T: Serialize>(data: T, metadata: PageMetadata) -> Response {
    Json(ApiResponseEnvelope::paged(data, metadata)).into_response()
}

pub(crate) fn store_error(err: StoreError) -> ApiError {
    match err {
        StoreError::NotFound { entity, id } => ApiError::not_found(entity, &id),
        StoreError::Injected => ApiError::internal("simulated server error"),
        _ => ApiError::internal("unknown store error"),
    }
}

/// Record the request in the metrics table and stamp the request id.
pub(crate) async fn finish(
    state: &AppState,
    route: &'static str,
    request_id: &str,
    started: Instant,
    response: Response,
) -> Response {
    state
        .metrics
        .observe_request(route, response.status(), started.elapsed())
        .await;
    with_request_id(response, request_id)
}

/// Shallow merge of a JSON object patch into an existing record, id kept.
pub(crate) fn merge_record<T>(existing: &T, patch: &Value) -> Result<T, ApiError>
where
    T: Serialize + DeserializeOwned,
{
    let mut base = serde_json::to_value(existing)
        .map_err(|e| ApiError::internal(&format!("record serialization failed: {e}")))?;
    let Some(patch_map) = patch.as_object() else {
        return Err(ApiError::invalid_body("patch body must be a JSON object"));
    };
    let Some(base_map) = base.as_object_mut() else {
        return Err(ApiError::internal("record is not a JSON object"));
    };
    let id = base_map.get("id").cloned();
    for (key, value) in patch_map {
        if value.is_null() {
            base_map.remove(key);
        } else {
            base_map.insert(key.clone(), value.clone());
        }
    }
    if let Some(id) = id {
        base_map.insert("id".to_string(), id);
    }
    serde_json::from_value(base).map_err(|e| ApiError::invalid_body(&e.to_string()))
}

pub(crate) fn decode_body<T: DeserializeOwned>(body: &Value) -> Result<T, ApiError> {
    serde_json::from_value(body.clone()).map_err(|e| ApiError::invalid_body(&e.to_string()))
}

/// Catch-all for methods a resource does not support.
pub(crate) async fn method_not_allowed_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
) -> Response {
    let request_id = make_request_id(&state);
    let err = ApiError::method_not_allowed(method.as_str(), uri.path())
        .with_request_id(&request_id);
    with_request_id(api_error_response(err), &request_id)
}

/// Reject new work while the server drains for shutdown.
pub(crate) async fn drain_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if !state.accepting_requests.load(Ordering::Relaxed) {
        let err = ApiError::new(
            ApiErrorCode::NotReady,
            "server is draining",
            Value::Object(serde_json::Map::new()),
            make_request_id(&state),
        );
        return api_error_response(err);
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use nocap_model::{KycStatus, Stakeholder, StakeholderId, StakeholderType};

    fn stakeholder() -> Stakeholder {
        Stakeholder {
            id: StakeholderId::parse("emp-001").expect("id"),
            name: "Jane Doe".to_string(),
            email: "jane@acme.io".to_string(),
            kind: StakeholderType::Employee,
            kyc_status: KycStatus::Verified,
            address: None,
            wallet_address: None,
            tax_id: None,
            accreditation_status: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn merge_overwrites_fields_but_keeps_id() {
        let patched: Stakeholder = merge_record(
            &stakeholder(),
            &json!({"name": "Jane Q. Doe", "id": "evil-override"}),
        )
        .expect("merge");
        assert_eq!(patched.name, "Jane Q. Doe");
        assert_eq!(patched.id.as_str(), "emp-001");
        assert_eq!(patched.email, "jane@acme.io");
    }

    #[test]
    fn merge_null_clears_optional_fields() {
        let mut base = stakeholder();
        base.tax_id = Some("12-3456".to_string());
        let patched: Stakeholder =
            merge_record(&base, &json!({"tax_id": null})).expect("merge");
        assert_eq!(patched.tax_id, None);
    }

    #[test]
    fn merge_rejects_non_object_patch() {
        let err = merge_record::<Stakeholder>(&stakeholder(), &json!("nope")).expect_err("patch");
        assert_eq!(err.code, ApiErrorCode::InvalidBody);
    }

    #[test]
    fn sha256_hex_is_stable() {
        assert_eq!(
            sha256_hex(b"nocap"),
            sha256_hex(b"nocap"),
        );
        assert_eq!(sha256_hex(b"nocap").len(), 64);
    }
}
