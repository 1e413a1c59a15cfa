use super::support::{
    api_error_response, decode_body, envelope_response, finish, propagated_request_id, sha256_hex,
};
use crate::session::{issue_token, verify_token};
use crate::AppState;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Response;
use axum::Json;
use nocap_api::{ApiError, ConnectWalletRequest, LoginRequest};
use nocap_engine::short_address;
use nocap_model::{AuthSession, Wallet};
use serde_json::{json, Value};
use std::sync::atomic::Ordering;
use std::time::Instant;
use time::OffsetDateTime;
use tracing::info;

/// Deterministically derived `0x` address; the original rolled dice, the
/// demo server hashes a process-unique counter instead.
fn generate_wallet(state: &AppState, provider: &str) -> Wallet {
    let seed = state.address_seed.fetch_add(1, Ordering::Relaxed);
    let digest = sha256_hex(format!("{provider}:{seed}").as_bytes());
    let address = format!("0x{}", &digest[..40]);
    Wallet {
        short_address: short_address(&address),
        address,
        provider: provider.to_string(),
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|raw| raw.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

pub(crate) async fn connect_wallet_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let resp = match decode_body::<ConnectWalletRequest>(&body) {
        Ok(request) => envelope_response(generate_wallet(&state, &request.provider)),
        Err(e) => api_error_response(e.with_request_id(&request_id)),
    };
    finish(&state, "/v1/auth/wallet/connect", &request_id, started, resp).await
}

pub(crate) async fn login_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    info!(request_id = %request_id, route = "/v1/auth/login", "login");

    let resp = match decode_body::<LoginRequest>(&body) {
        Ok(request) => {
            let wallet = request
                .wallet
                .unwrap_or_else(|| generate_wallet(&state, "wallet"));
            let session = AuthSession {
                is_authenticated: true,
                wallet: Some(wallet),
                role: request.role,
                issued_at: OffsetDateTime::now_utc(),
            };
            match issue_token(&session, state.api.session_secret.as_bytes()) {
                Ok(token) => {
                    state
                        .sessions
                        .lock()
                        .await
                        .insert(token.clone(), session.clone());
                    envelope_response(json!({"token": token, "session": session}))
                }
                Err(e) => api_error_response(
                    ApiError::internal(&e.to_string()).with_request_id(&request_id),
                ),
            }
        }
        Err(e) => api_error_response(e.with_request_id(&request_id)),
    };
    finish(&state, "/v1/auth/login", &request_id, started, resp).await
}

pub(crate) async fn session_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let resp = current_session(&state, &headers, &request_id).await;
    finish(&state, "/v1/auth/session", &request_id, started, resp).await
}

async fn current_session(state: &AppState, headers: &HeaderMap, request_id: &str) -> Response {
    let Some(token) = bearer_token(headers) else {
        return api_error_response(
            ApiError::invalid_session("missing bearer token").with_request_id(request_id),
        );
    };
    if let Err(e) = verify_token(&token, state.api.session_secret.as_bytes()) {
        return api_error_response(
            ApiError::invalid_session(&e.to_string()).with_request_id(request_id),
        );
    }
    match state.sessions.lock().await.get(&token) {
        Some(session) => envelope_response(session.clone()),
        None => api_error_response(
            ApiError::invalid_session("session revoked or unknown").with_request_id(request_id),
        ),
    }
}

pub(crate) async fn logout_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let resp = match bearer_token(&headers) {
        Some(token) => {
            let removed = state.sessions.lock().await.remove(&token).is_some();
            envelope_response(json!({"logged_out": removed}))
        }
        None => api_error_response(
            ApiError::invalid_session("missing bearer token").with_request_id(&request_id),
        ),
    };
    finish(&state, "/v1/auth/logout", &request_id, started, resp).await
}
