// SPDX-License-Identifier: Apache-2.0

use nocap_server::{build_router, ApiConfig, AppState};
use nocap_store::{seed_demo, ChaosPolicy, EquityStore};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

async fn spawn_server() -> (std::net::SocketAddr, AppState) {
    let store = Arc::new(EquityStore::new(ChaosPolicy::default()));
    seed_demo(&store).await;
    let state = AppState::with_config(store, ApiConfig::default());
    state
        .ready
        .store(true, std::sync::atomic::Ordering::Relaxed);
    let app = build_router(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    (addr, state)
}

async fn send_raw(
    addr: std::net::SocketAddr,
    method: &str,
    path: &str,
    body: Option<&Value>,
    bearer: Option<&str>,
) -> (u16, String) {
    let mut stream = tokio::net::TcpStream::connect(addr)
        .await
        .expect("connect server");
    let payload = body.map(Value::to_string).unwrap_or_default();
    let mut req = format!("{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n");
    if let Some(token) = bearer {
        req.push_str(&format!("Authorization: Bearer {token}\r\n"));
    }
    if body.is_some() {
        req.push_str("Content-Type: application/json\r\n");
        req.push_str(&format!("Content-Length: {}\r\n", payload.len()));
    }
    req.push_str("\r\n");
    req.push_str(&payload);
    stream.write_all(req.as_bytes()).await.expect("write request");
    let mut response = String::new();
    stream
        .read_to_string(&mut response)
        .await
        .expect("read response");
    let (head, body) = response
        .split_once("\r\n\r\n")
        .expect("http response separator");
    let status = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|s| s.parse::<u16>().ok())
        .expect("status");
    (status, body.to_string())
}

fn parse_json(body: &str) -> Value {
    serde_json::from_str(body).expect("json body")
}

#[tokio::test]
async fn health_ready_and_version_respond() {
    let (addr, _state) = spawn_server().await;
    let (status, body) = send_raw(addr, "GET", "/healthz", None, None).await;
    assert_eq!((status, body.as_str()), (200, "ok"));
    let (status, body) = send_raw(addr, "GET", "/readyz", None, None).await;
    assert_eq!((status, body.as_str()), (200, "ready"));
    let (status, body) = send_raw(addr, "GET", "/v1/version", None, None).await;
    assert_eq!(status, 200);
    let payload = parse_json(&body);
    assert_eq!(payload["server"]["api_version"], "v1");
}

#[tokio::test]
async fn stakeholder_list_is_paged_and_enveloped() {
    let (addr, _state) = spawn_server().await;
    let (status, body) = send_raw(addr, "GET", "/v1/stakeholders", None, None).await;
    assert_eq!(status, 200);
    let payload = parse_json(&body);
    assert_eq!(payload["data"].as_array().expect("data array").len(), 3);
    assert_eq!(payload["metadata"]["total_count"], 3);
    assert_eq!(payload["metadata"]["page"], 1);
}

#[tokio::test]
async fn stakeholder_create_validates_and_round_trips() {
    let (addr, _state) = spawn_server().await;

    let invalid = json!({"name": "Bad Record", "kyc_status": "approved", "type": "employee"});
    let (status, body) = send_raw(addr, "POST", "/v1/stakeholders", Some(&invalid), None).await;
    assert_eq!(status, 400);
    let payload = parse_json(&body);
    let errors = payload["error"]["details"]["field_errors"]
        .as_array()
        .expect("field errors");
    assert_eq!(errors.len(), 2);

    let valid = json!({
        "name": "Ada Example",
        "email": "ada@acme.io",
        "type": "advisor",
        "kyc_status": "pending"
    });
    let (status, body) = send_raw(addr, "POST", "/v1/stakeholders", Some(&valid), None).await;
    assert_eq!(status, 201);
    let created = parse_json(&body);
    let id = created["data"]["id"].as_str().expect("created id");

    let (status, body) = send_raw(addr, "GET", &format!("/v1/stakeholders/{id}"), None, None).await;
    assert_eq!(status, 200);
    assert_eq!(parse_json(&body)["data"]["email"], "ada@acme.io");

    let patch = json!({"name": "Ada Q. Example"});
    let (status, body) = send_raw(
        addr,
        "PATCH",
        &format!("/v1/stakeholders/{id}"),
        Some(&patch),
        None,
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(parse_json(&body)["data"]["name"], "Ada Q. Example");

    let (status, _) =
        send_raw(addr, "DELETE", &format!("/v1/stakeholders/{id}"), None, None).await;
    assert_eq!(status, 204);
    let (status, body) =
        send_raw(addr, "GET", &format!("/v1/stakeholders/{id}"), None, None).await;
    assert_eq!(status, 404);
    assert_eq!(parse_json(&body)["error"]["code"], "NotFound");
}

#[tokio::test]
async fn unsupported_methods_return_405_envelopes() {
    let (addr, _state) = spawn_server().await;
    let (status, body) = send_raw(addr, "DELETE", "/v1/companies/acme-inc", None, None).await;
    assert_eq!(status, 405);
    assert_eq!(parse_json(&body)["error"]["code"], "MethodNotAllowed");
}

#[tokio::test]
async fn missing_company_is_a_404_envelope() {
    let (addr, _state) = spawn_server().await;
    let (status, body) = send_raw(addr, "GET", "/v1/companies/ghost-co", None, None).await;
    assert_eq!(status, 404);
    let payload = parse_json(&body);
    assert_eq!(payload["error"]["code"], "NotFound");
    assert!(payload["error"]["request_id"].as_str().is_some());
}

#[tokio::test]
async fn cap_table_grouping_preserves_share_totals() {
    let (addr, _state) = spawn_server().await;
    let (status, body) = send_raw(
        addr,
        "GET",
        "/v1/companies/acme-inc/cap-table?group_by=type",
        None,
        None,
    )
    .await;
    assert_eq!(status, 200);
    let payload = parse_json(&body);
    let entries = payload["data"]["cap_table"]["entries"]
        .as_array()
        .expect("entries");
    let raw_total: u64 = entries.iter().map(|e| e["shares"].as_u64().unwrap_or(0)).sum();
    let grouped_total: u64 = payload["data"]["by_type"]
        .as_array()
        .expect("slices")
        .iter()
        .map(|s| s["shares"].as_u64().unwrap_or(0))
        .sum();
    assert_eq!(raw_total, grouped_total);
    // Percentages are recomputed from shares, not read from storage.
    let founder_entry = entries
        .iter()
        .find(|e| e["stakeholder_id"] == "founder-001")
        .expect("founder entry");
    assert_eq!(founder_entry["percentage"].as_f64().expect("pct"), 45.0);
}

#[tokio::test]
async fn vesting_endpoint_honors_cliff_and_end() {
    let (addr, _state) = spawn_server().await;

    let (status, body) = send_raw(
        addr,
        "GET",
        "/v1/grants/grant-001/vesting?as_of=2022-06-01",
        None,
        None,
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(parse_json(&body)["data"]["vested_quantity"], 0);

    let (_, body) = send_raw(
        addr,
        "GET",
        "/v1/grants/grant-001/vesting?as_of=2026-06-01",
        None,
        None,
    )
    .await;
    assert_eq!(parse_json(&body)["data"]["vested_quantity"], 10_000);

    let (_, body) = send_raw(
        addr,
        "GET",
        "/v1/grants/grant-001/vesting?as_of=2024-01-01",
        None,
        None,
    )
    .await;
    let midway = parse_json(&body)["data"]["vested_quantity"]
        .as_u64()
        .expect("vested");
    assert!(midway > 0 && midway < 10_000);

    let (status, _) = send_raw(
        addr,
        "GET",
        "/v1/grants/grant-001/vesting?as_of=not-a-date",
        None,
        None,
    )
    .await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn exercise_flow_updates_grant_and_creates_transaction() {
    let (addr, _state) = spawn_server().await;

    let over = json!({"quantity": 999_999});
    let (status, _) = send_raw(
        addr,
        "POST",
        "/v1/grants/grant-001/exercise",
        Some(&over),
        None,
    )
    .await;
    assert_eq!(status, 400);

    let request = json!({"quantity": 1_000});
    let (status, body) = send_raw(
        addr,
        "POST",
        "/v1/grants/grant-001/exercise",
        Some(&request),
        None,
    )
    .await;
    assert_eq!(status, 201);
    let tx = parse_json(&body);
    assert_eq!(tx["data"]["type"], "exercise");
    assert_eq!(tx["data"]["status"], "completed");
    assert_eq!(tx["data"]["grant_id"], "grant-001");

    let (_, body) = send_raw(addr, "GET", "/v1/grants/grant-001", None, None).await;
    assert_eq!(parse_json(&body)["data"]["exercised_quantity"], 1_000);
}

#[tokio::test]
async fn transfer_preview_runs_the_rule_pipeline() {
    let (addr, _state) = spawn_server().await;
    let preview = json!({
        "from_stakeholder_id": "emp-001",
        "to_stakeholder_id": "founder-001",
        "security_id": "common-stock",
        "quantity": 100
    });
    let (status, body) = send_raw(
        addr,
        "POST",
        "/v1/transactions/preview",
        Some(&preview),
        None,
    )
    .await;
    assert_eq!(status, 200);
    let payload = parse_json(&body);
    assert_eq!(payload["data"]["final"], "allowed");
    assert_eq!(payload["data"]["flow"].as_array().expect("flow").len(), 3);

    let blocked = json!({
        "from": "ghost",
        "to": "founder-001",
        "security": "common-stock",
        "quantity": 100
    });
    let (status, body) = send_raw(addr, "POST", "/v1/rules/check", Some(&blocked), None).await;
    assert_eq!(status, 200);
    let payload = parse_json(&body);
    assert_eq!(payload["data"]["final"], "blocked");
    assert!(!payload["data"]["recommendations"]
        .as_array()
        .expect("recommendations")
        .is_empty());
}

#[tokio::test]
async fn auth_session_lifecycle_with_signed_tokens() {
    let (addr, _state) = spawn_server().await;

    let (status, body) = send_raw(
        addr,
        "POST",
        "/v1/auth/wallet/connect",
        Some(&json!({"provider": "metamask"})),
        None,
    )
    .await;
    assert_eq!(status, 200);
    let wallet = parse_json(&body)["data"].clone();
    let address = wallet["address"].as_str().expect("address");
    assert!(address.starts_with("0x") && address.len() == 42);

    let login = json!({"role": "founder", "wallet": wallet});
    let (status, body) = send_raw(addr, "POST", "/v1/auth/login", Some(&login), None).await;
    assert_eq!(status, 200);
    let payload = parse_json(&body);
    let token = payload["data"]["token"].as_str().expect("token").to_string();
    assert_eq!(payload["data"]["session"]["role"], "founder");

    let (status, body) = send_raw(addr, "GET", "/v1/auth/session", None, Some(&token)).await;
    assert_eq!(status, 200);
    assert_eq!(parse_json(&body)["data"]["is_authenticated"], true);

    let tampered = format!("{token}x");
    let (status, _) = send_raw(addr, "GET", "/v1/auth/session", None, Some(&tampered)).await;
    assert_eq!(status, 401);

    let (status, _) = send_raw(addr, "POST", "/v1/auth/logout", None, Some(&token)).await;
    assert_eq!(status, 200);
    let (status, body) = send_raw(addr, "GET", "/v1/auth/session", None, Some(&token)).await;
    assert_eq!(status, 401);
    assert_eq!(parse_json(&body)["error"]["code"], "InvalidSession");
}

#[tokio::test]
async fn treasury_reports_computed_total() {
    let (addr, _state) = spawn_server().await;
    let (status, body) =
        send_raw(addr, "GET", "/v1/companies/acme-inc/treasury", None, None).await;
    assert_eq!(status, 200);
    let payload = parse_json(&body);
    // 220M cash + 125M USDC + 95M DAI, all in cents.
    assert_eq!(payload["data"]["total_usd_cents"], 440_000_000_u64);
    assert_eq!(payload["data"]["treasury"]["runway_days"], 270);
}

#[tokio::test]
async fn dashboards_assemble_role_views() {
    let (addr, _state) = spawn_server().await;

    let (status, body) = send_raw(
        addr,
        "GET",
        "/v1/dashboards/founder/acme-inc",
        None,
        None,
    )
    .await;
    assert_eq!(status, 200);
    let founder = parse_json(&body);
    assert_eq!(founder["data"]["company"]["name"], "Acme Robotics");
    assert_eq!(
        founder["data"]["checklist"].as_array().expect("checklist").len(),
        4
    );
    assert!(!founder["data"]["activity"].as_array().expect("activity").is_empty());

    let (status, body) = send_raw(
        addr,
        "GET",
        "/v1/dashboards/employee/emp-001",
        None,
        None,
    )
    .await;
    assert_eq!(status, 200);
    let employee = parse_json(&body);
    let grants = employee["data"]["grants"].as_array().expect("grants");
    assert_eq!(grants.len(), 1);
    assert!(grants[0]["vested_as_of"].as_u64().is_some());
    // $8.5M over 10M shares.
    assert_eq!(employee["data"]["current_share_price_cents"], 85);

    let (status, body) = send_raw(
        addr,
        "GET",
        "/v1/dashboards/investor/inv-001",
        None,
        None,
    )
    .await;
    assert_eq!(status, 200);
    let investor = parse_json(&body);
    let holdings = investor["data"]["holdings"].as_array().expect("holdings");
    assert_eq!(holdings.len(), 1);
    assert_eq!(holdings[0]["ownership_pct"].as_f64().expect("pct"), 25.0);
    assert_eq!(holdings[0]["cost_basis_cents"], 150_000_000_u64);
    assert_eq!(
        investor["data"]["summary"]["current_value_usd_cents"],
        212_500_000_u64
    );
}

#[tokio::test]
async fn invalid_pagination_is_rejected() {
    let (addr, _state) = spawn_server().await;
    let (status, body) = send_raw(addr, "GET", "/v1/grants?page=0", None, None).await;
    assert_eq!(status, 400);
    assert_eq!(parse_json(&body)["error"]["code"], "InvalidQueryParameter");
}

#[tokio::test]
async fn metrics_expose_request_counters() {
    let (addr, _state) = spawn_server().await;
    let _ = send_raw(addr, "GET", "/healthz", None, None).await;
    let (status, body) = send_raw(addr, "GET", "/metrics", None, None).await;
    assert_eq!(status, 200);
    assert!(body.contains("nocap_requests_total"));
    assert!(body.contains("route=\"/healthz\""));
}

#[tokio::test]
async fn draining_server_rejects_new_work() {
    let (addr, state) = spawn_server().await;
    state
        .accepting_requests
        .store(false, std::sync::atomic::Ordering::Relaxed);
    let (status, body) = send_raw(addr, "GET", "/v1/stakeholders", None, None).await;
    assert_eq!(status, 503);
    assert_eq!(parse_json(&body)["error"]["code"], "NotReady");
}
