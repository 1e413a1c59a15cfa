#![forbid(unsafe_code)]
//! HTTP surface of the demo platform: router, shared state, handlers.

use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use nocap_model::AuthSession;
use nocap_store::EquityStore;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64};
use std::sync::Arc;
use tokio::sync::Mutex;

mod config;
mod http;
mod session;
mod telemetry;

pub use config::{validate_startup_config_contract, ApiConfig, CONFIG_SCHEMA_VERSION};
pub use session::{issue_token, verify_token, SessionError, SessionErrorCode};
pub use telemetry::RequestMetrics;

pub const CRATE_NAME: &str = "nocap-server";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<EquityStore>,
    pub api: Arc<ApiConfig>,
    pub metrics: Arc<RequestMetrics>,
    pub sessions: Arc<Mutex<HashMap<String, AuthSession>>>,
    pub request_id_seed: Arc<AtomicU64>,
    pub address_seed: Arc<AtomicU64>,
    pub accepting_requests: Arc<AtomicBool>,
    pub ready: Arc<AtomicBool>,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<EquityStore>) -> Self {
        Self::with_config(store, ApiConfig::default())
    }

    #[must_use]
    pub fn with_config(store: Arc<EquityStore>, api: ApiConfig) -> Self {
        Self {
            store,
            api: Arc::new(api),
            metrics: Arc::new(RequestMetrics::default()),
            sessions: Arc::new(Mutex::new(HashMap::new())),
            request_id_seed: Arc::new(AtomicU64::new(1)),
            address_seed: Arc::new(AtomicU64::new(1)),
            accepting_requests: Arc::new(AtomicBool::new(true)),
            ready: Arc::new(AtomicBool::new(false)),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let max_body = state.api.max_body_bytes;
    Router::new()
        .route("/", get(http::system::landing_handler))
        .route("/healthz", get(http::system::healthz_handler))
        .route("/readyz", get(http::system::readyz_handler))
        .route("/metrics", get(http::system::metrics_handler))
        .route("/v1/version", get(http::system::version_handler))
        .route(
            "/v1/companies",
            get(http::companies::list_handler).fallback(http::support::method_not_allowed_handler),
        )
        .route(
            "/v1/companies/:id",
            get(http::companies::get_handler)
                .patch(http::companies::update_handler)
                .fallback(http::support::method_not_allowed_handler),
        )
        .route(
            "/v1/companies/:id/cap-table",
            get(http::company_views::cap_table_handler),
        )
        .route(
            "/v1/companies/:id/treasury",
            get(http::company_views::treasury_handler),
        )
        .route(
            "/v1/companies/:id/compliance",
            get(http::company_views::compliance_handler),
        )
        .route(
            "/v1/companies/:id/activities",
            get(http::company_views::activities_handler),
        )
        .route(
            "/v1/stakeholders",
            get(http::stakeholders::list_handler)
                .post(http::stakeholders::create_handler)
                .fallback(http::support::method_not_allowed_handler),
        )
        .route(
            "/v1/stakeholders/:id",
            get(http::stakeholders::get_handler)
                .patch(http::stakeholders::update_handler)
                .delete(http::stakeholders::delete_handler)
                .fallback(http::support::method_not_allowed_handler),
        )
        .route(
            "/v1/securities",
            get(http::securities::list_handler)
                .post(http::securities::create_handler)
                .fallback(http::support::method_not_allowed_handler),
        )
        .route(
            "/v1/securities/:id",
            get(http::securities::get_handler)
                .patch(http::securities::update_handler)
                .fallback(http::support::method_not_allowed_handler),
        )
        .route(
            "/v1/vesting-schedules",
            get(http::schedules::list_handler)
                .post(http::schedules::create_handler)
                .fallback(http::support::method_not_allowed_handler),
        )
        .route(
            "/v1/vesting-schedules/:id",
            get(http::schedules::get_handler)
                .fallback(http::support::method_not_allowed_handler),
        )
        .route(
            "/v1/grants",
            get(http::grants::list_handler)
                .post(http::grants::create_handler)
                .fallback(http::support::method_not_allowed_handler),
        )
        .route(
            "/v1/grants/:id",
            get(http::grants::get_handler)
                .patch(http::grants::update_handler)
                .fallback(http::support::method_not_allowed_handler),
        )
        .route("/v1/grants/:id/vesting", get(http::grants::vesting_handler))
        .route(
            "/v1/grants/:id/exercise",
            post(http::grants::exercise_handler),
        )
        .route("/v1/grants/:id/cancel", post(http::grants::cancel_handler))
        .route(
            "/v1/transactions",
            get(http::transactions::list_handler)
                .post(http::transactions::create_handler)
                .fallback(http::support::method_not_allowed_handler),
        )
        .route(
            "/v1/transactions/preview",
            post(http::transactions::preview_handler),
        )
        .route(
            "/v1/transactions/:id",
            get(http::transactions::get_handler)
                .fallback(http::support::method_not_allowed_handler),
        )
        .route("/v1/rules/check", post(http::rules::check_handler))
        .route("/v1/activities", post(http::company_views::create_activity_handler))
        .route(
            "/v1/auth/wallet/connect",
            post(http::auth::connect_wallet_handler),
        )
        .route("/v1/auth/login", post(http::auth::login_handler))
        .route("/v1/auth/session", get(http::auth::session_handler))
        .route("/v1/auth/logout", post(http::auth::logout_handler))
        .route(
            "/v1/dashboards/founder/:company_id",
            get(http::dashboards::founder_handler),
        )
        .route(
            "/v1/dashboards/employee/:stakeholder_id",
            get(http::dashboards::employee_handler),
        )
        .route(
            "/v1/dashboards/investor/:stakeholder_id",
            get(http::dashboards::investor_handler),
        )
        .layer(from_fn_with_state(
            state.clone(),
            http::support::drain_middleware,
        ))
        .layer(DefaultBodyLimit::max(max_body))
        .with_state(state)
}
