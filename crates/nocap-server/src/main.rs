#![forbid(unsafe_code)]

use nocap_server::{build_router, validate_startup_config_contract, ApiConfig, AppState};
use nocap_store::{seed_demo, ChaosPolicy, EquityStore};
use std::env;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| match v.as_str() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(default)
}

fn env_duration_ms(name: &str, default_ms: u64) -> Duration {
    Duration::from_millis(env_u64(name, default_ms))
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("register SIGTERM");
        let mut sigint = signal(SignalKind::interrupt()).expect("register SIGINT");
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if env_bool("NOCAP_LOG_JSON", false) {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    init_tracing();

    let bind_addr = env::var("NOCAP_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    // The demo keeps its latency/failure theater: ~500ms and 5% by default,
    // both switchable off via env.
    let chaos = ChaosPolicy::new(
        env_duration_ms("NOCAP_MOCK_DELAY_MS", 500),
        env_u64("NOCAP_FAILURE_RATE_PCT", 5).min(100) as u8,
    );
    let api_cfg = ApiConfig {
        max_body_bytes: env_usize("NOCAP_MAX_BODY_BYTES", 16 * 1024),
        request_timeout: env_duration_ms("NOCAP_REQUEST_TIMEOUT_MS", 5000),
        default_page_size: env_usize("NOCAP_DEFAULT_PAGE_SIZE", 50),
        max_page_size: env_usize("NOCAP_MAX_PAGE_SIZE", 200),
        session_secret: env::var("NOCAP_SESSION_SECRET")
            .unwrap_or_else(|_| "nocap-dev-secret".to_string()),
        enable_demo_seed: env_bool("NOCAP_DEMO_SEED", true),
    };
    validate_startup_config_contract(&api_cfg, &chaos)?;

    let store = Arc::new(EquityStore::new(chaos));
    let enable_seed = api_cfg.enable_demo_seed;
    let state = AppState::with_config(store.clone(), api_cfg);
    if enable_seed {
        seed_demo(&store).await;
        info!("demo dataset seeded");
    }
    state.ready.store(true, Ordering::Relaxed);

    let app = build_router(state.clone());
    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| format!("bind {bind_addr} failed: {e}"))?;
    info!("nocap-server listening on {bind_addr}");

    let accepting = state.accepting_requests.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            wait_for_shutdown_signal().await;
            // Stop admitting new requests, then drain what is in flight.
            accepting.store(false, Ordering::Relaxed);
            let drain_ms = env_u64("NOCAP_SHUTDOWN_DRAIN_MS", 3000);
            tokio::time::sleep(Duration::from_millis(drain_ms)).await;
        })
        .await
        .map_err(|e| format!("server failed: {e}"))
}
