use nocap_store::ChaosPolicy;
use serde::Serialize;
use std::time::Duration;

pub const CONFIG_SCHEMA_VERSION: &str = "1";

#[derive(Debug, Clone, Serialize)]
pub struct ApiConfig {
    pub max_body_bytes: usize,
    pub request_timeout: Duration,
    pub default_page_size: usize,
    pub max_page_size: usize,
    /// Secret for HMAC-signed session tokens.
    #[serde(skip_serializing)]
    pub session_secret: String,
    /// Load the demo fixture set at startup.
    pub enable_demo_seed: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 16 * 1024,
            request_timeout: Duration::from_secs(5),
            default_page_size: 50,
            max_page_size: 200,
            session_secret: "nocap-dev-secret".to_string(),
            enable_demo_seed: true,
        }
    }
}

pub fn validate_startup_config_contract(
    api: &ApiConfig,
    chaos: &ChaosPolicy,
) -> Result<(), String> {
    if api.max_body_bytes == 0 {
        return Err("api size limits must be > 0".to_string());
    }
    if api.request_timeout.is_zero() {
        return Err("timeouts must be > 0".to_string());
    }
    if api.default_page_size == 0 || api.max_page_size == 0 {
        return Err("page sizes must be > 0".to_string());
    }
    if api.default_page_size > api.max_page_size {
        return Err("default page size must not exceed max page size".to_string());
    }
    if api.session_secret.is_empty() {
        return Err("session secret must be non-empty".to_string());
    }
    if chaos.failure_rate_pct > 100 {
        return Err("failure rate is a percentage, 0..=100".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startup_config_validation_rejects_inverted_page_sizes() {
        let api = ApiConfig {
            default_page_size: 500,
            max_page_size: 100,
            ..ApiConfig::default()
        };
        let err = validate_startup_config_contract(&api, &ChaosPolicy::default())
            .expect_err("inverted sizes");
        assert!(err.contains("page size"));
    }

    #[test]
    fn startup_config_validation_requires_session_secret() {
        let api = ApiConfig {
            session_secret: String::new(),
            ..ApiConfig::default()
        };
        let err = validate_startup_config_contract(&api, &ChaosPolicy::default())
            .expect_err("missing secret");
        assert!(err.contains("session secret"));
    }

    #[test]
    fn default_config_passes_the_contract() {
        validate_startup_config_contract(&ApiConfig::default(), &ChaosPolicy::default())
            .expect("default config");
    }
}
