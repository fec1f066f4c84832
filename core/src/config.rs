//! Client configuration.

use std::time::Duration;

use tracing::warn;

use crate::retry::RetryPolicy;

/// Production API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://skillsync-api-t4l2.onrender.com/api/v1";

/// Request timeout applied to every call.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Silent retries granted to idempotent reads.
pub const DEFAULT_READ_RETRIES: u32 = 2;

const BASE_URL_ENV: &str = "SKILLSYNC_API_URL";
const TIMEOUT_ENV: &str = "SKILLSYNC_TIMEOUT_SECS";
const READ_RETRIES_ENV: &str = "SKILLSYNC_READ_RETRIES";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub read_retry: RetryPolicy,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    /// Defaults overridden by `SKILLSYNC_*` environment variables.
    ///
    /// Unparseable numeric values are ignored with a warning.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            if !url.trim().is_empty() {
                config.base_url = url.trim().to_string();
            }
        }
        if let Ok(raw) = std::env::var(TIMEOUT_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(secs) => config.timeout = Duration::from_secs(secs),
                Err(_) => warn!(var = TIMEOUT_ENV, value = %raw, "Ignoring invalid timeout"),
            }
        }
        if let Ok(raw) = std::env::var(READ_RETRIES_ENV) {
            match raw.trim().parse::<u32>() {
                Ok(retries) => config.read_retry = RetryPolicy::new(retries.saturating_add(1)),
                Err(_) => warn!(var = READ_RETRIES_ENV, value = %raw, "Ignoring invalid retry count"),
            }
        }
        config
    }

    pub fn with_read_retry(mut self, policy: RetryPolicy) -> Self {
        self.read_retry = policy;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            read_retry: RetryPolicy::new(DEFAULT_READ_RETRIES + 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_production_client() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.read_retry.max_attempts, 3);
    }

    #[test]
    fn new_keeps_default_timeout() {
        let config = ClientConfig::new("http://localhost:3000");
        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn from_env_reads_overrides_and_ignores_garbage() {
        // One test owns these variables; parallel tests would race on them.
        std::env::set_var(BASE_URL_ENV, " http://127.0.0.1:9/api/v1 ");
        std::env::set_var(TIMEOUT_ENV, "5");
        std::env::set_var(READ_RETRIES_ENV, "4294967295");
        let config = ClientConfig::from_env();
        assert_eq!(config.base_url, "http://127.0.0.1:9/api/v1");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.read_retry.max_attempts, u32::MAX);

        std::env::set_var(TIMEOUT_ENV, "soon");
        std::env::set_var(READ_RETRIES_ENV, "-1");
        let config = ClientConfig::from_env();
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(config.read_retry.max_attempts, DEFAULT_READ_RETRIES + 1);

        for var in [BASE_URL_ENV, TIMEOUT_ENV, READ_RETRIES_ENV] {
            std::env::remove_var(var);
        }
        assert_eq!(ClientConfig::from_env().base_url, DEFAULT_BASE_URL);
    }
}
