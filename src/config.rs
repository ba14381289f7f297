// src/config.rs

use std::net::SocketAddr;
use std::time::Duration;

use tracing::warn;

/// Runtime configuration, read from the environment once at startup.
///
/// Both upstream credentials are optional: a missing vulnerability-source
/// key forces the synthetic fallback for every technology, and a missing
/// scrape-service key skips that markup tier. Neither is a startup error.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    /// Credential for the vulnerability database (`NVD_API_KEY`).
    pub vuln_api_key: Option<String>,
    /// Credential for the HTML-scraping service (`FIRECRAWL_API_KEY`).
    pub scrape_api_key: Option<String>,
    /// Minimum pause between successive vulnerability-source calls.
    pub vuln_call_delay: Duration,
    /// Admission-control window and per-client request quota.
    pub admission_window: Duration,
    pub admission_quota: u32,
}

const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8088";
const DEFAULT_VULN_CALL_DELAY_MS: u64 = 1000;
const DEFAULT_ADMISSION_WINDOW_SECS: u64 = 60;
const DEFAULT_ADMISSION_QUOTA: u32 = 3;

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            listen_addr: env_parsed("AEGIS_LISTEN_ADDR", DEFAULT_LISTEN_ADDR.parse().unwrap()),
            vuln_api_key: non_empty_env("NVD_API_KEY"),
            scrape_api_key: non_empty_env("FIRECRAWL_API_KEY"),
            vuln_call_delay: Duration::from_millis(env_parsed(
                "AEGIS_VULN_DELAY_MS",
                DEFAULT_VULN_CALL_DELAY_MS,
            )),
            admission_window: Duration::from_secs(env_parsed(
                "AEGIS_ADMISSION_WINDOW_SECS",
                DEFAULT_ADMISSION_WINDOW_SECS,
            )),
            admission_quota: env_parsed("AEGIS_ADMISSION_QUOTA", DEFAULT_ADMISSION_QUOTA),
        }
    }

    /// Configuration with no upstream credentials and no pacing delay, for
    /// deterministic tests.
    pub fn offline() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.parse().unwrap(),
            vuln_api_key: None,
            scrape_api_key: None,
            vuln_call_delay: Duration::ZERO,
            admission_window: Duration::from_secs(DEFAULT_ADMISSION_WINDOW_SECS),
            admission_quota: DEFAULT_ADMISSION_QUOTA,
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!(variable = name, value = %raw, "unparseable value, using default");
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offline_config_has_no_credentials_and_no_delay() {
        let config = AppConfig::offline();
        assert!(config.vuln_api_key.is_none());
        assert!(config.scrape_api_key.is_none());
        assert!(config.vuln_call_delay.is_zero());
    }
}
