//! CLI configuration from environment.

use scout_sim::SimConfig;
use std::env;
use tokio::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub elevation_url: String,
    /// Pre-issued bearer token; skips the login round-trip when set.
    pub auth_token: Option<String>,
    pub username: String,
    pub password: String,
    pub tick_ms: u64,
    pub dwell_ms: Option<u64>,
    pub settle_ms: Option<u64>,
    pub rng_seed: Option<u64>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            api_url: get("SCOUT_API_URL").unwrap_or_else(|| "http://localhost:8000".to_string()),
            elevation_url: get("SCOUT_ELEVATION_URL")
                .unwrap_or_else(|| "https://api.open-elevation.com/api/v1/lookup".to_string()),
            auth_token: get("SCOUT_TOKEN")
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
            username: get("SCOUT_USERNAME").unwrap_or_else(|| "admin".to_string()),
            password: get("SCOUT_PASSWORD").unwrap_or_else(|| "admin".to_string()),
            tick_ms: get("SCOUT_TICK_MS").and_then(|s| s.parse().ok()).unwrap_or(16),
            dwell_ms: get("SCOUT_DWELL_MS").and_then(|s| s.parse().ok()),
            settle_ms: get("SCOUT_SETTLE_MS").and_then(|s| s.parse().ok()),
            rng_seed: get("SCOUT_SEED").and_then(|s| s.parse().ok()),
        }
    }

    pub fn sim_config(&self) -> SimConfig {
        let defaults = SimConfig::default();
        SimConfig {
            tick: Duration::from_millis(self.tick_ms),
            dwell: self
                .dwell_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.dwell),
            settle: self
                .settle_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.settle),
            rng_seed: self.rng_seed,
            ..defaults
        }
    }
}
