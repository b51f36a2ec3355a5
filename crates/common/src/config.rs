use std::net::SocketAddr;

use serde::Deserialize;

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Global application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Address the console API listens on
    pub api_bind_addr: SocketAddr,

    /// Period of the staleness check in milliseconds (default: 60000).
    /// Independent of any resource TTL.
    pub scheduler_period_ms: u64,

    /// Upper bound on a single fetch in milliseconds (default: 10000)
    pub fetch_timeout_ms: u64,

    /// Clear a resource's pending flag when the view moves away from it
    /// (default: false, pending flags survive navigation)
    pub clear_pending_on_defocus: bool,

    /// Run the synthetic webhook event simulator
    pub simulator_enabled: bool,

    /// Lower bound of the randomized simulator period in milliseconds
    pub simulator_min_period_ms: u64,

    /// Upper bound of the randomized simulator period in milliseconds
    pub simulator_max_period_ms: u64,

    /// Probability in [0, 1] that a simulator tick produces no event
    pub simulator_suppression: f64,

    /// Fixed RNG seed for reproducible simulator runs
    pub simulator_seed: Option<u64>,

    /// Base URL of the LMS REST API (e.g. `http://localhost:8000/api/v1`).
    /// When unset, the built-in mock sources are used.
    pub lms_rest_base_url: Option<String>,

    /// URL of the LMS GraphQL endpoint (e.g. `http://localhost:8000/graphql/`)
    pub lms_graphql_url: Option<String>,

    /// Multiplier applied to the mock sources' simulated latency (0 disables)
    pub mock_latency_scale: f64,

    /// Log output format
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            scheduler_period_ms: 60_000,
            fetch_timeout_ms: 10_000,
            clear_pending_on_defocus: false,
            simulator_enabled: true,
            simulator_min_period_ms: 8_000,
            simulator_max_period_ms: 12_000,
            simulator_suppression: 0.3,
            simulator_seed: None,
            lms_rest_base_url: None,
            lms_graphql_url: None,
            mock_latency_scale: 1.0,
            log_format: LogFormat::Pretty,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let config = Self {
            api_bind_addr: match std::env::var("API_BIND_ADDR") {
                Ok(v) => v
                    .parse()
                    .map_err(|_| anyhow::anyhow!("API_BIND_ADDR must be a socket address"))?,
                Err(_) => defaults.api_bind_addr,
            },
            scheduler_period_ms: std::env::var("SCHEDULER_PERIOD_MS")
                .unwrap_or_else(|_| defaults.scheduler_period_ms.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("SCHEDULER_PERIOD_MS must be a valid u64"))?,
            fetch_timeout_ms: std::env::var("FETCH_TIMEOUT_MS")
                .unwrap_or_else(|_| defaults.fetch_timeout_ms.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("FETCH_TIMEOUT_MS must be a valid u64"))?,
            clear_pending_on_defocus: std::env::var("CLEAR_PENDING_ON_DEFOCUS")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("CLEAR_PENDING_ON_DEFOCUS must be true or false"))?,
            simulator_enabled: std::env::var("SIMULATOR_ENABLED")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("SIMULATOR_ENABLED must be true or false"))?,
            simulator_min_period_ms: std::env::var("SIMULATOR_MIN_PERIOD_MS")
                .unwrap_or_else(|_| defaults.simulator_min_period_ms.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("SIMULATOR_MIN_PERIOD_MS must be a valid u64"))?,
            simulator_max_period_ms: std::env::var("SIMULATOR_MAX_PERIOD_MS")
                .unwrap_or_else(|_| defaults.simulator_max_period_ms.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("SIMULATOR_MAX_PERIOD_MS must be a valid u64"))?,
            simulator_suppression: std::env::var("SIMULATOR_SUPPRESSION")
                .unwrap_or_else(|_| defaults.simulator_suppression.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("SIMULATOR_SUPPRESSION must be a number"))?,
            simulator_seed: match std::env::var("SIMULATOR_SEED") {
                Ok(v) => Some(
                    v.parse()
                        .map_err(|_| anyhow::anyhow!("SIMULATOR_SEED must be a valid u64"))?,
                ),
                Err(_) => None,
            },
            lms_rest_base_url: std::env::var("LMS_REST_BASE_URL").ok(),
            lms_graphql_url: std::env::var("LMS_GRAPHQL_URL").ok(),
            mock_latency_scale: std::env::var("MOCK_LATENCY_SCALE")
                .unwrap_or_else(|_| "1.0".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("MOCK_LATENCY_SCALE must be a number"))?,
            log_format: match std::env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_ascii_lowercase()
                .as_str()
            {
                "pretty" => LogFormat::Pretty,
                "json" => LogFormat::Json,
                other => anyhow::bail!("LOG_FORMAT must be 'pretty' or 'json', got '{other}'"),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject combinations the runtime cannot honour.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.scheduler_period_ms == 0 {
            anyhow::bail!("SCHEDULER_PERIOD_MS must be greater than zero");
        }
        if self.fetch_timeout_ms == 0 {
            anyhow::bail!("FETCH_TIMEOUT_MS must be greater than zero");
        }
        if self.simulator_min_period_ms == 0
            || self.simulator_min_period_ms > self.simulator_max_period_ms
        {
            anyhow::bail!(
                "simulator period bounds must satisfy 0 < SIMULATOR_MIN_PERIOD_MS <= SIMULATOR_MAX_PERIOD_MS"
            );
        }
        if !(0.0..=1.0).contains(&self.simulator_suppression) {
            anyhow::bail!("SIMULATOR_SUPPRESSION must be within [0, 1]");
        }
        if !self.mock_latency_scale.is_finite() || self.mock_latency_scale < 0.0 {
            anyhow::bail!("MOCK_LATENCY_SCALE must be a non-negative number");
        }
        Ok(())
    }
}
