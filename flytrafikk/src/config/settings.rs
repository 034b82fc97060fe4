//! Settings structs for all configuration sections.
//!
//! Pure data types; defaults live in `defaults.rs` and the environment
//! loader in `env.rs`. The numeric knobs here (budget thresholds, batch
//! size, attempt counts) are deliberately configuration, not constants
//! baked into the call sites.

use std::path::PathBuf;
use std::time::Duration;

use crate::model::BoundingBox;

/// Complete application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Primary provider (OpenSky) settings.
    pub opensky: OpenSkySettings,
    /// Secondary per-flight metadata provider settings.
    pub aerodatabox: AeroDataBoxSettings,
    /// Fallback live-flight provider settings.
    pub airlabs: AirLabsSettings,
    /// Request budget settings.
    pub budget: BudgetSettings,
    /// Batch enrichment settings.
    pub enrichment: EnrichmentSettings,
    /// Outbound retry/timeout policy.
    pub retry: RetrySettings,
    /// Region the fallback provider is filtered to.
    pub fallback_region: BoundingBox,
    /// Directory holding the airline code table.
    pub data_dir: PathBuf,
}

/// OpenSky Network credentials and endpoints.
///
/// All credential material is optional; absence degrades the
/// authentication tier rather than failing startup.
#[derive(Debug, Clone)]
pub struct OpenSkySettings {
    /// REST API base, e.g. `https://opensky-network.org/api`.
    pub api_url: String,
    /// OAuth2 token endpoint for the client-credentials grant.
    pub token_url: String,
    /// OAuth2 client id (token-exchange tier).
    pub client_id: Option<String>,
    /// OAuth2 client secret (token-exchange tier).
    pub client_secret: Option<String>,
    /// Account username (basic-auth tier).
    pub username: Option<String>,
    /// Account password (basic-auth tier).
    pub password: Option<String>,
}

/// AeroDataBox (secondary provider) settings.
#[derive(Debug, Clone)]
pub struct AeroDataBoxSettings {
    /// API base URL.
    pub api_url: String,
    /// API key; absence skips secondary enrichment entirely.
    pub api_key: Option<String>,
}

/// AirLabs (fallback provider) settings.
#[derive(Debug, Clone)]
pub struct AirLabsSettings {
    /// API base URL.
    pub api_url: String,
    /// Subscription key; absence disables the fallback path.
    pub api_key: Option<String>,
}

/// Wall-clock budget configuration.
#[derive(Debug, Clone, Copy)]
pub struct BudgetSettings {
    /// Execution-time limit imposed by the calling environment.
    pub function_limit: Duration,
    /// Margin reserved for response assembly and transport.
    pub safety_margin: Duration,
}

impl BudgetSettings {
    /// The working ceiling: environment limit minus the safety margin.
    pub fn ceiling(&self) -> Duration {
        self.function_limit.saturating_sub(self.safety_margin)
    }
}

/// Batch enrichment tuning.
#[derive(Debug, Clone, Copy)]
pub struct EnrichmentSettings {
    /// Maximum entities that get a secondary-provider lookup per request.
    pub max_lookups: usize,
    /// Concurrent lookups per batch; batches run back to back, never
    /// interleaved.
    pub batch_size: usize,
    /// Below this remaining budget, enrichment is skipped outright.
    pub min_remaining: Duration,
    /// Elapsed time after which remaining batches are abandoned.
    pub hard_ceiling: Duration,
}

/// Retry and adaptive-timeout policy for outbound calls.
#[derive(Debug, Clone, Copy)]
pub struct RetrySettings {
    /// Attempts per call, including the first.
    pub max_attempts: u32,
    /// Timeout for the first attempt.
    pub base_timeout: Duration,
    /// Timeout increase per subsequent attempt.
    pub timeout_step: Duration,
    /// Upper bound on any attempt's timeout.
    pub max_timeout: Duration,
    /// Backoff before retry n is `backoff_base * 2^(n-1)`.
    pub backoff_base: Duration,
}
