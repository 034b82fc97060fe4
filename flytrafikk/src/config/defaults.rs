//! Default values for all configuration settings.

use std::path::PathBuf;
use std::time::Duration;

use super::settings::*;
use crate::model::BoundingBox;

/// OpenSky REST API base URL.
pub const DEFAULT_OPENSKY_API_URL: &str = "https://opensky-network.org/api";

/// OpenSky OAuth2 token endpoint (client-credentials grant).
pub const DEFAULT_OPENSKY_TOKEN_URL: &str =
    "https://auth.opensky-network.org/auth/realms/opensky-network/protocol/openid-connect/token";

/// AeroDataBox API base URL.
pub const DEFAULT_AERODATABOX_API_URL: &str = "https://aerodatabox.p.rapidapi.com";

/// AirLabs API base URL.
pub const DEFAULT_AIRLABS_API_URL: &str = "https://airlabs.co/api/v9";

/// Serverless function execution limit.
pub const DEFAULT_FUNCTION_LIMIT: Duration = Duration::from_secs(10);

/// Reserved for response assembly and transport.
pub const DEFAULT_SAFETY_MARGIN: Duration = Duration::from_secs(1);

/// Minimum remaining budget for enrichment to be attempted at all.
pub const DEFAULT_MIN_REMAINING: Duration = Duration::from_secs(2);

/// Elapsed time after which remaining enrichment batches are abandoned.
pub const DEFAULT_HARD_CEILING: Duration = Duration::from_millis(6500);

/// Entities eligible for secondary-provider lookup per request.
pub const DEFAULT_MAX_LOOKUPS: usize = 12;

/// Concurrent lookups within one enrichment batch.
pub const DEFAULT_BATCH_SIZE: usize = 3;

/// Region the fallback provider is filtered to when the primary is down.
/// Covers the Nordic display area of the original deployment.
pub const DEFAULT_FALLBACK_REGION: BoundingBox = BoundingBox {
    lamin: 54.0,
    lamax: 72.0,
    lomin: -5.0,
    lomax: 32.0,
};

impl Default for OpenSkySettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_OPENSKY_API_URL.to_string(),
            token_url: DEFAULT_OPENSKY_TOKEN_URL.to_string(),
            client_id: None,
            client_secret: None,
            username: None,
            password: None,
        }
    }
}

impl Default for AeroDataBoxSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_AERODATABOX_API_URL.to_string(),
            api_key: None,
        }
    }
}

impl Default for AirLabsSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_AIRLABS_API_URL.to_string(),
            api_key: None,
        }
    }
}

impl Default for BudgetSettings {
    fn default() -> Self {
        Self {
            function_limit: DEFAULT_FUNCTION_LIMIT,
            safety_margin: DEFAULT_SAFETY_MARGIN,
        }
    }
}

impl Default for EnrichmentSettings {
    fn default() -> Self {
        Self {
            max_lookups: DEFAULT_MAX_LOOKUPS,
            batch_size: DEFAULT_BATCH_SIZE,
            min_remaining: DEFAULT_MIN_REMAINING,
            hard_ceiling: DEFAULT_HARD_CEILING,
        }
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_timeout: Duration::from_secs(8),
            timeout_step: Duration::from_secs(2),
            max_timeout: Duration::from_secs(16),
            backoff_base: Duration::from_millis(300),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            opensky: OpenSkySettings::default(),
            aerodatabox: AeroDataBoxSettings::default(),
            airlabs: AirLabsSettings::default(),
            budget: BudgetSettings::default(),
            enrichment: EnrichmentSettings::default(),
            retry: RetrySettings::default(),
            fallback_region: DEFAULT_FALLBACK_REGION,
            data_dir: PathBuf::from("data"),
        }
    }
}
