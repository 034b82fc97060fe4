//! Environment-variable configuration loader.
//!
//! Credential material is read once at process start. A missing variable
//! is never an error; it just degrades the corresponding tier or feature.
//!
//! Variables:
//!
//! - `OPENSKY_CLIENT_ID` / `OPENSKY_CLIENT_SECRET`: token-exchange tier
//! - `OPENSKY_USERNAME` / `OPENSKY_PASSWORD`: basic-auth tier
//! - `AERODATABOX_KEY`: secondary enrichment provider
//! - `AIRLABS_KEY`: fallback provider

use std::env;

use tracing::info;

use super::settings::AppConfig;

/// Reads a variable, treating empty values as absent.
fn env_opt(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl AppConfig {
    /// Builds the configuration from defaults plus process environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        config.opensky.client_id = env_opt("OPENSKY_CLIENT_ID");
        config.opensky.client_secret = env_opt("OPENSKY_CLIENT_SECRET");
        config.opensky.username = env_opt("OPENSKY_USERNAME");
        config.opensky.password = env_opt("OPENSKY_PASSWORD");
        config.aerodatabox.api_key = env_opt("AERODATABOX_KEY");
        config.airlabs.api_key = env_opt("AIRLABS_KEY");

        info!(
            opensky_oauth = config.opensky.client_id.is_some(),
            opensky_basic = config.opensky.username.is_some(),
            aerodatabox = config.aerodatabox.api_key.is_some(),
            airlabs = config.airlabs.api_key.is_some(),
            "credential material loaded from environment"
        );

        config
    }
}
