//! Per-request status block.
//!
//! Attached to every snapshot so the UI can tell a full result from a
//! degraded one without inspecting entities.

use serde::Serialize;

use crate::enrich::EnrichmentOutcome;

/// Where the snapshot's entities came from.
pub const SOURCE_OPENSKY: &str = "opensky";
/// Fallback provider supplied the entities.
pub const SOURCE_AIRLABS: &str = "airlabs";
/// No provider produced usable entities.
pub const SOURCE_NONE: &str = "none";

/// Describes what was attempted and what succeeded for one request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentStatus {
    /// Which provider the entities came from.
    pub data_source: String,
    /// Authentication tier used against the primary provider.
    pub auth_tier: String,
    /// Secondary-provider lookups started.
    pub lookups_attempted: usize,
    /// Lookups that produced a usable record.
    pub lookups_succeeded: usize,
    /// Enrichment skipped entirely (budget or missing key).
    pub enrichment_skipped: bool,
    /// Enrichment abandoned mid-flight on the hard ceiling.
    pub enrichment_truncated: bool,
    /// Total fetch latency in milliseconds, primary plus any fallback.
    pub fetch_ms: u64,
    /// Time spent in the enrichment pass in milliseconds.
    pub enrich_ms: u64,
    /// Whether a secondary-provider key is configured.
    pub aerodatabox_key_present: bool,
    /// Whether a fallback-provider key is configured.
    pub airlabs_key_present: bool,
    /// Human-readable annotation when something degraded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EnrichmentStatus {
    /// Baseline status before any fetch has happened.
    pub fn new(auth_tier: &str, aerodatabox_key: bool, airlabs_key: bool) -> Self {
        Self {
            data_source: SOURCE_NONE.to_string(),
            auth_tier: auth_tier.to_string(),
            lookups_attempted: 0,
            lookups_succeeded: 0,
            enrichment_skipped: false,
            enrichment_truncated: false,
            fetch_ms: 0,
            enrich_ms: 0,
            aerodatabox_key_present: aerodatabox_key,
            airlabs_key_present: airlabs_key,
            error: None,
        }
    }

    /// Folds an enrichment outcome into the status.
    pub fn record_outcome(&mut self, outcome: &EnrichmentOutcome) {
        self.lookups_attempted = outcome.attempted;
        self.lookups_succeeded = outcome.succeeded;
        self.enrichment_skipped = outcome.skipped;
        self.enrichment_truncated = outcome.truncated;
    }
}
