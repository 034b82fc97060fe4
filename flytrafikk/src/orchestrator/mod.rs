//! Request orchestration.
//!
//! Sequences one inbound request end to end: resolve credentials, fetch
//! the primary snapshot, enrich under budget on success, or remap the
//! fallback provider on primary failure. Data-fetching failures never
//! escape this module; the caller always receives a well-formed
//! [`Snapshot`], possibly empty with an error annotation in its status.

mod stats;

pub use stats::{EnrichmentStatus, SOURCE_AIRLABS, SOURCE_NONE, SOURCE_OPENSKY};

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::airlines::{classify, AirlineTable};
use crate::budget::RequestBudget;
use crate::config::AppConfig;
use crate::enrich::BatchEnricher;
use crate::model::{BoundingBox, Snapshot, StateVector};
use crate::provider::{
    resolve_credentials, AeroDataBoxProvider, AirLabsProvider, AsyncHttpClient, BoundedRequester,
    CredentialTier, OpenSkyProvider,
};

/// One-request-at-a-time aggregation pipeline.
///
/// Holds no per-request state; each call resolves its own credential
/// tier and budget.
pub struct Orchestrator<C>
where
    C: AsyncHttpClient + Clone + 'static,
{
    auth_requester: BoundedRequester<C>,
    opensky: OpenSkyProvider<C>,
    aerodatabox: Arc<AeroDataBoxProvider<C>>,
    airlabs: AirLabsProvider<C>,
    enricher: BatchEnricher<C>,
    table: &'static AirlineTable,
    config: AppConfig,
}

impl<C> Orchestrator<C>
where
    C: AsyncHttpClient + Clone + 'static,
{
    pub fn new(client: C, config: AppConfig, table: &'static AirlineTable) -> Self {
        let aerodatabox = Arc::new(AeroDataBoxProvider::new(
            client.clone(),
            &config.aerodatabox,
            config.retry,
        ));
        Self {
            auth_requester: BoundedRequester::new(client.clone(), config.retry),
            opensky: OpenSkyProvider::new(client.clone(), &config.opensky, config.retry),
            airlabs: AirLabsProvider::new(client.clone(), &config.airlabs, config.retry),
            enricher: BatchEnricher::new(Arc::clone(&aerodatabox), config.enrichment),
            aerodatabox,
            table,
            config,
        }
    }

    /// Produces the enriched snapshot for a bounding-box query.
    ///
    /// Never fails: primary failure triggers the fallback provider, and
    /// fallback failure yields an empty snapshot with an error
    /// annotation.
    pub async fn bounding_box_snapshot(
        &self,
        bbox: &BoundingBox,
        budget: &RequestBudget,
    ) -> Snapshot {
        let tier = self.resolve_tier().await;
        let mut status = EnrichmentStatus::new(
            tier.name(),
            self.config.aerodatabox.api_key.is_some(),
            self.config.airlabs.api_key.is_some(),
        );

        let fetch_start = Instant::now();
        match self.opensky.states(bbox, &tier).await {
            Ok(raw) => {
                status.fetch_ms = fetch_start.elapsed().as_millis() as u64;
                status.data_source = SOURCE_OPENSKY.to_string();

                let mut states = raw.states;
                let enrich_start = Instant::now();
                let outcome = self
                    .enricher
                    .enrich(&mut states, self.table, budget, Utc::now())
                    .await;
                status.enrich_ms = enrich_start.elapsed().as_millis() as u64;
                status.record_outcome(&outcome);

                info!(
                    entities = states.len(),
                    attempted = outcome.attempted,
                    succeeded = outcome.succeeded,
                    elapsed_ms = budget.elapsed().as_millis() as u64,
                    "snapshot assembled from primary provider"
                );
                Snapshot {
                    time: raw.time,
                    states,
                    status,
                }
            }
            Err(primary_err) => {
                warn!(error = %primary_err, "primary provider failed, trying fallback");
                status.fetch_ms = fetch_start.elapsed().as_millis() as u64;
                self.fallback_snapshot(primary_err.to_string(), status).await
            }
        }
    }

    /// Cross-provider fallback path: remap AirLabs into the primary
    /// schema, or return an explicitly empty snapshot.
    async fn fallback_snapshot(
        &self,
        primary_err: String,
        mut status: EnrichmentStatus,
    ) -> Snapshot {
        let now = Utc::now().timestamp();
        let fetch_start = Instant::now();
        let fetched = self
            .airlabs
            .states_in_region(&self.config.fallback_region, now)
            .await;
        // Fetch latency covers both phases; the primary's share is
        // already recorded.
        status.fetch_ms += fetch_start.elapsed().as_millis() as u64;

        match fetched {
            Ok(mut states) if !states.is_empty() => {
                status.data_source = SOURCE_AIRLABS.to_string();
                status.error = Some(format!("primary provider unavailable: {}", primary_err));

                // Fallback rows without a synthesized route still get a
                // heuristic label.
                for state in states.iter_mut() {
                    if state.route.is_none() {
                        state.route = Some(classify(self.table, state.callsign.as_deref()));
                    }
                }

                info!(entities = states.len(), "snapshot assembled from fallback provider");
                Snapshot {
                    time: now,
                    states,
                    status,
                }
            }
            Ok(_) => {
                status.error = Some(format!(
                    "primary provider unavailable ({}); fallback returned no usable entities",
                    primary_err
                ));
                Snapshot {
                    time: now,
                    states: Vec::new(),
                    status,
                }
            }
            Err(fallback_err) => {
                warn!(error = %fallback_err, "fallback provider failed as well");
                status.error = Some(format!(
                    "primary provider unavailable ({}); fallback failed ({})",
                    primary_err, fallback_err
                ));
                Snapshot {
                    time: now,
                    states: Vec::new(),
                    status,
                }
            }
        }
    }

    /// Waypoint track for one aircraft (`time = 0` for the live track).
    pub async fn track(&self, icao24: &str, time: i64) -> Value {
        let tier = self.resolve_tier().await;
        match self.opensky.track(icao24, time, &tier).await {
            Ok(body) => body,
            Err(e) => error_envelope("track lookup failed", &e.to_string()),
        }
    }

    /// Flights flown by one aircraft in a time range.
    pub async fn flight_history(&self, icao24: &str, begin: i64, end: i64) -> Value {
        let tier = self.resolve_tier().await;
        match self.opensky.flights(icao24, begin, end, &tier).await {
            Ok(body) => body,
            Err(e) => error_envelope("flight history lookup failed", &e.to_string()),
        }
    }

    /// Direct secondary-provider lookup by callsign.
    pub async fn flight_info(&self, callsign: &str) -> Value {
        match self.aerodatabox.flight_by_callsign(callsign).await {
            Ok(Some(record)) => json!({
                "callsign": callsign.trim(),
                "route": record.route,
                "aircraft": record.aircraft_model,
                "scheduledDeparture": record.scheduled_departure.map(|t| t.to_rfc3339()),
                "scheduledArrival": record.scheduled_arrival.map(|t| t.to_rfc3339()),
                "arrived": record.arrived,
            }),
            Ok(None) => json!({
                "callsign": callsign.trim(),
                "route": classify(self.table, Some(callsign)),
            }),
            Err(e) => error_envelope("flight info lookup failed", &e.to_string()),
        }
    }

    async fn resolve_tier(&self) -> CredentialTier {
        resolve_credentials(&self.auth_requester, &self.config.opensky).await
    }
}

fn error_envelope(message: &str, detail: &str) -> Value {
    json!({ "error": message, "details": detail })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::config::RetrySettings;
    use crate::provider::{HttpResponse, ProviderError, SequenceHttpClient};

    /// Wrapper delaying every call, so fetch latencies are measurable.
    #[derive(Clone)]
    struct SlowClient {
        inner: SequenceHttpClient,
        delay: Duration,
    }

    impl AsyncHttpClient for SlowClient {
        async fn get(
            &self,
            url: &str,
            headers: &[(&str, String)],
            timeout: Duration,
        ) -> Result<HttpResponse, ProviderError> {
            tokio::time::sleep(self.delay).await;
            self.inner.get(url, headers, timeout).await
        }

        async fn post_form(
            &self,
            url: &str,
            form: &[(&str, &str)],
            timeout: Duration,
        ) -> Result<HttpResponse, ProviderError> {
            self.inner.post_form(url, form, timeout).await
        }
    }

    fn leaked_table() -> &'static AirlineTable {
        Box::leak(Box::new(AirlineTable::from_entries([(
            "FI",
            "Icelandair",
        )])))
    }

    fn config(aerodatabox_key: Option<&str>, airlabs_key: Option<&str>) -> AppConfig {
        let mut config = AppConfig::default();
        config.aerodatabox.api_key = aerodatabox_key.map(str::to_string);
        config.airlabs.api_key = airlabs_key.map(str::to_string);
        config.retry = RetrySettings {
            max_attempts: 1,
            backoff_base: Duration::from_millis(1),
            ..RetrySettings::default()
        };
        config
    }

    fn ok(body: &str) -> Result<HttpResponse, ProviderError> {
        Ok(HttpResponse {
            status: 200,
            body: body.to_string(),
        })
    }

    fn http_err(status: u16) -> Result<HttpResponse, ProviderError> {
        Ok(HttpResponse {
            status,
            body: "unavailable".to_string(),
        })
    }

    fn bbox() -> BoundingBox {
        BoundingBox {
            lamin: 58.0,
            lamax: 62.0,
            lomin: 4.0,
            lomax: 8.0,
        }
    }

    #[tokio::test]
    async fn empty_primary_snapshot_is_a_clean_success() {
        // Call order: states only (no credentials, no lookups to make).
        let client = SequenceHttpClient::new(vec![ok(r#"{"time": 7, "states": []}"#)]);
        let orchestrator = Orchestrator::new(client, config(Some("k"), None), leaked_table());

        let budget = RequestBudget::new(Duration::from_secs(9));
        let snapshot = orchestrator.bounding_box_snapshot(&bbox(), &budget).await;

        assert_eq!(snapshot.time, 7);
        assert!(snapshot.states.is_empty());
        assert_eq!(snapshot.status.data_source, SOURCE_OPENSKY);
        assert_eq!(snapshot.status.lookups_attempted, 0);
        assert_eq!(snapshot.status.lookups_succeeded, 0);
        assert!(snapshot.status.error.is_none());
    }

    #[tokio::test]
    async fn primary_failure_falls_back_to_airlabs() {
        let airlabs_body = r#"{"response": [
            {"hex": "4ca1fa", "lat": 60.0, "lng": 5.0, "alt": 3000, "speed": 720,
             "flight_icao": "SAS123", "dep_iata": "OSL", "arr_iata": "BGO",
             "status": "en-route"}
        ]}"#;
        // Call order: states (503) then airlabs flights.
        let client = SequenceHttpClient::new(vec![http_err(503), ok(airlabs_body)]);
        let orchestrator = Orchestrator::new(client, config(None, Some("k")), leaked_table());

        let budget = RequestBudget::new(Duration::from_secs(9));
        let snapshot = orchestrator.bounding_box_snapshot(&bbox(), &budget).await;

        assert_eq!(snapshot.status.data_source, SOURCE_AIRLABS);
        assert_eq!(snapshot.states.len(), 1);
        assert_eq!(snapshot.states[0].icao24, "4ca1fa");
        assert!(snapshot.states[0].route.is_some());
        assert!(snapshot.status.error.as_deref().unwrap().contains("primary"));
    }

    #[tokio::test]
    async fn fallback_fetch_latency_includes_the_primary_attempt() {
        let airlabs_body = r#"{"response": [
            {"hex": "4ca1fa", "lat": 60.0, "lng": 5.0, "status": "en-route"}
        ]}"#;
        let client = SlowClient {
            inner: SequenceHttpClient::new(vec![http_err(503), ok(airlabs_body)]),
            delay: Duration::from_millis(20),
        };
        let orchestrator = Orchestrator::new(client, config(None, Some("k")), leaked_table());

        let budget = RequestBudget::new(Duration::from_secs(9));
        let snapshot = orchestrator.bounding_box_snapshot(&bbox(), &budget).await;

        assert_eq!(snapshot.status.data_source, SOURCE_AIRLABS);
        // Two 20ms calls: the failed primary attempt must stay counted.
        assert!(
            snapshot.status.fetch_ms >= 35,
            "fetch_ms {} lost the primary phase",
            snapshot.status.fetch_ms
        );
    }

    #[tokio::test]
    async fn double_failure_returns_empty_snapshot_not_error() {
        let client = SequenceHttpClient::new(vec![http_err(503), http_err(500)]);
        let orchestrator = Orchestrator::new(client, config(None, Some("k")), leaked_table());

        let budget = RequestBudget::new(Duration::from_secs(9));
        let snapshot = orchestrator.bounding_box_snapshot(&bbox(), &budget).await;

        assert_eq!(snapshot.status.data_source, SOURCE_NONE);
        assert!(snapshot.states.is_empty());
        assert!(snapshot.status.error.is_some());
    }

    #[tokio::test]
    async fn fallback_without_key_still_yields_empty_snapshot() {
        let client = SequenceHttpClient::new(vec![http_err(503)]);
        let orchestrator = Orchestrator::new(client, config(None, None), leaked_table());

        let budget = RequestBudget::new(Duration::from_secs(9));
        let snapshot = orchestrator.bounding_box_snapshot(&bbox(), &budget).await;

        assert_eq!(snapshot.status.data_source, SOURCE_NONE);
        assert!(snapshot.status.error.is_some());
        assert!(!snapshot.status.airlabs_key_present);
    }

    #[tokio::test]
    async fn track_failure_is_an_error_envelope() {
        let client = SequenceHttpClient::new(vec![http_err(404)]);
        let orchestrator = Orchestrator::new(client, config(None, None), leaked_table());

        let body = orchestrator.track("4ca1fa", 0).await;
        assert!(body.get("error").is_some());
    }

    #[tokio::test]
    async fn flight_info_falls_back_to_classifier_on_empty() {
        let client = SequenceHttpClient::new(vec![ok("[]")]);
        let orchestrator = Orchestrator::new(client, config(Some("k"), None), leaked_table());

        let body = orchestrator.flight_info("SK1234").await;
        assert_eq!(body["route"], "SAS Domestic/European");
    }
}
