//! OpenSky Network primary provider.
//!
//! # Endpoints
//!
//! - `/states/all?lamin={}&lamax={}&lomin={}&lomax={}`: bounding-box
//!   snapshot; optional `Authorization` header from the resolved tier
//! - `/tracks/all?icao24={}&time={}`: waypoint track for one aircraft
//! - `/flights/aircraft?icao24={}&begin={}&end={}`: flight history
//!
//! The snapshot body is `{"time": <unix>, "states": [[...17 fields]]}`.
//! `states` may be `null` when nothing is in range; an entirely empty body
//! is also a valid empty result. Rows that fail to parse are dropped
//! individually.

use serde_json::Value;

use super::auth::CredentialTier;
use super::http::{AsyncHttpClient, BoundedRequester};
use super::types::ProviderError;
use crate::config::{OpenSkySettings, RetrySettings};
use crate::model::{BoundingBox, RawSnapshot, StateVector};

/// Primary surveillance snapshot provider.
pub struct OpenSkyProvider<C: AsyncHttpClient> {
    requester: BoundedRequester<C>,
    api_url: String,
    max_attempts: u32,
}

impl<C: AsyncHttpClient> OpenSkyProvider<C> {
    pub fn new(client: C, settings: &OpenSkySettings, retry: RetrySettings) -> Self {
        Self {
            requester: BoundedRequester::new(client, retry),
            api_url: settings.api_url.trim_end_matches('/').to_string(),
            max_attempts: retry.max_attempts,
        }
    }

    /// Fetches the current state vectors inside the bounding box.
    pub async fn states(
        &self,
        bbox: &BoundingBox,
        tier: &CredentialTier,
    ) -> Result<RawSnapshot, ProviderError> {
        let url = format!(
            "{}/states/all?lamin={}&lamax={}&lomin={}&lomax={}",
            self.api_url, bbox.lamin, bbox.lamax, bbox.lomin, bbox.lomax
        );
        let body = self
            .requester
            .request_json(&url, &tier.headers(), self.max_attempts)
            .await?;
        Ok(parse_snapshot(&body))
    }

    /// Fetches the waypoint track for one aircraft. `time = 0` means the
    /// live track.
    pub async fn track(
        &self,
        icao24: &str,
        time: i64,
        tier: &CredentialTier,
    ) -> Result<Value, ProviderError> {
        let url = format!(
            "{}/tracks/all?icao24={}&time={}",
            self.api_url,
            icao24.to_lowercase(),
            time
        );
        self.requester
            .request_json(&url, &tier.headers(), self.max_attempts)
            .await
    }

    /// Fetches flights flown by one aircraft in the given time range.
    pub async fn flights(
        &self,
        icao24: &str,
        begin: i64,
        end: i64,
        tier: &CredentialTier,
    ) -> Result<Value, ProviderError> {
        let url = format!(
            "{}/flights/aircraft?icao24={}&begin={}&end={}",
            self.api_url,
            icao24.to_lowercase(),
            begin,
            end
        );
        self.requester
            .request_json(&url, &tier.headers(), self.max_attempts)
            .await
    }
}

fn parse_snapshot(body: &Value) -> RawSnapshot {
    let time = body.get("time").and_then(Value::as_i64).unwrap_or_default();
    let states = body
        .get("states")
        .and_then(Value::as_array)
        .map(|rows| rows.iter().filter_map(StateVector::from_opensky_row).collect())
        .unwrap_or_default();
    RawSnapshot { time, states }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::http::tests::MockAsyncHttpClient;

    fn provider(client: MockAsyncHttpClient) -> OpenSkyProvider<MockAsyncHttpClient> {
        OpenSkyProvider::new(
            client,
            &OpenSkySettings::default(),
            RetrySettings {
                backoff_base: std::time::Duration::from_millis(1),
                ..RetrySettings::default()
            },
        )
    }

    #[tokio::test]
    async fn parses_states_response() {
        let body = r#"{
            "time": 1700000000,
            "states": [
                ["4ca1fa", "SK1234  ", "Norway", null, 1700000000, 5.3, 60.4,
                 3048.0, false, 210.0, 180.0, -2.0, null, 3100.0, null, false, 0],
                ["48c1de", "WF123", "Norway", null, 1700000000, 6.1, 61.0,
                 1500.0, false, 120.0, 90.0, 1.0, null, 1550.0, null, false, 0]
            ]
        }"#;
        let snapshot = provider(MockAsyncHttpClient::ok(200, body))
            .states(
                &BoundingBox {
                    lamin: 58.0,
                    lamax: 62.0,
                    lomin: 4.0,
                    lomax: 8.0,
                },
                &CredentialTier::Anonymous,
            )
            .await
            .unwrap();

        assert_eq!(snapshot.time, 1_700_000_000);
        assert_eq!(snapshot.states.len(), 2);
        assert_eq!(snapshot.states[0].icao24, "4ca1fa");
        assert_eq!(snapshot.states[1].trimmed_callsign(), Some("WF123"));
    }

    #[tokio::test]
    async fn null_states_is_empty_snapshot() {
        let snapshot = provider(MockAsyncHttpClient::ok(
            200,
            r#"{"time": 1700000000, "states": null}"#,
        ))
        .states(
            &BoundingBox {
                lamin: 0.0,
                lamax: 1.0,
                lomin: 0.0,
                lomax: 1.0,
            },
            &CredentialTier::Anonymous,
        )
        .await
        .unwrap();
        assert_eq!(snapshot.time, 1_700_000_000);
        assert!(snapshot.states.is_empty());
    }

    #[tokio::test]
    async fn empty_body_is_empty_snapshot() {
        let snapshot = provider(MockAsyncHttpClient::ok(200, ""))
            .states(
                &BoundingBox {
                    lamin: 0.0,
                    lamax: 1.0,
                    lomin: 0.0,
                    lomax: 1.0,
                },
                &CredentialTier::Anonymous,
            )
            .await
            .unwrap();
        assert!(snapshot.states.is_empty());
    }

    #[tokio::test]
    async fn provider_failure_propagates_classified() {
        let err = provider(MockAsyncHttpClient::ok(503, "maintenance"))
            .states(
                &BoundingBox {
                    lamin: 0.0,
                    lamax: 1.0,
                    lomin: 0.0,
                    lomax: 1.0,
                },
                &CredentialTier::Anonymous,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Http { status: 503, .. }));
    }

    #[tokio::test]
    async fn unparseable_rows_are_dropped_individually() {
        let body = r#"{"time": 1, "states": [["4ca1fa"], [null], "junk"]}"#;
        let snapshot = provider(MockAsyncHttpClient::ok(200, body))
            .states(
                &BoundingBox {
                    lamin: 0.0,
                    lamax: 1.0,
                    lomin: 0.0,
                    lomax: 1.0,
                },
                &CredentialTier::Anonymous,
            )
            .await
            .unwrap();
        assert_eq!(snapshot.states.len(), 1);
    }
}
