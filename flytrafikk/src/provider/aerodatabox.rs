//! AeroDataBox secondary provider: per-flight metadata lookup.
//!
//! # Endpoint
//!
//! `/flights/callsign/{callsign}?withAircraftImage=false&withLocation=false`
//! with an `x-rapidapi-key` header. Returns zero or more flight records
//! with nested departure/arrival/aircraft objects; we keep the most
//! recent one.
//!
//! Two response forms exist in the wild:
//!
//! - structured: an array of flight objects (route, aircraft model and
//!   the scheduled times come from here)
//! - legacy: a bare JSON string, used as the route text only
//!
//! Anything else (empty, null, malformed) resolves to `None` and the
//! caller falls back to heuristic classification.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;
use tracing::debug;

use super::http::{AsyncHttpClient, BoundedRequester};
use super::types::ProviderError;
use crate::config::{AeroDataBoxSettings, RetrySettings};

/// One recent flight's enrichment metadata.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlightRecord {
    /// Route description, e.g. "Oslo Gardermoen → Bergen Flesland".
    pub route: Option<String>,
    /// Aircraft model label.
    pub aircraft_model: Option<String>,
    /// Scheduled departure, UTC.
    pub scheduled_departure: Option<DateTime<Utc>>,
    /// Scheduled arrival, UTC.
    pub scheduled_arrival: Option<DateTime<Utc>>,
    /// Whether the provider marks the flight as arrived.
    pub arrived: bool,
}

/// Keyed flight metadata lookup client.
pub struct AeroDataBoxProvider<C: AsyncHttpClient> {
    requester: BoundedRequester<C>,
    api_url: String,
    api_key: Option<String>,
    max_attempts: u32,
}

impl<C: AsyncHttpClient> AeroDataBoxProvider<C> {
    pub fn new(client: C, settings: &AeroDataBoxSettings, retry: RetrySettings) -> Self {
        Self {
            requester: BoundedRequester::new(client, retry),
            api_url: settings.api_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            max_attempts: retry.max_attempts,
        }
    }

    /// Whether a key is configured. Without one every lookup would fail,
    /// so the enrichment engine checks this before spending budget.
    pub fn has_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Looks up the most recent flight for a callsign.
    ///
    /// `Ok(None)` means the provider answered but had nothing usable.
    pub async fn flight_by_callsign(
        &self,
        callsign: &str,
    ) -> Result<Option<FlightRecord>, ProviderError> {
        let Some(api_key) = self.api_key.as_ref() else {
            return Err(ProviderError::MissingCredentials("aerodatabox"));
        };

        let url = format!(
            "{}/flights/callsign/{}?withAircraftImage=false&withLocation=false",
            self.api_url,
            callsign.trim()
        );
        let headers = [("x-rapidapi-key", api_key.clone())];
        let body = self
            .requester
            .request_json(&url, &headers, self.max_attempts)
            .await?;

        let record = parse_flight_response(&body);
        if record.is_none() {
            debug!(callsign = callsign, "no usable flight record");
        }
        Ok(record)
    }
}

fn parse_flight_response(body: &Value) -> Option<FlightRecord> {
    match body {
        // Legacy form: a bare route string.
        Value::String(route) if !route.trim().is_empty() => Some(FlightRecord {
            route: Some(route.trim().to_string()),
            ..FlightRecord::default()
        }),
        // Structured form: array of flights, most recent last.
        Value::Array(flights) => flights.iter().rev().find_map(parse_flight_object),
        Value::Object(_) => parse_flight_object(body),
        _ => None,
    }
}

fn parse_flight_object(flight: &Value) -> Option<FlightRecord> {
    let departure = flight.get("departure");
    let arrival = flight.get("arrival");

    let record = FlightRecord {
        route: route_text(departure, arrival),
        aircraft_model: flight
            .pointer("/aircraft/model")
            .and_then(Value::as_str)
            .map(str::to_string),
        scheduled_departure: scheduled_time(departure),
        scheduled_arrival: scheduled_time(arrival),
        arrived: flight
            .get("status")
            .and_then(Value::as_str)
            .is_some_and(|s| s.eq_ignore_ascii_case("arrived")),
    };

    // A record with no fields at all is no record.
    if record == FlightRecord::default() {
        None
    } else {
        Some(record)
    }
}

fn route_text(departure: Option<&Value>, arrival: Option<&Value>) -> Option<String> {
    let from = airport_label(departure)?;
    let to = airport_label(arrival)?;
    Some(format!("{} \u{2192} {}", from, to))
}

fn airport_label(endpoint: Option<&Value>) -> Option<String> {
    let airport = endpoint?.get("airport")?;
    airport
        .get("name")
        .or_else(|| airport.get("iata"))
        .or_else(|| airport.get("icao"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Accepts both the nested `scheduledTime.utc` and the flat
/// `scheduledTimeUtc` field, in RFC 3339 or the provider's
/// `YYYY-MM-DD HH:MMZ` shorthand.
fn scheduled_time(endpoint: Option<&Value>) -> Option<DateTime<Utc>> {
    let endpoint = endpoint?;
    let raw = endpoint
        .pointer("/scheduledTime/utc")
        .or_else(|| endpoint.get("scheduledTimeUtc"))
        .and_then(Value::as_str)?;
    parse_utc(raw)
}

fn parse_utc(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw.trim_end_matches('Z'), "%Y-%m-%d %H:%M")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::http::tests::MockAsyncHttpClient;

    fn provider(client: MockAsyncHttpClient) -> AeroDataBoxProvider<MockAsyncHttpClient> {
        AeroDataBoxProvider::new(
            client,
            &AeroDataBoxSettings {
                api_key: Some("key".to_string()),
                ..AeroDataBoxSettings::default()
            },
            RetrySettings::default(),
        )
    }

    #[tokio::test]
    async fn structured_response_yields_full_record() {
        let body = r#"[{
            "departure": {
                "airport": {"name": "Oslo Gardermoen", "iata": "OSL"},
                "scheduledTimeUtc": "2023-11-14 10:00Z"
            },
            "arrival": {
                "airport": {"name": "Bergen Flesland", "iata": "BGO"},
                "scheduledTimeUtc": "2023-11-14 11:30Z"
            },
            "aircraft": {"model": "Boeing 737-800"},
            "status": "EnRoute"
        }]"#;
        let record = provider(MockAsyncHttpClient::ok(200, body))
            .flight_by_callsign("SK1234")
            .await
            .unwrap()
            .expect("record");

        assert_eq!(
            record.route.as_deref(),
            Some("Oslo Gardermoen \u{2192} Bergen Flesland")
        );
        assert_eq!(record.aircraft_model.as_deref(), Some("Boeing 737-800"));
        assert!(!record.arrived);
        let dep = record.scheduled_departure.unwrap();
        let arr = record.scheduled_arrival.unwrap();
        assert_eq!((arr - dep).num_minutes(), 90);
    }

    #[tokio::test]
    async fn nested_scheduled_time_form_is_accepted() {
        let body = r#"[{
            "departure": {
                "airport": {"iata": "OSL"},
                "scheduledTime": {"utc": "2023-11-14T10:00:00Z"}
            },
            "arrival": {
                "airport": {"iata": "TRD"},
                "scheduledTime": {"utc": "2023-11-14T10:55:00Z"}
            },
            "status": "Arrived"
        }]"#;
        let record = provider(MockAsyncHttpClient::ok(200, body))
            .flight_by_callsign("SK1234")
            .await
            .unwrap()
            .expect("record");
        assert_eq!(record.route.as_deref(), Some("OSL \u{2192} TRD"));
        assert!(record.arrived);
    }

    #[tokio::test]
    async fn legacy_string_response_is_route_only() {
        let record = provider(MockAsyncHttpClient::ok(200, r#""OSL-BGO shuttle""#))
            .flight_by_callsign("WF123")
            .await
            .unwrap()
            .expect("record");
        assert_eq!(record.route.as_deref(), Some("OSL-BGO shuttle"));
        assert!(record.scheduled_departure.is_none());
        assert!(record.aircraft_model.is_none());
    }

    #[tokio::test]
    async fn empty_and_malformed_responses_are_none() {
        for body in ["", "[]", "null", "42", r#"[{"unrelated": true}]"#] {
            let result = provider(MockAsyncHttpClient::ok(200, body))
                .flight_by_callsign("SK1234")
                .await
                .unwrap();
            assert!(result.is_none(), "body {:?} should yield None", body);
        }
    }

    #[tokio::test]
    async fn missing_key_is_a_credential_error() {
        let provider = AeroDataBoxProvider::new(
            MockAsyncHttpClient::ok(200, "[]"),
            &AeroDataBoxSettings::default(),
            RetrySettings::default(),
        );
        assert!(!provider.has_key());
        let err = provider.flight_by_callsign("SK1234").await.unwrap_err();
        assert_eq!(err, ProviderError::MissingCredentials("aerodatabox"));
    }

    #[test]
    fn parse_utc_accepts_both_formats() {
        assert!(parse_utc("2023-11-14T10:00:00Z").is_some());
        assert!(parse_utc("2023-11-14 10:00Z").is_some());
        assert!(parse_utc("not a time").is_none());
    }
}
