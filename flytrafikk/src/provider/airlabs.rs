//! AirLabs fallback provider.
//!
//! Used only when the primary snapshot fetch fails outright. Queries
//! `/flights?api_key={key}` for globally active flights and remaps the
//! structurally different schema into the primary [`StateVector`] form:
//!
//! - `hex` → icao24 (lowercased)
//! - `lat`/`lng` → position, `alt` metres → both altitude fields
//! - `speed` km/h → velocity m/s, `dir` → heading, `v_speed` → vertical rate
//! - route synthesized from `dep_iata`/`arr_iata`/`airline_iata` when present
//!
//! Rows missing required fields are dropped individually, never as a
//! whole-batch failure.

use serde::Deserialize;
use tracing::{debug, warn};

use super::http::{AsyncHttpClient, BoundedRequester};
use super::types::ProviderError;
use crate::config::{AirLabsSettings, RetrySettings};
use crate::model::{BoundingBox, StateVector};

/// Conversion factor from km/h to m/s.
const KMH_TO_MS: f64 = 1.0 / 3.6;

/// One row of the AirLabs `/flights` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AirLabsFlight {
    pub hex: Option<String>,
    pub flag: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub alt: Option<f64>,
    pub dir: Option<f64>,
    pub speed: Option<f64>,
    pub v_speed: Option<f64>,
    pub squawk: Option<String>,
    pub flight_icao: Option<String>,
    pub flight_iata: Option<String>,
    pub dep_iata: Option<String>,
    pub arr_iata: Option<String>,
    pub airline_iata: Option<String>,
    pub status: Option<String>,
    pub updated: Option<i64>,
}

impl AirLabsFlight {
    fn airborne(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("en-route"))
    }

    /// Remaps into the primary schema. `None` drops the row.
    fn to_state_vector(&self, now: i64) -> Option<StateVector> {
        let icao24 = self.hex.as_deref()?.to_lowercase();
        let latitude = self.lat?;
        let longitude = self.lng?;
        if icao24.is_empty() {
            return None;
        }

        let timestamp = self.updated.unwrap_or(now);
        Some(StateVector {
            icao24,
            callsign: self.flight_icao.clone().or_else(|| self.flight_iata.clone()),
            origin_country: self.flag.clone(),
            time_position: Some(timestamp),
            last_contact: Some(timestamp),
            longitude: Some(longitude),
            latitude: Some(latitude),
            baro_altitude: self.alt,
            on_ground: false,
            velocity: self.speed.map(|kmh| kmh * KMH_TO_MS),
            true_track: self.dir,
            vertical_rate: self.v_speed,
            geo_altitude: self.alt,
            squawk: self.squawk.clone(),
            route: self.route_text(),
            ..StateVector::default()
        })
    }

    fn route_text(&self) -> Option<String> {
        let (dep, arr) = (self.dep_iata.as_deref()?, self.arr_iata.as_deref()?);
        let route = format!("{} \u{2192} {}", dep, arr);
        Some(match self.airline_iata.as_deref() {
            Some(airline) => format!("{} ({})", route, airline),
            None => route,
        })
    }
}

/// Fallback live-flight provider.
pub struct AirLabsProvider<C: AsyncHttpClient> {
    requester: BoundedRequester<C>,
    api_url: String,
    api_key: Option<String>,
    max_attempts: u32,
}

impl<C: AsyncHttpClient> AirLabsProvider<C> {
    pub fn new(client: C, settings: &AirLabsSettings, retry: RetrySettings) -> Self {
        Self {
            requester: BoundedRequester::new(client, retry),
            api_url: settings.api_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            max_attempts: retry.max_attempts,
        }
    }

    /// Fetches active flights, filters to airborne entities with live
    /// position data inside `region`, and remaps them into the primary
    /// schema.
    pub async fn states_in_region(
        &self,
        region: &BoundingBox,
        now: i64,
    ) -> Result<Vec<StateVector>, ProviderError> {
        let Some(api_key) = self.api_key.as_ref() else {
            return Err(ProviderError::MissingCredentials("airlabs"));
        };

        let url = format!("{}/flights?api_key={}", self.api_url, api_key);
        let body = self
            .requester
            .request_json(&url, &[], self.max_attempts)
            .await?;

        let rows: Vec<AirLabsFlight> = match body.get("response") {
            Some(response) => serde_json::from_value(response.clone()).map_err(|e| {
                ProviderError::InvalidResponse(format!("unexpected flights payload: {}", e))
            })?,
            None => Vec::new(),
        };
        let total = rows.len();

        let states: Vec<StateVector> = rows
            .into_iter()
            .filter(|f| f.airborne())
            .filter(|f| match (f.lat, f.lng) {
                (Some(lat), Some(lng)) => region.contains(lat, lng),
                _ => false,
            })
            .filter_map(|f| {
                let state = f.to_state_vector(now);
                if state.is_none() {
                    warn!(hex = ?f.hex, "dropping fallback row with missing fields");
                }
                state
            })
            .collect();

        debug!(
            total = total,
            usable = states.len(),
            "fallback provider remap complete"
        );
        Ok(states)
    }
}
