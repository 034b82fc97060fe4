//! The `/flights` endpoint.
//!
//! One route, several operations selected by query parameters:
//!
//! - `lamin`/`lamax`/`lomin`/`lomax`: enriched bounding-box snapshot
//! - `mode=track&icao24=...[&time=...]`: waypoint track for one aircraft
//! - `mode=history&icao24=...&begin=...&end=...`: flights in a time range
//! - `mode=flightinfo&callsign=...`: direct metadata lookup
//!
//! Parameter errors are the only 400s. Upstream provider failures come
//! back as 200s with an error annotation in the body, so the UI always
//! has something well-formed to render.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use flytrafikk::budget::RequestBudget;
use flytrafikk::model::BoundingBox;
use flytrafikk::orchestrator::Orchestrator;
use flytrafikk::provider::ReqwestClient;

/// Shared server state: the pipeline plus the budget ceiling applied to
/// each inbound request.
pub struct AppState {
    pub orchestrator: Orchestrator<ReqwestClient>,
    pub budget_ceiling: std::time::Duration,
}

/// Everything `/flights` accepts. All optional; the handler decides
/// which operation the combination selects.
#[derive(Debug, Default, Deserialize)]
pub struct FlightsQuery {
    pub lamin: Option<f64>,
    pub lamax: Option<f64>,
    pub lomin: Option<f64>,
    pub lomax: Option<f64>,
    pub mode: Option<String>,
    pub icao24: Option<String>,
    pub callsign: Option<String>,
    pub time: Option<i64>,
    pub begin: Option<i64>,
    pub end: Option<i64>,
}

impl FlightsQuery {
    fn bounding_box(&self) -> Option<BoundingBox> {
        Some(BoundingBox {
            lamin: self.lamin?,
            lamax: self.lamax?,
            lomin: self.lomin?,
            lomax: self.lomax?,
        })
    }
}

pub async fn flights(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FlightsQuery>,
) -> (StatusCode, Json<Value>) {
    // The budget clock starts the moment the request arrives.
    let budget = RequestBudget::new(state.budget_ceiling);

    match query.mode.as_deref() {
        Some("track") => track(&state, &query).await,
        Some("history") => history(&state, &query).await,
        Some("flightinfo") => flight_info(&state, &query).await,
        Some(other) => bad_request(&format!(
            "unknown mode '{}'; expected track, history or flightinfo",
            other
        )),
        None => snapshot(&state, &query, &budget).await,
    }
}

async fn snapshot(
    state: &AppState,
    query: &FlightsQuery,
    budget: &RequestBudget,
) -> (StatusCode, Json<Value>) {
    let Some(bbox) = query.bounding_box() else {
        return bad_request("lamin, lamax, lomin and lomax are all required for a snapshot");
    };

    let snapshot = state.orchestrator.bounding_box_snapshot(&bbox, budget).await;
    info!(
        entities = snapshot.states.len(),
        source = %snapshot.status.data_source,
        elapsed_ms = budget.elapsed().as_millis() as u64,
        "snapshot request served"
    );
    (StatusCode::OK, Json(json!(snapshot)))
}

async fn track(state: &AppState, query: &FlightsQuery) -> (StatusCode, Json<Value>) {
    let Some(icao24) = query.icao24.as_deref() else {
        return bad_request("icao24 is required for mode=track");
    };
    // time=0 selects the live track.
    let body = state.orchestrator.track(icao24, query.time.unwrap_or(0)).await;
    (StatusCode::OK, Json(body))
}

async fn history(state: &AppState, query: &FlightsQuery) -> (StatusCode, Json<Value>) {
    let (Some(icao24), Some(begin), Some(end)) =
        (query.icao24.as_deref(), query.begin, query.end)
    else {
        return bad_request("icao24, begin and end are all required for mode=history");
    };
    let body = state.orchestrator.flight_history(icao24, begin, end).await;
    (StatusCode::OK, Json(body))
}

async fn flight_info(state: &AppState, query: &FlightsQuery) -> (StatusCode, Json<Value>) {
    let Some(callsign) = query.callsign.as_deref() else {
        return bad_request("callsign is required for mode=flightinfo");
    };
    let body = state.orchestrator.flight_info(callsign).await;
    (StatusCode::OK, Json(body))
}

fn bad_request(message: &str) -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": message,
            "usage": "GET /flights?lamin=..&lamax=..&lomin=..&lomax=.. \
                      | mode=track&icao24=.. | mode=history&icao24=..&begin=..&end=.. \
                      | mode=flightinfo&callsign=..",
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> FlightsQuery {
        let qs: Vec<String> = pairs.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        serde_urlencoded::from_str(&qs.join("&")).unwrap()
    }

    #[test]
    fn full_bbox_parses() {
        let q = query(&[
            ("lamin", "58.0"),
            ("lamax", "62.0"),
            ("lomin", "4.0"),
            ("lomax", "8.0"),
        ]);
        let bbox = q.bounding_box().unwrap();
        assert_eq!(bbox.lamin, 58.0);
        assert_eq!(bbox.lomax, 8.0);
    }

    #[test]
    fn partial_bbox_is_rejected() {
        let q = query(&[("lamin", "58.0"), ("lamax", "62.0")]);
        assert!(q.bounding_box().is_none());
    }

    #[test]
    fn mode_parameters_parse() {
        let q = query(&[
            ("mode", "history"),
            ("icao24", "4ca1fa"),
            ("begin", "1700000000"),
            ("end", "1700086400"),
        ]);
        assert_eq!(q.mode.as_deref(), Some("history"));
        assert_eq!(q.icao24.as_deref(), Some("4ca1fa"));
        assert_eq!(q.begin, Some(1_700_000_000));
    }

    #[test]
    fn bad_request_carries_usage_hint() {
        let (status, body) = bad_request("missing parameters");
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.0["error"], "missing parameters");
        assert!(body.0["usage"].as_str().unwrap().contains("lamin"));
    }
}
