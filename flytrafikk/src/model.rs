//! Core data model: state vectors, snapshots and geographic bounds.
//!
//! A [`StateVector`] is one tracked aircraft at a point in time. The first
//! 17 fields mirror the OpenSky `/states/all` positional schema; the five
//! extension fields are appended by this system and never come from the
//! primary provider. Internally everything is named and typed; the
//! positional 22-slot wire array exists only in the `Serialize` impl, so
//! compatibility-sensitive consumers keep seeing fixed offsets while the
//! rest of the crate works with real fields.

use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::orchestrator::EnrichmentStatus;

/// Number of positions in the OpenSky state vector schema.
pub const CORE_FIELDS: usize = 17;

/// Total wire positions including the extension fields appended by us.
pub const WIRE_FIELDS: usize = 22;

/// Geographic bounding box in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct BoundingBox {
    /// Minimum latitude (southern edge).
    pub lamin: f64,
    /// Maximum latitude (northern edge).
    pub lamax: f64,
    /// Minimum longitude (western edge).
    pub lomin: f64,
    /// Maximum longitude (eastern edge).
    pub lomax: f64,
}

impl BoundingBox {
    /// Whether the given position falls inside this box (edges inclusive).
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.lamin && lat <= self.lamax && lon >= self.lomin && lon <= self.lomax
    }
}

/// One tracked aircraft's positional record plus our derived fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StateVector {
    /// ICAO 24-bit transponder address, lowercase hex.
    pub icao24: String,
    /// Callsign as broadcast; may carry trailing whitespace.
    pub callsign: Option<String>,
    /// Country of registration.
    pub origin_country: Option<String>,
    /// Unix timestamp of the last position report.
    pub time_position: Option<i64>,
    /// Unix timestamp of the last message of any kind.
    pub last_contact: Option<i64>,
    /// Longitude in decimal degrees.
    pub longitude: Option<f64>,
    /// Latitude in decimal degrees.
    pub latitude: Option<f64>,
    /// Barometric altitude in metres.
    pub baro_altitude: Option<f64>,
    /// Whether the aircraft reports ground contact.
    pub on_ground: bool,
    /// Ground speed in m/s.
    pub velocity: Option<f64>,
    /// True track in decimal degrees clockwise from north.
    pub true_track: Option<f64>,
    /// Vertical rate in m/s; negative means descending.
    pub vertical_rate: Option<f64>,
    /// IDs of the receivers that contributed to this vector.
    pub sensors: Option<Vec<i64>>,
    /// Geometric altitude in metres.
    pub geo_altitude: Option<f64>,
    /// Transponder squawk code.
    pub squawk: Option<String>,
    /// Special purpose indicator flag.
    pub spi: bool,
    /// Position source (0 ADS-B, 1 ASTERIX, 2 MLAT, 3 FLARM).
    pub position_source: Option<i64>,

    // Extension fields, populated by enrichment only. Wire offsets 17-21.
    /// Route or operator description.
    pub route: Option<String>,
    /// Aircraft type/model label.
    pub aircraft_type: Option<String>,
    /// Total scheduled flight duration, whole minutes.
    pub total_minutes: Option<i64>,
    /// Minutes remaining until scheduled arrival.
    pub remaining_minutes: Option<i64>,
    /// Minutes elapsed since scheduled departure.
    pub elapsed_minutes: Option<i64>,
}

impl StateVector {
    /// Parses one row of the OpenSky `states` array.
    ///
    /// Returns `None` when the row is not an array or lacks an ICAO
    /// address; such rows are dropped individually, never a batch failure.
    pub fn from_opensky_row(row: &Value) -> Option<Self> {
        let fields = row.as_array()?;
        let icao24 = fields.first()?.as_str()?.to_string();
        if icao24.is_empty() {
            return None;
        }

        Some(Self {
            icao24,
            callsign: str_at(fields, 1),
            origin_country: str_at(fields, 2),
            time_position: i64_at(fields, 3),
            last_contact: i64_at(fields, 4),
            longitude: f64_at(fields, 5),
            latitude: f64_at(fields, 6),
            baro_altitude: f64_at(fields, 7),
            on_ground: bool_at(fields, 8),
            velocity: f64_at(fields, 9),
            true_track: f64_at(fields, 10),
            vertical_rate: f64_at(fields, 11),
            sensors: fields.get(12).and_then(|v| {
                v.as_array()
                    .map(|a| a.iter().filter_map(Value::as_i64).collect())
            }),
            geo_altitude: f64_at(fields, 13),
            squawk: str_at(fields, 14),
            spi: bool_at(fields, 15),
            position_source: i64_at(fields, 16),
            ..Self::default()
        })
    }

    /// Callsign with surrounding whitespace removed, if non-empty.
    pub fn trimmed_callsign(&self) -> Option<&str> {
        self.callsign
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

fn str_at(fields: &[Value], idx: usize) -> Option<String> {
    fields.get(idx)?.as_str().map(str::to_string)
}

fn f64_at(fields: &[Value], idx: usize) -> Option<f64> {
    fields.get(idx)?.as_f64()
}

fn i64_at(fields: &[Value], idx: usize) -> Option<i64> {
    fields.get(idx)?.as_i64()
}

fn bool_at(fields: &[Value], idx: usize) -> bool {
    fields
        .get(idx)
        .and_then(Value::as_bool)
        .unwrap_or_default()
}

// The wire format is the OpenSky positional array with our extension
// fields at fixed offsets 17-21. Consumers index, they do not name.
impl Serialize for StateVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(WIRE_FIELDS))?;
        seq.serialize_element(&self.icao24)?;
        seq.serialize_element(&self.callsign)?;
        seq.serialize_element(&self.origin_country)?;
        seq.serialize_element(&self.time_position)?;
        seq.serialize_element(&self.last_contact)?;
        seq.serialize_element(&self.longitude)?;
        seq.serialize_element(&self.latitude)?;
        seq.serialize_element(&self.baro_altitude)?;
        seq.serialize_element(&self.on_ground)?;
        seq.serialize_element(&self.velocity)?;
        seq.serialize_element(&self.true_track)?;
        seq.serialize_element(&self.vertical_rate)?;
        seq.serialize_element(&self.sensors)?;
        seq.serialize_element(&self.geo_altitude)?;
        seq.serialize_element(&self.squawk)?;
        seq.serialize_element(&self.spi)?;
        seq.serialize_element(&self.position_source)?;
        seq.serialize_element(&self.route)?;
        seq.serialize_element(&self.aircraft_type)?;
        seq.serialize_element(&self.total_minutes)?;
        seq.serialize_element(&self.remaining_minutes)?;
        seq.serialize_element(&self.elapsed_minutes)?;
        seq.end()
    }
}

/// Raw primary-provider snapshot before enrichment.
#[derive(Debug, Clone, Default)]
pub struct RawSnapshot {
    /// Unix timestamp the provider stamped the snapshot with.
    pub time: i64,
    /// State vectors in the provider's original order.
    pub states: Vec<StateVector>,
}

/// Finished, UI-ready snapshot. Immutable once assembled.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    /// Unix timestamp of the underlying data.
    pub time: i64,
    /// Enriched state vectors, primary-provider order preserved.
    pub states: Vec<StateVector>,
    /// What was attempted and what succeeded while assembling this.
    pub status: EnrichmentStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_row() -> Value {
        json!([
            "4ca1fa", "SK1234  ", "Norway", 1_700_000_000, 1_700_000_005, 5.32, 60.39, 3048.0,
            false, 210.5, 182.0, -4.5, null, 3100.0, "4511", false, 0
        ])
    }

    #[test]
    fn parses_opensky_row() {
        assert_eq!(sample_row().as_array().unwrap().len(), CORE_FIELDS);
        let sv = StateVector::from_opensky_row(&sample_row()).expect("row should parse");
        assert_eq!(sv.icao24, "4ca1fa");
        assert_eq!(sv.callsign.as_deref(), Some("SK1234  "));
        assert_eq!(sv.trimmed_callsign(), Some("SK1234"));
        assert_eq!(sv.longitude, Some(5.32));
        assert_eq!(sv.latitude, Some(60.39));
        assert!(!sv.on_ground);
        assert_eq!(sv.velocity, Some(210.5));
        assert_eq!(sv.position_source, Some(0));
        assert!(sv.route.is_none());
    }

    #[test]
    fn row_without_icao_is_dropped() {
        assert!(StateVector::from_opensky_row(&json!([null, "SK1234"])).is_none());
        assert!(StateVector::from_opensky_row(&json!(["", "SK1234"])).is_none());
        assert!(StateVector::from_opensky_row(&json!("not an array")).is_none());
    }

    #[test]
    fn short_row_parses_with_nulls() {
        let sv = StateVector::from_opensky_row(&json!(["abc123"])).expect("minimal row");
        assert_eq!(sv.icao24, "abc123");
        assert!(sv.callsign.is_none());
        assert!(!sv.on_ground);
    }

    #[test]
    fn wire_format_has_fixed_extension_offsets() {
        let mut sv = StateVector::from_opensky_row(&sample_row()).unwrap();
        sv.route = Some("SAS Domestic/European".to_string());
        sv.total_minutes = Some(90);

        let wire = serde_json::to_value(&sv).unwrap();
        let fields = wire.as_array().unwrap();
        assert_eq!(fields.len(), WIRE_FIELDS);
        assert_eq!(fields[0], json!("4ca1fa"));
        // Extension fields start right after the core schema.
        assert_eq!(fields[CORE_FIELDS], json!("SAS Domestic/European"));
        assert_eq!(fields[CORE_FIELDS + 1], Value::Null);
        assert_eq!(fields[CORE_FIELDS + 2], json!(90));
        assert_eq!(fields[WIRE_FIELDS - 1], Value::Null);
    }

    #[test]
    fn bounding_box_contains_edges() {
        let bbox = BoundingBox {
            lamin: 58.0,
            lamax: 62.0,
            lomin: 4.0,
            lomax: 8.0,
        };
        assert!(bbox.contains(60.0, 5.0));
        assert!(bbox.contains(58.0, 4.0));
        assert!(!bbox.contains(57.9, 5.0));
        assert!(!bbox.contains(60.0, 8.1));
    }
}
