//! Heuristic callsign classification.
//!
//! Deterministic, total fallback used whenever secondary enrichment is
//! unavailable, too slow, or failed for an entity. Absence of information
//! is itself a valid terminal branch, so this never errors: every callsign
//! resolves to *some* label.

use super::table::AirlineTable;

/// Label for an absent or empty callsign.
pub const UNKNOWN_OPERATOR: &str = "Unknown operator";

/// Label for a callsign that matches nothing at all.
pub const UNKNOWN_AIRCRAFT: &str = "Unknown aircraft";

/// Label for an unrecognized but flight-number-shaped callsign.
pub const COMMERCIAL_FLIGHT: &str = "Commercial flight";

/// Route descriptions for a fixed set of recognized carrier prefixes.
/// These win over the plain table name when both match.
const ROUTE_DECORATIONS: &[(&str, &str)] = &[
    ("SK", "SAS Domestic/European"),
    ("SAS", "SAS Domestic/European"),
    ("WF", "Wider\u{f8}e Regional (Norway)"),
    ("WIF", "Wider\u{f8}e Regional (Norway)"),
    ("DY", "Norwegian Short-haul (Europe)"),
    ("NAX", "Norwegian Short-haul (Europe)"),
    ("LH", "Lufthansa (Germany/Europe)"),
    ("BA", "British Airways (UK/Europe)"),
    ("KL", "KLM (Netherlands/Europe)"),
    ("AF", "Air France (France/Europe)"),
    ("EK", "Emirates (Long-haul)"),
];

/// Maps a callsign to a human-readable route/operator label.
///
/// Normalizes (trim, uppercase), then tries progressively shorter
/// prefixes (length 4 down to 2) against the decoration set and the code
/// table; falls back to a flight-number shape check and finally a generic
/// label. Pure function of its inputs.
pub fn classify(table: &AirlineTable, callsign: Option<&str>) -> String {
    let normalized = match callsign.map(str::trim).filter(|c| !c.is_empty()) {
        Some(c) => c.to_uppercase(),
        None => return UNKNOWN_OPERATOR.to_string(),
    };

    for len in (2..=4).rev() {
        let Some(prefix) = normalized.get(..len) else {
            continue;
        };
        if let Some((_, label)) = ROUTE_DECORATIONS.iter().find(|(code, _)| *code == prefix) {
            return (*label).to_string();
        }
        if let Some(name) = table.lookup(prefix) {
            return name.to_string();
        }
    }

    if looks_like_flight_number(&normalized) {
        COMMERCIAL_FLIGHT.to_string()
    } else {
        UNKNOWN_AIRCRAFT.to_string()
    }
}

/// Alphabetic prefix of length 2-3 followed by a digit.
fn looks_like_flight_number(callsign: &str) -> bool {
    let alpha = callsign
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .count();
    (2..=3).contains(&alpha)
        && callsign
            .chars()
            .nth(alpha)
            .is_some_and(|c| c.is_ascii_digit())
}
