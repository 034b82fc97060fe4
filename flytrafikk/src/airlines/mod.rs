//! Airline code table and heuristic callsign classification.

mod classify;
mod table;

pub use classify::{classify, COMMERCIAL_FLIGHT, UNKNOWN_AIRCRAFT, UNKNOWN_OPERATOR};
pub use table::{AirlineTable, AIRLINES_FILE};
