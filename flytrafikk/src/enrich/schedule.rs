//! Schedule-derived flight timing.
//!
//! Computed only when both scheduled departure and arrival are known.
//! All durations are whole minutes, rounded to nearest.

use chrono::{DateTime, Duration, Utc};

/// Total/remaining/elapsed flight duration in whole minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlightTimes {
    pub total: i64,
    pub remaining: i64,
    pub elapsed: i64,
}

/// Derives flight timing from the schedule and the current time.
///
/// `remaining` is zero at or past arrival, or when the provider already
/// marks the flight as arrived; `elapsed` is zero before departure.
pub fn flight_times(
    departure: DateTime<Utc>,
    arrival: DateTime<Utc>,
    now: DateTime<Utc>,
    arrived: bool,
) -> FlightTimes {
    let total = rounded_minutes(arrival - departure).max(0);

    let remaining = if arrived || now >= arrival {
        0
    } else {
        rounded_minutes(arrival - now).max(0)
    };

    let elapsed = if now < departure {
        0
    } else {
        rounded_minutes(now - departure).max(0)
    };

    FlightTimes {
        total,
        remaining,
        elapsed,
    }
}

fn rounded_minutes(duration: Duration) -> i64 {
    (duration.num_seconds() + 30).div_euclid(60)
}
