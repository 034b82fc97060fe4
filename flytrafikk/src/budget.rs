//! Request execution budget tracking.
//!
//! The serverless environment that fronts this library enforces a hard
//! wall-clock limit per invocation. A [`RequestBudget`] is created when a
//! request arrives and consulted throughout enrichment to decide whether
//! secondary lookups may still start. It is advisory only: an in-flight
//! lookup runs to its own timeout even if the budget expires while waiting.

use std::time::{Duration, Instant};

/// Wall-clock budget for a single inbound request.
///
/// Immutable after construction; `elapsed`/`remaining` are pure functions
/// of the clock. One budget is created per request and discarded with it.
#[derive(Debug, Clone, Copy)]
pub struct RequestBudget {
    started: Instant,
    ceiling: Duration,
}

impl RequestBudget {
    /// Starts a new budget with the given ceiling (the environment's
    /// execution limit minus a safety margin).
    pub fn new(ceiling: Duration) -> Self {
        Self {
            started: Instant::now(),
            ceiling,
        }
    }

    /// Creates a budget that already reports `spent` as elapsed.
    ///
    /// Intended for tests that need to simulate a partially consumed
    /// budget without sleeping.
    pub fn backdated(ceiling: Duration, spent: Duration) -> Self {
        let now = Instant::now();
        Self {
            started: now.checked_sub(spent).unwrap_or(now),
            ceiling,
        }
    }

    /// Time spent since the request started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Time left before the ceiling, saturating at zero.
    pub fn remaining(&self) -> Duration {
        self.ceiling.saturating_sub(self.elapsed())
    }

    /// Whether at least `needed` remains before the ceiling.
    pub fn has_at_least(&self, needed: Duration) -> bool {
        self.remaining() >= needed
    }

    /// The configured ceiling.
    pub fn ceiling(&self) -> Duration {
        self.ceiling
    }
}
