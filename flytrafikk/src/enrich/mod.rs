//! Batch enrichment engine.
//!
//! Enriches a bounded subset of a snapshot's entities with
//! secondary-provider metadata, in fixed-size batches of concurrent
//! lookups. One batch's lookups run concurrently and the engine waits for
//! the whole batch before starting the next; the request budget is
//! re-checked between batches. Per-entity failures are swallowed and the
//! entity falls back to heuristic classification, so every entity leaves
//! here with *some* label. This module never errors outward.

mod schedule;

pub use schedule::{flight_times, FlightTimes};

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::airlines::{classify, AirlineTable};
use crate::budget::RequestBudget;
use crate::config::EnrichmentSettings;
use crate::model::StateVector;
use crate::provider::{AeroDataBoxProvider, AsyncHttpClient, FlightRecord};

/// What the enrichment pass attempted and achieved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichmentOutcome {
    /// Secondary-provider lookups started.
    pub attempted: usize,
    /// Lookups that produced a usable record.
    pub succeeded: usize,
    /// Enrichment was skipped entirely (budget too low or no key).
    pub skipped: bool,
    /// Remaining batches were abandoned mid-flight on the hard ceiling.
    pub truncated: bool,
}

/// Runs budget-aware batched enrichment over a snapshot.
pub struct BatchEnricher<C>
where
    C: AsyncHttpClient + 'static,
{
    secondary: Arc<AeroDataBoxProvider<C>>,
    settings: EnrichmentSettings,
}

impl<C> BatchEnricher<C>
where
    C: AsyncHttpClient + 'static,
{
    pub fn new(secondary: Arc<AeroDataBoxProvider<C>>, settings: EnrichmentSettings) -> Self {
        Self { secondary, settings }
    }

    /// Enriches `states` in place and reports what happened.
    ///
    /// Entity order is never changed; results are written back by index.
    pub async fn enrich(
        &self,
        states: &mut [StateVector],
        table: &AirlineTable,
        budget: &RequestBudget,
        now: DateTime<Utc>,
    ) -> EnrichmentOutcome {
        let mut outcome = EnrichmentOutcome::default();

        if !budget.has_at_least(self.settings.min_remaining) {
            info!(
                remaining_ms = budget.remaining().as_millis() as u64,
                threshold_ms = self.settings.min_remaining.as_millis() as u64,
                "insufficient budget, heuristic classification only"
            );
            outcome.skipped = true;
        } else if !self.secondary.has_key() {
            debug!("no secondary-provider key, heuristic classification only");
            outcome.skipped = true;
        } else {
            self.run_batches(states, budget, now, &mut outcome).await;
        }

        // Totality sweep: whatever enrichment did not resolve gets a
        // heuristic label. No entity leaves blank.
        for state in states.iter_mut() {
            if state.route.is_none() {
                state.route = Some(classify(table, state.callsign.as_deref()));
            }
        }

        outcome
    }

    async fn run_batches(
        &self,
        states: &mut [StateVector],
        budget: &RequestBudget,
        now: DateTime<Utc>,
        outcome: &mut EnrichmentOutcome,
    ) {
        // Bounded prefix of lookup-eligible entities; the rest get
        // heuristics from the sweep.
        let eligible: Vec<(usize, String)> = states
            .iter()
            .enumerate()
            .filter_map(|(idx, sv)| sv.trimmed_callsign().map(|cs| (idx, cs.to_string())))
            .take(self.settings.max_lookups)
            .collect();

        for batch in eligible.chunks(self.settings.batch_size.max(1)) {
            if budget.elapsed() >= self.settings.hard_ceiling {
                warn!(
                    elapsed_ms = budget.elapsed().as_millis() as u64,
                    ceiling_ms = self.settings.hard_ceiling.as_millis() as u64,
                    "hard ceiling reached, abandoning remaining batches"
                );
                outcome.truncated = true;
                break;
            }

            let mut lookups = JoinSet::new();
            for (idx, callsign) in batch {
                let secondary = Arc::clone(&self.secondary);
                let idx = *idx;
                let callsign = callsign.clone();
                outcome.attempted += 1;
                lookups.spawn(async move {
                    let result = secondary.flight_by_callsign(&callsign).await;
                    (idx, callsign, result)
                });
            }

            // Wait for the whole batch; a failed lookup never aborts its
            // siblings.
            while let Some(joined) = lookups.join_next().await {
                match joined {
                    Ok((idx, callsign, Ok(Some(record)))) => {
                        debug!(callsign = %callsign, "secondary lookup succeeded");
                        apply_record(&mut states[idx], &record, now);
                        outcome.succeeded += 1;
                    }
                    Ok((_, callsign, Ok(None))) => {
                        debug!(callsign = %callsign, "secondary lookup empty, will classify");
                    }
                    Ok((_, callsign, Err(e))) => {
                        warn!(callsign = %callsign, error = %e, "secondary lookup failed, will classify");
                    }
                    Err(join_err) => {
                        warn!(error = %join_err, "secondary lookup task panicked");
                    }
                }
            }
        }
    }
}

/// Writes a flight record's fields into the entity's extension slots.
fn apply_record(state: &mut StateVector, record: &FlightRecord, now: DateTime<Utc>) {
    state.route = record.route.clone();
    state.aircraft_type = record.aircraft_model.clone();

    if let (Some(dep), Some(arr)) = (record.scheduled_departure, record.scheduled_arrival) {
        let times = flight_times(dep, arr, now, record.arrived);
        state.total_minutes = Some(times.total);
        state.remaining_minutes = Some(times.remaining);
        state.elapsed_minutes = Some(times.elapsed);
    }
}
