//! Polling state machine.
//!
//! [`PollEngine`] owns the granularity selection, the Idle/Fetching/
//! Error phase, and the projection currently on screen. It decides
//! *when* a fetch should be issued and *whether* a settled fetch may be
//! applied; actually performing fetches and running the timer is the
//! runtime driver's job (see `poller`).
//!
//! Every issued fetch carries a ticket with the epoch it was issued
//! for. Changing granularity bumps the epoch, so a response that
//! belongs to a superseded selection fails the epoch comparison on
//! arrival and is dropped without touching displayed state.

use serde::Serialize;
use tracing::{debug, warn};

use plugwatch_protocol::{AggregationRecord, Granularity};

use super::client::FetchError;
use super::projection::{self, Projection};

/// Lifecycle phase of the poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Last fetch applied cleanly; waiting for the next timer tick.
    Idle,
    /// A fetch for the current selection is in flight.
    Fetching,
    /// Last fetch failed; previous data stays visible, timer keeps
    /// retrying.
    Error,
}

/// Identifies one issued fetch: which selection epoch it belongs to
/// and what granularity it was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub epoch: u64,
    pub granularity: Granularity,
}

/// What the view reads: selection, loading flag, last error, and the
/// currently displayed projection. Published as an atomic unit so the
/// renderer never observes a half-updated state.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub granularity: Granularity,
    pub loading: bool,
    pub last_error: Option<String>,
    pub projection: Projection,
}

impl DashboardSnapshot {
    pub fn empty(granularity: Granularity) -> Self {
        Self {
            granularity,
            loading: false,
            last_error: None,
            projection: Projection::empty(granularity),
        }
    }
}

pub struct PollEngine {
    granularity: Granularity,
    phase: Phase,
    epoch: u64,
    last_error: Option<String>,
    projection: Projection,
}

impl PollEngine {
    pub fn new(granularity: Granularity) -> Self {
        Self {
            granularity,
            phase: Phase::Idle,
            epoch: 0,
            last_error: None,
            projection: Projection::empty(granularity),
        }
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn loading(&self) -> bool {
        self.phase == Phase::Fetching
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Issues the initial fetch when the dashboard mounts.
    pub fn start(&mut self) -> FetchTicket {
        self.begin_fetch()
    }

    /// Applies a user selection. Returns the fetch to issue, or `None`
    /// when the granularity is unchanged. The caller must disarm any
    /// pending timer when a ticket is returned.
    pub fn select(&mut self, granularity: Granularity) -> Option<FetchTicket> {
        if granularity == self.granularity {
            return None;
        }

        debug!(from = %self.granularity, to = %granularity, "Granularity changed");
        self.granularity = granularity;
        Some(self.begin_fetch())
    }

    /// Handles a timer tick. Only valid between fetches; a tick that
    /// races an in-flight fetch is ignored.
    pub fn timer_tick(&mut self) -> Option<FetchTicket> {
        match self.phase {
            Phase::Idle | Phase::Error => Some(self.begin_fetch()),
            Phase::Fetching => None,
        }
    }

    fn begin_fetch(&mut self) -> FetchTicket {
        self.epoch += 1;
        self.phase = Phase::Fetching;
        FetchTicket {
            epoch: self.epoch,
            granularity: self.granularity,
        }
    }

    /// Applies a successful fetch, replacing the displayed projection
    /// wholesale. Returns `false` when the ticket is stale, in which
    /// case nothing changes.
    pub fn fetch_succeeded(&mut self, ticket: FetchTicket, records: Vec<AggregationRecord>) -> bool {
        if self.is_stale(ticket) {
            return false;
        }

        debug!(count = records.len(), %ticket.granularity, "Applying fetch result");
        self.projection = projection::project(records, self.granularity);
        self.last_error = None;
        self.phase = Phase::Idle;
        true
    }

    /// Records a failed fetch. Previously displayed data stays put;
    /// only the error indicator changes. Returns `false` for stale
    /// tickets.
    pub fn fetch_failed(&mut self, ticket: FetchTicket, error: &FetchError) -> bool {
        if self.is_stale(ticket) {
            return false;
        }

        warn!(%error, %ticket.granularity, "Fetch failed, keeping previous data");
        self.last_error = Some(error.to_string());
        self.phase = Phase::Error;
        true
    }

    fn is_stale(&self, ticket: FetchTicket) -> bool {
        if ticket.epoch != self.epoch {
            debug!(
                ticket_epoch = ticket.epoch,
                current_epoch = self.epoch,
                %ticket.granularity,
                "Dropping stale fetch result"
            );
            return true;
        }
        false
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            granularity: self.granularity,
            loading: self.loading(),
            last_error: self.last_error.clone(),
            projection: self.projection.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(period: i64, watt_hours: f64) -> AggregationRecord {
        AggregationRecord {
            period,
            average_volt: 230.0,
            average_current: 1.0,
            average_watts: 230.0,
            max_watts: 240.0,
            min_watts: 220.0,
            total_count: 60,
            total_watt_hours: watt_hours,
        }
    }

    #[test]
    fn starts_idle_with_empty_projection() {
        let engine = PollEngine::new(Granularity::Hourly);
        assert_eq!(engine.phase(), Phase::Idle);
        assert_eq!(engine.granularity(), Granularity::Hourly);
        assert!(engine.projection().rows.is_empty());
        assert!(!engine.loading());
    }

    #[test]
    fn start_enters_fetching_and_sets_loading() {
        let mut engine = PollEngine::new(Granularity::Hourly);
        let ticket = engine.start();
        assert_eq!(ticket.granularity, Granularity::Hourly);
        assert_eq!(engine.phase(), Phase::Fetching);
        assert!(engine.loading());
        assert!(engine.snapshot().loading);
    }

    #[test]
    fn successful_fetch_returns_to_idle_with_rows() {
        let mut engine = PollEngine::new(Granularity::Hourly);
        let ticket = engine.start();

        assert!(engine.fetch_succeeded(ticket, vec![record(1_700_000_000_000, 3.83)]));
        assert_eq!(engine.phase(), Phase::Idle);
        assert_eq!(engine.projection().rows.len(), 1);
        assert_eq!(engine.projection().running_total, 3.83);
        assert!(engine.snapshot().last_error.is_none());
    }

    #[test]
    fn selecting_same_granularity_is_a_no_op() {
        let mut engine = PollEngine::new(Granularity::Hourly);
        assert!(engine.select(Granularity::Hourly).is_none());
        assert_eq!(engine.phase(), Phase::Idle);
    }

    #[test]
    fn stale_result_is_discarded_after_reselect() {
        let mut engine = PollEngine::new(Granularity::Hourly);
        let hourly_ticket = engine.start();

        // User switches to weekly before the hourly fetch resolves.
        let weekly_ticket = engine.select(Granularity::Weekly).expect("new fetch");
        assert_eq!(weekly_ticket.granularity, Granularity::Weekly);

        // The late hourly result must not overwrite the weekly view.
        assert!(!engine.fetch_succeeded(hourly_ticket, vec![record(0, 99.0)]));
        assert!(engine.projection().rows.is_empty());
        assert_eq!(engine.granularity(), Granularity::Weekly);
        assert!(engine.loading());

        // The weekly result lands normally.
        assert!(engine.fetch_succeeded(weekly_ticket, vec![record(1_700_000_000_000, 3.0)]));
        assert_eq!(engine.projection().granularity, Granularity::Weekly);
        assert_eq!(engine.projection().rows.len(), 1);
    }

    #[test]
    fn stale_failure_is_discarded_too() {
        let mut engine = PollEngine::new(Granularity::Hourly);
        let old = engine.start();
        let new = engine.select(Granularity::Daily).expect("new fetch");

        assert!(!engine.fetch_failed(old, &FetchError::Network("timeout".into())));
        assert!(engine.snapshot().last_error.is_none());
        assert!(engine.loading());

        assert!(engine.fetch_succeeded(new, Vec::new()));
        assert_eq!(engine.phase(), Phase::Idle);
    }

    #[test]
    fn failure_keeps_previous_rows_and_clears_loading() {
        let mut engine = PollEngine::new(Granularity::Hourly);
        let first = engine.start();
        assert!(engine.fetch_succeeded(first, vec![record(1, 1.0), record(2, 2.0)]));

        let second = engine.timer_tick().expect("tick from idle");
        assert!(engine.fetch_failed(second, &FetchError::BadResponse("HTTP 500".into())));

        assert_eq!(engine.phase(), Phase::Error);
        assert!(!engine.loading());
        assert_eq!(engine.projection().rows.len(), 2);
        assert_eq!(engine.projection().running_total, 3.0);
        let snapshot = engine.snapshot();
        assert!(!snapshot.loading);
        assert_eq!(snapshot.last_error.as_deref(), Some("bad response: HTTP 500"));
    }

    #[test]
    fn timer_tick_retries_from_error_state() {
        let mut engine = PollEngine::new(Granularity::Hourly);
        let first = engine.start();
        assert!(engine.fetch_failed(first, &FetchError::Network("refused".into())));
        assert_eq!(engine.phase(), Phase::Error);

        let retry = engine.timer_tick().expect("tick from error");
        assert_eq!(retry.granularity, Granularity::Hourly);
        assert!(engine.fetch_succeeded(retry, Vec::new()));
        assert!(engine.snapshot().last_error.is_none());
    }

    #[test]
    fn timer_tick_is_ignored_while_fetching() {
        let mut engine = PollEngine::new(Granularity::Hourly);
        let _inflight = engine.start();
        assert!(engine.timer_tick().is_none());
    }

    #[test]
    fn refetch_of_identical_data_is_idempotent() {
        let records = vec![record(1_700_000_000_000, 3.83), record(1_700_000_060_000, 4.1)];

        let mut engine = PollEngine::new(Granularity::Minute);
        let first = engine.start();
        assert!(engine.fetch_succeeded(first, records.clone()));
        let before = engine.projection().clone();

        let second = engine.timer_tick().expect("tick");
        assert!(engine.fetch_succeeded(second, records));
        assert_eq!(engine.projection(), &before);
    }

    #[test]
    fn each_fetch_gets_a_fresh_epoch() {
        let mut engine = PollEngine::new(Granularity::Hourly);
        let a = engine.start();
        assert!(engine.fetch_succeeded(a, Vec::new()));
        let b = engine.timer_tick().expect("tick");
        assert!(b.epoch > a.epoch);
    }
}
