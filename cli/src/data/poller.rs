//! Poll loop runtime.
//!
//! Runs the [`PollEngine`] on a dedicated thread with a current-thread
//! tokio runtime, multiplexing three event sources with `select!`:
//! commands from the UI (granularity changes, manual refresh), the
//! settling of in-flight fetches, and the recurring poll timer.
//!
//! Fetches run on the blocking pool and are collected through a
//! `FuturesUnordered`, so switching granularity never aborts the old
//! request; its result is simply rejected by the engine's epoch check
//! when it eventually arrives. The timer is re-armed only after a fetch
//! settles, which means a hung request stalls the cadence for that
//! selection instead of piling up concurrent fetches.

use std::future::Future;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, error, info};

use plugwatch_protocol::{AggregationRecord, Granularity};

use super::client::{FetchError, MeterSource};
use super::poll::{DashboardSnapshot, FetchTicket, PollEngine};

/// Commands the UI sends to the poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollCommand {
    Select(Granularity),
    Refresh,
}

/// Handle owned by the UI: sends commands in, reads snapshots out.
/// Dropping the handle shuts the poll loop down.
pub struct PollerHandle {
    cmd_tx: Option<mpsc::Sender<PollCommand>>,
    snapshot_rx: watch::Receiver<DashboardSnapshot>,
    thread: Option<thread::JoinHandle<()>>,
}

impl PollerHandle {
    pub fn select(&self, granularity: Granularity) {
        self.send(PollCommand::Select(granularity));
    }

    pub fn refresh(&self) {
        self.send(PollCommand::Refresh);
    }

    fn send(&self, cmd: PollCommand) {
        if let Some(tx) = &self.cmd_tx {
            if tx.blocking_send(cmd).is_err() {
                error!(?cmd, "Poller is gone, command dropped");
            }
        }
    }

    /// Returns the latest snapshot if it changed since the last call.
    pub fn try_update(&mut self) -> Option<DashboardSnapshot> {
        match self.snapshot_rx.has_changed() {
            Ok(true) => Some(self.snapshot_rx.borrow_and_update().clone()),
            _ => None,
        }
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        self.snapshot_rx.borrow().clone()
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        // Closing the command channel ends the loop; join so the
        // runtime tears down before we return.
        self.cmd_tx.take();
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

/// Spawns the poll loop on its own thread and returns the UI handle.
pub fn spawn_poller(
    source: Arc<dyn MeterSource>,
    initial: Granularity,
    interval: Duration,
) -> std::io::Result<PollerHandle> {
    let (cmd_tx, cmd_rx) = mpsc::channel(32);
    let (snapshot_tx, snapshot_rx) = watch::channel(DashboardSnapshot::empty(initial));

    let thread = thread::Builder::new()
        .name("plugwatch-poller".to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    error!(error = %e, "Failed to build poller runtime");
                    return;
                }
            };

            runtime.block_on(poll_loop(source, initial, interval, cmd_rx, snapshot_tx));
            // Don't wait on a possibly hung blocking fetch at shutdown.
            runtime.shutdown_background();
        })?;

    Ok(PollerHandle {
        cmd_tx: Some(cmd_tx),
        snapshot_rx,
        thread: Some(thread),
    })
}

type SettledFetch = (FetchTicket, Result<Vec<AggregationRecord>, FetchError>);

fn run_fetch(
    source: &Arc<dyn MeterSource>,
    ticket: FetchTicket,
) -> impl Future<Output = SettledFetch> {
    let source = Arc::clone(source);
    async move {
        let result = match tokio::task::spawn_blocking(move || source.fetch(ticket.granularity))
            .await
        {
            Ok(result) => result,
            Err(e) => Err(FetchError::Network(format!("fetch task failed: {}", e))),
        };
        (ticket, result)
    }
}

async fn poll_loop(
    source: Arc<dyn MeterSource>,
    initial: Granularity,
    interval: Duration,
    mut cmd_rx: mpsc::Receiver<PollCommand>,
    snapshot_tx: watch::Sender<DashboardSnapshot>,
) {
    info!(granularity = %initial, interval_secs = interval.as_secs(), "Poller starting");

    let mut engine = PollEngine::new(initial);
    let mut inflight = FuturesUnordered::new();

    // Fetch immediately on mount, before the first timer tick.
    inflight.push(run_fetch(&source, engine.start()));
    publish(&snapshot_tx, &engine);

    let timer = tokio::time::sleep(interval);
    tokio::pin!(timer);
    let mut timer_armed = false;

    loop {
        tokio::select! {
            maybe_cmd = cmd_rx.recv() => {
                let Some(cmd) = maybe_cmd else {
                    debug!("Command channel closed, poller stopping");
                    break;
                };
                let ticket = match cmd {
                    PollCommand::Select(granularity) => engine.select(granularity),
                    PollCommand::Refresh => engine.timer_tick(),
                };
                if let Some(ticket) = ticket {
                    // Any pending recurring timer belongs to the old
                    // cadence; the new fetch re-arms it when it settles.
                    timer_armed = false;
                    inflight.push(run_fetch(&source, ticket));
                    publish(&snapshot_tx, &engine);
                }
            }
            Some((ticket, result)) = inflight.next(), if !inflight.is_empty() => {
                let settled = match result {
                    Ok(records) => engine.fetch_succeeded(ticket, records),
                    Err(err) => engine.fetch_failed(ticket, &err),
                };
                if settled {
                    timer.as_mut().reset(Instant::now() + interval);
                    timer_armed = true;
                    publish(&snapshot_tx, &engine);
                }
            }
            _ = &mut timer, if timer_armed => {
                timer_armed = false;
                if let Some(ticket) = engine.timer_tick() {
                    inflight.push(run_fetch(&source, ticket));
                    publish(&snapshot_tx, &engine);
                }
            }
        }
    }
}

fn publish(snapshot_tx: &watch::Sender<DashboardSnapshot>, engine: &PollEngine) {
    // Send only fails when every receiver is gone, which means the UI
    // is already shutting down.
    let _ = snapshot_tx.send(engine.snapshot());
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

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

    /// Serves a fixed response per granularity, recording each call.
    struct FakeSource {
        calls: Mutex<Vec<Granularity>>,
        fail: bool,
    }

    impl FakeSource {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail: true,
            }
        }
    }

    impl MeterSource for FakeSource {
        fn fetch(&self, granularity: Granularity) -> Result<Vec<AggregationRecord>, FetchError> {
            self.calls.lock().unwrap().push(granularity);
            if self.fail {
                return Err(FetchError::Network("connection refused".into()));
            }
            let base = match granularity {
                Granularity::Minute => 1.0,
                Granularity::Hourly => 2.0,
                _ => 3.0,
            };
            Ok(vec![record(1_700_000_000_000, base)])
        }
    }

    async fn wait_for(
        rx: &mut watch::Receiver<DashboardSnapshot>,
        pred: impl FnMut(&DashboardSnapshot) -> bool,
    ) -> DashboardSnapshot {
        tokio::time::timeout(Duration::from_secs(2), rx.wait_for(pred))
            .await
            .expect("snapshot timeout")
            .expect("poller gone")
            .clone()
    }

    #[tokio::test]
    async fn publishes_rows_after_initial_fetch() {
        let source: Arc<dyn MeterSource> = Arc::new(FakeSource::new());
        let (_cmd_tx, cmd_rx) = mpsc::channel(8);
        let (snapshot_tx, mut snapshot_rx) =
            watch::channel(DashboardSnapshot::empty(Granularity::Hourly));

        let loop_task = tokio::spawn(poll_loop(
            source,
            Granularity::Hourly,
            Duration::from_millis(20),
            cmd_rx,
            snapshot_tx,
        ));

        let snapshot = wait_for(&mut snapshot_rx, |s| !s.projection.rows.is_empty()).await;
        assert_eq!(snapshot.granularity, Granularity::Hourly);
        assert!(!snapshot.loading);
        assert_eq!(snapshot.projection.running_total, 2.0);

        drop(snapshot_rx);
        drop(_cmd_tx);
        let _ = loop_task.await;
    }

    #[tokio::test]
    async fn select_switches_displayed_granularity() {
        let source: Arc<dyn MeterSource> = Arc::new(FakeSource::new());
        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let (snapshot_tx, mut snapshot_rx) =
            watch::channel(DashboardSnapshot::empty(Granularity::Hourly));

        let loop_task = tokio::spawn(poll_loop(
            source,
            Granularity::Hourly,
            Duration::from_millis(20),
            cmd_rx,
            snapshot_tx,
        ));

        wait_for(&mut snapshot_rx, |s| !s.projection.rows.is_empty()).await;

        cmd_tx.send(PollCommand::Select(Granularity::Minute)).await.unwrap();
        let snapshot = wait_for(&mut snapshot_rx, |s| {
            s.granularity == Granularity::Minute && !s.loading
        })
        .await;
        assert_eq!(snapshot.projection.running_total, 1.0);

        drop(cmd_tx);
        let _ = loop_task.await;
    }

    #[tokio::test]
    async fn keeps_polling_after_failures() {
        let fake = Arc::new(FakeSource::failing());
        let source: Arc<dyn MeterSource> = fake.clone();
        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let (snapshot_tx, mut snapshot_rx) =
            watch::channel(DashboardSnapshot::empty(Granularity::Daily));

        let loop_task = tokio::spawn(poll_loop(
            source,
            Granularity::Daily,
            Duration::from_millis(10),
            cmd_rx,
            snapshot_tx,
        ));

        let snapshot = wait_for(&mut snapshot_rx, |s| s.last_error.is_some()).await;
        assert!(!snapshot.loading);
        assert!(snapshot.projection.rows.is_empty());

        // The timer keeps retrying after an error.
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(fake.calls.lock().unwrap().len() >= 2);

        drop(cmd_tx);
        let _ = loop_task.await;
    }
}
