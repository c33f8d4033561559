//! Tokio task that drives a [`PlantSimulation`] from a [`TickSource`].
//!
//! The simulation lives behind a `parking_lot::Mutex`; each tick locks it
//! once, runs the whole tick and takes a snapshot before releasing, so
//! readers never see a half-applied tick. The lock is never held across an
//! await point. Shutdown is a `watch<bool>` observed only between ticks.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info};

use super::clock::TickSource;
use super::engine::PlantSimulation;
use super::kpi::SessionSummary;
use super::snapshot::PlantSnapshot;
use super::types::Control;

/// Handle to a running scheduler task.
pub struct SchedulerHandle {
    sim: Arc<Mutex<PlantSimulation>>,
    snapshots: watch::Receiver<Arc<PlantSnapshot>>,
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<SessionSummary>,
}

/// Spawns the tick loop on the current tokio runtime.
///
/// The loop ends when `source` is exhausted or [`SchedulerHandle::shutdown`]
/// is called. Dropping the handle also stops it. A [`ManualClock`] source
/// never waits between ticks, so give it a tick budget.
///
/// [`ManualClock`]: super::clock::ManualClock
pub fn spawn<S>(sim: PlantSimulation, source: S) -> SchedulerHandle
where
    S: TickSource + 'static,
{
    let (snapshot_tx, snapshots) = watch::channel(Arc::new(sim.snapshot()));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sim = Arc::new(Mutex::new(sim));
    let task = tokio::spawn(drive(Arc::clone(&sim), source, snapshot_tx, shutdown_rx));
    SchedulerHandle {
        sim,
        snapshots,
        shutdown_tx,
        task,
    }
}

async fn drive<S: TickSource>(
    sim: Arc<Mutex<PlantSimulation>>,
    mut source: S,
    snapshot_tx: watch::Sender<Arc<PlantSnapshot>>,
    mut shutdown_rx: watch::Receiver<bool>,
) -> SessionSummary {
    let mut summary = SessionSummary::default();

    loop {
        let next = tokio::select! {
            biased;
            _ = shutdown_rx.wait_for(|stop| *stop) => {
                debug!("scheduler shutdown received");
                break;
            }
            next = source.next_tick() => next,
        };
        let Some(tick) = next else {
            debug!("tick source exhausted");
            break;
        };
        if *shutdown_rx.borrow() {
            break;
        }

        let (result, snapshot) = {
            let mut guard = sim.lock();
            let result = guard.tick(&tick);
            (result, Arc::new(guard.snapshot()))
        };
        match result {
            Ok(report) => summary.record(&report),
            Err(_) => summary.record_skipped(),
        }
        snapshot_tx.send_replace(snapshot);
    }

    info!(
        ticks = summary.ticks,
        skipped = summary.skipped_ticks,
        "scheduler stopped"
    );
    summary
}

impl SchedulerHandle {
    /// New receiver of published snapshots.
    pub fn subscribe(&self) -> watch::Receiver<Arc<PlantSnapshot>> {
        self.snapshots.clone()
    }

    /// Last published snapshot.
    pub fn snapshot(&self) -> Arc<PlantSnapshot> {
        Arc::clone(&self.snapshots.borrow())
    }

    /// Queues a control for the next tick.
    pub fn control(&self, control: Control) {
        self.sim.lock().submit(control);
    }

    /// Shared simulation, for inspection between ticks.
    pub fn simulation(&self) -> Arc<Mutex<PlantSimulation>> {
        Arc::clone(&self.sim)
    }

    /// `true` once the loop has stopped.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stops the loop and returns the session summary. No tick fires after
    /// the signal is observed.
    ///
    /// # Errors
    ///
    /// Returns the `JoinError` if the task panicked or was aborted.
    pub async fn shutdown(self) -> Result<SessionSummary, JoinError> {
        self.shutdown_tx.send_replace(true);
        self.task.await
    }

    /// Waits for the tick source to run out.
    ///
    /// # Errors
    ///
    /// Returns the `JoinError` if the task panicked or was aborted.
    pub async fn join(self) -> Result<SessionSummary, JoinError> {
        // keep the sender alive so the loop is not cancelled
        let _shutdown_tx = self.shutdown_tx;
        self.task.await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlantConfig;
    use crate::sim::clock::{IntervalSource, ManualClock};
    use crate::sim::perturbation::Fixed;
    use crate::sim::types::ChartPeriod;
    use chrono::{TimeZone, Utc};
    use std::time::Duration;

    fn sim() -> PlantSimulation {
        let start = Utc.with_ymd_and_hms(2025, 9, 26, 8, 0, 0).unwrap();
        PlantSimulation::from_config(&PlantConfig::kvarken(), start)
            .unwrap()
            .with_perturbation(Fixed(0.0))
    }

    #[tokio::test]
    async fn runs_until_source_exhausted() {
        let start = Utc.with_ymd_and_hms(2025, 9, 26, 8, 0, 0).unwrap();
        let handle = spawn(sim(), ManualClock::new(start, 2.0, Some(10)));
        let mut rx = handle.subscribe();
        let summary = handle.join().await.unwrap();
        assert_eq!(summary.ticks, 10);
        assert_eq!(summary.skipped_ticks, 0);
        assert_eq!(rx.borrow_and_update().ticks, 10);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_further_ticks() {
        let handle = spawn(sim(), IntervalSource::new(Duration::from_secs(2), None));
        let mut rx = handle.subscribe();
        rx.changed().await.unwrap();
        rx.changed().await.unwrap();
        assert!(!handle.is_finished());

        let summary = handle.shutdown().await.unwrap();
        let published = rx.borrow().ticks;
        assert!(summary.ticks >= 2);
        assert_eq!(summary.ticks, published);

        tokio::time::advance(Duration::from_secs(20)).await;
        assert_eq!(rx.borrow().ticks, published);
    }

    #[tokio::test(start_paused = true)]
    async fn controls_reach_the_running_loop() {
        let handle = spawn(sim(), IntervalSource::new(Duration::from_secs(2), None));
        let mut rx = handle.subscribe();
        handle.control(Control::SetChartPeriod(ChartPeriod::Week));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().chart_period, ChartPeriod::Week);
        assert_eq!(handle.snapshot().chart_period, ChartPeriod::Week);
        handle.shutdown().await.unwrap();
    }
}
