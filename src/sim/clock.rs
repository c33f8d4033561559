//! Tick sources: a stepped manual clock for deterministic runs and a tokio
//! interval for wall-clock operation.

use std::future::{self, Future};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::time::{self as tokio_time, Instant, Interval, MissedTickBehavior};

/// One scheduled firing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    /// Sequence number, starting at 0.
    pub index: u64,
    /// Wall or simulated time at which the tick fires.
    pub timestamp: DateTime<Utc>,
    /// Time elapsed since the previous tick (s).
    pub interval_secs: f64,
}

/// Anything that can drive the scheduler.
///
/// Returns `None` once the source is exhausted.
pub trait TickSource: Send {
    fn next_tick(&mut self) -> impl Future<Output = Option<Tick>> + Send;
}

/// A stepped clock producing evenly spaced simulated ticks.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use plant_sim::sim::clock::ManualClock;
///
/// let start = Utc.with_ymd_and_hms(2025, 9, 26, 8, 0, 0).unwrap();
/// let mut clock = ManualClock::new(start, 2.0, Some(3));
/// let mut ticks = Vec::new();
///
/// clock.run(|tick| ticks.push(tick.index));
/// assert_eq!(ticks, vec![0, 1, 2]);
/// ```
#[derive(Debug, Clone)]
pub struct ManualClock {
    /// Next tick index
    current: u64,
    /// Ticks to produce; `None` runs forever
    total: Option<u64>,
    start: DateTime<Utc>,
    interval_secs: f64,
}

impl ManualClock {
    /// Creates a clock whose first tick fires one interval after `start`.
    ///
    /// # Arguments
    ///
    /// * `start` - Simulated start time
    /// * `interval_secs` - Spacing between ticks (s)
    /// * `total` - Number of ticks to produce, or `None` for unbounded
    pub fn new(start: DateTime<Utc>, interval_secs: f64, total: Option<u64>) -> Self {
        Self {
            current: 0,
            total,
            start,
            interval_secs,
        }
    }

    /// Produces the next tick.
    ///
    /// # Returns
    ///
    /// * `Some(tick)` - The tick at the current index, before advancing
    /// * `None` - If the clock has produced all its ticks, or the next
    ///   timestamp is outside the representable range
    pub fn tick(&mut self) -> Option<Tick> {
        if self.total.is_some_and(|total| self.current >= total) {
            return None;
        }
        let index = self.current;
        let offset_ms = (self.interval_secs * 1000.0 * (index + 1) as f64).round() as i64;
        let timestamp = TimeDelta::try_milliseconds(offset_ms)
            .and_then(|offset| self.start.checked_add_signed(offset))?;
        self.current += 1;
        Some(Tick {
            index,
            timestamp,
            interval_secs: self.interval_secs,
        })
    }

    /// Runs a function for each remaining tick.
    pub fn run(&mut self, mut f: impl FnMut(Tick)) {
        while let Some(tick) = self.tick() {
            f(tick);
        }
    }
}

impl TickSource for ManualClock {
    fn next_tick(&mut self) -> impl Future<Output = Option<Tick>> + Send {
        future::ready(self.tick())
    }
}

/// Wall-clock ticks from a tokio interval.
///
/// Missed firings are skipped rather than bursted; the reported interval is
/// the measured time since the previous tick, so a late tick covers the
/// whole gap.
#[derive(Debug)]
pub struct IntervalSource {
    interval: Interval,
    last: Instant,
    index: u64,
    limit: Option<u64>,
}

impl IntervalSource {
    /// Creates a source firing every `period`, first after one period.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(period: Duration, limit: Option<u64>) -> Self {
        let now = Instant::now();
        let mut interval = tokio_time::interval_at(now + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self {
            interval,
            last: now,
            index: 0,
            limit,
        }
    }
}

impl TickSource for IntervalSource {
    async fn next_tick(&mut self) -> Option<Tick> {
        if self.limit.is_some_and(|limit| self.index >= limit) {
            return None;
        }
        let fired = self.interval.tick().await;
        let elapsed = fired.duration_since(self.last);
        self.last = fired;
        let index = self.index;
        self.index += 1;
        Some(Tick {
            index,
            timestamp: Utc::now(),
            interval_secs: elapsed.as_secs_f64(),
        })
    }
}
