//! Chart history: a bounded real-time ring plus day/week/month series.
//!
//! Long-period series come from exactly one [`HistorySource`]. With
//! `Synthetic` they are seeded once at startup with illustrative trend data
//! and never touched again; with `DownsampledReal` they start empty and are
//! filled with bucket means of recorded ticks. Real-time points are always
//! real.

use std::collections::VecDeque;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use super::synthetic;
use super::types::{ChartPeriod, SECONDS_PER_HOUR};

/// One chart sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistoryPoint {
    pub timestamp: DateTime<Utc>,
    /// Plant output (MW).
    pub power_mw: f64,
    /// Net CO2 impact as an hourly figure (kg/h, negative = offset).
    pub co2_impact_kg_per_h: f64,
}

/// Where day/week/month series come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistorySource {
    /// Trend-plus-jitter demo data, generated once. Not real measurements.
    Synthetic,
    /// Bucket means of real ticks.
    #[default]
    #[serde(alias = "downsampled")]
    DownsampledReal,
}

impl HistorySource {
    /// `true` when long-period series are illustrative only.
    pub fn is_illustrative(self) -> bool {
        self == HistorySource::Synthetic
    }
}

/// Fixed-capacity FIFO of samples, oldest first.
#[derive(Debug, Clone)]
pub struct RingBuffer {
    points: VecDeque<HistoryPoint>,
    capacity: usize,
}

impl RingBuffer {
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "ring buffer capacity must be > 0");
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a sample, evicting the oldest once full.
    pub fn push(&mut self, point: HistoryPoint) {
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&HistoryPoint> {
        self.points.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryPoint> {
        self.points.iter()
    }

    pub fn to_vec(&self) -> Vec<HistoryPoint> {
        self.points.iter().copied().collect()
    }
}

#[derive(Debug, Clone, Copy)]
struct Bucket {
    start: DateTime<Utc>,
    power_sum: f64,
    co2_sum: f64,
    count: u32,
}

impl Bucket {
    fn open(point: &HistoryPoint) -> Self {
        Self {
            start: point.timestamp,
            power_sum: point.power_mw,
            co2_sum: point.co2_impact_kg_per_h,
            count: 1,
        }
    }

    fn add(&mut self, point: &HistoryPoint) {
        self.power_sum += point.power_mw;
        self.co2_sum += point.co2_impact_kg_per_h;
        self.count += 1;
    }

    fn mean(&self) -> HistoryPoint {
        let n = f64::from(self.count);
        HistoryPoint {
            timestamp: self.start,
            power_mw: self.power_sum / n,
            co2_impact_kg_per_h: self.co2_sum / n,
        }
    }
}

/// Long-period series with one point per bucket.
#[derive(Debug, Clone)]
pub struct PeriodSeries {
    points: RingBuffer,
    bucket: TimeDelta,
    open: Option<Bucket>,
}

impl PeriodSeries {
    pub fn new(capacity: usize, bucket: TimeDelta) -> Self {
        Self {
            points: RingBuffer::new(capacity),
            bucket,
            open: None,
        }
    }

    /// Feeds one real sample. A bucket closes when a sample arrives at least
    /// one bucket length after the bucket's first sample; its mean is then
    /// pushed and the new sample opens the next bucket.
    pub fn record(&mut self, point: HistoryPoint) {
        let span = self.bucket;
        if let Some(closed) = self.open.take_if(|b| point.timestamp - b.start >= span) {
            self.points.push(closed.mean());
        }
        match self.open.as_mut() {
            Some(bucket) => bucket.add(&point),
            None => self.open = Some(Bucket::open(&point)),
        }
    }

    fn seed(&mut self, points: impl IntoIterator<Item = HistoryPoint>) {
        for p in points {
            self.points.push(p);
        }
    }

    /// Closed points, oldest first.
    pub fn points(&self) -> Vec<HistoryPoint> {
        self.points.to_vec()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Capacities and source selection for the recorder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HistorySettings {
    /// Real-time ring size (450 samples = 15 minutes at 2 s ticks).
    pub real_time_capacity: usize,
    pub source: HistorySource,
    /// Hourly points kept for the day chart.
    pub day_capacity: usize,
    /// Daily points kept for the week chart.
    pub week_capacity: usize,
    /// Daily points kept for the month chart.
    pub month_capacity: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            real_time_capacity: 450,
            source: HistorySource::DownsampledReal,
            day_capacity: 24,
            week_capacity: 7,
            month_capacity: 30,
        }
    }
}

/// Owns all chart buffers.
#[derive(Debug, Clone)]
pub struct HistoryRecorder {
    source: HistorySource,
    real_time: RingBuffer,
    day: PeriodSeries,
    week: PeriodSeries,
    month: PeriodSeries,
}

impl HistoryRecorder {
    /// Builds the buffers, seeding synthetic series ending at `now` when the
    /// source is [`HistorySource::Synthetic`].
    pub fn new(settings: &HistorySettings, now: DateTime<Utc>, seed: u64) -> Self {
        let mut recorder = Self {
            source: settings.source,
            real_time: RingBuffer::new(settings.real_time_capacity),
            day: PeriodSeries::new(settings.day_capacity, TimeDelta::hours(1)),
            week: PeriodSeries::new(settings.week_capacity, TimeDelta::days(1)),
            month: PeriodSeries::new(settings.month_capacity, TimeDelta::days(1)),
        };
        if settings.source == HistorySource::Synthetic {
            let mut trends = synthetic::TrendGenerator::new(seed);
            let day = trends.day(now, settings.day_capacity);
            let week = trends.week(now, settings.week_capacity);
            let month = trends.month(now, settings.month_capacity);
            recorder.day.seed(day);
            recorder.week.seed(week);
            recorder.month.seed(month);
        }
        recorder
    }

    /// Records one tick. `co2_kg_per_s` is stored as kg/h.
    pub fn record(&mut self, timestamp: DateTime<Utc>, power_mw: f64, co2_kg_per_s: f64) {
        let point = HistoryPoint {
            timestamp,
            power_mw,
            co2_impact_kg_per_h: co2_kg_per_s * SECONDS_PER_HOUR,
        };
        self.real_time.push(point);
        if self.source == HistorySource::DownsampledReal {
            self.day.record(point);
            self.week.record(point);
            self.month.record(point);
        }
    }

    pub fn source(&self) -> HistorySource {
        self.source
    }

    pub fn real_time(&self) -> &RingBuffer {
        &self.real_time
    }

    pub fn day(&self) -> &PeriodSeries {
        &self.day
    }

    pub fn week(&self) -> &PeriodSeries {
        &self.week
    }

    pub fn month(&self) -> &PeriodSeries {
        &self.month
    }

    /// Points of the series shown for `period`.
    pub fn series(&self, period: ChartPeriod) -> Vec<HistoryPoint> {
        match period {
            ChartPeriod::RealTime => self.real_time.to_vec(),
            ChartPeriod::Day => self.day.points(),
            ChartPeriod::Week => self.week.points(),
            ChartPeriod::Month => self.month.points(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 26, 8, 0, 0).unwrap()
    }

    fn point(secs: i64, power: f64) -> HistoryPoint {
        HistoryPoint {
            timestamp: t0() + TimeDelta::seconds(secs),
            power_mw: power,
            co2_impact_kg_per_h: power * 10.0,
        }
    }

    #[test]
    fn ring_never_exceeds_capacity() {
        let mut ring = RingBuffer::new(5);
        for i in 0..20 {
            ring.push(point(i, i as f64));
            assert!(ring.len() <= ring.capacity());
        }
        assert_eq!(ring.len(), 5);
    }

    #[test]
    fn ring_keeps_most_recent_oldest_first() {
        let mut ring = RingBuffer::new(4);
        for i in 0..5 {
            ring.push(point(i, i as f64));
        }
        let powers: Vec<f64> = ring.iter().map(|p| p.power_mw).collect();
        assert_eq!(powers, vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(ring.latest().map(|p| p.power_mw), Some(4.0));
    }

    #[test]
    #[should_panic]
    fn zero_capacity_ring_panics() {
        RingBuffer::new(0);
    }

    #[test]
    fn record_stores_hourly_co2() {
        let mut rec = HistoryRecorder::new(&HistorySettings::default(), t0(), 1);
        rec.record(t0(), 8.0, 0.5);
        let p = rec.real_time().latest().copied().unwrap();
        assert_eq!(p.co2_impact_kg_per_h, 1800.0);
        assert_eq!(p.power_mw, 8.0);
    }

    #[test]
    fn downsampler_emits_bucket_mean_when_bucket_closes() {
        let mut series = PeriodSeries::new(24, TimeDelta::hours(1));
        series.record(point(0, 10.0));
        series.record(point(1800, 20.0));
        assert!(series.is_empty());
        series.record(point(3600, 99.0));
        let pts = series.points();
        assert_eq!(pts.len(), 1);
        assert_eq!(pts[0].power_mw, 15.0);
        assert_eq!(pts[0].co2_impact_kg_per_h, 150.0);
        assert_eq!(pts[0].timestamp, t0());
    }

    #[test]
    fn downsampled_series_respect_capacity() {
        let mut series = PeriodSeries::new(3, TimeDelta::hours(1));
        for h in 0..10 {
            series.record(point(h * 3600, h as f64));
        }
        let pts = series.points();
        assert_eq!(pts.len(), 3);
        assert_eq!(pts[0].power_mw, 6.0);
        assert_eq!(pts[2].power_mw, 8.0);
    }

    #[test]
    fn synthetic_source_seeds_long_series_once() {
        let settings = HistorySettings {
            source: HistorySource::Synthetic,
            ..HistorySettings::default()
        };
        let mut rec = HistoryRecorder::new(&settings, t0(), 42);
        assert_eq!(rec.day().len(), 24);
        assert_eq!(rec.week().len(), 7);
        assert_eq!(rec.month().len(), 30);
        assert!(rec.real_time().is_empty());

        let day_before = rec.day().points();
        for i in 0..4000 {
            rec.record(t0() + TimeDelta::seconds(i * 2), 10.0, 0.1);
        }
        assert_eq!(rec.day().points(), day_before);
        assert!(rec.source().is_illustrative());
    }

    #[test]
    fn downsampled_source_starts_empty() {
        let rec = HistoryRecorder::new(&HistorySettings::default(), t0(), 42);
        assert!(rec.day().is_empty());
        assert!(rec.week().is_empty());
        assert!(rec.month().is_empty());
        assert!(!rec.source().is_illustrative());
    }

    #[test]
    fn series_selects_by_period() {
        let mut rec = HistoryRecorder::new(&HistorySettings::default(), t0(), 42);
        for i in 0..3 {
            rec.record(t0() + TimeDelta::seconds(i * 2), 5.0, 0.0);
        }
        assert_eq!(rec.series(ChartPeriod::RealTime).len(), 3);
        assert!(rec.series(ChartPeriod::Month).is_empty());
    }
}
