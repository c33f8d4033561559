//! Illustrative long-period chart data.
//!
//! Each series is a sinusoidal base with bounded uniform jitter, sampled
//! backwards from `now`. The day series shows net emissions; week and month
//! show net offsets with large swings. None of it is measured data.

use std::f64::consts::PI;

use chrono::{DateTime, TimeDelta, Utc};
use rand::{Rng, SeedableRng, rngs::StdRng};

use super::history::HistoryPoint;

/// Seeded generator for the synthetic day/week/month series.
pub struct TrendGenerator {
    rng: StdRng,
}

impl TrendGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Uniform noise in `[-span / 2, span / 2)`.
    fn jitter(&mut self, span: f64) -> f64 {
        (self.rng.random::<f64>() - 0.5) * span
    }

    /// `points` hourly samples ending at `now`; positive CO2 (emitting).
    pub fn day(&mut self, now: DateTime<Utc>, points: usize) -> Vec<HistoryPoint> {
        let n = points.max(1) as f64;
        (0..points)
            .rev()
            .map(|i| {
                let age = i as f64;
                let base = 15.0 + ((n - age) / n * 2.0 * PI).sin() * 3.0 + self.jitter(2.0);
                let co2 = 50.0 + base * 20.0 + self.jitter(60.0);
                HistoryPoint {
                    timestamp: now - TimeDelta::hours(i as i64),
                    power_mw: base.max(8.0),
                    co2_impact_kg_per_h: co2.max(10.0),
                }
            })
            .collect()
    }

    /// `points` daily samples ending at `now`; net offset with volatility.
    pub fn week(&mut self, now: DateTime<Utc>, points: usize) -> Vec<HistoryPoint> {
        let n = points.max(1) as f64;
        (0..points)
            .rev()
            .map(|i| {
                let age = i as f64;
                let base = 14.0 + (age / n * PI).sin() * 4.0 + self.jitter(6.0);
                let seasonal = (age / n * PI * 4.0).sin() * 100.0;
                let co2 = -(120.0 + base * 25.0) + self.jitter(300.0) + seasonal;
                HistoryPoint {
                    timestamp: now - TimeDelta::days(i as i64),
                    power_mw: base.max(8.0),
                    co2_impact_kg_per_h: co2.min(-30.0),
                }
            })
            .collect()
    }

    /// `points` daily samples ending at `now`; net offset with market,
    /// policy and weather cycles.
    pub fn month(&mut self, now: DateTime<Utc>, points: usize) -> Vec<HistoryPoint> {
        let n = points.max(1) as f64;
        (0..points)
            .rev()
            .map(|i| {
                let age = i as f64;
                let base = 13.0 + (age / n * PI * 3.0).sin() * 5.0 + self.jitter(4.0);
                let market = self.jitter(400.0);
                let policy = (age / n * PI * 6.0).sin() * 150.0;
                let weather = (age / n * PI * 8.0).cos() * 80.0;
                let co2 = -(180.0 + base * 35.0) + market + policy + weather;
                HistoryPoint {
                    timestamp: now - TimeDelta::days(i as i64),
                    power_mw: base.max(6.0),
                    co2_impact_kg_per_h: co2.min(-20.0),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 26, 12, 0, 0).unwrap()
    }

    #[test]
    fn day_series_is_oldest_first_and_ends_now() {
        let pts = TrendGenerator::new(1).day(now(), 24);
        assert_eq!(pts.len(), 24);
        assert_eq!(pts[0].timestamp, now() - TimeDelta::hours(23));
        assert_eq!(pts[23].timestamp, now());
        assert!(pts.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }

    #[test]
    fn series_respect_their_bounds() {
        let mut trends = TrendGenerator::new(7);
        assert!(
            trends
                .day(now(), 24)
                .iter()
                .all(|p| p.power_mw >= 8.0 && p.co2_impact_kg_per_h >= 10.0)
        );
        assert!(
            trends
                .week(now(), 7)
                .iter()
                .all(|p| p.power_mw >= 8.0 && p.co2_impact_kg_per_h <= -30.0)
        );
        assert!(
            trends
                .month(now(), 30)
                .iter()
                .all(|p| p.power_mw >= 6.0 && p.co2_impact_kg_per_h <= -20.0)
        );
    }

    #[test]
    fn same_seed_same_series() {
        let a = TrendGenerator::new(5).month(now(), 30);
        let b = TrendGenerator::new(5).month(now(), 30);
        assert_eq!(a, b);
    }
}
