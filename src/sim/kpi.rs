//! Session KPIs accumulated from tick reports.

use std::fmt;

use serde::Serialize;

use super::types::{SECONDS_PER_HOUR, TickReport};

/// Aggregate figures for one simulation session.
///
/// Built incrementally by the scheduler or post-hoc from a report slice;
/// both paths give identical results for the same reports.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionSummary {
    /// Committed ticks.
    pub ticks: u64,
    /// Ticks rejected and skipped.
    pub skipped_ticks: u64,
    /// Simulated time covered by committed ticks (h).
    pub elapsed_hours: f64,
    /// Energy generated (MWh).
    pub energy_mwh: f64,
    /// Net CO2 released, offsets subtracted (kg).
    pub net_co2_kg: f64,
    /// Highest plant output seen (MW).
    pub peak_power_mw: f64,
    /// Energy-weighted emission intensity (kg CO2 / MWh).
    pub mean_co2_per_mwh: f64,
    /// Sum of credit deltas.
    pub net_credit_change: f64,
}

impl SessionSummary {
    /// Adds one committed tick.
    pub fn record(&mut self, report: &TickReport) {
        let hours = report.interval_secs / SECONDS_PER_HOUR;
        self.ticks += 1;
        self.elapsed_hours += hours;
        self.energy_mwh += report.total_power_mw * hours;
        self.net_co2_kg += report.total_co2_kg_per_s * report.interval_secs;
        self.peak_power_mw = self.peak_power_mw.max(report.total_power_mw);
        self.net_credit_change += report.credit_delta;
        self.mean_co2_per_mwh = if self.energy_mwh > 0.0 {
            self.net_co2_kg / self.energy_mwh
        } else {
            0.0
        };
    }

    pub fn record_skipped(&mut self) {
        self.skipped_ticks += 1;
    }

    /// Computes the summary from committed reports.
    ///
    /// # Arguments
    ///
    /// * `reports` - Committed tick reports, in order
    /// * `skipped_ticks` - Ticks rejected during the same session
    pub fn from_reports(reports: &[TickReport], skipped_ticks: u64) -> Self {
        let mut summary = Self {
            skipped_ticks,
            ..Self::default()
        };
        for r in reports {
            summary.record(r);
        }
        summary
    }
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Session Summary ---")?;
        writeln!(
            f,
            "Ticks:                 {} committed, {} skipped",
            self.ticks, self.skipped_ticks
        )?;
        writeln!(f, "Simulated time:        {:.4} h", self.elapsed_hours)?;
        writeln!(f, "Energy generated:      {:.4} MWh", self.energy_mwh)?;
        writeln!(f, "Net CO2:               {:+.2} kg", self.net_co2_kg)?;
        writeln!(f, "Peak output:           {:.2} MW", self.peak_power_mw)?;
        writeln!(
            f,
            "Mean intensity:        {:.1} kg CO2/MWh",
            self.mean_co2_per_mwh
        )?;
        write!(f, "Net credit change:     {:+.5}", self.net_credit_change)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn report(power: f64, co2: f64, delta: f64) -> TickReport {
        TickReport {
            tick: 0,
            timestamp: Utc::now(),
            interval_secs: 3600.0,
            total_power_mw: power,
            total_co2_kg_per_s: co2,
            clean_power_mw: 0.0,
            credit_delta: delta,
            credit_balance: 0.0,
            co2_per_mwh: 0.0,
            uptime_hours: 0.0,
        }
    }

    #[test]
    fn energy_and_co2_integrate_over_interval() {
        let reports = [report(10.0, 0.5, -1.8), report(20.0, 1.0, -3.6)];
        let s = SessionSummary::from_reports(&reports, 0);
        assert_eq!(s.ticks, 2);
        assert!((s.energy_mwh - 30.0).abs() < 1e-9);
        assert!((s.net_co2_kg - 5400.0).abs() < 1e-9);
        assert!((s.mean_co2_per_mwh - 180.0).abs() < 1e-9);
        assert!((s.net_credit_change + 5.4).abs() < 1e-9);
        assert_eq!(s.peak_power_mw, 20.0);
        assert!((s.elapsed_hours - 2.0).abs() < 1e-12);
    }

    #[test]
    fn incremental_matches_post_hoc() {
        let reports = [
            report(8.0, 0.2, 0.1),
            report(9.5, -0.1, 0.3),
            report(7.0, 0.0, 0.0),
        ];
        let mut live = SessionSummary::default();
        for r in &reports {
            live.record(r);
        }
        live.record_skipped();
        assert_eq!(live, SessionSummary::from_reports(&reports, 1));
    }

    #[test]
    fn empty_summary() {
        let s = SessionSummary::from_reports(&[], 0);
        assert_eq!(s.ticks, 0);
        assert_eq!(s.mean_co2_per_mwh, 0.0);
        assert!(!s.to_string().is_empty());
    }
}
