//! Read-only view of the plant published after every tick.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::plant::Unit;

use super::history::{HistoryPoint, HistoryRecorder, HistorySource};
use super::regulatory::{RegulatoryModel, RegulatoryProfile};
use super::types::{ChartPeriod, PlantAggregate};

/// Copy of every chart buffer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistorySnapshot {
    pub source: HistorySource,
    /// `true` when day/week/month hold synthetic demo data.
    pub illustrative: bool,
    pub real_time: Vec<HistoryPoint>,
    pub day: Vec<HistoryPoint>,
    pub week: Vec<HistoryPoint>,
    pub month: Vec<HistoryPoint>,
}

impl HistorySnapshot {
    pub fn from_recorder(recorder: &HistoryRecorder) -> Self {
        Self {
            source: recorder.source(),
            illustrative: recorder.source().is_illustrative(),
            real_time: recorder.real_time().to_vec(),
            day: recorder.day().points(),
            week: recorder.week().points(),
            month: recorder.month().points(),
        }
    }

    pub fn series(&self, period: ChartPeriod) -> &[HistoryPoint] {
        match period {
            ChartPeriod::RealTime => &self.real_time,
            ChartPeriod::Day => &self.day,
            ChartPeriod::Week => &self.week,
            ChartPeriod::Month => &self.month,
        }
    }
}

/// Consistent state of the plant after the last committed tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlantSnapshot {
    /// Committed ticks so far.
    pub ticks: u64,
    /// Ticks rejected and skipped so far.
    pub skipped_ticks: u64,
    /// Timestamp of the last committed tick; `None` before the first one.
    pub timestamp: Option<DateTime<Utc>>,
    pub units: Vec<Unit>,
    pub aggregate: PlantAggregate,
    pub utilization_pct: f64,
    pub regulatory: RegulatoryProfile,
    pub chart_period: ChartPeriod,
    pub history: HistorySnapshot,
}

impl PlantSnapshot {
    /// Series for the currently selected chart period.
    pub fn selected_series(&self) -> &[HistoryPoint] {
        self.history.series(self.chart_period)
    }

    pub fn unit(&self, id: u32) -> Option<&Unit> {
        self.units.iter().find(|u| u.id == id)
    }
}

impl fmt::Display for PlantSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let agg = &self.aggregate;
        let reg = &self.regulatory;
        writeln!(f, "--- Plant Snapshot (tick {}) ---", self.ticks)?;
        if let Some(ts) = self.timestamp {
            writeln!(f, "Time:              {}", ts.to_rfc3339())?;
        }
        writeln!(
            f,
            "Output:            {:.2} MW of {:.1} MW ({:.1}%)",
            agg.total_power_mw, agg.capacity_mw, self.utilization_pct
        )?;
        writeln!(f, "Net CO2:           {:+.4} kg/s", agg.total_co2_kg_per_s)?;
        writeln!(
            f,
            "Credits:           {:.3} ({:+.5} last tick)",
            agg.co2_credit_balance(),
            agg.co2_credit_delta()
        )?;
        writeln!(f, "Uptime:            {:.3} h", agg.uptime_hours)?;
        writeln!(
            f,
            "Region:            {} ({:.1} kg CO2/MWh, {:?})",
            reg.jurisdiction, reg.co2_per_mwh, reg.verification_status
        )?;
        match reg.jurisdiction.model() {
            RegulatoryModel::AllowanceMarket => {
                if let Some(account) = reg.active_account() {
                    writeln!(
                        f,
                        "Allowances:        {:.3} t remaining, {:.3} t surrendered",
                        account.remaining, account.surrendered
                    )?;
                }
            }
            RegulatoryModel::Benchmark => {
                writeln!(
                    f,
                    "Benchmark:         {:.1} / {:.1} kg/MWh, {:.4} t/h extra, {:.0} t CCER",
                    reg.efficiency.actual,
                    reg.efficiency.benchmark,
                    reg.efficiency.extra_allowances_required,
                    reg.ccer_offsets
                )?;
            }
        }
        for unit in &self.units {
            writeln!(f, "  {unit}")?;
        }
        let marker = if self.history.illustrative && self.chart_period != ChartPeriod::RealTime {
            " (illustrative)"
        } else {
            ""
        };
        write!(
            f,
            "Chart:             {:?}, {} points{marker}",
            self.chart_period,
            self.selected_series().len()
        )
    }
}
