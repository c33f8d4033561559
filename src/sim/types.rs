//! Core simulation types: formula coefficients, plant totals, control
//! commands and per-tick records.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::plant::OperationalState;

use super::credits::CreditLedger;
use super::regulatory::Jurisdiction;

pub const SECONDS_PER_HOUR: f64 = 3600.0;
pub const KG_PER_TONNE: f64 = 1000.0;

/// Tonnes of CO2 released over `interval_secs` at a constant `co2_kg_per_s`.
///
/// Converts to an hourly tonnage first and scales by the fraction of an hour
/// the interval covers, so every per-tick accrual uses the same conversion.
pub fn tonnes_over_interval(co2_kg_per_s: f64, interval_secs: f64) -> f64 {
    let tonnes_per_hour = co2_kg_per_s * SECONDS_PER_HOUR / KG_PER_TONNE;
    tonnes_per_hour * (interval_secs / SECONDS_PER_HOUR)
}

/// Tunable formula constants shared by the step, ledger and history.
///
/// # Examples
///
/// ```
/// use plant_sim::sim::types::Coefficients;
///
/// let c = Coefficients::default();
/// assert_eq!(c.co2_normalization, 3600.0);
/// assert_eq!(c.perturbation_pct, 5.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Coefficients {
    /// Half-width of the uniform fuel-input noise band (percent of nominal).
    pub perturbation_pct: f64,
    /// Divisor turning `kg/h * kg CO2/kg` into the stored CO2 rate.
    /// 3600 yields kg/s for every fuel.
    pub co2_normalization: f64,
    /// CO2 offset credited per MW from zero-emission units (kg/s per MW).
    pub offset_coefficient: f64,
    /// Credits awarded per MWh of zero-emission generation.
    pub reward_coefficient: f64,
}

impl Default for Coefficients {
    fn default() -> Self {
        Self {
            perturbation_pct: 5.0,
            co2_normalization: SECONDS_PER_HOUR,
            offset_coefficient: 0.02,
            reward_coefficient: 0.5,
        }
    }
}

/// Plant-wide totals, mutated once per committed tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlantAggregate {
    /// Sum of running unit outputs (MW).
    pub total_power_mw: f64,
    /// Sum of unit CO2 rates (kg/s, negative = net offset).
    pub total_co2_kg_per_s: f64,
    /// Hours the plant has been simulated, including the configured start.
    pub uptime_hours: f64,
    /// CO2 credit balance and last tick's signed change.
    #[serde(flatten)]
    pub credits: CreditLedger,
    /// Nameplate capacity (MW).
    pub capacity_mw: f64,
}

impl PlantAggregate {
    pub fn new(capacity_mw: f64, uptime_hours: f64, co2_credit_balance: f64) -> Self {
        Self {
            total_power_mw: 0.0,
            total_co2_kg_per_s: 0.0,
            uptime_hours,
            credits: CreditLedger::new(co2_credit_balance),
            capacity_mw,
        }
    }

    pub fn co2_credit_balance(&self) -> f64 {
        self.credits.balance
    }

    pub fn co2_credit_delta(&self) -> f64 {
        self.credits.last_delta
    }

    /// Current output as a share of nameplate capacity (percent).
    pub fn utilization_pct(&self) -> f64 {
        if self.capacity_mw > 0.0 {
            100.0 * self.total_power_mw / self.capacity_mw
        } else {
            0.0
        }
    }
}

/// Chart series selected by the consuming dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartPeriod {
    #[default]
    #[serde(alias = "realtime")]
    RealTime,
    Day,
    Week,
    Month,
}

impl FromStr for ChartPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "realtime" | "real_time" | "real-time" => Ok(ChartPeriod::RealTime),
            "day" => Ok(ChartPeriod::Day),
            "week" => Ok(ChartPeriod::Week),
            "month" => Ok(ChartPeriod::Month),
            _ => Err(format!("unknown chart period \"{s}\"")),
        }
    }
}

/// External control input, applied at the start of the next tick.
#[derive(Debug, Clone, PartialEq)]
pub enum Control {
    SetJurisdiction(Jurisdiction),
    SetUnitState {
        unit_id: u32,
        state: OperationalState,
    },
    SetFuelInput { unit_id: u32, fuel_input_mw: f64 },
    SetChartPeriod(ChartPeriod),
}

/// Record of one committed tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickReport {
    /// Tick sequence number from the tick source.
    pub tick: u64,
    pub timestamp: DateTime<Utc>,
    /// Elapsed time covered by this tick (s).
    pub interval_secs: f64,
    pub total_power_mw: f64,
    pub total_co2_kg_per_s: f64,
    /// Output of running zero-emission units (MW).
    pub clean_power_mw: f64,
    pub credit_delta: f64,
    pub credit_balance: f64,
    /// Emission intensity after this tick (kg CO2 / MWh).
    pub co2_per_mwh: f64,
    pub uptime_hours: f64,
}

impl fmt::Display for TickReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tick={:>4} {} | power={:>6.2} MW  co2={:>+8.4} kg/s  \
             clean={:>5.2} MW | credits={:>9.3} ({:>+.5}) | {:>7.1} kg/MWh | up={:.3}h",
            self.tick,
            self.timestamp.format("%H:%M:%S"),
            self.total_power_mw,
            self.total_co2_kg_per_s,
            self.clean_power_mw,
            self.credit_balance,
            self.credit_delta,
            self.co2_per_mwh,
            self.uptime_hours,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tonnes_over_one_hour_matches_hourly_rate() {
        // 1 kg/s for an hour is 3.6 t
        assert!((tonnes_over_interval(1.0, 3600.0) - 3.6).abs() < 1e-12);
        assert_eq!(tonnes_over_interval(1.0, 0.0), 0.0);
    }

    #[test]
    fn utilization_handles_zero_capacity() {
        let mut agg = PlantAggregate::new(0.0, 0.0, 0.0);
        agg.total_power_mw = 5.0;
        assert_eq!(agg.utilization_pct(), 0.0);

        let mut agg = PlantAggregate::new(20.0, 0.0, 0.0);
        agg.total_power_mw = 5.0;
        assert!((agg.utilization_pct() - 25.0).abs() < 1e-12);
    }

    #[test]
    fn chart_period_parses() {
        assert_eq!("realtime".parse::<ChartPeriod>(), Ok(ChartPeriod::RealTime));
        assert_eq!("Week".parse::<ChartPeriod>(), Ok(ChartPeriod::Week));
        assert!("year".parse::<ChartPeriod>().is_err());
    }

    #[test]
    fn tick_report_display_does_not_panic() {
        let r = TickReport {
            tick: 1,
            timestamp: Utc::now(),
            interval_secs: 2.0,
            total_power_mw: 8.2,
            total_co2_kg_per_s: 0.3,
            clean_power_mw: 3.2,
            credit_delta: 0.001,
            credit_balance: 5000.0,
            co2_per_mwh: 131.7,
            uptime_hours: 11.6,
        };
        assert!(!format!("{r}").is_empty());
    }
}
