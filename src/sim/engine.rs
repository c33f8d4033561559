//! Simulation context that owns all plant state and commits ticks.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::config::PlantConfig;
use crate::error::{ConfigError, TickError, ensure_finite};
use crate::plant::{FuelTable, Unit};

use super::clock::{ManualClock, Tick};
use super::history::HistoryRecorder;
use super::perturbation::{Perturbation, SeededPerturbation};
use super::regulatory::RegulatoryProfile;
use super::snapshot::{HistorySnapshot, PlantSnapshot};
use super::step::step;
use super::types::{
    ChartPeriod, Coefficients, Control, PlantAggregate, SECONDS_PER_HOUR, TickReport,
};

/// The plant model and everything derived from it.
///
/// A tick runs Step -> Ledger -> Regulatory on scratch copies and only
/// writes them back, together with the history sample, once every computed
/// value is finite. A rejected tick leaves the plant exactly as it was.
pub struct PlantSimulation {
    units: Vec<Unit>,
    fuels: FuelTable,
    coefficients: Coefficients,
    perturbation: Box<dyn Perturbation + Send>,
    aggregate: PlantAggregate,
    regulatory: RegulatoryProfile,
    history: HistoryRecorder,
    chart_period: ChartPeriod,
    /// Controls waiting for the next tick
    pending: Vec<Control>,
    ticks: u64,
    skipped: u64,
    last_timestamp: Option<DateTime<Utc>>,
}

impl PlantSimulation {
    /// Builds a simulation from a configuration, validating it first.
    ///
    /// Perturbation noise is seeded from `simulation.seed`; synthetic history,
    /// when selected, uses a derived seed so the two streams are independent.
    ///
    /// # Arguments
    ///
    /// * `config` - Plant configuration
    /// * `now` - Start time; synthetic series end here
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] listing every invalid field.
    pub fn from_config(config: &PlantConfig, now: DateTime<Utc>) -> Result<Self, ConfigError> {
        config.ensure_valid()?;
        let seed = config.simulation.seed;
        let plant = &config.plant;
        Ok(Self {
            units: config.build_units(),
            fuels: FuelTable::standard(),
            coefficients: config.coefficients,
            perturbation: Box::new(SeededPerturbation::new(seed)),
            aggregate: PlantAggregate::new(
                plant.capacity_mw,
                plant.initial_uptime_hours,
                plant.initial_credit_balance,
            ),
            regulatory: config.regulatory.build_profile(),
            history: HistoryRecorder::new(&config.history, now, seed.wrapping_add(1)),
            chart_period: config.simulation.chart_period,
            pending: Vec::new(),
            ticks: 0,
            skipped: 0,
            last_timestamp: None,
        })
    }

    /// Replaces the noise source.
    pub fn with_perturbation(mut self, perturbation: impl Perturbation + Send + 'static) -> Self {
        self.perturbation = Box::new(perturbation);
        self
    }

    /// Replaces the fuel property table.
    pub fn with_fuel_table(mut self, fuels: FuelTable) -> Self {
        self.fuels = fuels;
        self
    }

    /// Queues a control for the start of the next tick.
    pub fn submit(&mut self, control: Control) {
        self.pending.push(control);
    }

    fn apply_controls(&mut self) {
        for control in std::mem::take(&mut self.pending) {
            match control {
                Control::SetJurisdiction(jurisdiction) => {
                    info!(%jurisdiction, "jurisdiction changed");
                    self.regulatory.jurisdiction = jurisdiction;
                }
                Control::SetUnitState { unit_id, state } => {
                    match self.units.iter_mut().find(|u| u.id == unit_id) {
                        Some(unit) => {
                            info!(unit_id, from = %unit.state, to = %state, "unit state changed");
                            unit.state = state;
                        }
                        None => warn!(unit_id, "dropping state change for unknown unit"),
                    }
                }
                Control::SetFuelInput {
                    unit_id,
                    fuel_input_mw,
                } => {
                    if !(fuel_input_mw.is_finite() && fuel_input_mw >= 0.0) {
                        warn!(unit_id, fuel_input_mw, "dropping invalid fuel input");
                        continue;
                    }
                    match self.units.iter_mut().find(|u| u.id == unit_id) {
                        Some(unit) => {
                            info!(unit_id, fuel_input_mw, "fuel input changed");
                            unit.fuel_input_mw = fuel_input_mw;
                        }
                        None => warn!(unit_id, "dropping fuel input for unknown unit"),
                    }
                }
                Control::SetChartPeriod(period) => {
                    info!(?period, "chart period changed");
                    self.chart_period = period;
                }
            }
        }
    }

    /// Applies pending controls, then executes one tick.
    ///
    /// # Errors
    ///
    /// Returns a [`TickError`] if the interval is negative or any computed
    /// value is non-finite. The tick is then skipped: units, aggregate,
    /// regulatory profile and history are left untouched. Controls applied
    /// at the start of the tick stay applied.
    pub fn tick(&mut self, tick: &Tick) -> Result<TickReport, TickError> {
        self.apply_controls();
        match self.compute_and_commit(tick) {
            Ok(report) => Ok(report),
            Err(err) => {
                self.skipped += 1;
                warn!(tick = tick.index, error = %err, "tick skipped");
                Err(err)
            }
        }
    }

    fn compute_and_commit(&mut self, tick: &Tick) -> Result<TickReport, TickError> {
        let interval = ensure_finite("interval_secs", tick.interval_secs)?;
        if interval < 0.0 {
            return Err(TickError::NegativeInterval(interval));
        }

        let mut units = self.units.clone();
        let totals = step(
            &mut units,
            &self.fuels,
            &self.coefficients,
            self.perturbation.as_mut(),
        );
        let power = ensure_finite("total_power_mw", totals.total_power_mw)?;
        let co2 = ensure_finite("total_co2_kg_per_s", totals.total_co2_kg_per_s)?;
        let clean = ensure_finite("clean_power_mw", totals.clean_power_mw)?;
        for unit in &units {
            ensure_finite("fuel_consumption_kg_per_h", unit.fuel_consumption_kg_per_h)?;
        }

        let mut credits = self.aggregate.credits;
        let delta = credits.update(co2, clean, interval, self.coefficients.reward_coefficient);
        ensure_finite("co2_credit_balance", credits.balance)?;

        let mut regulatory = self.regulatory.clone();
        regulatory.update(power, co2, interval);
        ensure_finite("co2_per_mwh", regulatory.co2_per_mwh)?;
        ensure_finite(
            "extra_allowances_required",
            regulatory.efficiency.extra_allowances_required,
        )?;
        if let Some(account) = regulatory.active_account() {
            ensure_finite("allowances_remaining", account.remaining)?;
            ensure_finite("allowances_surrendered", account.surrendered)?;
        }

        let uptime = ensure_finite(
            "uptime_hours",
            self.aggregate.uptime_hours + interval / SECONDS_PER_HOUR,
        )?;

        // commit
        self.units = units;
        self.aggregate.total_power_mw = power;
        self.aggregate.total_co2_kg_per_s = co2;
        self.aggregate.credits = credits;
        self.aggregate.uptime_hours = uptime;
        self.regulatory = regulatory;
        self.history.record(tick.timestamp, power, co2);
        self.ticks += 1;
        self.last_timestamp = Some(tick.timestamp);

        debug!(
            tick = tick.index,
            power_mw = power,
            co2_kg_per_s = co2,
            credit_delta = delta,
            "tick committed"
        );

        Ok(TickReport {
            tick: tick.index,
            timestamp: tick.timestamp,
            interval_secs: interval,
            total_power_mw: power,
            total_co2_kg_per_s: co2,
            clean_power_mw: clean,
            credit_delta: delta,
            credit_balance: credits.balance,
            co2_per_mwh: self.regulatory.co2_per_mwh,
            uptime_hours: uptime,
        })
    }

    /// Drives every remaining tick of `clock` and returns the committed
    /// reports. Skipped ticks are counted but produce no report.
    pub fn run(&mut self, clock: &mut ManualClock) -> Vec<TickReport> {
        let mut reports = Vec::new();
        clock.run(|tick| {
            if let Ok(report) = self.tick(&tick) {
                reports.push(report);
            }
        });
        reports
    }

    /// Copies the current state for publication.
    pub fn snapshot(&self) -> PlantSnapshot {
        PlantSnapshot {
            ticks: self.ticks,
            skipped_ticks: self.skipped,
            timestamp: self.last_timestamp,
            units: self.units.clone(),
            aggregate: self.aggregate.clone(),
            utilization_pct: self.aggregate.utilization_pct(),
            regulatory: self.regulatory.clone(),
            chart_period: self.chart_period,
            history: HistorySnapshot::from_recorder(&self.history),
        }
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn aggregate(&self) -> &PlantAggregate {
        &self.aggregate
    }

    pub fn regulatory(&self) -> &RegulatoryProfile {
        &self.regulatory
    }

    pub fn history(&self) -> &HistoryRecorder {
        &self.history
    }

    pub fn chart_period(&self) -> ChartPeriod {
        self.chart_period
    }

    /// Committed ticks.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Rejected ticks.
    pub fn skipped_ticks(&self) -> u64 {
        self.skipped
    }

    pub fn pending_controls(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plant::{FuelKind, FuelProperties, OperationalState};
    use crate::sim::perturbation::Fixed;
    use crate::sim::regulatory::Jurisdiction;
    use chrono::{TimeDelta, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 26, 8, 0, 0).unwrap()
    }

    fn sim() -> PlantSimulation {
        PlantSimulation::from_config(&PlantConfig::kvarken(), t0())
            .unwrap()
            .with_perturbation(Fixed(0.0))
    }

    fn tick_at(index: u64, interval_secs: f64) -> Tick {
        Tick {
            index,
            timestamp: t0() + TimeDelta::seconds(index as i64 * 2),
            interval_secs,
        }
    }

    #[test]
    fn tick_commits_totals_and_history() {
        let mut s = sim();
        let report = s.tick(&tick_at(0, 2.0)).unwrap();
        let expected: f64 = s.units().iter().map(|u| u.power_mw).sum();
        assert!((report.total_power_mw - expected).abs() < 1e-9);
        assert_eq!(s.aggregate().total_power_mw, report.total_power_mw);
        assert_eq!(s.history().real_time().len(), 1);
        assert_eq!(s.ticks(), 1);
        assert!((s.aggregate().uptime_hours - (11.6 + 2.0 / 3600.0)).abs() < 1e-12);
    }

    #[test]
    fn negative_interval_is_rejected_without_side_effects() {
        let mut s = sim();
        s.tick(&tick_at(0, 2.0)).unwrap();
        let before = s.snapshot();
        let err = s.tick(&tick_at(1, -1.0));
        assert_eq!(err, Err(TickError::NegativeInterval(-1.0)));
        let after = s.snapshot();
        assert_eq!(after.aggregate, before.aggregate);
        assert_eq!(after.units, before.units);
        assert_eq!(after.history, before.history);
        assert_eq!(after.skipped_ticks, 1);
    }

    #[test]
    fn non_finite_tick_is_skipped() {
        let mut fuels = FuelTable::standard();
        fuels.set(
            FuelKind::Lng,
            FuelProperties {
                energy_density_mj_per_kg: 0.0,
                co2_kg_per_kg: 2.75,
            },
        );
        let mut s = sim().with_fuel_table(fuels);
        let balance = s.aggregate().co2_credit_balance();
        assert!(matches!(
            s.tick(&tick_at(0, 2.0)),
            Err(TickError::NonFinite { .. })
        ));
        assert_eq!(s.aggregate().co2_credit_balance(), balance);
        assert!(s.history().real_time().is_empty());
        assert_eq!(s.ticks(), 0);
    }

    #[test]
    fn controls_apply_at_next_tick() {
        let mut s = sim();
        s.submit(Control::SetUnitState {
            unit_id: 3,
            state: OperationalState::Running,
        });
        s.submit(Control::SetFuelInput {
            unit_id: 3,
            fuel_input_mw: 9.0,
        });
        s.submit(Control::SetJurisdiction(Jurisdiction::China));
        s.submit(Control::SetChartPeriod(ChartPeriod::Day));
        assert_eq!(s.pending_controls(), 4);
        assert_eq!(s.regulatory().jurisdiction, Jurisdiction::Eu);

        s.tick(&tick_at(0, 2.0)).unwrap();
        let snapshot = s.snapshot();
        assert!(snapshot.unit(3).is_some_and(|diesel| diesel.power_mw > 0.0));
        assert_eq!(s.regulatory().jurisdiction, Jurisdiction::China);
        assert_eq!(s.chart_period(), ChartPeriod::Day);
        assert_eq!(s.pending_controls(), 0);
    }

    #[test]
    fn unknown_unit_and_negative_input_are_dropped() {
        let mut s = sim();
        s.submit(Control::SetUnitState {
            unit_id: 99,
            state: OperationalState::Standby,
        });
        s.submit(Control::SetFuelInput {
            unit_id: 1,
            fuel_input_mw: -4.0,
        });
        s.tick(&tick_at(0, 2.0)).unwrap();
        assert_eq!(s.units()[0].fuel_input_mw, 8.5);
        assert!(s.units().iter().all(|u| u.id != 99));
    }

    #[test]
    fn zero_interval_leaves_counters_untouched() {
        let mut s = sim();
        let before = s.snapshot();
        s.tick(&tick_at(0, 0.0)).unwrap();
        let after = s.snapshot();
        assert_eq!(after.aggregate.uptime_hours, before.aggregate.uptime_hours);
        assert_eq!(
            after.aggregate.co2_credit_balance(),
            before.aggregate.co2_credit_balance()
        );
        assert_eq!(
            after.regulatory.eu_allowances,
            before.regulatory.eu_allowances
        );
        assert_eq!(after.regulatory.us_credits, before.regulatory.us_credits);
    }

    #[test]
    fn run_drives_manual_clock() {
        let mut s = sim();
        let mut clock = ManualClock::new(t0(), 2.0, Some(5));
        let reports = s.run(&mut clock);
        assert_eq!(reports.len(), 5);
        assert_eq!(s.ticks(), 5);
        assert_eq!(s.snapshot().timestamp, Some(t0() + TimeDelta::seconds(10)));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = PlantConfig::kvarken();
        config.history.real_time_capacity = 0;
        match PlantSimulation::from_config(&config, t0()) {
            Err(ConfigError::Invalid(errors)) => assert_eq!(errors.len(), 1),
            _ => panic!("zero ring capacity should be rejected"),
        }
    }

    #[test]
    fn out_of_range_clock_produces_no_ticks() {
        let mut s = sim();
        let reports = s.run(&mut ManualClock::new(t0(), 1e13, Some(1)));
        assert!(reports.is_empty());
        assert_eq!(s.ticks(), 0);
        assert_eq!(s.skipped_ticks(), 0);
    }
}
