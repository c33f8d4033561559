//! Shared test fixtures for integration tests.
#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};

use plant_sim::config::{PlantConfig, UnitConfig};
use plant_sim::plant::{FuelKind, OperationalState};
use plant_sim::sim::clock::{ManualClock, Tick};
use plant_sim::sim::engine::PlantSimulation;
use plant_sim::sim::perturbation::Fixed;
use plant_sim::sim::regulatory::Jurisdiction;
use plant_sim::sim::types::TickReport;

/// Fixed start time used by every fixture.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 26, 8, 0, 0).unwrap()
}

pub fn unit(
    id: u32,
    fuel: FuelKind,
    state: OperationalState,
    fuel_input_mw: f64,
    efficiency_pct: f64,
) -> UnitConfig {
    UnitConfig {
        id,
        fuel,
        state,
        fuel_input_mw,
        efficiency_pct,
    }
}

/// LNG 10 MW at 50 %, Hydrogen 8 MW at 40 %, Diesel on standby.
pub fn two_unit_config() -> PlantConfig {
    PlantConfig {
        units: vec![
            unit(1, FuelKind::Lng, OperationalState::Running, 10.0, 50.0),
            unit(2, FuelKind::Hydrogen, OperationalState::Running, 8.0, 40.0),
            unit(3, FuelKind::Diesel, OperationalState::Standby, 6.0, 45.0),
        ],
        ..PlantConfig::kvarken()
    }
}

/// One LNG unit producing 10 MW at 360 kg CO2/MWh, under the China benchmark.
pub fn benchmark_config() -> PlantConfig {
    let mut config = PlantConfig {
        units: vec![unit(
            1,
            FuelKind::Lng,
            OperationalState::Running,
            200.0 / 11.0,
            55.0,
        )],
        ..PlantConfig::kvarken()
    };
    config.regulatory.jurisdiction = Jurisdiction::China;
    config
}

/// Simulation with perturbation disabled.
pub fn quiet_sim(config: &PlantConfig) -> PlantSimulation {
    PlantSimulation::from_config(config, t0())
        .expect("fixture config should be valid")
        .with_perturbation(Fixed(0.0))
}

/// Simulation with seeded noise from the configuration.
pub fn noisy_sim(config: &PlantConfig) -> PlantSimulation {
    PlantSimulation::from_config(config, t0()).expect("fixture config should be valid")
}

pub fn tick(index: u64, interval_secs: f64) -> Tick {
    let offset_ms = (interval_secs * 1000.0) as i64 * (index as i64 + 1);
    Tick {
        index,
        timestamp: t0() + chrono::TimeDelta::milliseconds(offset_ms),
        interval_secs,
    }
}

/// Runs `n` evenly spaced ticks through a manual clock.
pub fn run_ticks(sim: &mut PlantSimulation, n: u64, interval_secs: f64) -> Vec<TickReport> {
    let mut clock = ManualClock::new(t0(), interval_secs, Some(n));
    sim.run(&mut clock)
}
