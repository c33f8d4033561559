use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::fuel::FuelKind;

/// Operating state of a generator unit.
///
/// Only [`OperationalState::Running`] units produce output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationalState {
    #[serde(alias = "on", alias = "On")]
    Running,
    #[serde(alias = "Standby")]
    Standby,
    #[serde(alias = "Maintenance")]
    Maintenance,
}

impl fmt::Display for OperationalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OperationalState::Running => "running",
            OperationalState::Standby => "standby",
            OperationalState::Maintenance => "maintenance",
        };
        f.write_str(s)
    }
}

impl FromStr for OperationalState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "running" | "on" => Ok(OperationalState::Running),
            "standby" => Ok(OperationalState::Standby),
            "maintenance" => Ok(OperationalState::Maintenance),
            _ => Err(format!(
                "unknown state \"{s}\", expected running, standby or maintenance"
            )),
        }
    }
}

/// One simulated generator ("motor").
///
/// Configuration fields are set at load time or through control commands;
/// the reading fields are overwritten by every simulation step.
///
/// # Examples
///
/// ```
/// use plant_sim::plant::{FuelKind, OperationalState, Unit};
///
/// let unit = Unit::new(1, FuelKind::Lng, OperationalState::Running, 8.5, 48.5);
/// assert_eq!(unit.power_mw, 0.0);
/// assert!(unit.is_running());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Unit {
    /// Stable unique identifier.
    pub id: u32,
    /// Fuel burned by the unit.
    pub fuel: FuelKind,
    /// Current operating state.
    pub state: OperationalState,
    /// Nominal fuel energy input (MW).
    pub fuel_input_mw: f64,
    /// Nominal conversion efficiency (percent).
    pub efficiency_pct: f64,
    /// Electrical output from the last step (MW, >= 0).
    pub power_mw: f64,
    /// Fuel mass flow from the last step (kg/h).
    pub fuel_consumption_kg_per_h: f64,
    /// CO2 rate from the last step (kg/s, negative = credited offset).
    pub co2_kg_per_s: f64,
}

impl Unit {
    /// Creates a unit with zeroed readings.
    pub fn new(
        id: u32,
        fuel: FuelKind,
        state: OperationalState,
        fuel_input_mw: f64,
        efficiency_pct: f64,
    ) -> Self {
        Self {
            id,
            fuel,
            state,
            fuel_input_mw,
            efficiency_pct,
            power_mw: 0.0,
            fuel_consumption_kg_per_h: 0.0,
            co2_kg_per_s: 0.0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == OperationalState::Running
    }

    /// Zeroes all readings.
    pub fn clear_readings(&mut self) {
        self.power_mw = 0.0;
        self.fuel_consumption_kg_per_h = 0.0;
        self.co2_kg_per_s = 0.0;
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{:<2} {:<11} {:<11} | in={:>5.2} MW  eff={:>4.1}%  out={:>5.2} MW  \
             fuel={:>7.1} kg/h  co2={:>+7.4} kg/s",
            self.id,
            self.fuel.name(),
            self.state.to_string(),
            self.fuel_input_mw,
            self.efficiency_pct,
            self.power_mw,
            self.fuel_consumption_kg_per_h,
            self.co2_kg_per_s,
        )
    }
}
