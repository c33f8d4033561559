//! One simulation step: per-unit readings and plant totals.

use crate::plant::{FuelTable, Unit};

use super::perturbation::Perturbation;
use super::types::{Coefficients, SECONDS_PER_HOUR};

/// Plant totals produced by one step.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StepTotals {
    /// Sum of unit outputs (MW).
    pub total_power_mw: f64,
    /// Sum of unit CO2 rates (kg/s, signed).
    pub total_co2_kg_per_s: f64,
    /// Output of running zero-emission units (MW).
    pub clean_power_mw: f64,
}

/// Recomputes every unit's readings in place and returns the totals.
///
/// Running units get an independent fuel-input perturbation per call; the
/// nominal `fuel_input_mw` is left untouched. Units in any other state are
/// zeroed. Totals are plain sums over the updated readings.
///
/// # Arguments
///
/// * `units` - Units to update
/// * `fuels` - Fuel property table
/// * `coefficients` - Noise band, CO2 normalization and offset coefficient
/// * `perturbation` - Noise source, drawn once per running unit
pub fn step<P: Perturbation + ?Sized>(
    units: &mut [Unit],
    fuels: &FuelTable,
    coefficients: &Coefficients,
    perturbation: &mut P,
) -> StepTotals {
    let max_fraction = coefficients.perturbation_pct / 100.0;
    let mut totals = StepTotals::default();

    for unit in units.iter_mut() {
        if !unit.is_running() {
            unit.clear_readings();
            continue;
        }

        let props = fuels.get(unit.fuel);
        let input_mw = unit.fuel_input_mw * (1.0 + perturbation.factor(max_fraction));

        // MW in -> MJ/h -> kg/h
        unit.power_mw = (input_mw * (unit.efficiency_pct / 100.0)).max(0.0);
        unit.fuel_consumption_kg_per_h =
            input_mw * SECONDS_PER_HOUR / props.energy_density_mj_per_kg;
        unit.co2_kg_per_s = if unit.fuel.is_zero_emission() {
            -(unit.power_mw * coefficients.offset_coefficient)
        } else {
            unit.fuel_consumption_kg_per_h * props.co2_kg_per_kg / coefficients.co2_normalization
        };

        totals.total_power_mw += unit.power_mw;
        totals.total_co2_kg_per_s += unit.co2_kg_per_s;
        if unit.fuel.is_zero_emission() {
            totals.clean_power_mw += unit.power_mw;
        }
    }

    totals
}
