//! CO2 credit ledger.

use serde::Serialize;

use super::types::{SECONDS_PER_HOUR, tonnes_over_interval};

/// Signed credit change for one tick.
///
/// Net emissions cost one credit per tonne; zero-emission generation earns
/// `reward_coefficient` credits per MWh. Both terms are prorated to the
/// interval, so a zero interval always yields zero.
///
/// # Examples
///
/// ```
/// use plant_sim::sim::credits::credit_delta;
///
/// // 1 kg/s for one hour costs 3.6 credits; 4 MW clean earns 2.0
/// let delta = credit_delta(1.0, 4.0, 3600.0, 0.5);
/// assert!((delta - (2.0 - 3.6)).abs() < 1e-12);
/// ```
pub fn credit_delta(
    total_co2_kg_per_s: f64,
    clean_power_mw: f64,
    interval_secs: f64,
    reward_coefficient: f64,
) -> f64 {
    let emission_cost = if total_co2_kg_per_s > 0.0 {
        tonnes_over_interval(total_co2_kg_per_s, interval_secs)
    } else {
        0.0
    };
    let clean_reward = clean_power_mw * reward_coefficient * (interval_secs / SECONDS_PER_HOUR);
    clean_reward - emission_cost
}

/// Running credit balance. Unbounded in both directions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CreditLedger {
    /// Current balance (credits).
    #[serde(rename = "co2_credit_balance")]
    pub balance: f64,
    /// Change applied by the last update.
    #[serde(rename = "co2_credit_delta")]
    pub last_delta: f64,
}

impl CreditLedger {
    pub fn new(initial_balance: f64) -> Self {
        Self {
            balance: initial_balance,
            last_delta: 0.0,
        }
    }

    /// Applies one tick's emissions and clean output; returns the delta.
    pub fn update(
        &mut self,
        total_co2_kg_per_s: f64,
        clean_power_mw: f64,
        interval_secs: f64,
        reward_coefficient: f64,
    ) -> f64 {
        let delta = credit_delta(
            total_co2_kg_per_s,
            clean_power_mw,
            interval_secs,
            reward_coefficient,
        );
        self.balance += delta;
        self.last_delta = delta;
        delta
    }
}
