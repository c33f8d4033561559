//! Jurisdiction-specific compliance figures derived from plant totals.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::types::{KG_PER_TONNE, SECONDS_PER_HOUR, tonnes_over_interval};

/// Regulatory region the plant reports to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Jurisdiction {
    /// EU Emissions Trading System (EUA allowances).
    #[default]
    #[serde(alias = "EU")]
    Eu,
    /// US cap-and-trade carbon credits.
    #[serde(alias = "US")]
    Us,
    /// China national ETS intensity benchmark.
    #[serde(alias = "China", alias = "CN", alias = "cn")]
    China,
}

/// How a jurisdiction turns emissions into compliance figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegulatoryModel {
    /// A tradable balance drawn down by emitted tonnes.
    AllowanceMarket,
    /// An intensity threshold; excess intensity requires extra allowances.
    Benchmark,
}

impl Jurisdiction {
    pub fn model(self) -> RegulatoryModel {
        match self {
            Jurisdiction::Eu | Jurisdiction::Us => RegulatoryModel::AllowanceMarket,
            Jurisdiction::China => RegulatoryModel::Benchmark,
        }
    }
}

impl fmt::Display for Jurisdiction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Jurisdiction::Eu => "EU",
            Jurisdiction::Us => "US",
            Jurisdiction::China => "China",
        };
        f.write_str(s)
    }
}

impl FromStr for Jurisdiction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "eu" => Ok(Jurisdiction::Eu),
            "us" => Ok(Jurisdiction::Us),
            "china" | "cn" => Ok(Jurisdiction::China),
            _ => Err(format!(
                "unknown jurisdiction \"{s}\", expected eu, us or china"
            )),
        }
    }
}

/// Tradable allowance or credit holdings (tonnes CO2).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AllowanceAccount {
    pub purchased: f64,
    /// Monotonically increasing.
    pub surrendered: f64,
    /// Never below zero.
    pub remaining: f64,
}

impl AllowanceAccount {
    /// Surrenders `tonnes`; `remaining` is floored at zero.
    fn surrender(&mut self, tonnes: f64) {
        self.remaining = (self.remaining - tonnes).max(0.0);
        self.surrendered += tonnes;
    }
}

/// Intensity benchmark status (kg CO2 / MWh, equivalently g/kWh).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EfficiencyBenchmark {
    pub benchmark: f64,
    #[serde(default)]
    pub actual: f64,
    /// Extra allowances needed at the current intensity (t CO2 per hour).
    #[serde(default)]
    pub extra_allowances_required: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Verified,
    #[default]
    Pending,
    Required,
}

/// Compliance state for every supported jurisdiction; only the active one
/// is updated per tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegulatoryProfile {
    pub jurisdiction: Jurisdiction,
    pub eu_allowances: AllowanceAccount,
    pub us_credits: AllowanceAccount,
    pub efficiency: EfficiencyBenchmark,
    /// Tonnes CO2 offset through China CCER projects.
    pub ccer_offsets: f64,
    /// Emission intensity (kg CO2 / MWh); kept from the last tick with output.
    pub co2_per_mwh: f64,
    pub verification_status: VerificationStatus,
    pub last_audit_date: NaiveDate,
}

impl RegulatoryProfile {
    /// Allowance account of the active jurisdiction, if it trades one.
    pub fn active_account(&self) -> Option<&AllowanceAccount> {
        match self.jurisdiction {
            Jurisdiction::Eu => Some(&self.eu_allowances),
            Jurisdiction::Us => Some(&self.us_credits),
            Jurisdiction::China => None,
        }
    }

    fn active_account_mut(&mut self) -> Option<&mut AllowanceAccount> {
        match self.jurisdiction {
            Jurisdiction::Eu => Some(&mut self.eu_allowances),
            Jurisdiction::Us => Some(&mut self.us_credits),
            Jurisdiction::China => None,
        }
    }

    /// Updates intensity and the active jurisdiction's figures for one tick.
    ///
    /// With zero output the intensity is left unchanged. Allowance markets
    /// surrender the tick's emitted tonnes and never refund offset-only
    /// ticks. The benchmark model recomputes a point-in-time requirement.
    ///
    /// # Arguments
    ///
    /// * `total_power_mw` - Plant output this tick (MW)
    /// * `total_co2_kg_per_s` - Net plant CO2 rate (kg/s)
    /// * `interval_secs` - Elapsed time covered by the tick (s)
    pub fn update(&mut self, total_power_mw: f64, total_co2_kg_per_s: f64, interval_secs: f64) {
        if total_power_mw > 0.0 {
            self.co2_per_mwh = total_co2_kg_per_s * SECONDS_PER_HOUR / total_power_mw;
        }

        match self.jurisdiction.model() {
            RegulatoryModel::AllowanceMarket => {
                if total_co2_kg_per_s > 0.0 {
                    let tonnes = tonnes_over_interval(total_co2_kg_per_s, interval_secs);
                    if let Some(account) = self.active_account_mut() {
                        account.surrender(tonnes);
                    }
                }
            }
            RegulatoryModel::Benchmark => {
                let eff = &mut self.efficiency;
                eff.actual = self.co2_per_mwh.abs();
                eff.extra_allowances_required = if eff.actual > eff.benchmark {
                    (eff.actual - eff.benchmark) * total_power_mw / KG_PER_TONNE
                } else {
                    0.0
                };
            }
        }
    }
}
