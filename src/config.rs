//! TOML-based plant configuration and preset definitions.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::{ConfigError, FieldError};
use crate::plant::{FuelKind, OperationalState, Unit};
use crate::sim::history::HistorySettings;
use crate::sim::regulatory::{
    AllowanceAccount, EfficiencyBenchmark, Jurisdiction, RegulatoryProfile, VerificationStatus,
};
use crate::sim::types::{ChartPeriod, Coefficients};

/// Longest accepted tick interval (s).
pub const MAX_TICK_INTERVAL_SECS: f64 = 86_400.0;

/// Top-level plant configuration parsed from TOML.
///
/// Every table has defaults matching the reference plant. Load from TOML
/// with [`PlantConfig::load`] or use [`PlantConfig::kvarken`] for the
/// built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlantConfig {
    /// Tick cadence, seed and chart selection.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Plant-wide starting values.
    #[serde(default)]
    pub plant: PlantSettings,
    /// Formula constants.
    #[serde(default)]
    pub coefficients: Coefficients,
    /// Jurisdiction and starting compliance balances.
    #[serde(default)]
    pub regulatory: RegulatoryConfig,
    /// Chart buffer capacities and long-period data source.
    #[serde(default)]
    pub history: HistorySettings,
    /// Generator units.
    #[serde(default = "reference_units")]
    pub units: Vec<UnitConfig>,
}

/// Tick cadence and global parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Scheduler period (s, in `(0, MAX_TICK_INTERVAL_SECS]`).
    pub tick_interval_secs: f64,
    /// Master random seed.
    pub seed: u64,
    /// Chart series initially selected.
    pub chart_period: ChartPeriod,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: 2.0,
            seed: 42,
            chart_period: ChartPeriod::RealTime,
        }
    }
}

/// Plant-wide starting values.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlantSettings {
    /// Nameplate capacity (MW).
    pub capacity_mw: f64,
    /// Uptime already accumulated at startup (h).
    pub initial_uptime_hours: f64,
    /// Starting CO2 credit balance.
    pub initial_credit_balance: f64,
}

impl Default for PlantSettings {
    fn default() -> Self {
        Self {
            capacity_mw: 18.5,
            initial_uptime_hours: 11.6,
            initial_credit_balance: 5000.0,
        }
    }
}

/// Jurisdiction and starting compliance figures.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegulatoryConfig {
    pub jurisdiction: Jurisdiction,
    /// EU ETS allowances (EUAs, t CO2).
    pub eu_allowances: AllowanceAccount,
    /// US carbon credits (t CO2).
    pub us_credits: AllowanceAccount,
    /// China intensity benchmark (kg CO2 / MWh).
    pub benchmark_kg_per_mwh: f64,
    /// China CCER offsets (t CO2).
    pub ccer_offsets: f64,
    pub verification_status: VerificationStatus,
    pub last_audit_date: NaiveDate,
}

impl Default for RegulatoryConfig {
    fn default() -> Self {
        Self {
            jurisdiction: Jurisdiction::Eu,
            eu_allowances: AllowanceAccount {
                purchased: 2450.0,
                surrendered: 1890.0,
                remaining: 560.0,
            },
            us_credits: AllowanceAccount {
                purchased: 890.0,
                surrendered: 340.0,
                remaining: 550.0,
            },
            benchmark_kg_per_mwh: 310.0,
            ccer_offsets: 125.0,
            verification_status: VerificationStatus::Pending,
            last_audit_date: NaiveDate::from_ymd_opt(2025, 9, 15).unwrap_or_default(),
        }
    }
}

impl RegulatoryConfig {
    /// Builds the starting regulatory profile.
    pub fn build_profile(&self) -> RegulatoryProfile {
        RegulatoryProfile {
            jurisdiction: self.jurisdiction,
            eu_allowances: self.eu_allowances,
            us_credits: self.us_credits,
            efficiency: EfficiencyBenchmark {
                benchmark: self.benchmark_kg_per_mwh,
                actual: 0.0,
                extra_allowances_required: 0.0,
            },
            ccer_offsets: self.ccer_offsets,
            co2_per_mwh: 0.0,
            verification_status: self.verification_status,
            last_audit_date: self.last_audit_date,
        }
    }
}

/// One generator unit entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnitConfig {
    pub id: u32,
    pub fuel: FuelKind,
    pub state: OperationalState,
    /// Nominal fuel energy input (MW, >= 0).
    pub fuel_input_mw: f64,
    /// Conversion efficiency (percent, in (0, 100]).
    pub efficiency_pct: f64,
}

impl UnitConfig {
    fn new(
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
        }
    }

    pub fn build(&self) -> Unit {
        Unit::new(
            self.id,
            self.fuel,
            self.state,
            self.fuel_input_mw,
            self.efficiency_pct,
        )
    }
}

/// The six reference motors of the kvarken plant.
fn reference_units() -> Vec<UnitConfig> {
    use FuelKind::*;
    use OperationalState::*;
    vec![
        UnitConfig::new(1, Lng, Running, 8.5, 48.5),
        UnitConfig::new(2, Hydrogen, Running, 10.2, 43.2),
        UnitConfig::new(3, Diesel, Standby, 0.0, 45.8),
        UnitConfig::new(4, NaturalGas, Running, 7.8, 49.1),
        UnitConfig::new(5, Ammonia, Running, 9.6, 41.8),
        UnitConfig::new(6, Lng, Maintenance, 0.0, 48.5),
    ]
}

impl PlantConfig {
    /// Returns the reference plant: six units, EU jurisdiction.
    pub fn kvarken() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            plant: PlantSettings::default(),
            coefficients: Coefficients::default(),
            regulatory: RegulatoryConfig::default(),
            history: HistorySettings::default(),
            units: reference_units(),
        }
    }

    /// Returns the clean-transition preset: hydrogen and ammonia heavy,
    /// reporting against the China intensity benchmark.
    pub fn clean_transition() -> Self {
        use FuelKind::*;
        use OperationalState::*;
        Self {
            regulatory: RegulatoryConfig {
                jurisdiction: Jurisdiction::China,
                ..RegulatoryConfig::default()
            },
            units: vec![
                UnitConfig::new(1, Hydrogen, Running, 10.2, 43.2),
                UnitConfig::new(2, Hydrogen, Running, 9.8, 43.2),
                UnitConfig::new(3, Ammonia, Running, 9.6, 41.8),
                UnitConfig::new(4, Lng, Running, 6.0, 48.5),
                UnitConfig::new(5, Ammonia, Standby, 9.6, 41.8),
            ],
            ..Self::kvarken()
        }
    }

    /// Returns the peak-diesel preset: fossil peaking units under US
    /// cap-and-trade, with synthetic long-period charts for demos.
    pub fn peak_diesel() -> Self {
        use FuelKind::*;
        use OperationalState::*;
        Self {
            plant: PlantSettings {
                capacity_mw: 22.0,
                initial_uptime_hours: 0.0,
                initial_credit_balance: 1200.0,
            },
            regulatory: RegulatoryConfig {
                jurisdiction: Jurisdiction::Us,
                verification_status: VerificationStatus::Required,
                ..RegulatoryConfig::default()
            },
            history: HistorySettings {
                source: crate::sim::history::HistorySource::Synthetic,
                ..HistorySettings::default()
            },
            units: vec![
                UnitConfig::new(1, Diesel, Running, 11.0, 45.8),
                UnitConfig::new(2, Diesel, Running, 10.5, 45.8),
                UnitConfig::new(3, NaturalGas, Running, 9.0, 49.1),
                UnitConfig::new(4, Hydrogen, Maintenance, 10.2, 43.2),
            ],
            ..Self::kvarken()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["kvarken", "clean_transition", "peak_diesel"];

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownPreset`] if the name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "kvarken" => Ok(Self::kvarken()),
            "clean_transition" => Ok(Self::clean_transition()),
            "peak_diesel" => Ok(Self::peak_diesel()),
            _ => Err(ConfigError::UnknownPreset {
                name: name.to_string(),
                available: Self::PRESETS.join(", "),
            }),
        }
    }

    /// Parses a configuration from a TOML file without validating it.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string without validating it.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid, names an unknown fuel
    /// or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] listing every invalid field, or the
    /// read/parse error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let cfg = Self::from_toml_file(path)?;
        cfg.ensure_valid()?;
        Ok(cfg)
    }

    /// Returns `Err` with all field errors if the configuration is invalid.
    pub fn ensure_valid(&self) -> Result<(), ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        let s = &self.simulation;
        if !(s.tick_interval_secs > 0.0 && s.tick_interval_secs <= MAX_TICK_INTERVAL_SECS) {
            errors.push(FieldError::new(
                "simulation.tick_interval_secs",
                "must be in (0, 86400]",
            ));
        }

        let p = &self.plant;
        if !(p.capacity_mw.is_finite() && p.capacity_mw > 0.0) {
            errors.push(FieldError::new("plant.capacity_mw", "must be > 0"));
        }
        if !(p.initial_uptime_hours.is_finite() && p.initial_uptime_hours >= 0.0) {
            errors.push(FieldError::new(
                "plant.initial_uptime_hours",
                "must be >= 0",
            ));
        }
        if !p.initial_credit_balance.is_finite() {
            errors.push(FieldError::new(
                "plant.initial_credit_balance",
                "must be finite",
            ));
        }

        let c = &self.coefficients;
        if !(0.0..100.0).contains(&c.perturbation_pct) {
            errors.push(FieldError::new(
                "coefficients.perturbation_pct",
                "must be in [0, 100)",
            ));
        }
        if !(c.co2_normalization.is_finite() && c.co2_normalization > 0.0) {
            errors.push(FieldError::new(
                "coefficients.co2_normalization",
                "must be > 0",
            ));
        }
        if !(c.offset_coefficient.is_finite() && c.offset_coefficient >= 0.0) {
            errors.push(FieldError::new(
                "coefficients.offset_coefficient",
                "must be >= 0",
            ));
        }
        if !(c.reward_coefficient.is_finite() && c.reward_coefficient >= 0.0) {
            errors.push(FieldError::new(
                "coefficients.reward_coefficient",
                "must be >= 0",
            ));
        }

        let r = &self.regulatory;
        for (name, account) in [
            ("eu_allowances", &r.eu_allowances),
            ("us_credits", &r.us_credits),
        ] {
            for (field, value) in [
                ("purchased", account.purchased),
                ("surrendered", account.surrendered),
                ("remaining", account.remaining),
            ] {
                if !(value.is_finite() && value >= 0.0) {
                    errors.push(FieldError::new(
                        format!("regulatory.{name}.{field}"),
                        "must be >= 0",
                    ));
                }
            }
        }
        if !(r.benchmark_kg_per_mwh.is_finite() && r.benchmark_kg_per_mwh > 0.0) {
            errors.push(FieldError::new(
                "regulatory.benchmark_kg_per_mwh",
                "must be > 0",
            ));
        }
        if !(r.ccer_offsets.is_finite() && r.ccer_offsets >= 0.0) {
            errors.push(FieldError::new("regulatory.ccer_offsets", "must be >= 0"));
        }

        let h = &self.history;
        for (field, value) in [
            ("history.real_time_capacity", h.real_time_capacity),
            ("history.day_capacity", h.day_capacity),
            ("history.week_capacity", h.week_capacity),
            ("history.month_capacity", h.month_capacity),
        ] {
            if value == 0 {
                errors.push(FieldError::new(field, "must be > 0"));
            }
        }

        if self.units.is_empty() {
            errors.push(FieldError::new("units", "at least one unit is required"));
        }
        let mut seen = HashSet::new();
        for (i, u) in self.units.iter().enumerate() {
            if !seen.insert(u.id) {
                errors.push(FieldError::new(
                    format!("units[{i}].id"),
                    format!("duplicate unit id {}", u.id),
                ));
            }
            if !(u.fuel_input_mw.is_finite() && u.fuel_input_mw >= 0.0) {
                errors.push(FieldError::new(
                    format!("units[{i}].fuel_input_mw"),
                    "must be >= 0",
                ));
            }
            if !(u.efficiency_pct > 0.0 && u.efficiency_pct <= 100.0) {
                errors.push(FieldError::new(
                    format!("units[{i}].efficiency_pct"),
                    "must be in (0, 100]",
                ));
            }
        }

        errors
    }

    /// Builds the unit list with zeroed readings.
    pub fn build_units(&self) -> Vec<Unit> {
        self.units.iter().map(UnitConfig::build).collect()
    }
}
