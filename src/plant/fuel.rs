//! Fuel kinds and their physical properties.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Fuel burned by a generator unit.
///
/// Deserializes from the names used in plant configuration files. The
/// spaced spelling `"Natural Gas"` is accepted as an alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FuelKind {
    #[serde(rename = "LNG")]
    Lng,
    Hydrogen,
    Diesel,
    #[serde(alias = "Natural Gas")]
    NaturalGas,
    Ammonia,
}

impl FuelKind {
    /// All supported fuels, in table order.
    pub const ALL: [FuelKind; 5] = [
        FuelKind::Lng,
        FuelKind::Hydrogen,
        FuelKind::Diesel,
        FuelKind::NaturalGas,
        FuelKind::Ammonia,
    ];

    /// Returns `true` for fuels with no direct CO2 emissions.
    ///
    /// Running units on these fuels are credited with a negative CO2 rate
    /// proportional to their power output.
    pub fn is_zero_emission(self) -> bool {
        matches!(self, FuelKind::Hydrogen | FuelKind::Ammonia)
    }

    /// Display name used in logs and reports.
    pub fn name(self) -> &'static str {
        match self {
            FuelKind::Lng => "LNG",
            FuelKind::Hydrogen => "Hydrogen",
            FuelKind::Diesel => "Diesel",
            FuelKind::NaturalGas => "Natural Gas",
            FuelKind::Ammonia => "Ammonia",
        }
    }
}

impl fmt::Display for FuelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FuelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "lng" => Ok(FuelKind::Lng),
            "hydrogen" | "h2" => Ok(FuelKind::Hydrogen),
            "diesel" => Ok(FuelKind::Diesel),
            "naturalgas" => Ok(FuelKind::NaturalGas),
            "ammonia" | "nh3" => Ok(FuelKind::Ammonia),
            _ => Err(format!("unknown fuel kind \"{s}\"")),
        }
    }
}

/// Energy density and direct emission factor of one fuel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FuelProperties {
    /// Lower heating value (MJ/kg).
    pub energy_density_mj_per_kg: f64,
    /// Direct CO2 emitted per mass of fuel burned (kg CO2 / kg fuel).
    pub co2_kg_per_kg: f64,
}

/// Lookup from fuel kind to its properties.
#[derive(Debug, Clone)]
pub struct FuelTable {
    lng: FuelProperties,
    hydrogen: FuelProperties,
    diesel: FuelProperties,
    natural_gas: FuelProperties,
    ammonia: FuelProperties,
}

impl FuelTable {
    /// Standard property table.
    ///
    /// | Fuel        | MJ/kg | kg CO2/kg |
    /// |-------------|-------|-----------|
    /// | LNG         | 50.0  | 2.75      |
    /// | Natural Gas | 50.0  | 2.75      |
    /// | Hydrogen    | 120.0 | 0.0       |
    /// | Ammonia     | 18.6  | 0.0       |
    /// | Diesel      | 42.7  | 3.15      |
    pub fn standard() -> Self {
        Self {
            lng: FuelProperties {
                energy_density_mj_per_kg: 50.0,
                co2_kg_per_kg: 2.75,
            },
            hydrogen: FuelProperties {
                energy_density_mj_per_kg: 120.0,
                co2_kg_per_kg: 0.0,
            },
            diesel: FuelProperties {
                energy_density_mj_per_kg: 42.7,
                co2_kg_per_kg: 3.15,
            },
            natural_gas: FuelProperties {
                energy_density_mj_per_kg: 50.0,
                co2_kg_per_kg: 2.75,
            },
            ammonia: FuelProperties {
                energy_density_mj_per_kg: 18.6,
                co2_kg_per_kg: 0.0,
            },
        }
    }

    /// Returns the properties of `fuel`.
    pub fn get(&self, fuel: FuelKind) -> FuelProperties {
        match fuel {
            FuelKind::Lng => self.lng,
            FuelKind::Hydrogen => self.hydrogen,
            FuelKind::Diesel => self.diesel,
            FuelKind::NaturalGas => self.natural_gas,
            FuelKind::Ammonia => self.ammonia,
        }
    }

    /// Overrides the properties of `fuel`.
    pub fn set(&mut self, fuel: FuelKind, properties: FuelProperties) {
        let slot = match fuel {
            FuelKind::Lng => &mut self.lng,
            FuelKind::Hydrogen => &mut self.hydrogen,
            FuelKind::Diesel => &mut self.diesel,
            FuelKind::NaturalGas => &mut self.natural_gas,
            FuelKind::Ammonia => &mut self.ammonia,
        };
        *slot = properties;
    }
}

impl Default for FuelTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_emission_fuels_have_no_direct_co2() {
        let table = FuelTable::standard();
        for fuel in FuelKind::ALL {
            if fuel.is_zero_emission() {
                assert_eq!(table.get(fuel).co2_kg_per_kg, 0.0, "{fuel}");
            } else {
                assert!(table.get(fuel).co2_kg_per_kg > 0.0, "{fuel}");
            }
        }
    }

    #[test]
    fn energy_densities_are_positive() {
        let table = FuelTable::standard();
        assert!(
            FuelKind::ALL
                .iter()
                .all(|&f| table.get(f).energy_density_mj_per_kg > 0.0)
        );
    }

    #[test]
    fn parses_display_and_config_spellings() {
        assert_eq!("Natural Gas".parse::<FuelKind>(), Ok(FuelKind::NaturalGas));
        assert_eq!("natural_gas".parse::<FuelKind>(), Ok(FuelKind::NaturalGas));
        assert_eq!("LNG".parse::<FuelKind>(), Ok(FuelKind::Lng));
        assert_eq!("NH3".parse::<FuelKind>(), Ok(FuelKind::Ammonia));
        assert!("coal".parse::<FuelKind>().is_err());
    }

    #[test]
    fn serde_accepts_alias() {
        #[derive(Deserialize)]
        struct Wrapper {
            fuel: FuelKind,
        }
        let w: Wrapper = toml::from_str(r#"fuel = "Natural Gas""#).unwrap();
        assert_eq!(w.fuel, FuelKind::NaturalGas);
        let w: Wrapper = toml::from_str(r#"fuel = "NaturalGas""#).unwrap();
        assert_eq!(w.fuel, FuelKind::NaturalGas);
        assert!(toml::from_str::<Wrapper>(r#"fuel = "Coal""#).is_err());
    }
}
