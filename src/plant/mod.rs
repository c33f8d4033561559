//! Generator units and the fuel property table.

/// Fuel kinds, energy densities and emission factors.
pub mod fuel;
/// Generator unit configuration and readings.
pub mod unit;

pub use fuel::{FuelKind, FuelProperties, FuelTable};
pub use unit::{OperationalState, Unit};
