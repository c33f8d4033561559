//! Power-plant simulation engine: per-unit readings, CO2 credits,
//! regulatory compliance and chart history for a monitoring dashboard.

/// TOML plant configuration and presets.
pub mod config;
pub mod error;
pub mod io;
pub mod logging;
/// Fuels and generator units.
pub mod plant;
/// Simulation step, ledger, regulatory engine, history and scheduler.
pub mod sim;
