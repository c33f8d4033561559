//! Error types for configuration loading and tick execution.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// A single invalid configuration field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    /// Dotted field path (e.g., `"units[2].efficiency_pct"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Errors raised while loading plant configuration.
///
/// None of these reach the tick loop: a configuration that fails to load or
/// validate never builds a simulation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read \"{}\": {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid plant TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("unknown preset \"{name}\", available: {available}")]
    UnknownPreset { name: String, available: String },
    #[error("invalid configuration: {}", join_fields(.0))]
    Invalid(Vec<FieldError>),
}

fn join_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Reasons a tick is rejected without touching plant state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TickError {
    #[error("tick interval must be >= 0 s, got {0}")]
    NegativeInterval(f64),
    #[error("non-finite {quantity} ({value}) computed during tick")]
    NonFinite { quantity: &'static str, value: f64 },
}

/// Returns `Err(TickError::NonFinite)` when `value` is NaN or infinite.
pub(crate) fn ensure_finite(quantity: &'static str, value: f64) -> Result<f64, TickError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(TickError::NonFinite { quantity, value })
    }
}
