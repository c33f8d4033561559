//! Injectable randomness for fuel-input noise.

use rand::{Rng, SeedableRng, rngs::StdRng};

/// Source of per-unit fuel-input perturbations.
///
/// Implementations return a signed fraction of the nominal input, e.g.
/// `0.03` for +3 %. The step multiplies the nominal input by `1 + factor`.
pub trait Perturbation {
    /// Draws one factor in `[-max_fraction, +max_fraction]`.
    fn factor(&mut self, max_fraction: f64) -> f64;
}

/// Uniform noise from a seeded `StdRng`, reproducible for a fixed seed.
///
/// # Examples
///
/// ```
/// use plant_sim::sim::perturbation::{Perturbation, SeededPerturbation};
///
/// let mut a = SeededPerturbation::new(7);
/// let mut b = SeededPerturbation::new(7);
/// assert_eq!(a.factor(0.05), b.factor(0.05));
/// ```
#[derive(Debug, Clone)]
pub struct SeededPerturbation {
    rng: StdRng,
}

impl SeededPerturbation {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Perturbation for SeededPerturbation {
    fn factor(&mut self, max_fraction: f64) -> f64 {
        if max_fraction <= 0.0 {
            return 0.0;
        }
        self.rng.random_range(-max_fraction..=max_fraction)
    }
}

/// Constant factor, clamped to the allowed band. `Fixed(0.0)` disables noise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fixed(pub f64);

impl Perturbation for Fixed {
    fn factor(&mut self, max_fraction: f64) -> f64 {
        let bound = max_fraction.max(0.0);
        self.0.clamp(-bound, bound)
    }
}
