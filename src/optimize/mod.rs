//! Derivative-free minimizers for scalar objective functions.
//!
//! ## Nelder–Mead
//!
//! Local simplex search. Maintains `p + 1` vertices in a `p`-dimensional
//! parameter space and moves the worst vertex by reflection, expansion,
//! contraction or a full shrink toward the best vertex. Cheap per iteration and
//! robust on non-smooth objectives, but only finds the minimum of the basin it
//! starts in.
//!
//! ## Differential evolution
//!
//! Global, population-based search inside box bounds. Each candidate is
//! challenged by a trial vector built from the scaled difference of two other
//! candidates added to a third. Slower than Nelder–Mead, but insensitive to the
//! starting point, which matters when a model has several plausible
//! interpretations.
//!
//! ## Usage
//!
//! ```rust
//! use regionclust::optimize::{DifferentialEvolution, NelderMead};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! fn bowl(x: &[f64]) -> f64 {
//!     (x[0] - 1.0).powi(2) + (x[1] + 2.0).powi(2)
//! }
//!
//! let local = NelderMead::new().minimize(&bowl, &[0.0, 0.0]).unwrap();
//! assert!((local.x[0] - 1.0).abs() < 1e-6);
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let global = DifferentialEvolution::new()
//!     .minimize(&bowl, &[-10.0, -10.0], &[10.0, 10.0], &mut rng)
//!     .unwrap();
//! assert!(global.value < 1e-6);
//! ```

mod differential_evolution;
mod nelder_mead;

pub use differential_evolution::DifferentialEvolution;
pub use nelder_mead::NelderMead;

/// A scalar cost over a real parameter vector.
///
/// Implemented for every `Fn(&[f64]) -> f64`, so plain functions and annotated
/// closures can be passed directly.
pub trait ObjectiveFunction {
    /// Evaluate the cost at `parameters`. Must be deterministic.
    fn evaluate(&self, parameters: &[f64]) -> f64;
}

impl<F> ObjectiveFunction for F
where
    F: Fn(&[f64]) -> f64,
{
    #[inline]
    fn evaluate(&self, parameters: &[f64]) -> f64 {
        self(parameters)
    }
}

/// Result of a minimization.
#[derive(Clone, Debug, PartialEq)]
pub struct Minimum {
    /// Parameters with the lowest cost found.
    pub x: Vec<f64>,
    /// Cost at `x`.
    pub value: f64,
    /// Iterations (simplex steps or generations) performed.
    pub iterations: usize,
    /// Number of objective evaluations.
    pub evaluations: usize,
}

/// Relative spread between two costs, guarded against a zero denominator.
#[inline]
pub(crate) fn relative_spread(a: f64, b: f64) -> f64 {
    2.0 * (a - b).abs() / (a.abs() + b.abs() + TINY)
}

pub(crate) const TINY: f64 = 1e-20;
