use crate::error::Result;
use crate::geometry::Point3;
use crate::random::UniformRandom;

/// Result of fitting a `k`-component mixture to a set of positions.
#[derive(Clone, Debug, PartialEq)]
pub struct MixtureFit {
    /// Component index in `0..k` for each input position, in input order.
    pub assignment: Vec<usize>,
    /// Responsibility of the assigned component for each position.
    pub probabilities: Vec<f64>,
    /// Total log-likelihood of the positions under the fitted mixture.
    pub log_likelihood: f64,
}

/// Statistical model used to propose sub-clusterings.
///
/// Implementations partition `positions` into at most `k` groups and report a
/// log-likelihood that is comparable across different `k` and different
/// subsets of positions. Given the same random-source state, a fit must be
/// reproducible.
pub trait MixtureModelFitter {
    /// Fit at most `k` components to `positions`.
    ///
    /// The returned `assignment` and `probabilities` must each hold one entry
    /// per position, in input order.
    ///
    /// # Errors
    ///
    /// Returns an error if `k` is zero or exceeds `positions.len()`, or if no
    /// finite likelihood can be obtained.
    fn fit(&self, positions: &[Point3], k: usize, rng: &mut dyn UniformRandom)
        -> Result<MixtureFit>;
}

impl<M: MixtureModelFitter + ?Sized> MixtureModelFitter for &M {
    fn fit(
        &self,
        positions: &[Point3],
        k: usize,
        rng: &mut dyn UniformRandom,
    ) -> Result<MixtureFit> {
        (**self).fit(positions, k, rng)
    }
}
