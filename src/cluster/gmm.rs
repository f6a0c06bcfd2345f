//! Diagonal-covariance Gaussian mixture fitted by expectation–maximisation.
//!
//! Components are seeded with K-means++, given per-axis variances from a hard
//! nearest-seed assignment, then refined with EM until the log-likelihood
//! stops improving. Variances are floored so that collapsed components (a
//! single region, or a flat z axis in 2D data) keep a finite density.

#![allow(clippy::needless_range_loop)]

use super::seeding::{assign_nearest, kmeans_plus_plus};
use super::traits::{MixtureFit, MixtureModelFitter};
use crate::error::{Error, Result};
use crate::geometry::Point3;
use crate::random::UniformRandom;

const LN_2PI: f64 = 1.837_877_066_409_345_5;

#[derive(Clone, Debug)]
struct Component {
    weight: f64,
    mean: [f64; 3],
    variance: [f64; 3],
}

impl Component {
    fn log_density(&self, x: &[f64; 3]) -> f64 {
        if self.weight <= 0.0 {
            return f64::NEG_INFINITY;
        }
        let mut acc = self.weight.ln();
        for d in 0..3 {
            let diff = x[d] - self.mean[d];
            acc -= 0.5 * (LN_2PI + self.variance[d].ln() + diff * diff / self.variance[d]);
        }
        acc
    }
}

/// Default [`MixtureModelFitter`].
#[derive(Debug, Clone)]
pub struct GaussianMixtureFitter {
    max_iterations: usize,
    tolerance: f64,
    min_variance: f64,
}

impl Default for GaussianMixtureFitter {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            tolerance: 1e-8,
            min_variance: 1.0,
        }
    }
}

impl GaussianMixtureFitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap on EM iterations.
    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    /// Relative log-likelihood change below which EM stops.
    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    /// Per-axis variance floor, in squared pixels.
    pub fn with_min_variance(mut self, v: f64) -> Self {
        self.min_variance = v;
        self
    }

    fn initial_components(
        &self,
        data: &[[f64; 3]],
        positions: &[Point3],
        k: usize,
        rng: &mut dyn UniformRandom,
    ) -> Result<Vec<Component>> {
        let seeds = kmeans_plus_plus(positions, k, rng)?;
        let centers: Vec<Point3> = seeds.iter().map(|&s| positions[s]).collect();
        let labels = assign_nearest(positions, &centers);

        let n = data.len() as f64;
        let mut comps: Vec<Component> = centers
            .iter()
            .map(|c| Component {
                weight: 0.0,
                mean: c.to_array(),
                variance: [0.0; 3],
            })
            .collect();
        for (x, &l) in data.iter().zip(&labels) {
            comps[l].weight += 1.0;
            for d in 0..3 {
                let diff = x[d] - comps[l].mean[d];
                comps[l].variance[d] += diff * diff;
            }
        }
        for c in &mut comps {
            for d in 0..3 {
                c.variance[d] = (c.variance[d] / c.weight.max(1.0)).max(self.min_variance);
            }
            c.weight /= n;
        }
        Ok(comps)
    }

    /// E-step: responsibilities (row per point) and total log-likelihood.
    fn expectation(comps: &[Component], data: &[[f64; 3]]) -> (Vec<Vec<f64>>, f64) {
        let mut total = 0.0;
        let resp = data
            .iter()
            .map(|x| {
                let logs: Vec<f64> = comps.iter().map(|c| c.log_density(x)).collect();
                let max = logs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let sum: f64 = logs.iter().map(|l| (l - max).exp()).sum();
                let lse = max + sum.ln();
                total += lse;
                logs.iter().map(|l| (l - lse).exp()).collect()
            })
            .collect();
        (resp, total)
    }

    fn maximization(&self, comps: &mut [Component], data: &[[f64; 3]], resp: &[Vec<f64>]) {
        let n = data.len() as f64;
        for (c, comp) in comps.iter_mut().enumerate() {
            let nk: f64 = resp.iter().map(|r| r[c]).sum();
            if nk < 1e-12 {
                comp.weight = 0.0;
                continue;
            }
            let mut mean = [0.0; 3];
            for (x, r) in data.iter().zip(resp) {
                for d in 0..3 {
                    mean[d] += r[c] * x[d];
                }
            }
            for m in &mut mean {
                *m /= nk;
            }
            let mut var = [0.0; 3];
            for (x, r) in data.iter().zip(resp) {
                for d in 0..3 {
                    let diff = x[d] - mean[d];
                    var[d] += r[c] * diff * diff;
                }
            }
            for v in &mut var {
                *v = (*v / nk).max(self.min_variance);
            }
            comp.weight = nk / n;
            comp.mean = mean;
            comp.variance = var;
        }
    }
}

impl MixtureModelFitter for GaussianMixtureFitter {
    fn fit(
        &self,
        positions: &[Point3],
        k: usize,
        rng: &mut dyn UniformRandom,
    ) -> Result<MixtureFit> {
        if self.min_variance <= 0.0 {
            return Err(Error::InvalidParameter {
                name: "min_variance",
                message: "must be positive",
            });
        }
        let data: Vec<[f64; 3]> = positions.iter().map(|p| p.to_array()).collect();
        let mut comps = self.initial_components(&data, positions, k, rng)?;

        let (mut resp, mut ll) = Self::expectation(&comps, &data);
        for _ in 0..self.max_iterations {
            self.maximization(&mut comps, &data, &resp);
            let (next_resp, next_ll) = Self::expectation(&comps, &data);
            let change = next_ll - ll;
            resp = next_resp;
            ll = next_ll;
            if change.abs() <= self.tolerance * ll.abs().max(1.0) {
                break;
            }
        }

        if !ll.is_finite() {
            return Err(Error::MixtureFit {
                k,
                message: format!("non-finite log-likelihood {ll}"),
            });
        }

        let mut assignment = Vec::with_capacity(data.len());
        let mut probabilities = Vec::with_capacity(data.len());
        for r in &resp {
            let mut best = 0;
            for c in 1..r.len() {
                if r[c] > r[best] {
                    best = c;
                }
            }
            assignment.push(best);
            probabilities.push(r[best]);
        }

        Ok(MixtureFit {
            assignment,
            probabilities,
            log_likelihood: ll,
        })
    }
}
