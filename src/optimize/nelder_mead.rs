//! Nelder–Mead simplex minimizer.

#![allow(clippy::needless_range_loop)]

use super::{relative_spread, Minimum, ObjectiveFunction};
use crate::error::{Error, Result};
use log::{debug, warn};

/// Perturbation used for a zero-valued component when no scale is given.
const ZERO_COMPONENT_STEP: f64 = 0.1;
/// Relative perturbation used for a nonzero component when no scale is given.
const RELATIVE_STEP: f64 = 0.1;

/// Nelder–Mead simplex minimizer.
///
/// Defaults: reflection `1.0`, expansion `2.0`, contraction `0.5`,
/// shrink `0.5`, relative tolerance `1e-6`, iteration cap `100_000`.
#[derive(Debug, Clone)]
pub struct NelderMead {
    reflection: f64,
    expansion: f64,
    contraction: f64,
    shrink: f64,
    tolerance: f64,
    max_iterations: Option<usize>,
}

impl Default for NelderMead {
    fn default() -> Self {
        Self {
            reflection: 1.0,
            expansion: 2.0,
            contraction: 0.5,
            shrink: 0.5,
            tolerance: 1e-6,
            max_iterations: Some(100_000),
        }
    }
}

impl NelderMead {
    /// Create a minimizer with the default factors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the reflection factor `a`.
    pub fn with_reflection(mut self, a: f64) -> Self {
        self.reflection = a;
        self
    }

    /// Set the expansion factor `g`.
    pub fn with_expansion(mut self, g: f64) -> Self {
        self.expansion = g;
        self
    }

    /// Set the contraction factor `r`.
    pub fn with_contraction(mut self, r: f64) -> Self {
        self.contraction = r;
        self
    }

    /// Set the shrink (reduction) factor `s`.
    pub fn with_shrink(mut self, s: f64) -> Self {
        self.shrink = s;
        self
    }

    /// Set the relative tolerance on the best/worst cost spread.
    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    /// Cap the number of simplex iterations. `None` searches until tolerance.
    pub fn with_max_iterations(mut self, max_iterations: Option<usize>) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Build the `p + 1` starting vertices around `point`.
    ///
    /// Vertex `0` is `point`; vertex `i + 1` is `point` moved by `scales[i]`
    /// along dimension `i`. Without scales each component moves by 10% of its
    /// magnitude, or by `0.1` when it is zero.
    pub fn initial_simplex(point: &[f64], scales: Option<&[f64]>) -> Result<Vec<Vec<f64>>> {
        let p = point.len();
        if p == 0 {
            return Err(Error::EmptyInput);
        }
        if let Some(s) = scales {
            if s.len() != p {
                return Err(Error::DimensionMismatch {
                    expected: p,
                    found: s.len(),
                });
            }
        }

        let mut simplex = Vec::with_capacity(p + 1);
        simplex.push(point.to_vec());
        for i in 0..p {
            let step = match scales {
                Some(s) => s[i],
                None if point[i] == 0.0 => ZERO_COMPONENT_STEP,
                None => RELATIVE_STEP * point[i].abs(),
            };
            let mut vertex = point.to_vec();
            vertex[i] += step;
            simplex.push(vertex);
        }
        Ok(simplex)
    }

    /// Minimize `f` starting from a simplex built around `start`.
    pub fn minimize<F>(&self, f: &F, start: &[f64]) -> Result<Minimum>
    where
        F: ObjectiveFunction + ?Sized,
    {
        let simplex = Self::initial_simplex(start, None)?;
        self.minimize_from_simplex(f, simplex)
    }

    /// Minimize `f` starting from a simplex with explicit per-dimension scales.
    pub fn minimize_with_scales<F>(&self, f: &F, start: &[f64], scales: &[f64]) -> Result<Minimum>
    where
        F: ObjectiveFunction + ?Sized,
    {
        let simplex = Self::initial_simplex(start, Some(scales))?;
        self.minimize_from_simplex(f, simplex)
    }

    /// Minimize `f` from a caller-supplied simplex of `p + 1` vertices.
    pub fn minimize_from_simplex<F>(&self, f: &F, mut simplex: Vec<Vec<f64>>) -> Result<Minimum>
    where
        F: ObjectiveFunction + ?Sized,
    {
        self.validate()?;
        let p = simplex.first().map(Vec::len).unwrap_or(0);
        if p == 0 {
            return Err(Error::EmptyInput);
        }
        if simplex.len() != p + 1 {
            return Err(Error::DimensionMismatch {
                expected: p + 1,
                found: simplex.len(),
            });
        }
        for vertex in &simplex {
            if vertex.len() != p {
                return Err(Error::DimensionMismatch {
                    expected: p,
                    found: vertex.len(),
                });
            }
        }

        let mut values: Vec<f64> = simplex.iter().map(|v| f.evaluate(v)).collect();
        let mut evaluations = p + 1;
        let mut iterations = 0usize;

        loop {
            let (best, worst, second) = rank(&values);

            if relative_spread(values[worst], values[best]) < self.tolerance {
                debug!(
                    "nelder-mead converged: iterations={iterations} evaluations={evaluations} value={}",
                    values[best]
                );
                return Ok(Minimum {
                    x: simplex.swap_remove(best),
                    value: values[best],
                    iterations,
                    evaluations,
                });
            }

            if let Some(cap) = self.max_iterations {
                if iterations >= cap {
                    warn!(
                        "nelder-mead stalled: {iterations} iterations, spread={}",
                        relative_spread(values[worst], values[best])
                    );
                    return Err(Error::MaxIterationsExceeded { iterations });
                }
            }
            iterations += 1;

            // Centroid of every vertex except the worst.
            let mut centroid = vec![0.0; p];
            for (i, vertex) in simplex.iter().enumerate() {
                if i == worst {
                    continue;
                }
                for j in 0..p {
                    centroid[j] += vertex[j];
                }
            }
            for c in &mut centroid {
                *c /= p as f64;
            }

            let reflected = towards(&centroid, &simplex[worst], -self.reflection);
            let f_reflected = f.evaluate(&reflected);
            evaluations += 1;

            if f_reflected < values[best] {
                let expanded = towards(&centroid, &reflected, self.expansion);
                let f_expanded = f.evaluate(&expanded);
                evaluations += 1;
                if f_expanded < f_reflected {
                    simplex[worst] = expanded;
                    values[worst] = f_expanded;
                } else {
                    simplex[worst] = reflected;
                    values[worst] = f_reflected;
                }
            } else if f_reflected < values[second] {
                simplex[worst] = reflected;
                values[worst] = f_reflected;
            } else {
                let contracted = towards(&centroid, &simplex[worst], self.contraction);
                let f_contracted = f.evaluate(&contracted);
                evaluations += 1;
                if f_contracted < values[worst] {
                    simplex[worst] = contracted;
                    values[worst] = f_contracted;
                } else {
                    let anchor = simplex[best].clone();
                    for i in 0..=p {
                        if i == best {
                            continue;
                        }
                        simplex[i] = towards(&anchor, &simplex[i], self.shrink);
                        values[i] = f.evaluate(&simplex[i]);
                        evaluations += 1;
                    }
                }
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.reflection <= 0.0 {
            return Err(Error::InvalidParameter {
                name: "reflection",
                message: "must be positive",
            });
        }
        if self.expansion <= 1.0 {
            return Err(Error::InvalidParameter {
                name: "expansion",
                message: "must be greater than 1",
            });
        }
        if self.contraction <= 0.0 || self.contraction >= 1.0 {
            return Err(Error::InvalidParameter {
                name: "contraction",
                message: "must be in (0, 1)",
            });
        }
        if self.shrink <= 0.0 || self.shrink >= 1.0 {
            return Err(Error::InvalidParameter {
                name: "shrink",
                message: "must be in (0, 1)",
            });
        }
        if self.tolerance <= 0.0 {
            return Err(Error::InvalidParameter {
                name: "tolerance",
                message: "must be positive",
            });
        }
        Ok(())
    }
}

/// `origin + t * (target - origin)`.
fn towards(origin: &[f64], target: &[f64], t: f64) -> Vec<f64> {
    origin
        .iter()
        .zip(target)
        .map(|(o, x)| o + t * (x - o))
        .collect()
}

/// Indices of the best, worst and second-worst values. First-seen wins ties.
fn rank(values: &[f64]) -> (usize, usize, usize) {
    let mut best = 0;
    let mut worst = 0;
    for (i, &v) in values.iter().enumerate() {
        if v < values[best] {
            best = i;
        }
        if v > values[worst] {
            worst = i;
        }
    }
    if best == worst {
        // All values equal; any distinct vertex serves as worst.
        worst = if best == 0 { 1 } else { 0 };
    }
    let mut second = best;
    for (i, &v) in values.iter().enumerate() {
        if i == best || i == worst {
            continue;
        }
        if second == best || v > values[second] {
            second = i;
        }
    }
    (best, worst, second)
}
