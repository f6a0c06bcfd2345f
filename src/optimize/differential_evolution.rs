//! Differential evolution global minimizer.

#![allow(clippy::needless_range_loop)]

use super::{Minimum, ObjectiveFunction, TINY};
use crate::error::{Error, Result};
use crate::random::UniformRandom;
use log::{debug, warn};

/// Per-dimension probability of the random-kick mutation.
const MUTATION_PROBABILITY: f64 = 0.01;
/// Size of the random kick as a fraction of the bound width.
const MUTATION_SPAN: f64 = 0.2;

/// Differential evolution minimizer over box bounds.
///
/// Trial vectors use the `rand/1/exp` scheme: a running segment of dimensions,
/// starting at a random position, is replaced by `x3 + F * (x2 - x1)`. The
/// search stops once the population's cost spread has stayed below the
/// relative tolerance for `max_stable_iterations` consecutive generations.
#[derive(Debug, Clone)]
pub struct DifferentialEvolution {
    population_size: usize,
    scale_factor: f64,
    max_stable_iterations: usize,
    crossover_frequency: f64,
    tolerance: f64,
    max_generations: usize,
}

impl Default for DifferentialEvolution {
    fn default() -> Self {
        Self {
            population_size: 40,
            scale_factor: 0.5,
            max_stable_iterations: 20,
            crossover_frequency: 0.9,
            tolerance: 1e-8,
            max_generations: 100_000,
        }
    }
}

impl DifferentialEvolution {
    /// Create a minimizer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of candidates (at least 4).
    pub fn with_population_size(mut self, population_size: usize) -> Self {
        self.population_size = population_size;
        self
    }

    /// Set the difference-vector scale factor `F`.
    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    /// Set how many consecutive converged generations end the search.
    pub fn with_max_stable_iterations(mut self, n: usize) -> Self {
        self.max_stable_iterations = n;
        self
    }

    /// Set the crossover frequency in `[0, 1]`.
    pub fn with_crossover_frequency(mut self, cr: f64) -> Self {
        self.crossover_frequency = cr;
        self
    }

    /// Set the relative tolerance on the population's cost spread.
    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    /// Hard cap on generations; reaching it logs a warning and returns the best candidate.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Minimize `f` over `[lower, upper]` from a uniformly random population.
    pub fn minimize<F, R>(&self, f: &F, lower: &[f64], upper: &[f64], rng: &mut R) -> Result<Minimum>
    where
        F: ObjectiveFunction + ?Sized,
        R: UniformRandom + ?Sized,
    {
        self.validate(lower, upper)?;
        let population = random_population(self.population_size, lower, upper, rng);
        self.run(f, lower, upper, population, rng)
    }

    /// Like [`minimize`](Self::minimize), with `initial` as the first candidate.
    pub fn minimize_with_initial<F, R>(
        &self,
        f: &F,
        lower: &[f64],
        upper: &[f64],
        initial: &[f64],
        rng: &mut R,
    ) -> Result<Minimum>
    where
        F: ObjectiveFunction + ?Sized,
        R: UniformRandom + ?Sized,
    {
        self.validate(lower, upper)?;
        if initial.len() != lower.len() {
            return Err(Error::DimensionMismatch {
                expected: lower.len(),
                found: initial.len(),
            });
        }
        if !in_bounds(initial, lower, upper) {
            return Err(Error::InvalidParameter {
                name: "initial",
                message: "must lie within the bounds",
            });
        }
        let mut population = random_population(self.population_size, lower, upper, rng);
        population[0] = initial.to_vec();
        self.run(f, lower, upper, population, rng)
    }

    /// Minimize from a caller-supplied population (one row per candidate).
    ///
    /// The population size is taken from `population`, not from the builder.
    pub fn minimize_with_population<F, R>(
        &self,
        f: &F,
        lower: &[f64],
        upper: &[f64],
        population: Vec<Vec<f64>>,
        rng: &mut R,
    ) -> Result<Minimum>
    where
        F: ObjectiveFunction + ?Sized,
        R: UniformRandom + ?Sized,
    {
        Self {
            population_size: population.len(),
            ..self.clone()
        }
        .validate(lower, upper)?;
        for row in &population {
            if row.len() != lower.len() {
                return Err(Error::DimensionMismatch {
                    expected: lower.len(),
                    found: row.len(),
                });
            }
            if !in_bounds(row, lower, upper) {
                return Err(Error::InvalidParameter {
                    name: "population",
                    message: "every row must lie within the bounds",
                });
            }
        }
        self.run(f, lower, upper, population, rng)
    }

    fn validate(&self, lower: &[f64], upper: &[f64]) -> Result<()> {
        if lower.is_empty() {
            return Err(Error::EmptyInput);
        }
        if lower.len() != upper.len() {
            return Err(Error::DimensionMismatch {
                expected: lower.len(),
                found: upper.len(),
            });
        }
        if lower.iter().zip(upper).any(|(lo, hi)| lo >= hi) {
            return Err(Error::InvalidParameter {
                name: "bounds",
                message: "each lower bound must be below its upper bound",
            });
        }
        if self.population_size < 4 {
            return Err(Error::InvalidParameter {
                name: "population_size",
                message: "must be at least 4",
            });
        }
        if self.scale_factor <= 0.0 {
            return Err(Error::InvalidParameter {
                name: "scale_factor",
                message: "must be positive",
            });
        }
        if !(0.0..=1.0).contains(&self.crossover_frequency) {
            return Err(Error::InvalidParameter {
                name: "crossover_frequency",
                message: "must be in [0, 1]",
            });
        }
        if self.max_stable_iterations == 0 {
            return Err(Error::InvalidParameter {
                name: "max_stable_iterations",
                message: "must be at least 1",
            });
        }
        if self.tolerance < 0.0 {
            return Err(Error::InvalidParameter {
                name: "tolerance",
                message: "must be non-negative",
            });
        }
        Ok(())
    }

    fn run<F, R>(
        &self,
        f: &F,
        lower: &[f64],
        upper: &[f64],
        mut population: Vec<Vec<f64>>,
        rng: &mut R,
    ) -> Result<Minimum>
    where
        F: ObjectiveFunction + ?Sized,
        R: UniformRandom + ?Sized,
    {
        let n = lower.len();
        let size = population.len();
        let cost = |x: &[f64]| {
            if in_bounds(x, lower, upper) {
                f.evaluate(x)
            } else {
                f64::INFINITY
            }
        };

        let mut costs: Vec<f64> = population.iter().map(|x| cost(x)).collect();
        let mut evaluations = size;
        let mut stable = self.max_stable_iterations;
        let mut generation = 0usize;

        while stable > 0 {
            if generation >= self.max_generations {
                warn!("differential evolution hit the generation cap ({generation})");
                break;
            }
            generation += 1;

            for i in 0..size {
                let [i1, i2, i3] = pick_three(size, i, rng);

                let mut trial = population[i].clone();
                let mut j = rng.next_index(n);
                let mut filled = 0;
                loop {
                    trial[j] = population[i3][j]
                        + self.scale_factor * (population[i2][j] - population[i1][j]);
                    j = (j + 1) % n;
                    filled += 1;
                    if filled >= n || rng.next_f64() >= self.crossover_frequency {
                        break;
                    }
                }
                for d in 0..n {
                    if rng.next_f64() < MUTATION_PROBABILITY {
                        trial[d] += (2.0 * rng.next_f64() - 1.0)
                            * MUTATION_SPAN
                            * (upper[d] - lower[d]);
                    }
                }

                let trial_cost = cost(&trial);
                evaluations += 1;
                if trial_cost < costs[i] {
                    population[i] = trial;
                    costs[i] = trial_cost;
                }
            }

            let (min, max) = costs
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &c| {
                    (lo.min(c), hi.max(c))
                });
            if (max - min).abs() <= self.tolerance * (max.abs() + min.abs()) + TINY {
                stable -= 1;
            } else {
                stable = self.max_stable_iterations;
            }
        }

        // Final pass over the whole population.
        let mut best = 0;
        let mut best_cost = f64::INFINITY;
        for (i, x) in population.iter().enumerate() {
            let c = cost(x);
            evaluations += 1;
            if c < best_cost {
                best_cost = c;
                best = i;
            }
        }
        debug!(
            "differential evolution finished: generations={generation} evaluations={evaluations} value={best_cost}"
        );

        Ok(Minimum {
            x: population.swap_remove(best),
            value: best_cost,
            iterations: generation,
            evaluations,
        })
    }
}

fn random_population<R>(size: usize, lower: &[f64], upper: &[f64], rng: &mut R) -> Vec<Vec<f64>>
where
    R: UniformRandom + ?Sized,
{
    (0..size)
        .map(|_| {
            lower
                .iter()
                .zip(upper)
                .map(|(lo, hi)| lo + rng.next_f64() * (hi - lo))
                .collect()
        })
        .collect()
}

/// Three distinct indices in `[0, size)`, all different from `exclude`.
fn pick_three<R>(size: usize, exclude: usize, rng: &mut R) -> [usize; 3]
where
    R: UniformRandom + ?Sized,
{
    let mut picked = [exclude; 3];
    for k in 0..3 {
        loop {
            let c = rng.next_index(size);
            if c != exclude && !picked[..k].contains(&c) {
                picked[k] = c;
                break;
            }
        }
    }
    picked
}

fn in_bounds(x: &[f64], lower: &[f64], upper: &[f64]) -> bool {
    x.iter()
        .zip(lower.iter().zip(upper))
        .all(|(v, (lo, hi))| *v >= *lo && *v <= *hi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn sphere(x: &[f64]) -> f64 {
        x.iter().map(|xi| xi * xi).sum()
    }

    fn rastrigin(x: &[f64]) -> f64 {
        10.0 * x.len() as f64
            + x.iter()
                .map(|xi| xi * xi - 10.0 * (2.0 * std::f64::consts::PI * xi).cos())
                .sum::<f64>()
    }

    #[test]
    fn test_de_sphere() {
        let mut rng = StdRng::seed_from_u64(42);
        let result = DifferentialEvolution::new()
            .minimize(&sphere, &[-10.0; 3], &[10.0; 3], &mut rng)
            .unwrap();
        assert!(result.value < 1e-6);
        for xi in &result.x {
            assert!(xi.abs() < 1e-3);
        }
    }

    #[test]
    fn test_de_rastrigin_finds_global_basin() {
        let mut rng = StdRng::seed_from_u64(7);
        let result = DifferentialEvolution::new()
            .with_population_size(60)
            .minimize(&rastrigin, &[-5.12; 2], &[5.12; 2], &mut rng)
            .unwrap();
        assert!(result.value < 1.0, "value = {}", result.value);
    }

    #[test]
    fn test_de_respects_bounds() {
        // Unconstrained minimum at x = -5 lies outside the box.
        let f = |x: &[f64]| (x[0] + 5.0).powi(2);
        let mut rng = StdRng::seed_from_u64(3);
        let result = DifferentialEvolution::new()
            .minimize(&f, &[0.0], &[1.0], &mut rng)
            .unwrap();
        assert!(result.x[0] >= 0.0 && result.x[0] <= 1.0);
        assert!(result.x[0] < 1e-3);
    }

    #[test]
    fn test_de_with_initial_keeps_good_guess() {
        let mut rng = StdRng::seed_from_u64(11);
        let result = DifferentialEvolution::new()
            .with_max_stable_iterations(1)
            .with_max_generations(1)
            .minimize_with_initial(&sphere, &[-10.0; 2], &[10.0; 2], &[0.0, 0.0], &mut rng)
            .unwrap();
        assert_eq!(result.value, 0.0);
        assert_eq!(result.iterations, 1);
    }

    #[test]
    fn test_de_with_population() {
        let mut rng = StdRng::seed_from_u64(5);
        let population: Vec<Vec<f64>> = (0..8).map(|i| vec![i as f64 - 4.0]).collect();
        let result = DifferentialEvolution::new()
            .minimize_with_population(&sphere, &[-10.0], &[10.0], population, &mut rng)
            .unwrap();
        assert!(result.value < 1e-6);
    }

    #[test]
    fn test_de_invalid_inputs() {
        let mut rng = StdRng::seed_from_u64(0);
        let de = DifferentialEvolution::new();
        assert!(de.minimize(&sphere, &[], &[], &mut rng).is_err());
        assert!(de.minimize(&sphere, &[1.0], &[0.0], &mut rng).is_err());
        assert!(de.minimize(&sphere, &[0.0, 0.0], &[1.0], &mut rng).is_err());
        assert!(DifferentialEvolution::new()
            .with_population_size(3)
            .minimize(&sphere, &[0.0], &[1.0], &mut rng)
            .is_err());
        assert!(DifferentialEvolution::new()
            .with_crossover_frequency(1.5)
            .minimize(&sphere, &[0.0], &[1.0], &mut rng)
            .is_err());
        assert!(de
            .minimize_with_population(&sphere, &[0.0], &[1.0], vec![vec![0.5]; 3], &mut rng)
            .is_err());
    }

    #[test]
    fn test_de_rejects_out_of_bounds_start() {
        let mut rng = StdRng::seed_from_u64(0);
        let de = DifferentialEvolution::new();
        let outside = vec![vec![20.0]; 8];
        assert!(matches!(
            de.minimize_with_population(&sphere, &[-10.0], &[10.0], outside, &mut rng),
            Err(Error::InvalidParameter { name: "population", .. })
        ));
        let mut mixed: Vec<Vec<f64>> = (0..8).map(|i| vec![i as f64]).collect();
        mixed[3] = vec![-11.0];
        assert!(de
            .minimize_with_population(&sphere, &[-10.0], &[10.0], mixed, &mut rng)
            .is_err());
        assert!(matches!(
            de.minimize_with_initial(&sphere, &[-1.0; 2], &[1.0; 2], &[0.0, 2.0], &mut rng),
            Err(Error::InvalidParameter { name: "initial", .. })
        ));
    }

    #[test]
    fn test_pick_three_distinct() {
        let mut rng = StdRng::seed_from_u64(9);
        for i in 0..4 {
            let [a, b, c] = pick_three(4, i, &mut rng);
            assert!(a != i && b != i && c != i);
            assert!(a != b && b != c && a != c);
        }
    }
}
