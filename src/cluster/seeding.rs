//! K-means++ seeding and nearest-center assignment.

use crate::error::{Error, Result};
use crate::geometry::Point3;
use crate::random::UniformRandom;

/// Choose `k` seed indices from `points` with K-means++ weighting.
///
/// The first seed is uniform. Each further seed is drawn with probability
/// proportional to the squared distance to its nearest already-chosen seed,
/// so far-away points are preferred. Chosen points are never drawn twice; if
/// every remaining point coincides with a seed, the draw falls back to uniform
/// over the remaining points.
pub fn kmeans_plus_plus<R>(points: &[Point3], k: usize, rng: &mut R) -> Result<Vec<usize>>
where
    R: UniformRandom + ?Sized,
{
    let n = points.len();
    if n == 0 {
        return Err(Error::EmptyInput);
    }
    if k == 0 {
        return Err(Error::InvalidParameter {
            name: "k",
            message: "must be at least 1",
        });
    }
    if k > n {
        return Err(Error::InvalidClusterCount {
            requested: k,
            n_items: n,
        });
    }

    let mut chosen = vec![false; n];
    let mut seeds = Vec::with_capacity(k);
    let first = rng.next_index(n);
    chosen[first] = true;
    seeds.push(first);

    // Squared distance to the nearest seed so far.
    let mut nearest: Vec<f64> = points
        .iter()
        .map(|p| p.distance_squared(&points[first]))
        .collect();

    while seeds.len() < k {
        let mut cumulative = Vec::with_capacity(n);
        let mut total = 0.0;
        for i in 0..n {
            if !chosen[i] {
                total += nearest[i];
            }
            cumulative.push(total);
        }

        let next = if total > 0.0 {
            let target = rng.next_f64() * total;
            (0..n)
                .find(|&i| !chosen[i] && cumulative[i] > target)
                .or_else(|| (0..n).rev().find(|&i| !chosen[i] && nearest[i] > 0.0))
        } else {
            let remaining: Vec<usize> = (0..n).filter(|&i| !chosen[i]).collect();
            remaining.get(rng.next_index(remaining.len())).copied()
        };
        let Some(next) = next else {
            break;
        };

        chosen[next] = true;
        seeds.push(next);
        for (d, p) in nearest.iter_mut().zip(points) {
            *d = d.min(p.distance_squared(&points[next]));
        }
    }

    Ok(seeds)
}

/// Index into `centers` of the center nearest to each point. First wins ties.
pub fn assign_nearest(points: &[Point3], centers: &[Point3]) -> Vec<usize> {
    points
        .iter()
        .map(|p| {
            let mut best = 0;
            let mut best_d = f64::INFINITY;
            for (c, center) in centers.iter().enumerate() {
                let d = p.distance_squared(center);
                if d < best_d {
                    best_d = d;
                    best = c;
                }
            }
            best
        })
        .collect()
}
