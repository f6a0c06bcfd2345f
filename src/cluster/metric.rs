//! Inter-cluster-distance ratio.
//!
//! Mixture likelihood alone always rewards more components, so cluster-count
//! selection needs an independent geometric signal. For each pair of clusters
//! the ratio is
//!
//! ```text
//! r(A, B) = 2 * (mean_intra(A) + mean_intra(B)) / max_inter(A, B)
//! ```
//!
//! where `mean_intra` is the mean pairwise member distance and `max_inter` the
//! largest distance between a member of `A` and a member of `B`. The score is
//! the mean of `r` over all pairs; lower means tight, well-separated clusters.
//!
//! A cluster with fewer than two members has no intra distance, so it is given
//! `max_inter / 4` instead; otherwise singletons would look perfectly tight.
//! A lone cluster scores `4 * mean_intra / max_intra`.

use crate::error::{Error, Result};
use crate::geometry::Point3;

const EPS: f64 = 1e-12;

/// Mean and maximum pairwise distance within one cluster (`None` below two members).
fn intra_distances(points: &[Point3]) -> Option<(f64, f64)> {
    if points.len() < 2 {
        return None;
    }
    let mut sum = 0.0;
    let mut max = 0.0f64;
    let mut pairs = 0usize;
    for i in 0..points.len() {
        for j in i + 1..points.len() {
            let d = points[i].distance(&points[j]);
            sum += d;
            max = max.max(d);
            pairs += 1;
        }
    }
    Some((sum / pairs as f64, max))
}

fn max_inter_distance(a: &[Point3], b: &[Point3]) -> f64 {
    a.iter()
        .flat_map(|p| b.iter().map(move |q| p.distance(q)))
        .fold(0.0, f64::max)
}

/// Score a set of clusters, each given as its members' positions.
pub fn inter_cluster_distance_ratio(clusters: &[Vec<Point3>]) -> Result<f64> {
    if clusters.is_empty() {
        return Err(Error::EmptyInput);
    }
    if let Some(i) = clusters.iter().position(Vec::is_empty) {
        return Err(Error::EmptyCluster { cluster: i });
    }

    let intra: Vec<Option<(f64, f64)>> = clusters.iter().map(|c| intra_distances(c)).collect();

    if clusters.len() == 1 {
        return Ok(match intra[0] {
            Some((mean, max)) => 4.0 * mean / (max + EPS),
            None => 0.0,
        });
    }

    let mut sum = 0.0;
    let mut pairs = 0usize;
    for a in 0..clusters.len() {
        for b in a + 1..clusters.len() {
            let max_inter = max_inter_distance(&clusters[a], &clusters[b]);
            let fallback = max_inter / 4.0;
            let mean_a = intra[a].map_or(fallback, |(m, _)| m);
            let mean_b = intra[b].map_or(fallback, |(m, _)| m);
            sum += 2.0 * (mean_a + mean_b) / (max_inter + EPS);
            pairs += 1;
        }
    }
    Ok(sum / pairs as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tight(cx: f64, cy: f64) -> Vec<Point3> {
        vec![
            Point3::new(cx, cy, 0.0),
            Point3::new(cx + 1.0, cy, 0.0),
            Point3::new(cx, cy + 1.0, 0.0),
            Point3::new(cx + 1.0, cy + 1.0, 0.0),
        ]
    }

    #[test]
    fn test_pair_ratio_matches_formula() {
        let a = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0)];
        let b = vec![Point3::new(10.0, 0.0, 0.0), Point3::new(12.0, 0.0, 0.0)];
        let r = inter_cluster_distance_ratio(&[a, b]).unwrap();
        assert!((r - 2.0 * 4.0 / 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_singleton_uses_quarter_of_max_inter() {
        let a = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0)];
        let b = vec![Point3::new(8.0, 0.0, 0.0)];
        let r = inter_cluster_distance_ratio(&[a, b]).unwrap();
        assert!((r - 2.0 * (2.0 + 2.0) / 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_splitting_separated_halves_lowers_ratio() {
        let left = tight(0.0, 0.0);
        let right = tight(50.0, 0.0);
        let merged: Vec<Point3> = left.iter().chain(&right).copied().collect();
        let whole = inter_cluster_distance_ratio(&[merged]).unwrap();
        let split = inter_cluster_distance_ratio(&[left, right]).unwrap();
        assert!(split < whole, "split={split} whole={whole}");
    }

    #[test]
    fn test_over_splitting_a_tight_group_scores_high() {
        let g = tight(0.0, 0.0);
        let r = inter_cluster_distance_ratio(&[g[..2].to_vec(), g[2..].to_vec()]).unwrap();
        assert!(r > 0.89, "r={r}");
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(matches!(
            inter_cluster_distance_ratio(&[]),
            Err(Error::EmptyInput)
        ));
        assert!(matches!(
            inter_cluster_distance_ratio(&[tight(0.0, 0.0), vec![]]),
            Err(Error::EmptyCluster { cluster: 1 })
        ));
        assert_eq!(
            inter_cluster_distance_ratio(&[vec![Point3::ORIGIN]]).unwrap(),
            0.0
        );
        let coincident = vec![vec![Point3::ORIGIN], vec![Point3::ORIGIN]];
        assert!(inter_cluster_distance_ratio(&coincident).unwrap().is_finite());
    }
}
