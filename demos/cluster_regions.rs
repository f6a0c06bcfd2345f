//! Cluster the regions of a small synthetic mask, then fit a line with both minimizers.
//!
//! Run with `RUST_LOG=debug cargo run --example cluster_regions` to see the
//! subdivision attempts.

use rand::{rngs::StdRng, SeedableRng};
use regionclust::cluster::{ClusteringParams, Initialization, ObjectClustering};
use regionclust::mask::LabelMask;
use regionclust::optimize::{DifferentialEvolution, NelderMead};

fn main() {
    env_logger::init();

    // Three clumps of regions in a 120x120 mask.
    let mut mask = LabelMask::new_2d(120, 120);
    let clumps = [(20usize, 20usize), (95, 30), (60, 95)];
    let mut label = 1;
    for (cx, cy) in clumps {
        for (dx, dy) in [(0, 0), (7, 0), (0, 7), (7, 7)] {
            let (x, y) = (cx + dx, cy + dy);
            mask.fill_box(x..x + 3, y..y + 3, 0..1, label);
            label += 1;
        }
    }

    for initialization in [Initialization::Basic, Initialization::KmeansPlusPlus { k: 1 }] {
        let params = ClusteringParams {
            initialization,
            ..Default::default()
        };
        let engine = ObjectClustering::new(params);
        let mut rng = StdRng::seed_from_u64(42);
        let outcome = engine.complex_clustering(&mask, &mut rng).unwrap();

        println!("=== {initialization:?} ===");
        println!(
            "  {} clusters after {} attempts (ratio {:.3})",
            outcome.partition.num_clusters(),
            outcome.attempts,
            outcome.ratio
        );
        for obj in outcome.partition.objects() {
            println!(
                "  {} at ({:5.1}, {:5.1}) => {}",
                obj.id,
                obj.centroid.x,
                obj.centroid.y,
                obj.most_probable_cluster
                    .map_or_else(|| "-".to_string(), |c| c.to_string())
            );
        }
    }

    // Least-squares line through noisy points.
    let xs: Vec<f64> = (0..20).map(|i| i as f64).collect();
    let ys: Vec<f64> = xs.iter().map(|x| 2.5 * x - 4.0 + (x * 1.3).sin() * 0.2).collect();
    let sse = |p: &[f64]| {
        xs.iter()
            .zip(&ys)
            .map(|(x, y)| (p[0] * x + p[1] - y).powi(2))
            .sum::<f64>()
    };

    let local = NelderMead::new().minimize(&sse, &[1.0, 0.0]).unwrap();
    println!(
        "\nNelder-Mead: slope {:.3}, intercept {:.3} ({} evaluations)",
        local.x[0], local.x[1], local.evaluations
    );

    let mut rng = StdRng::seed_from_u64(1);
    let global = DifferentialEvolution::new()
        .minimize(&sse, &[-10.0, -10.0], &[10.0, 10.0], &mut rng)
        .unwrap();
    println!(
        "Differential evolution: slope {:.3}, intercept {:.3} ({} evaluations)",
        global.x[0], global.x[1], global.evaluations
    );
}
