use proptest::prelude::*;
use rand::{rngs::StdRng, SeedableRng};
use regionclust::cluster::{assign_nearest, inter_cluster_distance_ratio, kmeans_plus_plus};
use regionclust::mask::LabelMask;
use regionclust::optimize::{DifferentialEvolution, NelderMead};
use regionclust::Point3;

fn point() -> impl Strategy<Value = Point3> {
    (-50.0f64..50.0, -50.0f64..50.0, -5.0f64..5.0).prop_map(|(x, y, z)| Point3::new(x, y, z))
}

fn clusters() -> impl Strategy<Value = Vec<Vec<Point3>>> {
    prop::collection::vec(prop::collection::vec(point(), 1..6), 1..5)
}

proptest! {
    #[test]
    fn prop_ratio_is_nonnegative_and_order_independent(mut cs in clusters()) {
        let forward = inter_cluster_distance_ratio(&cs).unwrap();
        prop_assert!(forward >= 0.0);
        prop_assert!(forward.is_finite());

        cs.reverse();
        for c in &mut cs {
            c.reverse();
        }
        let backward = inter_cluster_distance_ratio(&cs).unwrap();
        prop_assert!((forward - backward).abs() <= 1e-9 * forward.max(1.0));
    }

    #[test]
    fn prop_relabel_is_idempotent(labels in prop::collection::vec(0u32..50, 1..64)) {
        let n = labels.len();
        let mask = LabelMask::from_vec(n, 1, 1, labels).unwrap();
        let once = mask.relabel_consecutive();
        prop_assert_eq!(once.relabel_consecutive(), once.clone());

        let regions = mask.histogram().region_count();
        let max = once.as_slice().iter().copied().max().unwrap_or(0);
        prop_assert_eq!(max as usize, regions);
    }

    #[test]
    fn prop_kmeans_plus_plus_seeds_are_distinct(
        points in prop::collection::vec(point(), 1..30),
        k in 1usize..8,
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        if k <= points.len() {
            let mut seeds = kmeans_plus_plus(&points, k, &mut rng).unwrap();
            prop_assert_eq!(seeds.len(), k);
            seeds.sort_unstable();
            seeds.dedup();
            prop_assert_eq!(seeds.len(), k);
        } else {
            prop_assert!(kmeans_plus_plus(&points, k, &mut rng).is_err());
        }
    }

    #[test]
    fn prop_nelder_mead_finds_shifted_quadratic(
        c in prop::collection::vec(-5.0f64..5.0, 1..4),
        start_offset in -1.0f64..1.0,
    ) {
        let weights: Vec<f64> = (0..c.len()).map(|i| 1.0 + i as f64).collect();
        let f = |x: &[f64]| {
            x.iter()
                .zip(&c)
                .zip(&weights)
                .map(|((xi, ci), w)| w * (xi - ci).powi(2))
                .sum::<f64>()
                + 1.0
        };
        let start: Vec<f64> = c.iter().map(|ci| ci + start_offset + 0.5).collect();
        let m = NelderMead::new()
            .with_tolerance(1e-12)
            .minimize(&f, &start)
            .unwrap();
        for (xi, ci) in m.x.iter().zip(&c) {
            prop_assert!((xi - ci).abs() < 1e-3, "x={:?} c={:?}", m.x, c);
        }
    }
}

#[test]
fn kmeans_plus_plus_recovers_separated_groups() {
    let centers = [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(200.0, 0.0, 0.0),
        Point3::new(0.0, 200.0, 0.0),
        Point3::new(200.0, 200.0, 0.0),
    ];
    let mut points = Vec::new();
    let mut truth = Vec::new();
    for (g, c) in centers.iter().enumerate() {
        for j in 0..6 {
            let t = j as f64;
            points.push(*c + Point3::new(t.cos() * 2.0, t.sin() * 2.0, 0.0));
            truth.push(g);
        }
    }

    let trials = 100;
    let mut exact = 0;
    for seed in 0..trials {
        let mut rng = StdRng::seed_from_u64(seed);
        let seeds = kmeans_plus_plus(&points, 4, &mut rng).unwrap();
        let chosen: Vec<Point3> = seeds.iter().map(|&s| points[s]).collect();
        let labels = assign_nearest(&points, &chosen);
        let same_partition = (0..points.len()).all(|i| {
            (0..points.len()).all(|j| (labels[i] == labels[j]) == (truth[i] == truth[j]))
        });
        if same_partition {
            exact += 1;
        }
    }
    assert!(exact as f64 >= 0.9 * trials as f64, "exact {exact}/{trials}");
}

#[test]
fn differential_evolution_solves_sphere_up_to_five_dimensions() {
    let sphere = |x: &[f64]| x.iter().map(|v| v * v).sum::<f64>();
    for n in 1..=5 {
        let lower = vec![-10.0; n];
        let upper = vec![10.0; n];
        let mut rng = StdRng::seed_from_u64(n as u64);
        let m = DifferentialEvolution::new()
            .minimize(&sphere, &lower, &upper, &mut rng)
            .unwrap();
        assert!(m.value < 1e-3, "n={n} value={}", m.value);
    }
}
