mod common;

use common::synthetic_mask::{
    paint_plus_group, single_group, two_groups_sparse_labels, two_separated_groups,
};
use rand::{rngs::StdRng, SeedableRng};
use regionclust::cluster::{ClusteringParams, Initialization, ObjectClustering};
use regionclust::mask::LabelMask;
use regionclust::{ObjectId, Partition};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn assert_groups_match(partition: &Partition, a: &[u32], b: &[u32]) {
    let ca = partition.cluster_of(ObjectId(a[0])).expect("object in partition");
    let cb = partition.cluster_of(ObjectId(b[0])).expect("object in partition");
    assert_ne!(ca, cb, "groups merged");
    for &l in a {
        assert_eq!(partition.cluster_of(ObjectId(l)), Some(ca), "label {l}");
    }
    for &l in b {
        assert_eq!(partition.cluster_of(ObjectId(l)), Some(cb), "label {l}");
    }
}

fn distinct_labels(mask: &LabelMask) -> Vec<u32> {
    let mut labels: Vec<u32> = mask.as_slice().iter().copied().filter(|&l| l != 0).collect();
    labels.sort_unstable();
    labels.dedup();
    labels
}

#[test]
fn two_groups_from_basic_initialization() {
    init_logger();
    let (mask, a, b) = two_separated_groups();
    let engine = ObjectClustering::new(ClusteringParams::default());
    let mut rng = StdRng::seed_from_u64(2024);
    let outcome = engine.complex_clustering(&mask, &mut rng).unwrap();

    assert_eq!(outcome.partition.num_clusters(), 2);
    for cluster in outcome.partition.clusters() {
        assert_eq!(cluster.len(), 5);
    }
    assert_groups_match(&outcome.partition, &a, &b);
    assert_eq!(distinct_labels(&outcome.mask), vec![1, 2]);
}

#[test]
fn two_groups_from_a_single_seed_cluster() {
    init_logger();
    let (mask, a, b) = two_separated_groups();
    let params = ClusteringParams {
        initialization: Initialization::KmeansPlusPlus { k: 1 },
        ..Default::default()
    };
    let engine = ObjectClustering::new(params);
    for seed in [1, 17, 99] {
        let mut rng = StdRng::seed_from_u64(seed);
        let outcome = engine.complex_clustering(&mask, &mut rng).unwrap();
        assert_eq!(outcome.partition.num_clusters(), 2, "seed {seed}");
        assert_groups_match(&outcome.partition, &a, &b);
        assert!(outcome.ratio < engine.params().ratio_cutoff);
    }
}

#[test]
fn single_tight_group_is_not_split() {
    init_logger();
    let (mask, labels) = single_group();
    for initialization in [Initialization::Basic, Initialization::KmeansPlusPlus { k: 1 }] {
        let params = ClusteringParams {
            initialization,
            ..Default::default()
        };
        let engine = ObjectClustering::new(params);
        let mut rng = StdRng::seed_from_u64(8);
        let outcome = engine.complex_clustering(&mask, &mut rng).unwrap();
        assert_eq!(outcome.partition.num_clusters(), 1);
        assert_eq!(distinct_labels(&outcome.mask), vec![1]);
        for &l in &labels {
            let obj = outcome.partition.object(ObjectId(l)).unwrap();
            assert_eq!(obj.most_probable_cluster.map(|c| c.0), Some(1));
        }
    }
}

#[test]
fn sparse_labels_keep_their_identity() {
    init_logger();
    let (mask, a, b) = two_groups_sparse_labels();
    let engine = ObjectClustering::new(ClusteringParams::default());
    let mut rng = StdRng::seed_from_u64(3);
    let outcome = engine.complex_clustering(&mask, &mut rng).unwrap();
    assert_eq!(outcome.partition.num_objects(), 10);
    assert_groups_match(&outcome.partition, &a, &b);
}

#[test]
fn three_dimensional_mask() {
    init_logger();
    let mut mask = LabelMask::new(100, 100, 3);
    let mut slice = LabelMask::new_2d(100, 100);
    let a = paint_plus_group(&mut slice, 20, 30, 6, 1);
    let b = paint_plus_group(&mut slice, 80, 70, 6, 6);
    for (pos, label) in slice.pixels() {
        if label != 0 {
            mask.set(pos.x as usize, pos.y as usize, 1, label);
        }
    }

    let engine = ObjectClustering::new(ClusteringParams::default());
    let mut rng = StdRng::seed_from_u64(4);
    let outcome = engine.complex_clustering(&mask, &mut rng).unwrap();
    assert_eq!(outcome.partition.num_clusters(), 2);
    assert_groups_match(&outcome.partition, &a, &b);
    assert_eq!(outcome.mask.shape(), (100, 100, 3));
}

#[test]
fn final_mask_relabeling_is_idempotent() {
    let (mask, _, _) = two_separated_groups();
    let engine = ObjectClustering::new(ClusteringParams::default());
    let mut rng = StdRng::seed_from_u64(5);
    let outcome = engine.complex_clustering(&mask, &mut rng).unwrap();
    assert_eq!(outcome.mask.relabel_consecutive(), outcome.mask);
}

#[test]
fn params_from_json() {
    let params = ClusteringParams::from_json_str(
        r#"{ "initialization": { "kind": "kmeans_plus_plus", "k": 1 }, "seed": 12 }"#,
    )
    .unwrap();
    let engine = ObjectClustering::new(params);
    let (mask, a, b) = two_separated_groups();
    let outcome = engine.complex_clustering_seeded(&mask).unwrap();
    assert_groups_match(&outcome.partition, &a, &b);
}
