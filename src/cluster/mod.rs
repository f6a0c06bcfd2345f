//! Grouping detected regions into clusters.
//!
//! ## Data model
//!
//! Each nonzero label of a [`LabelMask`](crate::mask::LabelMask) becomes a
//! [`ClusterObject`] positioned at its pixel centroid. A [`Partition`] owns the
//! objects and assigns each one to exactly one [`Cluster`].
//!
//! ## Algorithms
//!
//! ### Basic clustering
//!
//! Smear the mask with a wide Gaussian so neighbouring regions fuse, label the
//! fused blobs, and assign each region to the nearest blob centroid. No model,
//! no randomness.
//!
//! ### K-means++ seeding
//!
//! Choose `k` centers with D² weighting and assign every region to the nearest.
//!
//! ### Adaptive subdivision
//!
//! [`ObjectClustering`] starts from one of the above and repeatedly tries to
//! split each cluster with a [`MixtureModelFitter`]. A split is kept only when
//! the [inter-cluster-distance ratio](inter_cluster_distance_ratio) says the
//! parts are well separated, so the number of clusters is chosen from the data.
//!
//! ## Usage
//!
//! ```rust
//! use regionclust::cluster::{ClusteringParams, ObjectClustering};
//! use regionclust::mask::LabelMask;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut mask = LabelMask::new_2d(100, 100);
//! mask.fill_box(10..13, 10..13, 0..1, 1);
//! mask.fill_box(16..19, 10..13, 0..1, 2);
//! mask.fill_box(80..83, 85..88, 0..1, 3);
//! mask.fill_box(86..89, 85..88, 0..1, 4);
//!
//! let engine = ObjectClustering::new(ClusteringParams::default());
//! let mut rng = StdRng::seed_from_u64(1);
//! let outcome = engine.complex_clustering(&mask, &mut rng).unwrap();
//! assert_eq!(outcome.partition.num_clusters(), 2);
//! assert_eq!(outcome.mask.get(11, 11, 0), outcome.mask.get(17, 11, 0));
//! ```

mod engine;
mod gmm;
mod metric;
mod object;
mod params;
mod seeding;
mod traits;

pub use engine::{ClusteringOutcome, ObjectClustering};
pub use gmm::GaussianMixtureFitter;
pub use metric::inter_cluster_distance_ratio;
pub use object::{Cluster, ClusterId, ClusterObject, ObjectId, Partition};
pub use params::{ClusteringParams, Initialization};
pub use seeding::{assign_nearest, kmeans_plus_plus};
pub use traits::{MixtureFit, MixtureModelFitter};
