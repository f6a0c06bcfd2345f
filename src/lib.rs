//! Region clustering and derivative-free minimization.
//!
//! `regionclust` groups the labeled regions of a 2D or 3D mask into clusters
//! whose number is chosen from the data, and ships the two minimizers used by
//! downstream fitting code.
//!
//! - [`cluster`]: objects, partitions, K-means++ seeding, basic and adaptive clustering
//! - [`mask`]: integer label masks (histogram, connected components, relabeling, smear)
//! - [`optimize`]: Nelder–Mead simplex and differential evolution
//! - [`random`]: the injectable uniform random source

#![forbid(unsafe_code)]

pub mod cluster;
pub mod error;
pub mod geometry;
pub mod mask;
pub mod optimize;
pub mod random;

mod util;

pub use cluster::{
    ClusterId, ClusterObject, ClusteringOutcome, ClusteringParams, ObjectClustering, ObjectId,
    Partition,
};
pub use error::{Error, Result};
pub use geometry::{Point3, Positioned};
pub use mask::LabelMask;
pub use optimize::{DifferentialEvolution, Minimum, NelderMead, ObjectiveFunction};
pub use random::UniformRandom;
