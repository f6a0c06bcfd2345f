//! Adaptive object clustering.
//!
//! # The Algorithm
//!
//! Regions of a label mask are grouped into clusters whose count is chosen
//! automatically. The engine starts from a cheap labeling and then tries to
//! subdivide every cluster with a mixture model:
//!
//! 1. **Initial labeling**: either *basic* (smear the mask with a wide Gaussian,
//!    label the resulting blobs, assign every region to the nearest blob
//!    centroid) or K-means++ seeding with a fixed `k`.
//!
//! 2. **Split pass**: for each current cluster with `n` members, fit mixtures
//!    with `2..=min(k_max, n - 1)` components, `num_repeats` times each. A fit is
//!    a split candidate only when its inter-cluster-distance ratio is below
//!    `ratio_cutoff`; the lowest ratio wins (first seen on ties). Accepted splits
//!    move their members to fresh cluster ids.
//!
//! 3. **Acceptance**: the candidate labeling replaces the best one when its
//!    total log-likelihood is at least as good *and* its distance ratio over all
//!    clusters is strictly lower.
//!
//! 4. **Termination**: stop when the candidate would exceed `max_clusters`,
//!    when the best cluster count has stayed the same for `num_repeats`
//!    attempts, or when the attempt count exceeds `max_clusters`.
//!
//! The final partition is renumbered to `1..=m` and painted back onto the mask.
//!
//! ## Why two criteria
//!
//! Likelihood alone keeps improving as components are added. The distance
//! ratio is the independent geometric signal that stops over-splitting: two
//! halves of one tight group are close relative to their own spread, so their
//! ratio stays above the cutoff.

use super::gmm::GaussianMixtureFitter;
use super::metric::inter_cluster_distance_ratio;
use super::object::{ClusterId, ClusterObject, ObjectId, Partition};
use super::params::{ClusteringParams, Initialization};
use super::seeding::{assign_nearest, kmeans_plus_plus};
use super::traits::{MixtureFit, MixtureModelFitter};
use crate::error::{Error, Result};
use crate::geometry::Point3;
use crate::mask::{LabelMask, RegionMoments};
use crate::random::{seeded_rng, UniformRandom};
use log::debug;
use std::collections::BTreeMap;

/// Result of [`ObjectClustering::complex_clustering`].
#[derive(Clone, Debug)]
pub struct ClusteringOutcome {
    /// Input regions painted with their cluster id (`1..=m`, background `0`).
    pub mask: LabelMask,
    /// Final objects and their consecutive cluster assignment.
    pub partition: Partition,
    /// Total log-likelihood of the accepted labeling.
    pub log_likelihood: f64,
    /// Inter-cluster-distance ratio of the accepted labeling.
    pub ratio: f64,
    /// Split passes performed.
    pub attempts: usize,
}

/// One split pass over every cluster of a partition.
struct SplitPass {
    partition: Partition,
    log_likelihood: f64,
}

/// Clustering engine, generic over the mixture model used to propose splits.
#[derive(Debug, Clone)]
pub struct ObjectClustering<M = GaussianMixtureFitter> {
    params: ClusteringParams,
    fitter: M,
}

impl Default for ObjectClustering {
    fn default() -> Self {
        Self::new(ClusteringParams::default())
    }
}

impl ObjectClustering {
    /// Engine with the built-in Gaussian mixture fitter.
    pub fn new(params: ClusteringParams) -> Self {
        Self::with_fitter(params, GaussianMixtureFitter::default())
    }
}

impl<M: MixtureModelFitter> ObjectClustering<M> {
    pub fn with_fitter(params: ClusteringParams, fitter: M) -> Self {
        Self { params, fitter }
    }

    pub fn params(&self) -> &ClusteringParams {
        &self.params
    }

    /// Geometric clustering: regions that fuse under a long-range smear share a cluster.
    pub fn basic_clustering(&self, mask: &LabelMask) -> Result<Partition> {
        self.params.validate()?;
        let objects = objects_of(mask)?;
        self.basic_partition(mask, objects)
    }

    /// K-means++ seeding with `k` centers followed by nearest-center assignment.
    pub fn kmeans_clustering<R>(&self, mask: &LabelMask, k: usize, rng: &mut R) -> Result<Partition>
    where
        R: UniformRandom + ?Sized,
    {
        let objects = objects_of(mask)?;
        kmeans_partition(objects, k, rng)
    }

    /// Full adaptive clustering using the random source in `rng`.
    pub fn complex_clustering<R: UniformRandom>(
        &self,
        mask: &LabelMask,
        rng: &mut R,
    ) -> Result<ClusteringOutcome> {
        self.params.validate()?;
        let rng: &mut dyn UniformRandom = rng;
        let objects = objects_of(mask)?;

        let initial = match self.params.initialization {
            Initialization::Basic => self.basic_partition(mask, objects)?,
            Initialization::KmeansPlusPlus { k } => kmeans_partition(objects, k, rng)?,
        };
        debug!(
            "initial labeling: {} objects in {} clusters",
            initial.num_objects(),
            initial.num_clusters()
        );

        let outcome = self.refine(initial, mask, rng)?;
        debug!(
            "clustering finished: {} clusters after {} attempts",
            outcome.partition.num_clusters(),
            outcome.attempts
        );
        Ok(outcome)
    }

    /// [`complex_clustering`](Self::complex_clustering) with an RNG built from `params.seed`.
    pub fn complex_clustering_seeded(&self, mask: &LabelMask) -> Result<ClusteringOutcome> {
        let mut rng = seeded_rng(self.params.seed);
        self.complex_clustering(mask, &mut rng)
    }

    fn basic_partition(&self, mask: &LabelMask, objects: Vec<ClusterObject>) -> Result<Partition> {
        let blobs = mask
            .smear(self.params.smear_sigma, self.params.smear_threshold)
            .connected_components();
        let centers: Vec<Point3> = blobs
            .region_moments()
            .values()
            .filter_map(RegionMoments::centroid)
            .collect();
        debug!("basic clustering: {} blobs", centers.len());
        if centers.is_empty() {
            return Partition::single(objects);
        }

        let positions: Vec<Point3> = objects.iter().map(|o| o.centroid).collect();
        let assignment = objects
            .iter()
            .zip(assign_nearest(&positions, &centers))
            .map(|(o, c)| (o.id, ClusterId(c as u32 + 1)))
            .collect();
        let mut partition = Partition::from_assignment(objects, assignment)?;
        partition.relabel_consecutive();
        Ok(partition)
    }

    /// Fit `k` components and require one assignment and one probability per position.
    fn checked_fit(
        &self,
        positions: &[Point3],
        k: usize,
        rng: &mut dyn UniformRandom,
    ) -> Result<MixtureFit> {
        let fit = self.fitter.fit(positions, k, rng)?;
        for (what, len) in [
            ("assignment", fit.assignment.len()),
            ("probabilities", fit.probabilities.len()),
        ] {
            if len != positions.len() {
                return Err(Error::MixtureFit {
                    k,
                    message: format!("{what} covers {len} of {} positions", positions.len()),
                });
            }
        }
        Ok(fit)
    }

    /// Sum over clusters of the single-component log-likelihood.
    fn unsplit_log_likelihood(
        &self,
        partition: &Partition,
        rng: &mut dyn UniformRandom,
    ) -> Result<f64> {
        let mut total = 0.0;
        for cluster in partition.clusters() {
            let positions = partition.member_positions(cluster.id);
            total += self.checked_fit(&positions, 1, rng)?.log_likelihood;
        }
        Ok(total)
    }

    fn refine(
        &self,
        initial: Partition,
        mask: &LabelMask,
        rng: &mut dyn UniformRandom,
    ) -> Result<ClusteringOutcome> {
        let params = &self.params;
        let mut best = initial;
        let mut best_ll = self.unsplit_log_likelihood(&best, rng)?;
        let mut best_ratio = inter_cluster_distance_ratio(&best.cluster_positions())?;
        let mut attempts = 0;
        let mut repeat_this = 0;

        loop {
            attempts += 1;
            let count_before = best.num_clusters();
            let candidate = self.split_pass(&best, rng)?;
            let count = candidate.partition.num_clusters();
            if count > params.max_clusters {
                debug!(
                    "attempt {attempts}: {count} clusters exceeds limit {}",
                    params.max_clusters
                );
                break;
            }

            let ratio = inter_cluster_distance_ratio(&candidate.partition.cluster_positions())?;
            let accepted = candidate.log_likelihood >= best_ll && ratio < best_ratio;
            debug!(
                "attempt {attempts}: {count} clusters, log-likelihood {:.3}, ratio {ratio:.4} ({})",
                candidate.log_likelihood,
                if accepted { "accepted" } else { "rejected" }
            );
            if accepted {
                best = candidate.partition;
                best_ll = candidate.log_likelihood;
                best_ratio = ratio;
            }

            if best.num_clusters() == count_before {
                repeat_this += 1;
            } else {
                repeat_this = 0;
            }
            if repeat_this >= params.num_repeats || attempts > params.max_clusters {
                break;
            }
        }

        best.relabel_consecutive();
        let labels: Vec<(ObjectId, ClusterId)> =
            best.assignment().iter().map(|(&o, &c)| (o, c)).collect();
        for (object, cluster) in labels {
            if let Some(obj) = best.object_mut(object) {
                obj.most_probable_cluster = Some(cluster);
            }
        }

        Ok(ClusteringOutcome {
            mask: best.to_mask(mask),
            partition: best,
            log_likelihood: best_ll,
            ratio: best_ratio,
            attempts,
        })
    }

    /// Try to subdivide every cluster of `current` once.
    fn split_pass(&self, current: &Partition, rng: &mut dyn UniformRandom) -> Result<SplitPass> {
        let params = &self.params;
        let k_max = if current.num_clusters() < params.few_clusters_threshold {
            params.k_max_few_clusters
        } else {
            params.k_max
        };

        let mut assignment = current.assignment().clone();
        let mut probabilities: BTreeMap<ObjectId, f64> = BTreeMap::new();
        let mut next_id = current.next_free_id().0;
        let mut log_likelihood = 0.0;

        for cluster in current.clusters() {
            let members: Vec<ObjectId> = cluster.members().iter().copied().collect();
            let positions = current.member_positions(cluster.id);
            let whole = self.checked_fit(&positions, 1, rng)?;

            let mut best_split: Option<(f64, MixtureFit)> = None;
            for temp_k in 2..=k_max.min(positions.len().saturating_sub(1)) {
                for _ in 0..params.num_repeats {
                    let fit = self.checked_fit(&positions, temp_k, rng)?;
                    let groups = group_positions(&positions, &fit.assignment);
                    if groups.len() < 2 {
                        continue;
                    }
                    let ratio = inter_cluster_distance_ratio(&groups)?;
                    let improves = best_split.as_ref().map_or(true, |(r, _)| ratio < *r);
                    if ratio < params.ratio_cutoff && improves {
                        best_split = Some((ratio, fit));
                    }
                }
            }

            match best_split {
                Some((ratio, fit)) => {
                    let mut fresh: BTreeMap<usize, ClusterId> = BTreeMap::new();
                    for ((&object, &component), &p) in
                        members.iter().zip(&fit.assignment).zip(&fit.probabilities)
                    {
                        let id = *fresh.entry(component).or_insert_with(|| {
                            next_id += 1;
                            ClusterId(next_id - 1)
                        });
                        assignment.insert(object, id);
                        probabilities.insert(object, p);
                    }
                    debug!(
                        "{} ({} members) split into {} with ratio {ratio:.4}",
                        cluster.id,
                        members.len(),
                        fresh.len()
                    );
                    log_likelihood += fit.log_likelihood;
                }
                None => {
                    for (&object, &p) in members.iter().zip(&whole.probabilities) {
                        probabilities.insert(object, p);
                    }
                    log_likelihood += whole.log_likelihood;
                }
            }
        }

        let mut partition = Partition::from_assignment(current.objects().cloned(), assignment)?;
        for (id, p) in probabilities {
            if let Some(obj) = partition.object_mut(id) {
                obj.probability = p;
            }
        }
        Ok(SplitPass {
            partition,
            log_likelihood,
        })
    }
}

fn objects_of(mask: &LabelMask) -> Result<Vec<ClusterObject>> {
    let objects = ClusterObject::from_mask(mask);
    if objects.is_empty() {
        return Err(Error::EmptyInput);
    }
    Ok(objects)
}

fn kmeans_partition<R>(objects: Vec<ClusterObject>, k: usize, rng: &mut R) -> Result<Partition>
where
    R: UniformRandom + ?Sized,
{
    let positions: Vec<Point3> = objects.iter().map(|o| o.centroid).collect();
    let seeds = kmeans_plus_plus(&positions, k, rng)?;
    let centers: Vec<Point3> = seeds.iter().map(|&s| positions[s]).collect();
    let assignment = objects
        .iter()
        .zip(assign_nearest(&positions, &centers))
        .map(|(o, c)| (o.id, ClusterId(c as u32 + 1)))
        .collect();
    let mut partition = Partition::from_assignment(objects, assignment)?;
    partition.relabel_consecutive();
    Ok(partition)
}

/// Non-empty groups of `positions` keyed by component, in component order.
fn group_positions(positions: &[Point3], assignment: &[usize]) -> Vec<Vec<Point3>> {
    let mut groups: BTreeMap<usize, Vec<Point3>> = BTreeMap::new();
    for (p, &c) in positions.iter().zip(assignment) {
        groups.entry(c).or_default().push(*p);
    }
    groups.into_values().collect()
}
