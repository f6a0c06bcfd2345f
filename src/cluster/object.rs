//! Regions, clusters, and the partition that ties them together.
//!
//! Ownership runs one way: a [`Partition`] owns the [`ClusterObject`]s and the
//! authoritative `object → cluster` assignment. Each [`Cluster`]'s member set
//! and centroid are derived from that assignment and rebuilt whenever it
//! changes, so the two views cannot drift apart.

use crate::error::{Error, Result};
use crate::geometry::{Point3, Positioned};
use crate::mask::LabelMask;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Stable identity of a region: its label in the source mask.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

/// Cluster identifier, 1-based (0 is background in output masks).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClusterId(pub u32);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "object#{}", self.0)
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cluster#{}", self.0)
    }
}

/// One detected region.
#[derive(Clone, Debug, PartialEq)]
pub struct ClusterObject {
    /// Label of the region in the source mask.
    pub id: ObjectId,
    /// Mean pixel coordinate of the region.
    pub centroid: Point3,
    /// Number of pixels carrying the region's label.
    pub pixel_count: usize,
    /// Reporting only: the cluster this object ended up in.
    pub most_probable_cluster: Option<ClusterId>,
    /// Reporting only: responsibility of the object's mixture component.
    pub probability: f64,
}

impl ClusterObject {
    pub fn new(id: ObjectId, centroid: Point3, pixel_count: usize) -> Self {
        Self {
            id,
            centroid,
            pixel_count,
            most_probable_cluster: None,
            probability: 1.0,
        }
    }

    /// One object per nonzero label in `mask`, ordered by label.
    ///
    /// Labels need not be consecutive; absent labels simply produce no object.
    pub fn from_mask(mask: &LabelMask) -> Vec<ClusterObject> {
        mask.region_moments()
            .into_iter()
            .filter_map(|(label, m)| {
                m.centroid()
                    .map(|c| ClusterObject::new(ObjectId(label), c, m.pixel_count))
            })
            .collect()
    }
}

impl Positioned for ClusterObject {
    #[inline]
    fn position(&self) -> Point3 {
        self.centroid
    }
}

/// A group of objects.
#[derive(Clone, Debug, PartialEq)]
pub struct Cluster {
    /// Identifier, unique within its partition.
    pub id: ClusterId,
    /// Mean of the members' centroids.
    pub centroid: Point3,
    members: BTreeSet<ObjectId>,
}

impl Cluster {
    pub fn members(&self) -> &BTreeSet<ObjectId> {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl Positioned for Cluster {
    #[inline]
    fn position(&self) -> Point3 {
        self.centroid
    }
}

/// Assignment of every object to exactly one cluster.
#[derive(Clone, Debug, PartialEq)]
pub struct Partition {
    objects: BTreeMap<ObjectId, ClusterObject>,
    assignment: BTreeMap<ObjectId, ClusterId>,
    clusters: BTreeMap<ClusterId, Cluster>,
}

impl Partition {
    /// Build a partition; `assignment` must cover exactly the given objects.
    pub fn from_assignment(
        objects: impl IntoIterator<Item = ClusterObject>,
        assignment: BTreeMap<ObjectId, ClusterId>,
    ) -> Result<Self> {
        let objects: BTreeMap<ObjectId, ClusterObject> =
            objects.into_iter().map(|o| (o.id, o)).collect();
        if objects.is_empty() {
            return Err(Error::EmptyInput);
        }
        if assignment.len() != objects.len()
            || !assignment.keys().all(|id| objects.contains_key(id))
        {
            return Err(Error::InvalidParameter {
                name: "assignment",
                message: "must cover exactly the partition's objects",
            });
        }
        if assignment.values().any(|c| c.0 == 0) {
            return Err(Error::InvalidParameter {
                name: "assignment",
                message: "cluster ids start at 1",
            });
        }

        let mut p = Self {
            objects,
            assignment,
            clusters: BTreeMap::new(),
        };
        p.rebuild();
        Ok(p)
    }

    /// Every object in one cluster with id `1`.
    pub fn single(objects: impl IntoIterator<Item = ClusterObject>) -> Result<Self> {
        let objects: Vec<ClusterObject> = objects.into_iter().collect();
        let assignment = objects.iter().map(|o| (o.id, ClusterId(1))).collect();
        Self::from_assignment(objects, assignment)
    }

    /// Re-derive cluster member sets and centroids from the assignment.
    fn rebuild(&mut self) {
        let mut members: BTreeMap<ClusterId, BTreeSet<ObjectId>> = BTreeMap::new();
        for (&obj, &cid) in &self.assignment {
            members.entry(cid).or_default().insert(obj);
        }
        self.clusters = members
            .into_iter()
            .map(|(id, members)| {
                let centroid =
                    Point3::mean(members.iter().map(|m| &self.objects[m].centroid))
                        .unwrap_or_default();
                (
                    id,
                    Cluster {
                        id,
                        centroid,
                        members,
                    },
                )
            })
            .collect();
    }

    pub fn num_objects(&self) -> usize {
        self.objects.len()
    }

    pub fn num_clusters(&self) -> usize {
        self.clusters.len()
    }

    pub fn objects(&self) -> impl Iterator<Item = &ClusterObject> + '_ {
        self.objects.values()
    }

    pub fn object(&self, id: ObjectId) -> Option<&ClusterObject> {
        self.objects.get(&id)
    }

    pub(crate) fn object_mut(&mut self, id: ObjectId) -> Option<&mut ClusterObject> {
        self.objects.get_mut(&id)
    }

    /// Clusters in id order.
    pub fn clusters(&self) -> impl Iterator<Item = &Cluster> + '_ {
        self.clusters.values()
    }

    pub fn cluster(&self, id: ClusterId) -> Option<&Cluster> {
        self.clusters.get(&id)
    }

    pub fn cluster_of(&self, object: ObjectId) -> Option<ClusterId> {
        self.assignment.get(&object).copied()
    }

    pub fn assignment(&self) -> &BTreeMap<ObjectId, ClusterId> {
        &self.assignment
    }

    /// Member centroids of `cluster`, in object-id order.
    pub fn member_positions(&self, cluster: ClusterId) -> Vec<Point3> {
        self.clusters
            .get(&cluster)
            .map(|c| c.members.iter().map(|m| self.objects[m].centroid).collect())
            .unwrap_or_default()
    }

    /// Member centroids of every cluster, in cluster-id order.
    pub fn cluster_positions(&self) -> Vec<Vec<Point3>> {
        self.clusters
            .keys()
            .map(|&id| self.member_positions(id))
            .collect()
    }

    /// Smallest id larger than every id in use.
    pub fn next_free_id(&self) -> ClusterId {
        ClusterId(self.clusters.keys().next_back().map_or(1, |c| c.0 + 1))
    }

    /// Renumber clusters `1..=m` keeping their order. Idempotent.
    pub fn relabel_consecutive(&mut self) {
        let lut: BTreeMap<ClusterId, ClusterId> = self
            .clusters
            .keys()
            .enumerate()
            .map(|(i, &old)| (old, ClusterId(i as u32 + 1)))
            .collect();
        for cid in self.assignment.values_mut() {
            *cid = lut[&*cid];
        }
        for obj in self.objects.values_mut() {
            if let Some(c) = obj.most_probable_cluster.as_mut() {
                if let Some(&new) = lut.get(&*c) {
                    *c = new;
                }
            }
        }
        self.rebuild();
    }

    /// Paint each region of `regions` with its cluster id.
    ///
    /// Labels with no object in this partition become background.
    pub fn to_mask(&self, regions: &LabelMask) -> LabelMask {
        regions.map_labels(|l| self.assignment.get(&ObjectId(l)).map_or(0, |c| c.0))
    }
}
