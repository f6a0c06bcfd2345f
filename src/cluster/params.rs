use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// How the starting labeling for statistical refinement is produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Initialization {
    /// Smear the mask, label the blobs, assign each region to the nearest blob.
    #[default]
    Basic,
    /// K-means++ seeding with `k` centers, then nearest-center assignment.
    KmeansPlusPlus { k: usize },
}

/// Configuration of [`ObjectClustering`](super::ObjectClustering).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringParams {
    /// How the starting labeling is built.
    pub initialization: Initialization,
    /// Upper bound on the cluster count and on the number of refinement attempts.
    pub max_clusters: usize,
    /// Mixture fits per trial sub-count, and how many unchanged attempts end the search.
    pub num_repeats: usize,
    /// A split is only accepted when its distance ratio is below this.
    pub ratio_cutoff: f64,
    /// Largest trial sub-count per cluster.
    pub k_max: usize,
    /// Largest trial sub-count while the best count is below `few_clusters_threshold`.
    pub k_max_few_clusters: usize,
    /// Best cluster count below which `k_max_few_clusters` applies.
    pub few_clusters_threshold: usize,
    /// Gaussian sigma (pixels) of the smear used by basic clustering.
    pub smear_sigma: f64,
    /// Fraction of the smeared maximum that counts as blob foreground.
    pub smear_threshold: f64,
    /// Seed for the convenience entry points; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for ClusteringParams {
    fn default() -> Self {
        Self {
            initialization: Initialization::Basic,
            max_clusters: 20,
            num_repeats: 3,
            ratio_cutoff: 0.89,
            k_max: 4,
            k_max_few_clusters: 6,
            few_clusters_threshold: 3,
            smear_sigma: 8.0,
            smear_threshold: 0.1,
            seed: None,
        }
    }
}

impl ClusteringParams {
    /// Parse from JSON; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(format!("failed to parse: {e}")))
    }

    /// Read and parse a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
        Self::from_json_str(&data)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.max_clusters == 0 {
            return Err(Error::InvalidParameter {
                name: "max_clusters",
                message: "must be at least 1",
            });
        }
        if self.num_repeats == 0 {
            return Err(Error::InvalidParameter {
                name: "num_repeats",
                message: "must be at least 1",
            });
        }
        if self.ratio_cutoff <= 0.0 {
            return Err(Error::InvalidParameter {
                name: "ratio_cutoff",
                message: "must be positive",
            });
        }
        if self.k_max < 2 || self.k_max_few_clusters < 2 {
            return Err(Error::InvalidParameter {
                name: "k_max",
                message: "must be at least 2",
            });
        }
        if self.smear_sigma < 0.0 {
            return Err(Error::InvalidParameter {
                name: "smear_sigma",
                message: "must be non-negative",
            });
        }
        if self.smear_threshold <= 0.0 || self.smear_threshold > 1.0 {
            return Err(Error::InvalidParameter {
                name: "smear_threshold",
                message: "must be in (0, 1]",
            });
        }
        if let Initialization::KmeansPlusPlus { k: 0 } = self.initialization {
            return Err(Error::InvalidParameter {
                name: "initialization.k",
                message: "must be at least 1",
            });
        }
        Ok(())
    }
}
