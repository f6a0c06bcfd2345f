use thiserror::Error;

/// Errors returned by the minimizers and the clustering engine.
#[derive(Debug, Error)]
pub enum Error {
    /// Input slice is empty.
    #[error("empty input")]
    EmptyInput,

    /// Invalid parameter value.
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Human-readable explanation.
        message: &'static str,
    },

    /// Requested cluster count is incompatible with the dataset.
    #[error("invalid cluster count: requested {requested}, but dataset has {n_items} items")]
    InvalidClusterCount {
        /// Requested number of clusters.
        requested: usize,
        /// Number of items in the dataset.
        n_items: usize,
    },

    /// Vectors that must share a length do not.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Expected dimensionality.
        expected: usize,
        /// Found dimensionality.
        found: usize,
    },

    /// A cluster that must have members has none.
    #[error("cluster {cluster} has no members")]
    EmptyCluster {
        /// Identifier (or position) of the offending cluster.
        cluster: usize,
    },

    /// An iterative search hit its iteration cap before reaching tolerance.
    #[error("no convergence after {iterations} iterations")]
    MaxIterationsExceeded {
        /// Iterations performed.
        iterations: usize,
    },

    /// The mixture-model fitter could not produce a likelihood.
    #[error("mixture fit with k={k} failed: {message}")]
    MixtureFit {
        /// Requested component count.
        k: usize,
        /// Human-readable explanation.
        message: String,
    },

    /// A label mask does not have the expected shape.
    #[error("mask shape mismatch: expected {expected:?}, found {found:?}")]
    MaskShape {
        /// Expected `(width, height, depth)`.
        expected: (usize, usize, usize),
        /// Found `(width, height, depth)`.
        found: (usize, usize, usize),
    },

    /// Configuration could not be read or parsed.
    #[error("config: {0}")]
    Config(String),
}

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, Error>;
