use thiserror::Error;

/// Errors reported while building a [`Neighborhood`](crate::Neighborhood) or a query on it.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum NeighborhoodError {
    /// The voxel size used for simplification is not strictly positive (or not finite).
    #[error("voxel size must be positive and finite, got {voxel_size}")]
    InvalidVoxelSize {
        /// The rejected voxel size.
        voxel_size: f64,
    },
    /// A coordinate divided by the voxel size does not fit the integer voxel key.
    #[error("coordinate {coordinate} of point {index} does not fit a voxel key")]
    CoordinateOverflow {
        /// Index of the offending point.
        index: usize,
        /// The offending coordinate value.
        coordinate: f64,
    },
    /// An index outside the accessor's range.
    #[error("index {index} out of range for {len} points")]
    InvalidIndex {
        /// The rejected index.
        index: usize,
        /// Number of points the accessor provides.
        len: usize,
    },
    /// Leaves must hold at least one point.
    #[error("leaf bucket size must be at least 1")]
    InvalidLeafBucketSize,
    /// k-NN queries require `k >= 1`.
    #[error("number of neighbors must be at least 1")]
    InvalidNeighborCount,
    /// Range queries require a non-negative radius.
    #[error("radius must be non-negative, got {radius}")]
    InvalidRadius {
        /// The rejected radius.
        radius: f64,
    },
    /// The fuzzy sphere tolerance must be non-negative.
    #[error("epsilon must be non-negative, got {epsilon}")]
    InvalidEpsilon {
        /// The rejected tolerance.
        epsilon: f64,
    },
}

/// Outcome of applying a neighbor query.
///
/// A k-NN query on an index holding fewer than `k` points emits every point and
/// reports [`QueryStatus::Underfull`]. This is not an error; the caller decides
/// whether the smaller neighborhood is acceptable.
#[must_use]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueryStatus {
    /// The query produced its full result.
    Complete,
    /// Fewer neighbors than requested were available.
    Underfull {
        /// Number of neighbors emitted.
        found: usize,
        /// Number of neighbors requested.
        requested: usize,
    },
}

impl QueryStatus {
    pub fn is_complete(&self) -> bool {
        matches!(self, QueryStatus::Complete)
    }
}
