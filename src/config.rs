use crate::error::NeighborhoodError;

/// Default number of points a kd-tree leaf may hold.
pub const DEFAULT_LEAF_BUCKET_SIZE: usize = 16;

/// Build parameters for a [`Neighborhood`](crate::Neighborhood).
///
/// ```
/// use pointhood::NeighborhoodConfig;
///
/// let config = NeighborhoodConfig::default()
///     .with_leaf_bucket_size(8)
///     .with_voxel_size(0.25);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NeighborhoodConfig {
    /// Maximum number of points stored in a kd-tree leaf.
    pub leaf_bucket_size: usize,
    /// When set, the point set is simplified on a voxel grid of this cell size before indexing.
    pub voxel_size: Option<f64>,
}

impl Default for NeighborhoodConfig {
    fn default() -> Self {
        Self {
            leaf_bucket_size: DEFAULT_LEAF_BUCKET_SIZE,
            voxel_size: None,
        }
    }
}

impl NeighborhoodConfig {
    pub fn with_leaf_bucket_size(mut self, leaf_bucket_size: usize) -> Self {
        self.leaf_bucket_size = leaf_bucket_size;
        self
    }

    pub fn with_voxel_size(mut self, voxel_size: f64) -> Self {
        self.voxel_size = Some(voxel_size);
        self
    }

    /// Checks the parameters without touching any point data.
    pub fn validate(&self) -> Result<(), NeighborhoodError> {
        if self.leaf_bucket_size == 0 {
            return Err(NeighborhoodError::InvalidLeafBucketSize);
        }
        if let Some(voxel_size) = self.voxel_size {
            if !(voxel_size > 0.0 && voxel_size.is_finite()) {
                return Err(NeighborhoodError::InvalidVoxelSize { voxel_size });
            }
        }
        Ok(())
    }
}
